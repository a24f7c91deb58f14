//! AI visual suggestions
//!
//! A [`VisualSuggester`] turns a free-text mood prompt plus the parameter
//! catalog into a JSON answer naming a parameterized visual and option
//! values. The answer is untrusted: [`parse_suggestion`] rejects unknown
//! visuals, drops unknown keys and clamps values into their ranges.
//!
//! [`SuggestionWorker`] runs a suggester on a background thread so the frame
//! loop never blocks on the service.

use crate::geometry::{ShapeId, VisualOptions};
use crate::visual::{param_spec, parameterized_visuals, ParamTable, VisualCategory, VisualId};
use crate::{CoreError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

/// External text-generation service
pub trait VisualSuggester: Send {
    /// Answer `request` with raw model text. Service failures are reported
    /// as [`CoreError::InvalidSuggestion`].
    fn suggest(&mut self, request: &SuggestionRequest) -> Result<String>;
}

/// Prompt plus the catalog of visuals the answer may choose from
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionRequest {
    /// User's free-text description
    pub prompt: String,
    /// Parameterized visuals and their parameter ranges
    pub catalog: BTreeMap<VisualId, &'static ParamTable>,
}

impl SuggestionRequest {
    /// Request over the full parameterized catalog
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            catalog: parameterized_visuals().collect(),
        }
    }

    /// Catalog as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Instruction text for a chat-style model
    pub fn to_prompt(&self) -> Result<String> {
        let catalog = serde_json::to_string_pretty(&self.catalog)?;
        Ok(format!(
            "Pick one visual for a projection-mapped shape that matches this mood: \"{}\".\n\
             Choose from these visuals and stay inside each parameter's min/max:\n{}\n\
             Answer with JSON only: \
             {{\"visual\": \"<id>\", \"visualOptions\": {{\"<key>\": <number>}}}}",
            self.prompt, catalog
        ))
    }
}

/// A validated suggestion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Chosen parameterized visual
    pub visual: VisualId,
    /// Registered keys only, clamped into range
    pub visual_options: VisualOptions,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSuggestion {
    visual: String,
    #[serde(default)]
    visual_options: BTreeMap<String, serde_json::Value>,
}

/// Strip a surrounding markdown code fence, if any
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip an info string such as "json"
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Validate raw model text
pub fn parse_suggestion(text: &str) -> Result<Suggestion> {
    let raw: RawSuggestion = serde_json::from_str(strip_fence(text))?;
    let visual: VisualId = raw.visual.parse()?;
    if visual.category() != VisualCategory::Parameterized || visual.params().is_none() {
        return Err(CoreError::InvalidSuggestion(format!(
            "'{}' has no adjustable parameters",
            visual.as_str()
        )));
    }

    let mut visual_options = VisualOptions::new();
    for (key, value) in raw.visual_options {
        let Some(spec) = param_spec(visual, &key) else {
            debug!("Dropping unknown option '{}' for {}", key, visual.as_str());
            continue;
        };
        let Some(number) = value.as_f64() else {
            debug!("Dropping non-numeric option '{}'", key);
            continue;
        };
        visual_options.insert(key, spec.clamp(number as f32));
    }
    Ok(Suggestion {
        visual,
        visual_options,
    })
}

struct Job {
    shape_id: ShapeId,
    request: SuggestionRequest,
}

/// Outcome of one background request
pub type SuggestionOutcome = (ShapeId, Result<String>);

/// Runs a [`VisualSuggester`] off the frame loop, one request at a time
pub struct SuggestionWorker {
    jobs: Option<Sender<Job>>,
    results: Receiver<SuggestionOutcome>,
    pending: usize,
    handle: Option<JoinHandle<()>>,
}

impl SuggestionWorker {
    /// Spawn the worker thread
    pub fn spawn(mut suggester: Box<dyn VisualSuggester>) -> std::io::Result<Self> {
        let (job_tx, job_rx) = unbounded::<Job>();
        let (result_tx, result_rx) = unbounded();
        let handle = std::thread::Builder::new()
            .name("prism-suggest".into())
            .spawn(move || {
                for job in job_rx {
                    let result = suggester.suggest(&job.request);
                    if let Err(e) = &result {
                        warn!("Suggestion request failed: {}", e);
                    }
                    if result_tx.send((job.shape_id, result)).is_err() {
                        break;
                    }
                }
                debug!("Suggestion worker stopped");
            })?;
        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            pending: 0,
            handle: Some(handle),
        })
    }

    /// Queue a prompt for `shape_id`. Returns false while a request is in
    /// flight or if the worker has stopped.
    pub fn request(&mut self, shape_id: ShapeId, prompt: impl Into<String>) -> bool {
        if self.pending > 0 {
            return false;
        }
        let Some(jobs) = &self.jobs else {
            return false;
        };
        let job = Job {
            shape_id,
            request: SuggestionRequest::new(prompt),
        };
        if jobs.send(job).is_err() {
            error!("Suggestion worker is gone");
            return false;
        }
        info!("Requested suggestion for shape {}", shape_id);
        self.pending += 1;
        true
    }

    /// True while a request is in flight
    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    /// Completed request, if any
    pub fn poll(&mut self) -> Option<SuggestionOutcome> {
        let outcome = self.results.try_recv().ok()?;
        self.pending = self.pending.saturating_sub(1);
        Some(outcome)
    }

    /// Block until the in-flight request completes
    pub fn wait(&mut self) -> Option<SuggestionOutcome> {
        if self.pending == 0 {
            return None;
        }
        let outcome = self.results.recv().ok()?;
        self.pending -= 1;
        Some(outcome)
    }
}

impl Drop for SuggestionWorker {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
