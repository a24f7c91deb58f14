//! Uploaded media and live camera streams
//!
//! Both are session state: they live beside the project, are referenced from
//! shapes by url or stream id, and are never part of undo history.

use crate::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Unique identifier for an uploaded media item
pub type MediaId = u64;

/// Unique identifier for a live stream
pub type LiveStreamId = u64;

/// Type of an uploaded media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Image file (png, jpg, etc.)
    Image,
    /// Video file (mp4, webm, etc.)
    Video,
}

impl MediaType {
    /// Determines the media type from a MIME type such as `image/png`
    pub fn from_mime(mime: &str) -> Option<Self> {
        let top = mime.split('/').next()?.trim().to_ascii_lowercase();
        match top.as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }

    /// Determines the media type from the file path extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        match ext.to_lowercase().as_str() {
            "mp4" | "mov" | "avi" | "mkv" | "webm" => Some(MediaType::Video),
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "svg" => Some(MediaType::Image),
            _ => None,
        }
    }

    /// MIME type first, file extension as fallback
    pub fn detect(mime: Option<&str>, name: &str) -> Option<Self> {
        mime.and_then(Self::from_mime)
            .or_else(|| Self::from_path(Path::new(name)))
    }
}

/// An uploaded asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Unique identifier
    pub id: MediaId,
    /// Display name (the file name)
    pub name: String,
    /// Url shapes reference it by
    pub url: String,
    /// Image or video
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Intrinsic pixel size, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec2>,
}

/// Failure acquiring a camera or microphone
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// The user or platform refused access
    #[error("permission denied")]
    PermissionDenied,
    /// No usable device, or the device failed to open
    #[error("device unavailable: {0}")]
    Unavailable(String),
}

/// What a camera reports once opened
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    /// Device label
    pub name: String,
    /// Frame size in pixels
    pub size: Vec2,
}

/// Capability interface for camera acquisition
pub trait VideoStreamSource {
    /// Request access and open a stream
    fn open(&mut self) -> std::result::Result<StreamInfo, DeviceError>;
}

/// A live camera capture registered with the session
#[derive(Debug, Clone, PartialEq)]
pub struct LiveStream {
    /// Unique identifier
    pub id: LiveStreamId,
    /// Display name
    pub name: String,
    /// Frame size in pixels
    pub size: Vec2,
}

/// Session media: uploaded items and live streams
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    items: Vec<MediaItem>,
    streams: Vec<LiveStream>,
    next_id: u64,
}

impl MediaLibrary {
    /// Creates a new empty media library
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    fn allocate_id(&mut self) -> u64 {
        // Default-constructed libraries start at 0
        self.next_id = self.next_id.max(1);
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Register an upload. Returns `None` when the file is neither image nor video.
    pub fn add_item(
        &mut self,
        name: impl Into<String>,
        url: impl Into<String>,
        mime: Option<&str>,
        size: Option<Vec2>,
    ) -> Option<&MediaItem> {
        let name = name.into();
        let Some(media_type) = MediaType::detect(mime, &name) else {
            warn!("Rejected upload '{}': not an image or video", name);
            return None;
        };
        let id = self.allocate_id();
        info!("Added {:?} media '{}' (id={})", media_type, name, id);
        self.items.push(MediaItem {
            id,
            name,
            url: url.into(),
            media_type,
            size,
        });
        self.items.last()
    }

    /// All uploaded items in upload order
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Look up an item by url
    pub fn item_by_url(&self, url: &str) -> Option<&MediaItem> {
        self.items.iter().find(|item| item.url == url)
    }

    /// Open a camera through `source` and register the stream.
    ///
    /// Nothing is registered on failure.
    pub fn acquire_stream(
        &mut self,
        source: &mut dyn VideoStreamSource,
    ) -> std::result::Result<&LiveStream, DeviceError> {
        let info = source.open()?;
        let id = self.allocate_id();
        info!("Live stream '{}' registered (id={})", info.name, id);
        self.streams.push(LiveStream {
            id,
            name: info.name,
            size: info.size,
        });
        // Just pushed
        Ok(&self.streams[self.streams.len() - 1])
    }

    /// All live streams
    pub fn streams(&self) -> &[LiveStream] {
        &self.streams
    }

    /// Look up a stream by id
    pub fn stream(&self, id: LiveStreamId) -> Option<&LiveStream> {
        self.streams.iter().find(|s| s.id == id)
    }

    /// Drop a stream (e.g. the camera was unplugged)
    pub fn remove_stream(&mut self, id: LiveStreamId) -> Option<LiveStream> {
        let index = self.streams.iter().position(|s| s.id == id)?;
        Some(self.streams.remove(index))
    }
}
