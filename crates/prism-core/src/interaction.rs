//! Pointer interaction state machine
//!
//! Translates pointer events on the canvas into editor operations: selecting
//! and dragging shapes, dragging individual handles, and click-to-place
//! polygon drawing. Drags are drafts inside an editor gesture, so each one
//! lands in history as a single entry on release.

use crate::editor::Editor;
use crate::geometry::{Point, ShapeId, ShapePatch};
use crate::Vec2;
use glam::Affine2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Drawn radius of a handle
pub const HANDLE_RADIUS: f32 = 6.0;
/// Pick tolerance around a handle center
pub const HANDLE_HIT_RADIUS: f32 = 8.0;

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    /// Left / primary
    Primary,
    /// Right / secondary
    Secondary,
}

/// Current interaction mode
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    /// Nothing in progress
    #[default]
    Idle,
    /// Moving a whole shape
    DraggingShape {
        /// Shape being moved
        shape_id: ShapeId,
        /// Pointer position minus the shape centroid at press time
        offset: Vec2,
    },
    /// Moving one handle
    DraggingPoint {
        /// Shape being edited
        shape_id: ShapeId,
        /// Handle index
        handle: usize,
        /// Shape transform captured at press time
        transform: Affine2,
    },
    /// Placing polygon vertices
    DrawingPolygon {
        /// Vertices placed so far
        points: Vec<Point>,
    },
}

/// A handle marker to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayHandle {
    /// Handle index
    pub index: usize,
    /// Canvas position
    pub position: Point,
    /// Marker radius
    pub radius: f32,
    /// Marker color (the layer color)
    pub color: String,
    /// Whether this is the selected point
    pub selected: bool,
}

/// In-progress polygon preview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingPreview {
    /// Placed vertices
    pub points: Vec<Point>,
    /// Dashed rubber-band segment from the last vertex to the pointer
    pub rubber_band: Option<(Point, Point)>,
}

/// Editing decorations drawn above the composition
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Overlay {
    /// Handles of the selected shape
    pub handles: Vec<OverlayHandle>,
    /// Polygon being drawn
    pub drawing: Option<DrawingPreview>,
}

/// Owns the drag state and the last pointer position
#[derive(Debug, Default)]
pub struct InteractionController {
    state: DragState,
    pointer: Option<Point>,
}

impl InteractionController {
    /// Create an idle controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// True while placing polygon vertices
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DragState::DrawingPolygon { .. })
    }

    /// Last known pointer position
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Handle a button press at canvas position `p`
    pub fn pointer_down(&mut self, editor: &mut Editor, p: Point, button: PointerButton) {
        self.pointer = Some(p);
        if let DragState::DrawingPolygon { points } = &mut self.state {
            match button {
                PointerButton::Primary => {
                    points.push(p);
                    trace!("Polygon vertex {} at {:?}", points.len(), p);
                }
                PointerButton::Secondary => self.finish_drawing(editor),
            }
            return;
        }
        if button != PointerButton::Primary || self.state != DragState::Idle {
            return;
        }

        // Handles of the selected shape win over shape bodies
        if let Some(handle) = editor.handle_at(p, HANDLE_HIT_RADIUS) {
            if let Some(shape) = editor.selected_shape() {
                let shape_id = shape.id;
                let transform = shape.transform();
                editor.select_point(Some(handle));
                editor.begin_gesture();
                debug!("Dragging handle {} of shape {}", handle, shape_id);
                self.state = DragState::DraggingPoint {
                    shape_id,
                    handle,
                    transform,
                };
                return;
            }
        }

        let Some(layer_id) = editor.layer_at(p) else {
            return;
        };
        editor.select_layer(Some(layer_id));
        if let Some(shape) = editor.selected_shape() {
            let shape_id = shape.id;
            let offset = p - shape.centroid();
            editor.begin_gesture();
            debug!("Dragging shape {}", shape_id);
            self.state = DragState::DraggingShape { shape_id, offset };
        }
    }

    /// Handle pointer motion
    pub fn pointer_move(&mut self, editor: &mut Editor, p: Point) {
        self.pointer = Some(p);
        match &self.state {
            DragState::DraggingShape { shape_id, offset } => {
                let Some(shape) = editor.state().shape(*shape_id) else {
                    return;
                };
                let delta = (p - *offset) - shape.centroid();
                let mut geometry = shape.geometry.clone();
                geometry.translate(delta);
                let patch = ShapePatch::geometry(geometry);
                if let Err(e) = editor.update_shape(*shape_id, &patch, false) {
                    debug!("Drag update dropped: {}", e);
                }
            }
            DragState::DraggingPoint {
                shape_id,
                handle,
                transform,
            } => {
                let Some(shape) = editor.state().shape(*shape_id) else {
                    return;
                };
                let local = if transform.matrix2.determinant().abs() < f32::EPSILON {
                    p
                } else {
                    transform.inverse().transform_point2(p)
                };
                let mut geometry = shape.geometry.clone();
                geometry.move_handle(*handle, local);
                let patch = ShapePatch::geometry(geometry);
                if let Err(e) = editor.update_shape(*shape_id, &patch, false) {
                    debug!("Drag update dropped: {}", e);
                }
            }
            DragState::Idle | DragState::DrawingPolygon { .. } => {}
        }
    }

    /// Handle a button release; ends any drag as one committed edit
    pub fn pointer_up(&mut self, editor: &mut Editor) {
        if matches!(
            self.state,
            DragState::DraggingShape { .. } | DragState::DraggingPoint { .. }
        ) {
            editor.end_gesture();
            self.state = DragState::Idle;
        }
    }

    /// Pointer left the canvas; treated as a release
    pub fn pointer_leave(&mut self, editor: &mut Editor) {
        self.pointer_up(editor);
        self.pointer = None;
    }

    /// Enter polygon drawing mode. Ignored mid-drag.
    pub fn start_drawing(&mut self) {
        if self.state == DragState::Idle {
            self.state = DragState::DrawingPolygon { points: Vec::new() };
        }
    }

    /// Start drawing when idle, finish when drawing
    pub fn toggle_drawing(&mut self, editor: &mut Editor) {
        if self.is_drawing() {
            self.finish_drawing(editor);
        } else {
            self.start_drawing();
        }
    }

    /// Leave drawing mode, creating a polygon from three or more vertices.
    /// Fewer vertices are discarded.
    pub fn finish_drawing(&mut self, editor: &mut Editor) {
        let DragState::DrawingPolygon { points } = std::mem::take(&mut self.state) else {
            return;
        };
        if points.len() < 3 {
            debug!("Discarding polygon with {} vertices", points.len());
            return;
        }
        if let Err(e) = editor.add_polygon(points) {
            debug!("Polygon rejected: {}", e);
        }
    }

    /// Leave drawing mode without creating anything
    pub fn cancel_drawing(&mut self) {
        if self.is_drawing() {
            self.state = DragState::Idle;
        }
    }

    /// Decorations for the current selection and drawing
    pub fn overlay(&self, editor: &Editor) -> Overlay {
        let mut overlay = Overlay::default();
        if let DragState::DrawingPolygon { points } = &self.state {
            let rubber_band = points.last().copied().zip(self.pointer);
            overlay.drawing = Some(DrawingPreview {
                points: points.clone(),
                rubber_band,
            });
            return overlay;
        }

        let Some(layer) = editor.selected_layer().filter(|l| l.visible) else {
            return overlay;
        };
        let Some(shape) = editor.state().shape(layer.shape_id) else {
            return overlay;
        };
        overlay.handles = shape
            .world_handles()
            .into_iter()
            .map(|h| OverlayHandle {
                index: h.index,
                position: h.position,
                radius: HANDLE_RADIUS,
                color: layer.color.clone(),
                selected: editor.selected_point() == Some(h.index),
            })
            .collect();
        overlay
    }
}
