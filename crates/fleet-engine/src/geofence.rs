//! Geofence evaluation and pointer-driven fence drawing.

use fleet_domain::{Geofence, Position, MIN_FENCE_EDGE};
use serde::{Deserialize, Serialize};

/// Whether a position lies outside the fence. With no fence set, no
/// breach is possible.
#[must_use]
pub fn is_outside(fence: Option<&Geofence>, pos: Position) -> bool {
    match fence {
        Some(fence) => !fence.contains(pos),
        None => false,
    }
}

/// Drawing phase of the fence designer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DrawState {
    /// No drawing in progress; the committed fence (if any) is fixed.
    Idle,
    /// Operator has requested a new fence; waiting for pointer press.
    Defining,
    /// Pointer is down; a provisional rectangle tracks the drag.
    Drawing { start: Position, current: Position },
}

/// State machine for drawing a new geofence on the map.
///
/// `Idle -> Defining -> Drawing -> Idle`. The drag rectangle is
/// normalized so width and height are non-negative regardless of drag
/// direction; on release it is committed only if both edges exceed
/// [`MIN_FENCE_EDGE`], otherwise it is silently discarded and the
/// prior fence survives.
#[derive(Debug, Clone, Copy, Default)]
pub struct FenceDesigner {
    state: DrawState,
}

impl Default for DrawState {
    fn default() -> Self {
        Self::Idle
    }
}

impl FenceDesigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    /// Operator requested a new fence; the next pointer press starts a drag.
    pub fn begin_define(&mut self) {
        self.state = DrawState::Defining;
    }

    /// Abandon a pending define request without touching the fence.
    pub fn cancel(&mut self) {
        self.state = DrawState::Idle;
    }

    /// Pointer press on the map area. Ignored unless a define was requested.
    pub fn pointer_down(&mut self, pos: Position) {
        if self.state == DrawState::Defining {
            self.state = DrawState::Drawing {
                start: pos,
                current: pos,
            };
        }
    }

    /// Pointer drag; recomputes the provisional rectangle.
    pub fn pointer_move(&mut self, pos: Position) {
        if let DrawState::Drawing { start, .. } = self.state {
            self.state = DrawState::Drawing {
                start,
                current: pos,
            };
        }
    }

    /// Provisional rectangle while dragging, for rendering feedback.
    #[must_use]
    pub fn provisional(&self) -> Option<Geofence> {
        match self.state {
            DrawState::Drawing { start, current } => Some(normalized_rect(start, current)),
            _ => None,
        }
    }

    /// Pointer release: commit the drag if it is large enough, discard
    /// otherwise. Either way the designer returns to `Idle`.
    pub fn pointer_up(&mut self) -> Option<Geofence> {
        let committed = self.provisional().filter(|fence| {
            fence.width > MIN_FENCE_EDGE && fence.height > MIN_FENCE_EDGE
        });
        self.state = DrawState::Idle;
        committed
    }

    /// Leaving the map mid-drag behaves exactly like a release.
    pub fn pointer_leave(&mut self) -> Option<Geofence> {
        self.pointer_up()
    }
}

fn normalized_rect(a: Position, b: Position) -> Geofence {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    Geofence {
        x,
        y,
        width: (a.x - b.x).abs(),
        height: (a.y - b.y).abs(),
    }
}
