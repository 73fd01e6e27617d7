use tracing::debug;

/// Local cursor rendering that changes while the viewer controls the host.
pub trait CursorOverlay: Send + Sync {
    /// `true` when control is enabled; `false` restores the local cursor.
    fn set_control_active(&self, active: bool);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoCursorOverlay;

impl CursorOverlay for NoCursorOverlay {
    fn set_control_active(&self, active: bool) {
        debug!(active, "Cursor overlay toggled");
    }
}
