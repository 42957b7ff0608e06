/// Default drawing color for a fresh editor session.
pub const DEFAULT_COLOR: &str = "#000000";

/// Drawing tools selectable in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Bucket,
    BucketErase,
    Eyedropper,
}

/// Drag-painting state machine: `Idle -> Stroking` on pointer-down,
/// `Stroking -> Idle` (with a single history commit) on pointer-up or
/// pointer-leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Stroking,
}
