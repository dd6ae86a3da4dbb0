use crate::storage::buffer_manager::{Frame, FrameId};

/// Eviction policy for the buffer pool. The buffer manager notifies the
/// policy about page activity and asks it for a victim when every frame is
/// occupied.
pub trait ReplacementPolicy {
    /// A page already resident in `frame_id` was requested again.
    fn record_access(&mut self, frame_id: FrameId);

    /// A page was just loaded into `frame_id`.
    fn record_load(&mut self, frame_id: FrameId);

    /// The pin count of `frame_id` dropped to zero; the frame is a
    /// candidate on the next sweep.
    fn record_unpin(&mut self, frame_id: FrameId);

    /// Picks an unpinned frame to evict, or `None` when every frame is
    /// pinned. `frames` is the pool in frame-id order.
    fn choose_victim(&mut self, frames: &[Frame]) -> Option<FrameId>;
}
