use crate::models::MarkSeen;

/// Downstream collaborator that durably records "seen" decisions
///
/// Calls must return immediately: the session never waits on persistence and
/// never learns whether a report succeeded.
pub trait SeenSink: Send + Sync {
    fn mark_seen(&self, command: MarkSeen);
}

/// Discrete tactile feedback fired once per committed swipe
pub trait TactileFeedback: Send + Sync {
    fn impact(&self);
}

/// Feedback for hosts without a haptics engine
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl TactileFeedback for NoFeedback {
    fn impact(&self) {}
}
