//! Pastoral follow-ups on members.

pub mod follow_up;

pub use follow_up::{
    Completion, FollowUp, FollowUpAction, FollowUpChange, FollowUpCommand, FollowUpDraft, FollowUpId,
    FollowUpKind, FollowUpStatus, work_queue,
};
