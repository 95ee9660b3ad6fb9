//! Contact message triage lifecycle.

pub mod message;

pub use message::{
    ContactChange, ContactCommand, ContactMessage, ContactMessageId, ContactStatus, ContactSubmission,
    triage_queue,
};
