//! Notices and their publication windows.
//!
//! Visibility is computed at read time; nothing here transitions on a timer.

pub mod notice;
pub mod window;

pub use notice::{
    Notice, NoticeChange, NoticeCommand, NoticeDraft, NoticeId, NoticePatch, Priority,
    public_listing,
};
pub use window::PublicationWindow;
