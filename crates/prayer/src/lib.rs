//! Prayer request lifecycle: submission, prayer tracking and visibility.

pub mod request;

pub use request::{
    PrayerChange, PrayerCommand, PrayerRequest, PrayerRequestId, PrayerStatus, PrayerSubmission,
    PublicPrayerView, SharingSettings, prayer_queue, public_wall,
};
