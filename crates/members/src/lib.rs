//! Member registration lifecycle.

pub mod member;

pub use member::{
    Member, MemberAction, MemberChange, MemberCommand, MemberDetails, MemberDetailsPatch, MemberId,
    MemberStatus, MemberTransition, RegistrationSource, pending_queue,
};
