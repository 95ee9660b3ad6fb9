//! `fellowship-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod queue;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, Change};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldViolation, Violations};
pub use id::{RecordId, UserId};
pub use queue::{QueueRank, sort_queue};
pub use value_object::ValueObject;
