//! Infrastructure layer: record storage and command execution against it.

pub mod command_dispatcher;
pub mod repository;

pub use command_dispatcher::{create, dispatch, dispatch_all};
pub use repository::{Committed, Decide, InMemoryRepository, Mutation, Repository, StoreError, StoreResult};
