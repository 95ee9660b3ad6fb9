//! Aggregate root trait for lifecycle-governed domain models.

use chrono::{DateTime, Utc};

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Number of changes applied to this aggregate since it was created.
    fn version(&self) -> u64;
}

/// A computed state change produced by an aggregate.
///
/// Changes are the "next-state patch" handed to storage; they carry no IO.
pub trait Change {
    /// Stable dotted name, e.g. `members.member.approved`.
    fn change_type(&self) -> &'static str;

    fn occurred_at(&self) -> DateTime<Utc>;

    /// Whether storage must delete the record after this change.
    fn removes_record(&self) -> bool {
        false
    }
}

/// Aggregate execution semantics (pure, deterministic).
///
/// - **Decision logic**: `handle(&self, cmd)` validates and returns changes.
/// - **State mutation**: `apply(&mut self, change)` evolves state.
///
/// Aggregates must not perform IO. Persisting the resulting state is the
/// caller's job.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Change: Change + Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Evolve in-memory state from a single change.
    fn apply(&mut self, change: &Self::Change);

    /// Decide which changes to emit given the current state and a command.
    ///
    /// This must not mutate state. An empty vector means the command is a
    /// successful no-op.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Change>, Self::Error>;

    /// Handle a command and apply the resulting changes to a copy of `self`.
    fn execute(&self, command: &Self::Command) -> Result<(Self, Vec<Self::Change>), Self::Error>
    where
        Self: Clone + Sized,
    {
        let changes = self.handle(command)?;
        let mut next = self.clone();
        for change in &changes {
            next.apply(change);
        }
        Ok((next, changes))
    }
}
