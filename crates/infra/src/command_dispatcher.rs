//! Command execution against stored aggregates.
//!
//! ```text
//! Command
//!   ↓
//! 1. Read the current record under the repository's write lock
//!   ↓
//! 2. Handle the command (pure decision, produces changes)
//!   ↓
//! 3. Commit: replace, remove, or leave the record as it was
//! ```
//!
//! Steps 1 to 3 are a single `Repository::transition`, so a stale status can
//! never be acted on.

use fellowship_core::{Aggregate, Change, DomainError};

use crate::repository::{Committed, Mutation, Repository, StoreError, StoreResult};

/// Map the outcome of `execute` onto a storage mutation.
fn mutation_for<A>(next: A, changes: &[A::Change]) -> Mutation<A>
where
    A: Aggregate,
{
    if changes.iter().any(|c| c.removes_record()) {
        Mutation::Remove
    } else if changes.is_empty() {
        Mutation::Unchanged
    } else {
        Mutation::Replace(next)
    }
}

/// Run `command` against the stored aggregate `id` and commit the result atomically.
pub async fn dispatch<A, R>(repo: &R, id: &A::Id, command: A::Command) -> StoreResult<Committed<A>>
where
    A: Aggregate<Error = DomainError> + Clone + Send + Sync + 'static,
    A::Id: Send + Sync + 'static,
    A::Command: Send + 'static,
    R: Repository<A::Id, A> + ?Sized,
{
    dispatch_all(repo, id, vec![command]).await
}

/// Run several commands in order inside one transition; all commit or none do.
pub async fn dispatch_all<A, R>(repo: &R, id: &A::Id, commands: Vec<A::Command>) -> StoreResult<Committed<A>>
where
    A: Aggregate<Error = DomainError> + Clone + Send + Sync + 'static,
    A::Id: Send + Sync + 'static,
    A::Command: Send + 'static,
    R: Repository<A::Id, A> + ?Sized,
{
    let committed = repo
        .transition(
            id,
            Box::new(move |current: &A| {
                let mut next = current.clone();
                let mut changes = Vec::new();
                for command in &commands {
                    let (after, emitted) = next.execute(command)?;
                    next = after;
                    changes.extend(emitted);
                }
                for change in &changes {
                    tracing::debug!(change = change.change_type(), "change decided");
                }
                Ok(mutation_for(next, &changes))
            }),
        )
        .await?;
    Ok(committed)
}

/// Run a creation command against `empty` and insert the result under its id.
pub async fn create<A, R>(repo: &R, empty: A, command: A::Command) -> StoreResult<A>
where
    A: Aggregate<Error = DomainError> + Clone + Send + Sync + 'static,
    A::Id: Send + Sync + 'static,
    R: Repository<A::Id, A> + ?Sized,
{
    let (created, changes) = empty.execute(&command)?;
    if changes.is_empty() {
        return Err(StoreError::Rejected(DomainError::invariant("creation produced no changes")));
    }
    repo.insert(created.id().clone(), created.clone()).await?;
    Ok(created)
}
