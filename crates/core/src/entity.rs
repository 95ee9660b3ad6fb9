//! Records with a stable identity that outlives edits (events, catalog entries).

/// A record addressed by its id rather than its contents.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
