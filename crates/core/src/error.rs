//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// lifecycle guards, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more fields failed validation. Every failing field is listed.
    #[error("validation failed: {0}")]
    Validation(Violations),

    /// A lifecycle guard rejected the requested transition.
    #[error("cannot {attempted} {entity} in status {from}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        attempted: &'static str,
    },

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A uniqueness conflict (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    /// Single-field validation failure.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        let mut v = Violations::new();
        v.push(field, message);
        Self::Validation(v)
    }

    pub fn invalid_transition(
        entity: &'static str,
        from: impl core::fmt::Display,
        attempted: &'static str,
    ) -> Self {
        Self::InvalidTransition {
            entity,
            from: from.to_string(),
            attempted,
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Accumulator for field violations.
///
/// Checks are run to completion so callers get every failing field at once
/// instead of only the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Record a violation when `value` is empty after trimming.
    pub fn require_text(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be blank");
        }
    }

    /// Record a violation when `value` does not look like an email address.
    pub fn require_email(&mut self, field: &'static str, value: &str) {
        let value = value.trim();
        let well_formed = value
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            self.push(field, "must be a valid email address");
        }
    }

    /// Record a violation when `condition` is false.
    pub fn check(&mut self, condition: bool, field: &'static str, message: &'static str) {
        if !condition {
            self.push(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn extend(&mut self, other: Violations) {
        self.0.extend(other.0);
    }

    /// `Ok(())` when nothing failed, otherwise a `Validation` error with all fields.
    pub fn finish(self) -> DomainResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl core::fmt::Display for Violations {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.field, v.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violations_collect_every_failing_field() {
        let mut v = Violations::new();
        v.require_text("name", "   ");
        v.require_email("email", "nope");
        v.require_text("subject", "Hello");

        let err = v.finish().unwrap_err();
        let DomainError::Validation(v) = &err else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = v.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email"]);
        assert_eq!(
            err.to_string(),
            "validation failed: name: must not be blank; email: must be a valid email address"
        );
    }

    #[test]
    fn invalid_transition_names_current_and_attempted_state() {
        let err = DomainError::invalid_transition("member", "ACTIVE", "approve");
        assert_eq!(err.to_string(), "cannot approve member in status ACTIVE");
    }
}
