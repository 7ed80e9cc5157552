//! Error taxonomy for the resolution engine.
//!
//! Two failure families exist, mirroring how a resolution pass degrades:
//!
//! - [`SyntaxError`] — a malformed rule record. Recoverable: the record is
//!   skipped, a diagnostic is attached to the report, and the rest of the
//!   batch proceeds.
//! - [`CycleError`] — an unsatisfiable (circular) constraint set. Fatal
//!   for the pass that contains it; the engine stays reusable for the
//!   next call.
//!
//! Missing-mod references and conflicts between installed mods are report
//! entries, not error values — they never abort anything.

use thiserror::Error;

use crate::rule::RuleKind;

/// A malformed rule record, detected at ingestion.
///
/// One record yields at most one diagnostic; validation stops at the
/// first problem it finds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyntaxError {
    /// The record's `kind` string is not a recognized rule kind.
    #[error("unknown rule kind: {0}")]
    UnknownKind(String),

    /// The record's subject name is empty.
    #[error("rule has an empty subject name")]
    EmptySubject,

    /// A kind that relates two mods was given no target.
    #[error("{kind} rule for '{subject}' is missing its target mod")]
    MissingTarget { kind: RuleKind, subject: String },

    /// A single-mod kind was given a target anyway.
    #[error("{kind} rule for '{subject}' does not take a target mod")]
    UnexpectedTarget { kind: RuleKind, subject: String },

    /// A severity tier was supplied for a kind that does not use one.
    #[error("{kind} rule for '{subject}' does not take a severity")]
    UnexpectedSeverity { kind: RuleKind, subject: String },

    /// The severity string is not `low`, `medium`, or `high`.
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),

    /// A priority level was supplied for a kind that does not use one.
    #[error("{kind} rule for '{subject}' does not take a priority level")]
    UnexpectedPriority { kind: RuleKind, subject: String },

    /// The priority level is outside the 1–3 emphasis range.
    #[error("priority level {0} is outside the range 1-3")]
    PriorityOutOfRange(i64),

    /// The predicate type string is not a recognized predicate kind.
    #[error("unknown predicate type: {0}")]
    UnknownPredicate(String),

    /// A SIZE or VER predicate value failed to parse as a comparison.
    #[error("malformed {kind} comparison: '{value}'")]
    BadComparison { kind: String, value: String },
}

/// A circular dependency in the constraint graph.
///
/// Carries one representative mod (the deterministically-first member of
/// the shortest cycle) plus every member of that cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("circular dependency detected for: {representative}")]
pub struct CycleError {
    /// First member (case-insensitive lexicographic) of the shortest cycle.
    pub representative: String,
    /// All members of that cycle.
    pub members: Vec<String>,
}
