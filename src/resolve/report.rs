//! Resolution report: the single value a pass returns.

use crate::error::{CycleError, SyntaxError};
use crate::rule::Severity;

/// Terminal status of a resolution pass.
///
/// Conflicts, missing mods, and malformed records are warnings and leave
/// the status `Ordered`; only a circular constraint set is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolveStatus {
    /// A total order was produced.
    Ordered,
    /// The constraint set contains at least one circular dependency.
    Cyclic,
}

/// A conflict between two installed mods that no explicit ordering
/// resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conflict {
    /// First mod of the pair, in installed spelling.
    pub first: String,
    /// Second mod of the pair.
    pub second: String,
    /// Severity tier, when the rule declared one.
    pub severity: Option<Severity>,
    /// Message emphasis level 1–3, when declared.
    pub priority_level: Option<u8>,
    /// Provenance of the conflict rule.
    pub reference: Option<String>,
}

/// An informational annotation attached to an installed mod by an active
/// NOTE rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    /// The annotated mod, in installed spelling.
    pub name: String,
    /// The annotation text.
    pub text: String,
    /// Message emphasis level 1–3, when declared.
    pub priority_level: Option<u8>,
}

/// A malformed rule record, identified by its position in the input batch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyntaxDiagnostic {
    /// Zero-based index of the record in the supplied batch.
    pub record: usize,
    /// What was wrong with it.
    pub error: SyntaxError,
}

/// Aggregated outcome of one resolution pass.
///
/// Pure data: assembled once, returned by value, never mutated by the
/// engine afterwards. The caller distinguishes three situations:
/// resolution failed (cyclic), succeeded with warnings (conflicts,
/// missing mods, malformed records), or clean success.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolutionReport {
    /// Terminal status of the pass.
    pub status: ResolveStatus,
    /// The resolved total order, in installed spelling. Empty on failure.
    pub order: Vec<String>,
    /// Surviving conflicts, most severe first.
    pub conflicts: Vec<Conflict>,
    /// Referenced-but-uninstalled mod names, sorted, deduplicated.
    pub missing: Vec<String>,
    /// Malformed rule records, in batch order.
    pub syntax_errors: Vec<SyntaxDiagnostic>,
    /// NOTE annotations for installed mods, in rule order.
    pub notes: Vec<Note>,
    /// Circular dependencies: each entry lists one cycle's members,
    /// shortest cycle first. Empty on success.
    pub cycles: Vec<Vec<String>>,
    /// The fatal error, present exactly when `status` is `Cyclic`.
    pub failure: Option<CycleError>,
}

impl ResolutionReport {
    /// Whether the pass produced an order.
    pub fn ok(&self) -> bool {
        self.status == ResolveStatus::Ordered
    }

    /// Whether the pass produced an order with no warnings of any kind.
    pub fn is_clean(&self) -> bool {
        self.ok()
            && self.conflicts.is_empty()
            && self.missing.is_empty()
            && self.syntax_errors.is_empty()
    }
}
