//! Conditional predicates gating whether a rule applies.
//!
//! A predicate compares one metadata field of the rule's subject mod
//! against a value carried by the rule. Evaluation never fails: a missing
//! or unparsable metadata field makes the predicate false, so a rule over
//! a partially-scanned mod set simply stays inactive.

use crate::error::SyntaxError;
use crate::mods::Metadata;

/// How `DESC` patterns match against a mod's description field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DescMatch {
    /// The pattern may appear anywhere in the description.
    #[default]
    Substring,
    /// The pattern must equal the whole description.
    Exact,
}

/// How multiple predicates on one rule combine.
///
/// The source never pins this down, so it is configurable rather than
/// hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Combine {
    /// Every predicate must hold (logical AND).
    #[default]
    All,
    /// At least one predicate must hold (logical OR).
    Any,
}

/// Predicate evaluation configuration.
///
/// # Examples
///
/// ```
/// use modorder::rule::{Combine, DescMatch, EvalConfig};
///
/// let config = EvalConfig::default()
///     .with_desc_match(DescMatch::Exact)
///     .with_combine(Combine::Any);
/// assert_eq!(config.desc_match, DescMatch::Exact);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EvalConfig {
    /// Matching mode for `DESC` predicates.
    pub desc_match: DescMatch,
    /// Combination logic across a rule's predicates.
    pub combine: Combine,
}

impl EvalConfig {
    /// Sets the `DESC` matching mode.
    pub fn with_desc_match(mut self, mode: DescMatch) -> Self {
        self.desc_match = mode;
        self
    }

    /// Sets the predicate combination logic.
    pub fn with_combine(mut self, combine: Combine) -> Self {
        self.combine = combine;
        self
    }
}

/// Comparison operator parsed from a predicate value prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cmp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Cmp {
    /// Splits a raw predicate value into its operator and operand.
    ///
    /// Recognized prefixes are `<=`, `>=`, `=`, `<`, `>`; a value with no
    /// prefix compares for equality.
    fn split(value: &str) -> (Cmp, &str) {
        let trimmed = value.trim();
        if let Some(rest) = trimmed.strip_prefix("<=") {
            (Cmp::Le, rest.trim_start())
        } else if let Some(rest) = trimmed.strip_prefix(">=") {
            (Cmp::Ge, rest.trim_start())
        } else if let Some(rest) = trimmed.strip_prefix('=') {
            (Cmp::Eq, rest.trim_start())
        } else if let Some(rest) = trimmed.strip_prefix('<') {
            (Cmp::Lt, rest.trim_start())
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            (Cmp::Gt, rest.trim_start())
        } else {
            (Cmp::Eq, trimmed)
        }
    }

    /// Applies the operator to an ordered pair.
    fn holds<T: Ord>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Cmp::Eq => lhs == rhs,
            Cmp::Lt => lhs < rhs,
            Cmp::Gt => lhs > rhs,
            Cmp::Le => lhs <= rhs,
            Cmp::Ge => lhs >= rhs,
        }
    }
}

/// A dotted numeric version, compared segment-wise left to right with
/// missing segments treated as zero (`1.2` equals `1.2.0`).
///
/// Parsing is lenient about non-numeric noise (`1.2b`, `1.2-rc`): each
/// dot-separated segment contributes its leading digit run, or zero when
/// it has none. Real mod version strings are messy; strictness here would
/// only turn usable rules into dead ones.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version(Vec<u64>);

impl Version {
    /// Parses a version string.
    pub fn parse(s: &str) -> Version {
        let segments = s
            .trim()
            .split('.')
            .map(|segment| {
                let digits: String = segment.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse().unwrap_or(0)
            })
            .collect();
        Version(segments)
    }

    /// Whether the string contains anything version-like at all.
    fn has_digits(s: &str) -> bool {
        s.chars().any(|c| c.is_ascii_digit())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                std::cmp::Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// Equality must agree with `Ord`'s zero-extension, so it cannot be
// derived from the segment vector.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Version {}

/// A raw predicate record as supplied by the rule source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredicateRecord {
    /// Predicate type string: `DESC`, `SIZE`, or `VER` (case-insensitive).
    pub predicate_type: String,
    /// The value to compare against, including any comparator prefix.
    pub value: String,
}

impl PredicateRecord {
    /// Creates a record from a type string and value.
    pub fn new(predicate_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            predicate_type: predicate_type.into(),
            value: value.into(),
        }
    }
}

/// A validated, immediately evaluable predicate.
///
/// `Size` and `Ver` parse their comparator and operand at construction,
/// so a malformed value is a per-record syntax diagnostic rather than a
/// predicate that silently never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Predicate {
    /// Matches against the `description` metadata field.
    Desc { pattern: String },
    /// Compares the `size` metadata field as a byte count.
    Size { cmp: Cmp, bytes: u64 },
    /// Compares the `version` metadata field as a dotted version.
    Ver { cmp: Cmp, version: Version },
}

impl Predicate {
    /// Validates a raw predicate record.
    pub fn from_record(record: &PredicateRecord) -> Result<Predicate, SyntaxError> {
        let kind = record.predicate_type.trim();
        if kind.eq_ignore_ascii_case("DESC") {
            Ok(Predicate::Desc {
                pattern: record.value.clone(),
            })
        } else if kind.eq_ignore_ascii_case("SIZE") {
            let (cmp, operand) = Cmp::split(&record.value);
            let bytes = operand
                .parse()
                .map_err(|_| SyntaxError::BadComparison {
                    kind: "SIZE".into(),
                    value: record.value.clone(),
                })?;
            Ok(Predicate::Size { cmp, bytes })
        } else if kind.eq_ignore_ascii_case("VER") {
            let (cmp, operand) = Cmp::split(&record.value);
            if !Version::has_digits(operand) {
                return Err(SyntaxError::BadComparison {
                    kind: "VER".into(),
                    value: record.value.clone(),
                });
            }
            Ok(Predicate::Ver {
                cmp,
                version: Version::parse(operand),
            })
        } else {
            Err(SyntaxError::UnknownPredicate(record.predicate_type.clone()))
        }
    }

    /// Evaluates the predicate against a mod's metadata.
    ///
    /// A missing or unparsable metadata field evaluates to false.
    pub fn matches(&self, metadata: &Metadata, config: &EvalConfig) -> bool {
        match self {
            Predicate::Desc { pattern } => match metadata.description() {
                Some(desc) => match config.desc_match {
                    DescMatch::Substring => desc.contains(pattern.as_str()),
                    DescMatch::Exact => desc == pattern,
                },
                None => false,
            },
            Predicate::Size { cmp, bytes } => match metadata.size() {
                Some(actual) => cmp.holds(&actual, bytes),
                None => false,
            },
            Predicate::Ver { cmp, version } => match metadata.version() {
                Some(actual) => cmp.holds(&actual, version),
                None => false,
            },
        }
    }
}
