//! Rule records and their validated form.

use std::fmt;

use crate::error::SyntaxError;
use crate::mods::Metadata;

use super::predicate::{Combine, EvalConfig, Predicate, PredicateRecord};

/// The closed set of rule kinds understood by the engine.
///
/// Which optional fields a record may carry is determined entirely by its
/// kind; violations are syntax errors at construction, never resolution
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleKind {
    /// The subject must load before the target.
    Order,
    /// The target must be installed and load before the subject.
    Requires,
    /// Subject and target are incompatible unless explicitly ordered.
    Conflict,
    /// Soft hint pulling the subject toward the front of the order.
    NearStart,
    /// Soft hint pulling the subject toward the back of the order.
    NearEnd,
    /// The subject is a compatibility fix loading after the target.
    Patch,
    /// Informational annotation attached to the subject.
    Note,
}

impl RuleKind {
    /// Parses a kind string, case-insensitively.
    pub fn parse(s: &str) -> Option<RuleKind> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("ORDER") {
            Some(RuleKind::Order)
        } else if s.eq_ignore_ascii_case("REQUIRES") {
            Some(RuleKind::Requires)
        } else if s.eq_ignore_ascii_case("CONFLICT") {
            Some(RuleKind::Conflict)
        } else if s.eq_ignore_ascii_case("NEARSTART") {
            Some(RuleKind::NearStart)
        } else if s.eq_ignore_ascii_case("NEAREND") {
            Some(RuleKind::NearEnd)
        } else if s.eq_ignore_ascii_case("PATCH") {
            Some(RuleKind::Patch)
        } else if s.eq_ignore_ascii_case("NOTE") {
            Some(RuleKind::Note)
        } else {
            None
        }
    }

    /// Whether this kind relates the subject to a second mod.
    pub fn wants_target(self) -> bool {
        matches!(
            self,
            RuleKind::Order | RuleKind::Requires | RuleKind::Conflict | RuleKind::Patch
        )
    }

    /// Whether this kind carries a conflict severity.
    pub fn allows_severity(self) -> bool {
        matches!(self, RuleKind::Conflict)
    }

    /// Whether this kind carries a 1–3 priority level for message emphasis.
    pub fn allows_priority(self) -> bool {
        matches!(self, RuleKind::Conflict | RuleKind::Note)
    }

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Order => "ORDER",
            RuleKind::Requires => "REQUIRES",
            RuleKind::Conflict => "CONFLICT",
            RuleKind::NearStart => "NEARSTART",
            RuleKind::NearEnd => "NEAREND",
            RuleKind::Patch => "PATCH",
            RuleKind::Note => "NOTE",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conflict severity tiers, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Parses a severity string, case-insensitively.
    pub fn parse(s: &str) -> Option<Severity> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("low") {
            Some(Severity::Low)
        } else if s.eq_ignore_ascii_case("medium") {
            Some(Severity::Medium)
        } else if s.eq_ignore_ascii_case("high") {
            Some(Severity::High)
        } else {
            None
        }
    }

    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw rule record exactly as the external rule source supplies it.
///
/// Stringly typed on purpose: validation into a [`Rule`] is the engine's
/// job, and a malformed record must yield a diagnostic rather than a
/// deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleRecord {
    /// Rule kind string (`ORDER`, `REQUIRES`, ...), case-insensitive.
    pub kind: String,
    /// The mod this rule is anchored to.
    pub subject: String,
    /// Optional second mod; required for ORDER/REQUIRES/CONFLICT/PATCH.
    pub target: Option<String>,
    /// Conflict severity string (`Low`/`Medium`/`High`), CONFLICT only.
    pub severity: Option<String>,
    /// Message emphasis level 1–3, CONFLICT and NOTE only.
    pub priority_level: Option<i64>,
    /// Free-text grouping label, informational.
    pub section: Option<String>,
    /// Conditional guards; the rule is unconditionally active when empty.
    pub predicates: Vec<PredicateRecord>,
    /// Free-text provenance note.
    pub reference: Option<String>,
    /// Free-text user notes.
    pub notes: Option<String>,
}

impl RuleRecord {
    /// Creates a record with the given kind and subject.
    pub fn new(kind: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Sets the target mod.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sets the conflict severity string.
    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    /// Sets the message emphasis level.
    pub fn with_priority(mut self, level: i64) -> Self {
        self.priority_level = Some(level);
        self
    }

    /// Sets the grouping section label.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Appends a predicate record.
    pub fn with_predicate(mut self, predicate: PredicateRecord) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Sets the provenance reference.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Sets the free-text notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A validated, immutable rule.
///
/// Construction via [`Rule::from_record`] enforces the kind-specific
/// field requirements; a `Rule` value is therefore always well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub kind: RuleKind,
    pub subject: String,
    pub target: Option<String>,
    pub severity: Option<Severity>,
    pub priority_level: Option<u8>,
    pub section: Option<String>,
    pub predicates: Vec<Predicate>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl Rule {
    /// Validates a raw record into a well-formed rule.
    ///
    /// Fails with the first problem found; one record yields at most one
    /// diagnostic. Pure data construction, no side effects.
    pub fn from_record(record: &RuleRecord) -> Result<Rule, SyntaxError> {
        let kind = RuleKind::parse(&record.kind)
            .ok_or_else(|| SyntaxError::UnknownKind(record.kind.clone()))?;

        if record.subject.trim().is_empty() {
            return Err(SyntaxError::EmptySubject);
        }

        let target = match (&record.target, kind.wants_target()) {
            (Some(target), true) => Some(target.clone()),
            (None, true) => {
                return Err(SyntaxError::MissingTarget {
                    kind,
                    subject: record.subject.clone(),
                })
            }
            (Some(_), false) => {
                return Err(SyntaxError::UnexpectedTarget {
                    kind,
                    subject: record.subject.clone(),
                })
            }
            (None, false) => None,
        };

        let severity = match &record.severity {
            Some(s) if kind.allows_severity() => {
                Some(Severity::parse(s).ok_or_else(|| SyntaxError::UnknownSeverity(s.clone()))?)
            }
            Some(_) => {
                return Err(SyntaxError::UnexpectedSeverity {
                    kind,
                    subject: record.subject.clone(),
                })
            }
            None => None,
        };

        let priority_level = match record.priority_level {
            Some(level) if kind.allows_priority() => {
                if (1..=3).contains(&level) {
                    Some(level as u8)
                } else {
                    return Err(SyntaxError::PriorityOutOfRange(level));
                }
            }
            Some(_) => {
                return Err(SyntaxError::UnexpectedPriority {
                    kind,
                    subject: record.subject.clone(),
                })
            }
            None => None,
        };

        let predicates = record
            .predicates
            .iter()
            .map(Predicate::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Rule {
            kind,
            subject: record.subject.clone(),
            target,
            severity,
            priority_level,
            section: record.section.clone(),
            predicates,
            reference: record.reference.clone(),
            notes: record.notes.clone(),
        })
    }

    /// Whether this rule applies to the given subject metadata.
    ///
    /// A rule with no predicates is unconditionally active.
    pub fn is_active(&self, metadata: &Metadata, config: &EvalConfig) -> bool {
        if self.predicates.is_empty() {
            return true;
        }
        match config.combine {
            Combine::All => self.predicates.iter().all(|p| p.matches(metadata, config)),
            Combine::Any => self.predicates.iter().any(|p| p.matches(metadata, config)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_case_insensitive() {
        assert_eq!(RuleKind::parse("order"), Some(RuleKind::Order));
        assert_eq!(RuleKind::parse("Requires"), Some(RuleKind::Requires));
        assert_eq!(RuleKind::parse("NEARSTART"), Some(RuleKind::NearStart));
        assert_eq!(RuleKind::parse("SORT"), None);
    }

    #[test]
    fn test_order_requires_target() {
        let record = RuleRecord::new("ORDER", "Base.esp").with_target("Addon.esp");
        let rule = Rule::from_record(&record).unwrap();
        assert_eq!(rule.kind, RuleKind::Order);
        assert_eq!(rule.target.as_deref(), Some("Addon.esp"));

        let record = RuleRecord::new("ORDER", "Base.esp");
        let err = Rule::from_record(&record).unwrap_err();
        assert!(matches!(err, SyntaxError::MissingTarget { .. }));
    }

    #[test]
    fn test_nearstart_rejects_target() {
        let record = RuleRecord::new("NEARSTART", "Base.esp").with_target("Other.esp");
        let err = Rule::from_record(&record).unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedTarget { .. }));
    }

    #[test]
    fn test_severity_only_on_conflict() {
        let record = RuleRecord::new("CONFLICT", "A.esp")
            .with_target("B.esp")
            .with_severity("High");
        let rule = Rule::from_record(&record).unwrap();
        assert_eq!(rule.severity, Some(Severity::High));

        let record = RuleRecord::new("ORDER", "A.esp")
            .with_target("B.esp")
            .with_severity("High");
        let err = Rule::from_record(&record).unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedSeverity { .. }));

        let record = RuleRecord::new("CONFLICT", "A.esp")
            .with_target("B.esp")
            .with_severity("fatal");
        let err = Rule::from_record(&record).unwrap_err();
        assert!(matches!(err, SyntaxError::UnknownSeverity(_)));
    }

    #[test]
    fn test_priority_level_validation() {
        let record = RuleRecord::new("NOTE", "A.esp").with_priority(3);
        let rule = Rule::from_record(&record).unwrap();
        assert_eq!(rule.priority_level, Some(3));

        let record = RuleRecord::new("NOTE", "A.esp").with_priority(4);
        let err = Rule::from_record(&record).unwrap_err();
        assert_eq!(err, SyntaxError::PriorityOutOfRange(4));

        let record = RuleRecord::new("ORDER", "A.esp")
            .with_target("B.esp")
            .with_priority(1);
        let err = Rule::from_record(&record).unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedPriority { .. }));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let record = RuleRecord::new("NEARSTART", "  ");
        assert_eq!(Rule::from_record(&record).unwrap_err(), SyntaxError::EmptySubject);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_unconditional_rule_is_active() {
        let rule = Rule::from_record(&RuleRecord::new("NEARSTART", "A.esp")).unwrap();
        assert!(rule.is_active(&Metadata::default(), &EvalConfig::default()));
    }

    #[test]
    fn test_predicate_combination_modes() {
        let record = RuleRecord::new("NEARSTART", "A.esp")
            .with_predicate(PredicateRecord::new("SIZE", ">100"))
            .with_predicate(PredicateRecord::new("VER", ">=2.0"));
        let rule = Rule::from_record(&record).unwrap();

        // size matches, version does not
        let mut metadata = Metadata::default();
        metadata.insert("size", "200");
        metadata.insert("version", "1.5");

        assert!(!rule.is_active(&metadata, &EvalConfig::default()));
        assert!(rule.is_active(
            &metadata,
            &EvalConfig::default().with_combine(Combine::Any)
        ));
    }

    #[test]
    fn test_bad_predicate_fails_rule() {
        let record = RuleRecord::new("NEARSTART", "A.esp")
            .with_predicate(PredicateRecord::new("SIZE", "huge"));
        assert!(matches!(
            Rule::from_record(&record),
            Err(SyntaxError::BadComparison { .. })
        ));
    }
}
