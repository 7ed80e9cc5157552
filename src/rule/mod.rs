//! Rule model: typed ordering constraints and their conditional guards.
//!
//! A rule arrives from the external rule source as a stringly-typed
//! [`RuleRecord`] and is validated into an immutable [`Rule`] whose
//! kind-specific field requirements are enforced at construction
//! ([`Rule::from_record`]). Predicates ([`Predicate`]) gate whether a
//! rule applies to the current mod set; evaluation is configurable via
//! [`EvalConfig`] and never fails on missing metadata.

mod predicate;
mod types;

pub use predicate::{
    Cmp, Combine, DescMatch, EvalConfig, Predicate, PredicateRecord, Version,
};
pub use types::{Rule, RuleKind, RuleRecord, Severity};
