//! Load-order resolution pass.
//!
//! # Algorithm
//!
//! 1. Snapshot the installed mods (case-insensitive, insertion-ordered).
//! 2. Validate rule records, collecting per-record syntax diagnostics.
//! 3. Filter to the rules active for this mod set (predicate evaluation).
//! 4. Build the constraint graph from the active rules.
//! 5. Decompose into strongly connected components; any cycle fails the
//!    pass.
//! 6. Otherwise run a deterministic topological sort: among ready nodes,
//!    pick the minimum of (placement weight, insertion index, folded
//!    name). The key is a total order, so identical inputs always yield
//!    byte-identical output.
//! 7. Filter conflict candidates against the finished graph; an ORDER or
//!    PATCH edge between the pair in either direction suppresses the
//!    report.
//!
//! The pass is pure and synchronous: no I/O, no shared state, no locks.
//! Independent passes may run concurrently on separate snapshots.

use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use log::{debug, warn};

use crate::error::CycleError;
use crate::graph::{cycles, ConflictCandidate, ConstraintGraph, NoteCandidate};
use crate::mods::{fold, Mod, ModSet};
use crate::rule::{Rule, RuleRecord};

use super::config::ResolveConfig;
use super::report::{Conflict, Note, ResolutionReport, ResolveStatus, SyntaxDiagnostic};

/// Resolves a consistent load order for a set of mods under a set of
/// declarative ordering rules.
///
/// Holds only configuration; every [`Resolver::resolve`] call is an
/// independent pass over its own snapshot.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolveConfig,
}

impl Resolver {
    /// Creates a resolver with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with the given configuration.
    pub fn with_config(config: ResolveConfig) -> Self {
        Self { config }
    }

    /// Runs one resolution pass.
    ///
    /// Never fails as a function call: malformed records, missing mods,
    /// and conflicts become report entries, and a circular constraint
    /// set yields a report with [`ResolveStatus::Cyclic`] and the fatal
    /// [`CycleError`] attached.
    pub fn resolve(&self, records: &[RuleRecord], mods: &[Mod]) -> ResolutionReport {
        let set = ModSet::from_mods(mods.iter().cloned());

        let mut rules = Vec::with_capacity(records.len());
        let mut syntax_errors = Vec::new();
        for (i, record) in records.iter().enumerate() {
            match Rule::from_record(record) {
                Ok(rule) => rules.push(rule),
                Err(error) => syntax_errors.push(SyntaxDiagnostic { record: i, error }),
            }
        }
        debug!(
            "validated {} of {} rule records ({} malformed)",
            rules.len(),
            records.len(),
            syntax_errors.len()
        );

        let active: Vec<&Rule> = rules.iter().filter(|r| self.is_active(r, &set)).collect();
        let graph = ConstraintGraph::build(&active, &set, self.config.placement_weight);

        let missing = graph.missing();
        let conflicts = filter_conflicts(&graph.conflicts, &graph, &set);
        let notes = collect_notes(&graph.notes, &set);

        let found = cycles(&graph);
        if !found.is_empty() {
            let named = name_cycles(found, &set);
            let failure = CycleError {
                representative: named[0][0].clone(),
                members: named[0].clone(),
            };
            warn!("resolution failed: {failure}");
            return ResolutionReport {
                status: ResolveStatus::Cyclic,
                order: Vec::new(),
                conflicts,
                missing,
                syntax_errors,
                notes,
                cycles: named,
                failure: Some(failure),
            };
        }

        let order = topological_order(&graph, &set);
        debug!("resolved {} mods, {} conflicts", order.len(), conflicts.len());
        ResolutionReport {
            status: ResolveStatus::Ordered,
            order,
            conflicts,
            missing,
            syntax_errors,
            notes,
            cycles: Vec::new(),
            failure: None,
        }
    }

    /// Whether a rule applies to the current mod set.
    ///
    /// A rule with predicates but an uninstalled subject cannot be
    /// evaluated and stays inactive; an unconditional rule stays active
    /// so the builder can report its missing references.
    fn is_active(&self, rule: &Rule, set: &ModSet) -> bool {
        match set.get(&rule.subject) {
            Some(m) => rule.is_active(&m.metadata, &self.config.eval),
            None => rule.predicates.is_empty(),
        }
    }
}

/// Runs one resolution pass with the default configuration.
pub fn resolve(records: &[RuleRecord], mods: &[Mod]) -> ResolutionReport {
    Resolver::new().resolve(records, mods)
}

/// Deterministic topological sort over an acyclic graph.
fn topological_order(graph: &ConstraintGraph, mods: &ModSet) -> Vec<String> {
    let n = graph.node_count();
    let mut remaining = graph.in_degrees().to_vec();

    let key = |v: usize| Reverse((graph.placement(v), v, fold(&mods.by_index(v).name)));

    let mut ready: BinaryHeap<_> = (0..n).filter(|&v| remaining[v] == 0).map(key).collect();
    let mut order = Vec::with_capacity(n);

    while let Some(Reverse((_, v, _))) = ready.pop() {
        order.push(mods.by_index(v).name.clone());
        for &(w, _) in graph.out_edges(v) {
            remaining[w] -= 1;
            if remaining[w] == 0 {
                ready.push(key(w));
            }
        }
    }

    order
}

/// Drops suppressed conflict pairs, deduplicates the rest (most severe
/// record wins), and sorts most severe first.
fn filter_conflicts(
    candidates: &[ConflictCandidate],
    graph: &ConstraintGraph,
    mods: &ModSet,
) -> Vec<Conflict> {
    let mut best: HashMap<(usize, usize), &ConflictCandidate> = HashMap::new();
    for candidate in candidates {
        if graph.intentionally_ordered(candidate.a, candidate.b) {
            continue;
        }
        let pair = (
            candidate.a.min(candidate.b),
            candidate.a.max(candidate.b),
        );
        match best.entry(pair) {
            Entry::Occupied(mut entry) => {
                if candidate.severity > entry.get().severity {
                    entry.insert(candidate);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(candidate);
            }
        }
    }

    let mut conflicts: Vec<Conflict> = best
        .into_values()
        .map(|c| Conflict {
            first: mods.by_index(c.a).name.clone(),
            second: mods.by_index(c.b).name.clone(),
            severity: c.severity,
            priority_level: c.priority_level,
            reference: c.reference.clone(),
        })
        .collect();
    conflicts.sort_by(|x, y| {
        y.severity
            .cmp(&x.severity)
            .then_with(|| fold(&x.first).cmp(&fold(&y.first)))
            .then_with(|| fold(&x.second).cmp(&fold(&y.second)))
    });
    conflicts
}

fn collect_notes(candidates: &[NoteCandidate], mods: &ModSet) -> Vec<Note> {
    candidates
        .iter()
        .map(|c| Note {
            name: mods.by_index(c.index).name.clone(),
            text: c.text.clone(),
            priority_level: c.priority_level,
        })
        .collect()
}

/// Maps cycle components to sorted name lists, shortest cycle first,
/// lexicographic at ties.
fn name_cycles(found: Vec<Vec<usize>>, mods: &ModSet) -> Vec<Vec<String>> {
    let mut named: Vec<Vec<String>> = found
        .into_iter()
        .map(|component| {
            let mut names: Vec<String> = component
                .into_iter()
                .map(|v| mods.by_index(v).name.clone())
                .collect();
            names.sort_by_key(|n| fold(n));
            names
        })
        .collect();
    named.sort_by(|a, b| {
        a.len()
            .cmp(&b.len())
            .then_with(|| fold(&a[0]).cmp(&fold(&b[0])))
    });
    named
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{PredicateRecord, Severity};

    fn mods(names: &[&str]) -> Vec<Mod> {
        names.iter().map(|&n| Mod::new(n)).collect()
    }

    fn order_rule(a: &str, b: &str) -> RuleRecord {
        RuleRecord::new("ORDER", a).with_target(b)
    }

    #[test]
    fn test_empty_inputs() {
        let report = resolve(&[], &[]);
        assert!(report.is_clean());
        assert!(report.order.is_empty());
    }

    #[test]
    fn test_no_rules_preserves_insertion_order() {
        let report = resolve(&[], &mods(&["C", "A", "B"]));
        assert_eq!(report.order, vec!["C", "A", "B"]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_order_rule_respected() {
        let report = resolve(&[order_rule("B", "A")], &mods(&["A", "B"]));
        assert_eq!(report.order, vec!["B", "A"]);
    }

    #[test]
    fn test_scenario_patch_base_addon() {
        // PATCH(Patch, Base) puts Base before Patch; ORDER(Base, Addon)
        // puts Base before Addon. Among the valid orders, the insertion
        // index of the mods list breaks the tie.
        let rules = [
            RuleRecord::new("PATCH", "Patch").with_target("Base"),
            order_rule("Base", "Addon"),
        ];

        let report = resolve(&rules, &mods(&["Base", "Addon", "Patch"]));
        assert_eq!(report.order, vec!["Base", "Addon", "Patch"]);

        let report = resolve(&rules, &mods(&["Base", "Patch", "Addon"]));
        assert_eq!(report.order, vec!["Base", "Patch", "Addon"]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_scenario_unordered_conflict() {
        let rules = [RuleRecord::new("CONFLICT", "X")
            .with_target("Y")
            .with_severity("High")];
        let report = resolve(&rules, &mods(&["X", "Y"]));

        assert!(report.ok());
        assert_eq!(report.order, vec!["X", "Y"]);
        assert_eq!(report.conflicts.len(), 1);
        let conflict = &report.conflicts[0];
        assert_eq!(conflict.first, "X");
        assert_eq!(conflict.second, "Y");
        assert_eq!(conflict.severity, Some(Severity::High));
    }

    #[test]
    fn test_two_cycle_fails() {
        let rules = [order_rule("A", "B"), order_rule("B", "A")];
        let report = resolve(&rules, &mods(&["A", "B"]));

        assert!(!report.ok());
        assert!(report.order.is_empty());
        assert_eq!(report.cycles, vec![vec!["A".to_string(), "B".to_string()]]);
        let failure = report.failure.unwrap();
        assert_eq!(failure.representative, "A");
        assert_eq!(failure.members, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_shortest_cycle_reported_first() {
        let rules = [
            // 3-cycle: C -> D -> E -> C
            order_rule("C", "D"),
            order_rule("D", "E"),
            order_rule("E", "C"),
            // 2-cycle: A <-> B
            order_rule("A", "B"),
            order_rule("B", "A"),
        ];
        let report = resolve(&rules, &mods(&["C", "D", "E", "A", "B"]));

        assert!(!report.ok());
        assert_eq!(report.cycles.len(), 2);
        assert_eq!(report.cycles[0], vec!["A".to_string(), "B".to_string()]);
        assert_eq!(
            report.cycles[1],
            vec!["C".to_string(), "D".to_string(), "E".to_string()]
        );
        assert_eq!(report.failure.unwrap().representative, "A");
    }

    #[test]
    fn test_conflict_suppressed_by_order() {
        let rules = [
            RuleRecord::new("CONFLICT", "A")
                .with_target("B")
                .with_severity("High"),
            order_rule("A", "B"),
        ];
        let report = resolve(&rules, &mods(&["A", "B"]));

        assert!(report.conflicts.is_empty());
        assert_eq!(report.order, vec!["A", "B"]);
    }

    #[test]
    fn test_conflict_suppressed_by_patch() {
        let rules = [
            RuleRecord::new("CONFLICT", "A").with_target("B"),
            RuleRecord::new("PATCH", "A").with_target("B"),
        ];
        let report = resolve(&rules, &mods(&["A", "B"]));
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn test_conflict_not_suppressed_by_requires() {
        let rules = [
            RuleRecord::new("CONFLICT", "A").with_target("B"),
            RuleRecord::new("REQUIRES", "A").with_target("B"),
        ];
        let report = resolve(&rules, &mods(&["A", "B"]));
        assert_eq!(report.conflicts.len(), 1);
    }

    #[test]
    fn test_duplicate_conflicts_keep_most_severe() {
        let rules = [
            RuleRecord::new("CONFLICT", "A")
                .with_target("B")
                .with_severity("Low"),
            RuleRecord::new("CONFLICT", "B")
                .with_target("A")
                .with_severity("High"),
        ];
        let report = resolve(&rules, &mods(&["A", "B"]));

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].severity, Some(Severity::High));
    }

    #[test]
    fn test_conflicts_sorted_most_severe_first() {
        let rules = [
            RuleRecord::new("CONFLICT", "A")
                .with_target("B")
                .with_severity("Low"),
            RuleRecord::new("CONFLICT", "C")
                .with_target("D")
                .with_severity("High"),
        ];
        let report = resolve(&rules, &mods(&["A", "B", "C", "D"]));

        assert_eq!(report.conflicts.len(), 2);
        assert_eq!(report.conflicts[0].severity, Some(Severity::High));
        assert_eq!(report.conflicts[1].severity, Some(Severity::Low));
    }

    #[test]
    fn test_requires_missing_mod_reported() {
        let rules = [RuleRecord::new("REQUIRES", "A").with_target("Gone.esp")];
        let with_rule = resolve(&rules, &mods(&["A", "B"]));
        let without_rule = resolve(&[], &mods(&["A", "B"]));

        assert!(with_rule.ok());
        assert_eq!(with_rule.missing, vec!["Gone.esp".to_string()]);
        // The missing edge must not move the subject
        assert_eq!(with_rule.order, without_rule.order);
    }

    #[test]
    fn test_syntax_errors_collected_batch_continues() {
        let rules = [
            RuleRecord::new("SORT", "A"),
            order_rule("B", "A"),
            RuleRecord::new("ORDER", "A"),
        ];
        let report = resolve(&rules, &mods(&["A", "B"]));

        assert!(report.ok());
        assert_eq!(report.syntax_errors.len(), 2);
        assert_eq!(report.syntax_errors[0].record, 0);
        assert_eq!(report.syntax_errors[1].record, 2);
        // The valid rule still took effect
        assert_eq!(report.order, vec!["B", "A"]);
    }

    #[test]
    fn test_nearstart_nearend_tiebreak() {
        let rules = [
            RuleRecord::new("NEAREND", "A"),
            RuleRecord::new("NEARSTART", "C"),
        ];
        let report = resolve(&rules, &mods(&["A", "B", "C"]));
        assert_eq!(report.order, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_placement_never_violates_hard_edges() {
        let rules = [order_rule("A", "B"), RuleRecord::new("NEARSTART", "B")];
        let report = resolve(&rules, &mods(&["A", "B", "C"]));

        let pos = |name: &str| report.order.iter().position(|n| n == name).unwrap();
        assert!(pos("A") < pos("B"), "order edge outranks placement hints");
        // The pulled mod still jumps the unconstrained one
        assert_eq!(report.order, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_inactive_rule_contributes_nothing() {
        let rules = [
            order_rule("B", "A"),
            RuleRecord::new("CONFLICT", "A")
                .with_target("B")
                .with_predicate(PredicateRecord::new("SIZE", ">999999")),
        ];
        let installed = [
            Mod::new("A").with_metadata("size", "100"),
            Mod::new("B"),
        ];

        let first = resolve(&rules, &installed);
        assert!(first.conflicts.is_empty());
        assert_eq!(first.order, vec!["B", "A"]);

        // Idempotent: repeated passes see the same inactive rule
        let second = resolve(&rules, &installed);
        assert_eq!(first, second);
    }

    #[test]
    fn test_predicate_activates_rule() {
        let rules = [order_rule("B", "A").with_predicate(PredicateRecord::new("VER", ">=2.0"))];

        let old = [Mod::new("A"), Mod::new("B").with_metadata("version", "1.0")];
        assert_eq!(resolve(&rules, &old).order, vec!["A", "B"]);

        let new = [Mod::new("A"), Mod::new("B").with_metadata("version", "2.1")];
        assert_eq!(resolve(&rules, &new).order, vec!["B", "A"]);
    }

    #[test]
    fn test_rules_match_mods_case_insensitively() {
        let rules = [order_rule("base.ESP", "ADDON.esp")];
        let report = resolve(&rules, &mods(&["Addon.esp", "Base.esp"]));

        assert!(report.missing.is_empty());
        assert_eq!(report.order, vec!["Base.esp", "Addon.esp"]);
    }

    #[test]
    fn test_note_surfaces_in_report() {
        let rules = [
            RuleRecord::new("NOTE", "A")
                .with_notes("load order sensitive")
                .with_priority(2),
        ];
        let report = resolve(&rules, &mods(&["A"]));

        assert_eq!(report.notes.len(), 1);
        assert_eq!(report.notes[0].name, "A");
        assert_eq!(report.notes[0].text, "load order sensitive");
        assert_eq!(report.notes[0].priority_level, Some(2));
    }

    #[test]
    fn test_cyclic_report_keeps_warnings() {
        let rules = [
            order_rule("A", "B"),
            order_rule("B", "A"),
            RuleRecord::new("CONFLICT", "A").with_target("C"),
            order_rule("A", "Gone.esp"),
            RuleRecord::new("BOGUS", "A"),
        ];
        let report = resolve(&rules, &mods(&["A", "B", "C"]));

        assert!(!report.ok());
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.missing, vec!["Gone.esp".to_string()]);
        assert_eq!(report.syntax_errors.len(), 1);
    }

    #[test]
    fn test_deterministic_repeated_resolution() {
        let rules = [
            order_rule("A", "C"),
            RuleRecord::new("REQUIRES", "D").with_target("B"),
            RuleRecord::new("NEARSTART", "D"),
            RuleRecord::new("CONFLICT", "A").with_target("D"),
        ];
        let installed = mods(&["C", "A", "D", "B"]);

        let first = resolve(&rules, &installed);
        let second = resolve(&rules, &installed);
        assert_eq!(first, second);
    }

    #[test]
    fn test_chain_resolution() {
        let names: Vec<String> = (0..50).map(|i| format!("mod{i:02}")).collect();
        let rules: Vec<RuleRecord> = names
            .windows(2)
            .map(|w| order_rule(&w[1], &w[0]))
            .collect();
        let installed: Vec<Mod> = names.iter().map(|n| Mod::new(n.clone())).collect();

        let report = resolve(&rules, &installed);
        let expected: Vec<String> = names.iter().rev().cloned().collect();
        assert_eq!(report.order, expected);
    }
}
