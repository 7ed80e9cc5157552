//! Constraint graph construction.
//!
//! Converts the active rules of one resolution pass into a directed
//! "must load before" graph over installed-mod indexes. The graph is an
//! engine-owned adjacency arena built fresh per call — nothing in it
//! refers back to rule or mod storage — and is never mutated after
//! construction.

use std::collections::{BTreeMap, HashSet};

use log::debug;

use crate::mods::{fold, ModSet};
use crate::rule::{Rule, RuleKind, Severity};

/// Kind of a must-load-before edge.
///
/// All three kinds constrain identically; the distinction survives for
/// reporting and for conflict suppression, which only an ORDER or PATCH
/// edge triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeKind {
    Order,
    Requires,
    Patch,
}

/// A conflict pair recorded during construction, filtered later against
/// the finished graph.
#[derive(Debug, Clone)]
pub(crate) struct ConflictCandidate {
    pub a: usize,
    pub b: usize,
    pub severity: Option<Severity>,
    pub priority_level: Option<u8>,
    pub reference: Option<String>,
}

/// A NOTE annotation for an installed mod.
#[derive(Debug, Clone)]
pub(crate) struct NoteCandidate {
    pub index: usize,
    pub text: String,
    pub priority_level: Option<u8>,
}

/// Directed constraint graph over the installed-mod set.
///
/// Nodes are insertion indexes of the [`ModSet`]; edges mean "must load
/// before". Duplicate edges between the same ordered pair collapse (the
/// first kind wins); antiparallel edges are kept — they form a 2-cycle
/// for the detector to surface.
#[derive(Debug, Clone)]
pub struct ConstraintGraph {
    out: Vec<Vec<(usize, EdgeKind)>>,
    edges: HashSet<(usize, usize)>,
    in_degree: Vec<usize>,
    placement: Vec<i64>,
    pub(crate) conflicts: Vec<ConflictCandidate>,
    pub(crate) notes: Vec<NoteCandidate>,
    missing: BTreeMap<String, String>,
}

impl ConstraintGraph {
    /// Builds the graph from the active rules of one pass.
    ///
    /// `placement_weight` is the magnitude a single NEARSTART/NEAREND
    /// rule contributes to its subject's soft placement weight.
    ///
    /// Any rule endpoint absent from the installed set is recorded as a
    /// missing reference and contributes no edge or conflict — the graph
    /// never fabricates nodes for mods that do not exist.
    pub fn build(rules: &[&Rule], mods: &ModSet, placement_weight: i64) -> ConstraintGraph {
        let n = mods.len();
        let mut graph = ConstraintGraph {
            out: vec![Vec::new(); n],
            edges: HashSet::new(),
            in_degree: vec![0; n],
            placement: vec![0; n],
            conflicts: Vec::new(),
            notes: Vec::new(),
            missing: BTreeMap::new(),
        };

        for &rule in rules {
            let subject = graph.lookup(mods, &rule.subject);
            match rule.kind {
                RuleKind::Order => {
                    if let (Some(s), Some(t)) = (subject, graph.lookup_target(mods, rule)) {
                        graph.add_edge(s, t, EdgeKind::Order);
                    }
                }
                RuleKind::Requires => {
                    // The required mod loads first.
                    if let (Some(s), Some(t)) = (subject, graph.lookup_target(mods, rule)) {
                        graph.add_edge(t, s, EdgeKind::Requires);
                    }
                }
                RuleKind::Patch => {
                    // The patch loads after the mod it patches.
                    if let (Some(s), Some(t)) = (subject, graph.lookup_target(mods, rule)) {
                        graph.add_edge(t, s, EdgeKind::Patch);
                    }
                }
                RuleKind::Conflict => {
                    if let (Some(a), Some(b)) = (subject, graph.lookup_target(mods, rule)) {
                        if a != b {
                            graph.conflicts.push(ConflictCandidate {
                                a,
                                b,
                                severity: rule.severity,
                                priority_level: rule.priority_level,
                                reference: rule.reference.clone(),
                            });
                        }
                    }
                }
                RuleKind::NearStart => {
                    if let Some(s) = subject {
                        graph.placement[s] -= placement_weight;
                    }
                }
                RuleKind::NearEnd => {
                    if let Some(s) = subject {
                        graph.placement[s] += placement_weight;
                    }
                }
                RuleKind::Note => {
                    if let Some(s) = subject {
                        let text = rule
                            .notes
                            .clone()
                            .or_else(|| rule.reference.clone())
                            .unwrap_or_default();
                        graph.notes.push(NoteCandidate {
                            index: s,
                            text,
                            priority_level: rule.priority_level,
                        });
                    }
                }
            }
        }

        debug!(
            "constraint graph built: {} nodes, {} edges, {} conflict candidates, {} missing",
            n,
            graph.edge_count(),
            graph.conflicts.len(),
            graph.missing.len()
        );
        graph
    }

    fn lookup(&mut self, mods: &ModSet, name: &str) -> Option<usize> {
        match mods.position(name) {
            Some(i) => Some(i),
            None => {
                self.missing
                    .entry(fold(name))
                    .or_insert_with(|| name.to_string());
                None
            }
        }
    }

    fn lookup_target(&mut self, mods: &ModSet, rule: &Rule) -> Option<usize> {
        rule.target.as_deref().and_then(|t| self.lookup(mods, t))
    }

    fn add_edge(&mut self, from: usize, to: usize, kind: EdgeKind) {
        if self.edges.insert((from, to)) {
            self.out[from].push((to, kind));
            self.in_degree[to] += 1;
        }
    }

    /// Number of nodes (installed mods).
    pub fn node_count(&self) -> usize {
        self.out.len()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of a node.
    pub fn out_edges(&self, node: usize) -> &[(usize, EdgeKind)] {
        &self.out[node]
    }

    /// Number of unsatisfied predecessors per node.
    pub fn in_degrees(&self) -> &[usize] {
        &self.in_degree
    }

    /// Soft placement weight of a node (negative pulls toward the front).
    pub fn placement(&self, node: usize) -> i64 {
        self.placement[node]
    }

    /// Whether a node constrains itself.
    pub fn has_self_loop(&self, node: usize) -> bool {
        self.edges.contains(&(node, node))
    }

    /// Whether an ORDER or PATCH edge connects the pair in either
    /// direction. Such an edge is an intentional ordering between the
    /// two mods and suppresses a conflict report.
    pub fn intentionally_ordered(&self, a: usize, b: usize) -> bool {
        let kind_of = |from: usize, to: usize| {
            self.out[from]
                .iter()
                .find(|(t, _)| *t == to)
                .map(|(_, kind)| *kind)
        };
        matches!(kind_of(a, b), Some(EdgeKind::Order | EdgeKind::Patch))
            || matches!(kind_of(b, a), Some(EdgeKind::Order | EdgeKind::Patch))
    }

    /// Referenced-but-uninstalled mod names, in their first-seen spelling,
    /// sorted by folded name.
    pub fn missing(&self) -> Vec<String> {
        self.missing.values().cloned().collect()
    }
}
