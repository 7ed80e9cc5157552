//! Order resolution: the entry point of the engine.
//!
//! A pass flows `PENDING → GRAPH_BUILT → (CYCLIC | ACYCLIC) → ORDERED |
//! FAILED`: rule records are validated, filtered by predicate, compiled
//! into a constraint graph, checked for cycles, and — when acyclic —
//! topologically sorted with deterministic tie-breaking. Everything the
//! caller needs lands in one [`ResolutionReport`].
//!
//! # Key Components
//!
//! - **Entry point**: [`resolve`] / [`Resolver`] — one pure pass per call
//! - **Configuration**: [`ResolveConfig`] — predicate evaluation modes,
//!   placement magnitude
//! - **Result**: [`ResolutionReport`] — order, conflicts, missing mods,
//!   diagnostics, cycles

mod config;
mod report;
mod runner;

pub use config::ResolveConfig;
pub use report::{Conflict, Note, ResolutionReport, ResolveStatus, SyntaxDiagnostic};
pub use runner::{resolve, Resolver};
