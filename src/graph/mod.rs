//! Constraint graph: adjacency built fresh per resolution pass, plus
//! strongly-connected-component decomposition for cycle detection.

mod build;
mod scc;

pub use build::{ConstraintGraph, EdgeKind};
pub use scc::{cycles, strongly_connected_components};

pub(crate) use build::{ConflictCandidate, NoteCandidate};
