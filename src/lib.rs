//! Deterministic load-order resolution for mod collections.
//!
//! Given a set of declarative ordering rules and a snapshot of installed
//! mods, computes a single reproducible load order that satisfies every
//! hard constraint, reports conflicts with their severity, and fails
//! cleanly on circular rule sets. The engine is a pure function from
//! (rule set, installed-mod set, mod metadata) to (ordered mod list,
//! conflict report): no I/O, no persistence, no global state.
//!
//! # Components
//!
//! - **Rule model** ([`rule`]): typed constraints — `ORDER`, `REQUIRES`,
//!   `CONFLICT`, `NEARSTART`, `NEAREND`, `PATCH`, `NOTE` — validated at
//!   construction, with conditional `DESC`/`SIZE`/`VER` predicates gating
//!   whether a rule applies to the current mod set.
//! - **Mod snapshot** ([`mods`]): the installed-mod set, case-insensitive
//!   and insertion-ordered, with scanner-supplied metadata.
//! - **Constraint graph** ([`graph`]): active rules compiled into a
//!   must-load-before adjacency arena, plus strongly-connected-component
//!   decomposition for cycle detection.
//! - **Resolution** ([`resolve`]): deterministic topological sort with
//!   soft NEARSTART/NEAREND tie-breaking, conflict filtering, and the
//!   aggregated [`resolve::ResolutionReport`].
//! - **Errors** ([`error`]): recoverable per-record syntax diagnostics
//!   and the fatal circular-dependency error.
//!
//! # Architecture
//!
//! Resolution is synchronous and single-threaded over an immutable
//! snapshot; independent passes may run concurrently on separate
//! snapshots without locks. Rule and mod storage, file formats, and any
//! network metadata lookup live outside this crate — a rule source hands
//! in records, the engine hands back a report, and the caller decides
//! what to log or display.

pub mod error;
pub mod graph;
pub mod mods;
pub mod resolve;
pub mod rule;
