//! Planning domain model.
//!
//! # Responsibility
//! - Define the goal -> sub-goal -> task hierarchy and its mutations.
//! - Coerce untrusted persisted data into that hierarchy.
//!
//! # Invariants
//! - Every value past `normalize` is trusted; no other module re-validates.
//!
//! # See also
//! - DESIGN.md (entity model, normalizer)

pub mod action;
pub mod execution;
pub mod normalize;
pub mod plan;
