//! Core use-case services.
//!
//! # Responsibility
//! - Own the active plan session (`plan_store`).
//! - Derive the execution view from a plan or any other task source.
//!
//! # Invariants
//! - Presentation code talks to these services only, never to storage.

pub mod execution_source;
pub mod execution_view;
pub mod plan_store;
pub mod projector;
