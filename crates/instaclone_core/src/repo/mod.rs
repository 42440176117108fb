//! Repository layer: session record, feed collection and hosted table.
//!
//! # Responsibility
//! - Own persisted state behind explicit load/mutate/persist contracts.
//! - Keep storage details out of services.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `InvalidInput`)
//!   separately from storage failures.

pub mod post_repo;
pub mod seed;
pub mod session_repo;
pub mod table_repo;
