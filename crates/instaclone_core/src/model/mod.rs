//! Feed domain model.
//!
//! # Responsibility
//! - Define the profile/post/comment records shared by every layer.
//! - Define the in-memory compose draft.
//!
//! # Invariants
//! - Authors are embedded by value; there is no profile store.
//! - Every record carries a string id that is stable once assigned.

pub mod draft;
pub mod post;
pub mod profile;
