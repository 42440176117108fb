//! Use-case services consumed by the presentation layer.
//!
//! # Responsibility
//! - Turn user intents into repository calls.
//! - Produce user-visible notices for outcomes and failures.
//! - Keep presentation code decoupled from storage details.

pub mod auth_service;
pub mod compose_service;
pub mod feed_service;
pub mod notice;
