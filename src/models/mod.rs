//! Data models for the portfolio backend.
//!
//! Field names serialize in camelCase to match the frontend interfaces.

mod post;
mod project;

pub use post::*;
pub use project::*;
