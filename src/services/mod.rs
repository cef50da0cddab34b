//! Lifecycle managers for posts and projects.
//!
//! Services own every derivation applied on the write path (sanitized body,
//! slug, read time, timestamps) so handlers only translate HTTP.

mod posts;
mod projects;

pub use posts::PostService;
pub use projects::ProjectService;
