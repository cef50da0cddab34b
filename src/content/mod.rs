//! Derivations applied to rich-text content on every write path.

mod read_time;
mod sanitize;
mod slug;

pub use read_time::estimate_read_time;
pub use sanitize::sanitize_html;
pub use slug::slugify;
