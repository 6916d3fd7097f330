//! Customer portal specifics
//!
//! `layout` pins down the markup the extractors and the traversal rely on;
//! `session` performs the fatal setup steps that precede a traversal.

pub mod layout;
mod session;

pub use session::{login, open_usage_history};
