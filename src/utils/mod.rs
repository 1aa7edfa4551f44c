//! Utils Module
pub mod truncate;

pub use truncate::{excerpt, truncate_middle};
