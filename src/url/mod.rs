//! URL handling module for Page Analyzer
//!
//! This module provides the syntactic gate that runs before any network
//! activity, and the normalization applied to accepted targets.

mod normalize;
mod validate;

// Re-export main functions
pub use normalize::normalize_url;
pub use validate::validate_url;
