//! Reader source generation.

pub mod cpp;
