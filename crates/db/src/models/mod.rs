//! Row types for the store tables.

pub mod project;
