//! Domain types and pure logic for the Content Engine.
//!
//! Nothing in this crate performs I/O: the project lifecycle, callback
//! application and video composition are all plain functions over owned
//! data so they can be exercised directly in unit tests.

pub mod callback;
pub mod composition;
pub mod error;
pub mod hashing;
pub mod project;
pub mod scene;
pub mod types;
pub mod workflow;
