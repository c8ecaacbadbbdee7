//! Shared domain types for the meshgen generation backend.
//!
//! This crate has zero internal dependencies. It defines the job and
//! credential models, the [`store::JobStore`] collaborator trait that
//! the dispatcher is written against, the dispatch limit constants
//! forming the external contract, and prompt validation.

pub mod credential;
pub mod job;
pub mod limits;
pub mod store;
pub mod types;
pub mod validation;
