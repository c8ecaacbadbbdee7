//! Row structs matching the database schema.
//!
//! Each submodule contains a `FromRow` row struct plus the conversion
//! into the corresponding `meshgen_core` domain model. Conversions are
//! fallible where a persisted value (e.g. the job state text) must be
//! parsed back into an enum.

pub mod credential;
pub mod job;
