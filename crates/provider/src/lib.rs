//! Client for the remote text-to-3D generation provider.
//!
//! The provider is an opaque HTTP API: submit a prompt, poll a status
//! endpoint until it reports `complete` or `failed`, then download the
//! produced artifacts. [`client::GenerationProvider`] is the seam the
//! dispatcher consumes; [`client::HttpProvider`] is the production
//! implementation.

pub mod client;
pub mod status;

pub use client::{GenerationProvider, HttpProvider, ProviderError};
pub use status::{RemoteTaskState, TaskOutputs, TaskStatus};
