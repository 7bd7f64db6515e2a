//! Shared primitives for the ADDZYME workspace.
//!
//! - **Error types** — [`AddzymeError`] and [`Result`] used by every crate
//! - **Traits** — [`Annotated`] and [`Summarizable`] for display-oriented types
//! - **Hashing** — SHA-256 digests used to fingerprint model artifacts

pub mod error;
pub mod hash;
pub mod traits;

pub use error::{AddzymeError, Result};
pub use traits::*;
