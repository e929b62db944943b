//! # Liceum Core
//!
//! Error types shared by every Liceum crate.
//!
//! - [`AuthError`]: the code-issuance and token lifecycle taxonomy
//! - [`StorageError`]: opaque failures of the event storage capability
//! - [`AppError`]: HTTP-facing error with a status code and JSON rendering
//!
//! # Example
//!
//! ```ignore
//! use liceum_core::{AppError, AuthError};
//!
//! async fn handler() -> Result<(), AppError> {
//!     Err(AuthError::WrongCode)?
//! }
//! ```

pub mod errors;

pub use errors::{AppError, AuthError, StorageError};
