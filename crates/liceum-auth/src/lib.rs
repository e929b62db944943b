//! # Liceum Auth
//!
//! Building blocks of the administrator login flow:
//!
//! - [`code_store`]: time-bounded one-time codes, one per identity
//! - [`jwt`]: signing and validating access/refresh tokens
//! - [`claims`]: token claim structures
//! - [`clock`]: the time source both of the above check expiry against
//!
//! # Token Types
//!
//! - **Access Token** (15 minutes): authorizes admin requests
//! - **Refresh Token** (15 days): exchanged for a new pair without a new code
//!
//! Both carry the admin's email; neither is tracked server-side.

pub mod claims;
pub mod clock;
pub mod code_store;
pub mod jwt;

pub use claims::{Claims, TokenKind, TokenPair};
pub use clock::{Clock, ManualClock, SystemClock};
pub use code_store::{CodeStore, OneTimeCode, generate_code};
pub use jwt::TokenIssuer;
