//! Request extractors and middleware.
//!
//! - [`auth`]: the administrator gate. [`auth::require_admin`] is layered on the
//!   admin router and [`auth::AdminUser`] gives handlers the caller's identity.
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <access token>`
//! 2. The token is verified (signature, expiry, `kind == access`)
//! 3. The `email` claim is checked against the administrator allow-list
//! 4. Handler executes; any failure above is answered with 401

pub mod auth;
