/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Shared wire types for the station auth backend.
//!
//! This crate defines the contract between the auth backend (which issues
//! calling identities and access tokens to stations) and its consumers.
//! It is intentionally framework-agnostic: no HTTP client, no calling engine.

pub mod error;
pub mod requests;
pub mod responses;

pub use error::APIError;
pub use requests::AuthRequest;
pub use responses::{AuthResponse, TokenResponse};
