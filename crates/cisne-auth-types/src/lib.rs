//! Authentication primitives shared by Cisne services.
//!
//! Provides session-token issuing and validation, password hashing, and the
//! `Principal` extractor that turns a bearer token into a caller identity.

pub mod password;
pub mod principal;
pub mod token;
