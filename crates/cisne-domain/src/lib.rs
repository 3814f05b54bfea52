//! Domain types shared across all Cisne crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod entity;
pub mod id;
pub mod link;
pub mod role;
