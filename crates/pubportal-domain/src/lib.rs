//! Domain types shared across the publications portal services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod audit;
pub mod email;
pub mod pagination;
