//! Session types shared by the portal services.
//!
//! Provides the session issuer (signed JWT), and the access gate that
//! validates `Authorization: Bearer` credentials on protected routes.

pub mod error;
pub mod gate;
pub mod token;
