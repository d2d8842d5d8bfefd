//! Service plumbing shared by the portal binaries: health probes, tracing
//! setup, request-id/trace layers and serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
