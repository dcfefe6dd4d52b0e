//! Response models for the gateway API.
//!
//! Nothing here persists beyond a single request; stored objects live
//! exclusively in the backend and links are recomputed on every resolution.

pub mod link;
