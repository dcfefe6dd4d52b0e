//! HTTP handlers for the gateway surface.

pub mod health_handlers;
pub mod share_handlers;
