//! Core services: key generation, link resolution, the storage backend
//! capability, and the upload gateway that composes them.

pub mod key_service;
pub mod link_service;
pub mod object_store;
pub mod share_service;
