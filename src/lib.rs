//! Minimal file-sharing gateway: accepts one uploaded file over HTTP, streams
//! it into an S3-compatible object store under a generated key, and resolves
//! stored keys into stream / player-scheme / share URLs.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
