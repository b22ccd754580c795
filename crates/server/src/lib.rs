//! HTTP file storage server guarded by panicguard recovery boundaries.

pub mod api;
pub mod config;
pub mod error;
pub mod telemetry;
