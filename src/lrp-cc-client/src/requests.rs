//! Outbound request bodies posted to CC. Field names and shapes are wire
//! contracts; they must not change independently of CC.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppCrashedRequest {
    pub instance: String,
    pub index: u32,
    pub cell_id: String,
    pub reason: String,
    pub exit_description: String,
    pub crash_count: u32,
    pub crash_timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppReschedulingRequest {
    pub instance: String,
    pub index: u32,
    pub cell_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppReadinessChangedRequest {
    pub instance: String,
    pub index: u32,
    pub cell_id: String,
    pub ready: bool,
}
