//! Response envelopes.

use serde::Serialize;

/// `{"is_success": ..., "data": ...}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub is_success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            is_success: true,
            data,
        }
    }

    pub fn failure(data: T) -> Self {
        Self {
            is_success: false,
            data,
        }
    }
}

/// A limit/offset page of results.
#[derive(Debug, Serialize)]
pub struct PageEnvelope<T> {
    pub is_success: bool,
    pub limit: u64,
    pub offset: u64,
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub data: Vec<T>,
}
