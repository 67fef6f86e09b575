use serde::Serialize;

/// Success body: `{"data": ..., "message": ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub message: &'static str,
}

impl<T> Envelope<T> {
    pub fn new(data: T, message: &'static str) -> Self {
        Self { data, message }
    }
}

/// Error body: `{"detail": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: &'static str,
}

impl ErrorBody {
    pub fn new(detail: &'static str) -> Self {
        Self { detail }
    }
}
