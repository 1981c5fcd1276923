//! Error Module - Runtime Error Types
//!
//! Defines all error types surfaced by the runtime. Every kind is terminal:
//! the runtime performs no local recovery, and a collection that reclaims
//! nothing is not an error (allocation reports `OutOfMemory` afterwards only
//! if storage is still insufficient).

use thiserror::Error;

/// Main error type for all runtime operations
#[derive(Debug, Error)]
pub enum GcError {
    #[error("root stack overflow: capacity is {capacity} slots")]
    StackOverflow { capacity: usize },

    #[error("root stack underflow: pop from an empty stack")]
    StackUnderflow,

    #[error("out of memory: requested {requested} bytes, available {available} bytes")]
    OutOfMemory { requested: usize, available: usize },

    #[error("allocation failed: system allocator refused {requested} bytes: {reason}")]
    AllocationFailed { requested: usize, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GcError {
    /// Check if this error indicates heap exhaustion rather than misuse
    pub fn is_exhaustion(&self) -> bool {
        matches!(
            self,
            GcError::OutOfMemory { .. } | GcError::AllocationFailed { .. }
        )
    }
}

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, GcError>;
