//! Error code contract shared by every module error.
//!
//! Each module owns its own `thiserror` enum; this trait gives hosts a stable
//! machine-readable code for toasts and logs without matching on variants.

/// Stable machine-readable classification of an error.
pub trait ErrorCode: std::fmt::Display {
    /// Short code such as `"E_FETCH_STATUS"`.
    fn error_code(&self) -> &'static str;

    /// Whether re-triggering the same action could plausibly succeed.
    ///
    /// Nothing in this crate retries on its own; the flag only tells the host
    /// whether to offer the user a retry.
    fn retryable(&self) -> bool {
        false
    }
}
