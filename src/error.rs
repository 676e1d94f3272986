//! Grepable error codes shared by every error enum in the crate.
//!
//! Hosts surface these codes next to the human-readable message so a warning
//! shown to the user can be traced back to the exact failure site.

/// Maps an error value to a stable `E_*` code.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same operation later may succeed.
    fn retryable(&self) -> bool {
        false
    }
}
