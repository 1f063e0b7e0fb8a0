//! FilemetaErrorCode trait for host-facing error reporting.

/// Trait for mapping filemeta errors to stable error code strings.
/// Every error enum implements this so hosts can branch on the code
/// instead of parsing messages.
pub trait FilemetaErrorCode {
    /// Returns the error code string (e.g., "CONFIG_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted report string: `[ERROR_CODE] message`.
    fn report_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const PATTERN_ERROR: &str = "PATTERN_ERROR";
pub const CHECK_ERROR: &str = "CHECK_ERROR";
pub const GATE_ERROR: &str = "GATE_ERROR";
