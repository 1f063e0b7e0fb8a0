//! Error handling for filemeta.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod check_error;
pub mod config_error;
pub mod error_code;
pub mod gate_error;
pub mod pattern_error;

pub use check_error::CheckError;
pub use config_error::ConfigError;
pub use error_code::FilemetaErrorCode;
pub use gate_error::GateError;
pub use pattern_error::PatternError;
