//! Shared constants.

/// Default policy file, read from the repository root.
pub const DEFAULT_PATTERN_FILE: &str = ".filemeta";

/// Project-level settings file name.
pub const PROJECT_CONFIG_FILE: &str = "filemeta.toml";

/// Environment variable holding the tracing filter.
pub const LOG_ENV_VAR: &str = "FILEMETA_LOG";

/// Filter used when `FILEMETA_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "filemeta=info";

/// Line prefix that changes the ambient pattern syntax.
pub const SYNTAX_DIRECTIVE: &str = "syntax:";

/// Line prefix that sets the pending check list.
pub const CHECKS_DIRECTIVE: &str = "checks:";

/// `encoding` argument that disables all textual constraints.
pub const BINARY_ENCODING: &str = "binary";

/// Tokens accepted as "true" by `bom(...)`. Anything else means false.
pub const TRUE_TOKENS: &[&str] = &["true", "yes", "y", "on", "1"];

pub const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];
pub const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
pub const BOM_UTF16_BE: &[u8] = &[0xFE, 0xFF];
pub const BOM_UTF32_LE: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
pub const BOM_UTF32_BE: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// Every byte-order mark the `bom(false)` check rejects.
pub const ALL_BOMS: &[&[u8]] = &[
    BOM_UTF8,
    BOM_UTF16_LE,
    BOM_UTF16_BE,
    BOM_UTF32_LE,
    BOM_UTF32_BE,
];
