//! Check library: byte-content validators and their invocation types.
//!
//! A check is a pure function of its declared arguments, the file bytes, and
//! the assertions established by checks that already passed for the same file.
//! `Err(reason)` means the check failed.

pub mod assertions;
pub mod bmp;
pub mod bom;
pub mod codec;
pub mod encoding;
pub mod mimetype;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::TRUE_TOKENS;
use crate::errors::CheckError;

pub use assertions::AssertionSet;
pub use codec::{Codec, DecodeError};

/// Outcome of a single check: `Err` carries the human-readable reason.
pub type CheckOutcome = Result<(), String>;

/// The closed set of check kinds the policy language knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Encoding,
    MimeType,
    Bmp,
    Bom,
}

impl CheckKind {
    pub const ALL: [CheckKind; 4] = [
        CheckKind::Encoding,
        CheckKind::MimeType,
        CheckKind::Bmp,
        CheckKind::Bom,
    ];

    /// Name as written in `checks:` lines.
    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::Encoding => "encoding",
            CheckKind::MimeType => "mimetype",
            CheckKind::Bmp => "bmp",
            CheckKind::Bom => "bom",
        }
    }

    /// Number of positional arguments the check takes.
    pub fn arity(&self) -> usize {
        match self {
            CheckKind::Bmp => 0,
            CheckKind::Encoding | CheckKind::MimeType | CheckKind::Bom => 1,
        }
    }

    /// Argument values worth offering in an editor or completion list.
    pub fn suggested_values(&self) -> &'static [&'static str] {
        match self {
            CheckKind::Encoding => &[
                "ascii",
                "latin_1",
                "utf-8",
                "utf-8-sig",
                "utf-16",
                "binary",
            ],
            CheckKind::Bom => &["true", "false"],
            CheckKind::MimeType => &[
                "application/octet-stream",
                "application/pdf",
                "application/xml",
                "application/zip",
                "image/gif",
                "image/jpeg",
                "image/png",
                "image/svg+xml",
                "text/csv",
                "text/html",
                "text/plain",
                "text/tab-separated-values",
                "text/x-c",
                "text/x-java-source",
                "text/yaml",
            ],
            CheckKind::Bmp => &[],
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CheckKind {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| CheckError::UnknownCheck { name: s.to_string() })
    }
}

/// Unresolved check: identifier plus positional arguments, as declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckInvocation {
    pub kind: CheckKind,
    pub args: Vec<String>,
}

impl CheckInvocation {
    pub fn new<I, S>(kind: CheckKind, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Bind the arguments to a validator, checking the argument count.
    pub fn bind(self) -> Result<BoundCheck, CheckError> {
        if self.args.len() != self.kind.arity() {
            return Err(CheckError::WrongArity {
                name: self.kind.name().to_string(),
                expected: self.kind.arity(),
                found: self.args.len(),
            });
        }
        let check = match self.kind {
            CheckKind::Encoding => Check::Encoding {
                codec: self.args[0].clone(),
            },
            CheckKind::MimeType => Check::MimeType {
                mime: self.args[0].clone(),
            },
            CheckKind::Bmp => Check::Bmp,
            CheckKind::Bom => Check::Bom {
                expected: parse_flag(&self.args[0]),
            },
        };
        Ok(BoundCheck {
            invocation: self,
            check,
        })
    }
}

impl fmt::Display for CheckInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.args.join(", "))
    }
}

/// A validator with its typed arguments applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Encoding { codec: String },
    MimeType { mime: String },
    Bmp,
    Bom { expected: bool },
}

impl Check {
    /// Single dispatch point from check kind to validator.
    pub fn run(&self, content: &[u8], asserted: &AssertionSet) -> CheckOutcome {
        match self {
            Check::Encoding { codec } => encoding::check_encoding(codec, content, asserted),
            Check::MimeType { mime } => mimetype::check_mimetype(mime, content, asserted),
            Check::Bmp => bmp::check_bmp(content, asserted),
            Check::Bom { expected } => bom::check_bom(*expected, content, asserted),
        }
    }
}

/// Resolved check: the declared invocation plus its ready-to-run validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundCheck {
    pub invocation: CheckInvocation,
    pub check: Check,
}

impl BoundCheck {
    pub fn kind(&self) -> CheckKind {
        self.invocation.kind
    }

    pub fn args(&self) -> &[String] {
        &self.invocation.args
    }

    pub fn run(&self, content: &[u8], asserted: &AssertionSet) -> CheckOutcome {
        self.check.run(content, asserted)
    }
}

impl fmt::Display for BoundCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.invocation.fmt(f)
    }
}

/// Boolean-like token parsing shared by `bom(...)` and the settings layer.
pub fn parse_flag(token: &str) -> bool {
    let lowered = token.trim().to_ascii_lowercase();
    TRUE_TOKENS.contains(&lowered.as_str())
}

/// `true` for encoding names of the unicode family (`utf*`).
pub(crate) fn is_unicode_family(encoding: &str) -> bool {
    encoding.to_ascii_lowercase().starts_with("utf")
}
