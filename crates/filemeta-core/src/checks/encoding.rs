//! `encoding(name)`: the content must decode in the named codec.

use super::{AssertionSet, CheckOutcome, Codec};
use crate::constants::BINARY_ENCODING;

/// `binary` declares "no textual constraint" and always passes.
pub fn check_encoding(encoding: &str, content: &[u8], _asserted: &AssertionSet) -> CheckOutcome {
    if encoding == BINARY_ENCODING {
        return Ok(());
    }
    let codec = Codec::lookup(encoding).ok_or_else(|| format!("unknown encoding: {encoding}"))?;
    codec
        .decode(content)
        .map(|_| ())
        .map_err(|e| format!("invalid encoding: {e}"))
}
