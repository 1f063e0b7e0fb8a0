//! `bom(expected)`: presence or absence of a byte-order mark.
//!
//! With `expected = true` only the mark(s) of the asserted encoding are
//! accepted. UTF-16 and UTF-32 little-endian marks share their first two
//! bytes, so a UTF-16 match is additionally rejected when the file also
//! starts with a UTF-32 mark. That second test assumes text never contains a
//! `0x00 0x00` pair right after a UTF-16 mark; it is a heuristic, not a proof.

use super::{AssertionSet, CheckOutcome};
use crate::constants::{
    ALL_BOMS, BOM_UTF16_BE, BOM_UTF16_LE, BOM_UTF32_BE, BOM_UTF32_LE, BOM_UTF8,
};

const UTF32_BOMS: &[&[u8]] = &[BOM_UTF32_LE, BOM_UTF32_BE];

/// Lowercase and drop `-`/`_` so `UTF-16-LE` becomes `utf16le`.
fn normalize_encoding(encoding: &str) -> String {
    encoding
        .chars()
        .filter(|c| !matches!(c, '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn has_bom(content: &[u8], boms: &[&[u8]]) -> bool {
    boms.iter().any(|bom| content.starts_with(bom))
}

/// Marks accepted for a normalized unicode encoding name.
fn expected_boms(encoding: &str) -> Option<&'static [&'static [u8]]> {
    let boms: &'static [&'static [u8]] = match encoding {
        "utf8" | "utf8sig" => &[BOM_UTF8],
        "utf16" => &[BOM_UTF16_LE, BOM_UTF16_BE],
        "utf16le" => &[BOM_UTF16_LE],
        "utf16be" => &[BOM_UTF16_BE],
        "utf32" => &[BOM_UTF32_LE, BOM_UTF32_BE],
        "utf32le" => &[BOM_UTF32_LE],
        "utf32be" => &[BOM_UTF32_BE],
        _ => return None,
    };
    Some(boms)
}

pub fn check_bom(expected: bool, content: &[u8], asserted: &AssertionSet) -> CheckOutcome {
    if !expected {
        if has_bom(content, ALL_BOMS) {
            return Err("unexpected BOM".to_string());
        }
        return Ok(());
    }

    let encoding = asserted
        .encoding()
        .ok_or_else(|| "Test for BOM requires encoding to be specified".to_string())?;
    let encoding = normalize_encoding(encoding);
    if !encoding.starts_with("utf") {
        return Err("Test for BOM requires an unicode encoding".to_string());
    }

    let boms = expected_boms(&encoding)
        .ok_or_else(|| format!("no byte order mark is defined for encoding {encoding}"))?;
    if !has_bom(content, boms) {
        return Err("invalid or missing BOM".to_string());
    }
    if encoding.starts_with("utf16") && has_bom(content, UTF32_BOMS) {
        return Err("invalid (32-bit) BOM".to_string());
    }
    Ok(())
}
