//! `bmp()`: every codepoint must lie in the Basic Multilingual Plane.

use super::{is_unicode_family, AssertionSet, CheckOutcome, Codec};

const BMP_MAX: u32 = 0xFFFF;

pub fn check_bmp(content: &[u8], asserted: &AssertionSet) -> CheckOutcome {
    let encoding = asserted
        .encoding()
        .ok_or_else(|| "Test for BMP requires encoding to be specified".to_string())?;
    if !is_unicode_family(encoding) {
        return Err("Test for BMP requires an unicode encoding".to_string());
    }

    let codec = Codec::lookup(encoding)
        .ok_or_else(|| format!("Test for BMP cannot decode unsupported encoding {encoding}"))?;
    let text = codec.decode(content).map_err(|e| e.to_string())?;

    match text.chars().position(|c| u32::from(c) > BMP_MAX) {
        Some(index) => Err(format!("characters outside BMP (first at character {index})")),
        None => Ok(()),
    }
}
