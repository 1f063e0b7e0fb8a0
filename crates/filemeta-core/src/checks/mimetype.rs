//! `mimetype(type)`: `text/*` files may only contain printable characters.
//!
//! The check leans on an earlier `encoding(...)` assertion; without one (or
//! for non-text types) there is nothing it can verify.

use super::{is_unicode_family, AssertionSet, CheckOutcome, Codec};

fn is_printable_8bit(b: u8) -> bool {
    b >= 0x20 || matches!(b, b'\r' | b'\n' | b'\t')
}

/// TAB/LF/CR, 0x20..=0x7E, or anything from 0xA0 up (C1 controls excluded).
fn is_printable_unicode(c: char) -> bool {
    let cp = u32::from(c);
    matches!(cp, 0x09 | 0x0A | 0x0D) || (0x20..0x7F).contains(&cp) || cp > 0x9F
}

fn is_single_byte_family(encoding: &str) -> bool {
    encoding == "ascii"
        || encoding.starts_with("latin")
        || encoding.starts_with("iso-8859")
        || encoding.starts_with("iso8859")
        || encoding.starts_with("cp")
}

pub fn check_mimetype(mime: &str, content: &[u8], asserted: &AssertionSet) -> CheckOutcome {
    if !mime.starts_with("text") {
        return Ok(());
    }
    let Some(encoding) = asserted.encoding() else {
        return Ok(());
    };
    let encoding = encoding.to_ascii_lowercase();

    if is_unicode_family(&encoding) {
        let codec = Codec::lookup(&encoding)
            .ok_or_else(|| format!("cannot verify {mime}: unsupported encoding {encoding}"))?;
        let text = codec
            .decode(content)
            .map_err(|e| format!("cannot verify {mime}: {e}"))?;
        if !text.chars().all(is_printable_unicode) {
            return Err("non-printable character in text-file".to_string());
        }
    } else if is_single_byte_family(&encoding) {
        if !content.iter().copied().all(is_printable_8bit) {
            return Err("non-printable characters in text-file".to_string());
        }
    }
    // Any other encoding: no way to verify, accept.
    Ok(())
}
