//! Strict decoders for the codecs the `encoding` check understands.
//!
//! Decoding never panics: invalid input yields a `DecodeError` naming the
//! offending byte(s) and their position.

use std::fmt;

use crate::constants::{BOM_UTF16_BE, BOM_UTF16_LE, BOM_UTF32_BE, BOM_UTF32_LE, BOM_UTF8};

/// A supported text codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Ascii,
    Latin1,
    Latin9,
    Cp1252,
    Utf8,
    Utf8Sig,
    Utf16,
    Utf16Le,
    Utf16Be,
    Utf32,
    Utf32Le,
    Utf32Be,
}

/// Why a byte sequence is not valid in a codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{codec}' codec can't decode {detail} in position {position}: {reason}")]
pub struct DecodeError {
    pub codec: &'static str,
    pub position: usize,
    pub detail: String,
    pub reason: &'static str,
}

impl Codec {
    /// Look up a codec by name. Case, `-`, `_` and spaces are ignored, so
    /// `UTF-8`, `utf_8` and `utf8` are the same codec.
    pub fn lookup(name: &str) -> Option<Codec> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let codec = match normalized.as_str() {
            "ascii" | "usascii" | "646" | "us" => Codec::Ascii,
            "latin1" | "latin" | "l1" | "iso88591" | "8859" | "cp819" => Codec::Latin1,
            "latin9" | "l9" | "iso885915" => Codec::Latin9,
            "cp1252" | "windows1252" => Codec::Cp1252,
            "utf8" | "utf" | "u8" | "cp65001" => Codec::Utf8,
            "utf8sig" => Codec::Utf8Sig,
            "utf16" | "u16" => Codec::Utf16,
            "utf16le" => Codec::Utf16Le,
            "utf16be" => Codec::Utf16Be,
            "utf32" | "u32" => Codec::Utf32,
            "utf32le" => Codec::Utf32Le,
            "utf32be" => Codec::Utf32Be,
            _ => return None,
        };
        Some(codec)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Codec::Ascii => "ascii",
            Codec::Latin1 => "latin-1",
            Codec::Latin9 => "iso8859-15",
            Codec::Cp1252 => "cp1252",
            Codec::Utf8 => "utf-8",
            Codec::Utf8Sig => "utf-8-sig",
            Codec::Utf16 => "utf-16",
            Codec::Utf16Le => "utf-16-le",
            Codec::Utf16Be => "utf-16-be",
            Codec::Utf32 => "utf-32",
            Codec::Utf32Le => "utf-32-le",
            Codec::Utf32Be => "utf-32-be",
        }
    }

    /// Decode `bytes` strictly. The generic `utf-16`/`utf-32` codecs and
    /// `utf-8-sig` consume a leading byte-order mark; without a mark the
    /// generic wide codecs assume little-endian.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        match self {
            Codec::Ascii => decode_single_byte(self.name(), bytes, |b| {
                (b < 0x80).then(|| char::from(b)).ok_or("ordinal not in range(128)")
            }),
            Codec::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Codec::Latin9 => Ok(bytes.iter().map(|&b| latin9_char(b)).collect()),
            Codec::Cp1252 => decode_single_byte(self.name(), bytes, |b| {
                cp1252_char(b).ok_or("character maps to <undefined>")
            }),
            Codec::Utf8 => decode_utf8(self.name(), bytes, 0),
            Codec::Utf8Sig => match bytes.strip_prefix(BOM_UTF8) {
                Some(rest) => decode_utf8(self.name(), rest, BOM_UTF8.len()),
                None => decode_utf8(self.name(), bytes, 0),
            },
            Codec::Utf16 => {
                if let Some(rest) = bytes.strip_prefix(BOM_UTF16_LE) {
                    decode_utf16(self.name(), rest, Endian::Little, 2)
                } else if let Some(rest) = bytes.strip_prefix(BOM_UTF16_BE) {
                    decode_utf16(self.name(), rest, Endian::Big, 2)
                } else {
                    decode_utf16(self.name(), bytes, Endian::Little, 0)
                }
            }
            Codec::Utf16Le => decode_utf16(self.name(), bytes, Endian::Little, 0),
            Codec::Utf16Be => decode_utf16(self.name(), bytes, Endian::Big, 0),
            Codec::Utf32 => {
                if let Some(rest) = bytes.strip_prefix(BOM_UTF32_LE) {
                    decode_utf32(self.name(), rest, Endian::Little, 4)
                } else if let Some(rest) = bytes.strip_prefix(BOM_UTF32_BE) {
                    decode_utf32(self.name(), rest, Endian::Big, 4)
                } else {
                    decode_utf32(self.name(), bytes, Endian::Little, 0)
                }
            }
            Codec::Utf32Le => decode_utf32(self.name(), bytes, Endian::Little, 0),
            Codec::Utf32Be => decode_utf32(self.name(), bytes, Endian::Big, 0),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
enum Endian {
    Little,
    Big,
}

fn decode_single_byte(
    codec: &'static str,
    bytes: &[u8],
    map: impl Fn(u8) -> Result<char, &'static str>,
) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(bytes.len());
    for (position, &b) in bytes.iter().enumerate() {
        let c = map(b).map_err(|reason| DecodeError {
            codec,
            position,
            detail: format!("byte 0x{b:02x}"),
            reason,
        })?;
        out.push(c);
    }
    Ok(out)
}

fn decode_utf8(codec: &'static str, bytes: &[u8], offset: usize) -> Result<String, DecodeError> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let position = e.valid_up_to();
            let b = bytes[position];
            let reason = match e.error_len() {
                None => "unexpected end of data",
                Some(_) if (0x80..=0xBF).contains(&b) || b >= 0xF5 || b == 0xC0 || b == 0xC1 => {
                    "invalid start byte"
                }
                Some(_) => "invalid continuation byte",
            };
            Err(DecodeError {
                codec,
                position: position + offset,
                detail: format!("byte 0x{b:02x}"),
                reason,
            })
        }
    }
}

fn decode_utf16(
    codec: &'static str,
    bytes: &[u8],
    endian: Endian,
    offset: usize,
) -> Result<String, DecodeError> {
    let units = bytes.chunks_exact(2).map(|pair| match endian {
        Endian::Little => u16::from_le_bytes([pair[0], pair[1]]),
        Endian::Big => u16::from_be_bytes([pair[0], pair[1]]),
    });

    let mut out = String::with_capacity(bytes.len() / 2);
    let mut unit_index = 0usize;
    for decoded in char::decode_utf16(units) {
        match decoded {
            Ok(c) => {
                unit_index += c.len_utf16();
                out.push(c);
            }
            Err(e) => {
                let position = unit_index * 2;
                return Err(DecodeError {
                    codec,
                    position: position + offset,
                    detail: format!("surrogate 0x{:04x}", e.unpaired_surrogate()),
                    reason: "illegal UTF-16 surrogate",
                });
            }
        }
    }

    if bytes.len() % 2 != 0 {
        let position = bytes.len() - 1;
        return Err(DecodeError {
            codec,
            position: position + offset,
            detail: format!("byte 0x{:02x}", bytes[position]),
            reason: "truncated data",
        });
    }
    Ok(out)
}

fn decode_utf32(
    codec: &'static str,
    bytes: &[u8],
    endian: Endian,
    offset: usize,
) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(bytes.len() / 4);
    for (index, quad) in bytes.chunks_exact(4).enumerate() {
        let raw = [quad[0], quad[1], quad[2], quad[3]];
        let value = match endian {
            Endian::Little => u32::from_le_bytes(raw),
            Endian::Big => u32::from_be_bytes(raw),
        };
        let c = char::from_u32(value).ok_or_else(|| DecodeError {
            codec,
            position: index * 4 + offset,
            detail: format!("code point 0x{value:x}"),
            reason: "code point not in range(0x110000) or a surrogate",
        })?;
        out.push(c);
    }

    let remainder = bytes.len() % 4;
    if remainder != 0 {
        let position = bytes.len() - remainder;
        return Err(DecodeError {
            codec,
            position: position + offset,
            detail: format!("{remainder} trailing byte(s)"),
            reason: "truncated data",
        });
    }
    Ok(out)
}

fn latin9_char(b: u8) -> char {
    match b {
        0xA4 => '\u{20AC}',
        0xA6 => '\u{0160}',
        0xA8 => '\u{0161}',
        0xB4 => '\u{017D}',
        0xB8 => '\u{017E}',
        0xBC => '\u{0152}',
        0xBD => '\u{0153}',
        0xBE => '\u{0178}',
        _ => char::from(b),
    }
}

/// Windows-1252; 0x81, 0x8D, 0x8F, 0x90 and 0x9D are undefined.
fn cp1252_char(b: u8) -> Option<char> {
    let c = match b {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        0x81 | 0x8D | 0x8F | 0x90 | 0x9D => return None,
        _ => char::from(b),
    };
    Some(c)
}
