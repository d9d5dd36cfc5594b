//! Character-set conversions for USSD payloads.
//!
//! Three representations show up on the wire:
//! - GSM 7-bit default alphabet, packed eight septets into seven octets
//! - UCS-2, 16-bit big-endian code units
//! - raw bytes, taken as-is up to the first NUL
//!
//! None of the decoders fail. Bytes that cannot be mapped still produce text,
//! and [`decode_text`] reports that through [`DecodeOutcome::Fallback`].

use crate::constants::{GSM7_CR, GSM7_ESCAPE};
use crate::types::{CodingScheme, DecodeOutcome, DecodedText};

/// GSM 7-bit default alphabet (3GPP TS 23.038 §6.2.1).
///
/// The escape slot (0x1B) never maps to a character on its own.
const DEFAULT_ALPHABET: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å',
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', ' ', 'Æ', 'æ', 'ß', 'É',
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§',
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à',
];

/// GSM 7-bit extension table, reached through [`GSM7_ESCAPE`].
const EXTENSION_TABLE: [(u8, char); 10] = [
    (0x0A, '\u{0C}'),
    (0x14, '^'),
    (0x28, '{'),
    (0x29, '}'),
    (0x2F, '\\'),
    (0x3C, '['),
    (0x3D, '~'),
    (0x3E, ']'),
    (0x40, '|'),
    (0x65, '€'),
];

/// Septet substituted for characters outside both tables.
const GSM7_UNKNOWN: u8 = b'?';

// ============================================================================
// GSM 7-bit
// ============================================================================

/// Append the septets for one character. Returns `false` if it had to be replaced.
fn push_septets(c: char, septets: &mut Vec<u8>) -> bool {
    if let Some(code) = DEFAULT_ALPHABET
        .iter()
        .enumerate()
        .position(|(i, &d)| i != GSM7_ESCAPE as usize && d == c)
    {
        septets.push(code as u8);
        return true;
    }
    if let Some(&(code, _)) = EXTENSION_TABLE.iter().find(|(_, e)| *e == c) {
        septets.push(GSM7_ESCAPE);
        septets.push(code);
        return true;
    }
    septets.push(GSM7_UNKNOWN);
    false
}

fn pack_septets(septets: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity((septets.len() * 7 + 7) / 8);
    let mut carry: u16 = 0;
    let mut carry_bits: u8 = 0;

    for &septet in septets {
        carry |= ((septet & 0x7F) as u16) << carry_bits;
        carry_bits += 7;
        while carry_bits >= 8 {
            out.push((carry & 0xFF) as u8);
            carry >>= 8;
            carry_bits -= 8;
        }
    }
    if carry_bits > 0 {
        out.push((carry & 0xFF) as u8);
    }
    out
}

fn unpack_septets(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() * 8 / 7);
    let mut acc: u32 = 0;
    let mut acc_bits: u8 = 0;

    for &b in bytes {
        acc |= (b as u32) << acc_bits;
        acc_bits += 8;
        while acc_bits >= 7 {
            out.push((acc & 0x7F) as u8);
            acc >>= 7;
            acc_bits -= 7;
        }
    }
    out
}

/// Pack text into the GSM 7-bit alphabet.
///
/// The packed byte count is the length of the returned vector. When the last
/// octet would leave seven unused bits, a CR septet fills them so the
/// receiver does not read a trailing `@`.
pub fn pack_gsm7(text: &str) -> Vec<u8> {
    let mut septets = Vec::with_capacity(text.len());
    for c in text.chars() {
        if !push_septets(c, &mut septets) {
            log::debug!("No GSM 7-bit mapping for {:?}, sending '?'", c);
        }
    }
    if septets.len() % 8 == 7 {
        septets.push(GSM7_CR);
    }
    pack_septets(&septets)
}

fn decode_gsm7(bytes: &[u8]) -> DecodedText {
    let mut septets = unpack_septets(bytes);
    if bytes.len() % 7 == 0 && septets.last() == Some(&GSM7_CR) {
        septets.pop();
    }

    let mut outcome = DecodeOutcome::Exact;
    let mut text = String::with_capacity(septets.len());
    let mut iter = septets.into_iter();
    while let Some(septet) = iter.next() {
        if septet != GSM7_ESCAPE {
            text.push(DEFAULT_ALPHABET[septet as usize]);
            continue;
        }
        match iter.next() {
            Some(code) => match EXTENSION_TABLE.iter().find(|(c, _)| *c == code) {
                Some(&(_, c)) => text.push(c),
                None => {
                    text.push(DEFAULT_ALPHABET[code as usize]);
                    outcome = DecodeOutcome::Fallback;
                }
            },
            None => outcome = DecodeOutcome::Fallback,
        }
    }

    DecodedText { text, outcome }
}

/// Unpack GSM 7-bit packed bytes into text.
///
/// The decoded character count is `text.chars().count()`.
pub fn unpack_gsm7(bytes: &[u8]) -> String {
    decode_gsm7(bytes).text
}

// ============================================================================
// UCS-2
// ============================================================================

fn decode_ucs2_checked(bytes: &[u8]) -> DecodedText {
    let mut outcome = DecodeOutcome::Exact;
    if bytes.len() % 2 != 0 {
        outcome = DecodeOutcome::Fallback;
    }

    let mut text = String::with_capacity(bytes.len());
    for unit in bytes.chunks_exact(2) {
        let code = u16::from_be_bytes([unit[0], unit[1]]);
        if code == 0 {
            break;
        }
        match char::from_u32(code as u32) {
            Some(c) => text.push(c),
            None => {
                text.push(char::REPLACEMENT_CHARACTER);
                outcome = DecodeOutcome::Fallback;
            }
        }
    }

    DecodedText { text, outcome }
}

/// Decode consecutive 16-bit big-endian code units into UTF-8 text.
///
/// Each unit is one code point, so only the Basic Multilingual Plane is
/// representable. Surrogate units become U+FFFD, a trailing odd byte is
/// ignored, and a zero unit ends the text.
pub fn decode_ucs2(bytes: &[u8]) -> String {
    decode_ucs2_checked(bytes).text
}

// ============================================================================
// Raw bytes
// ============================================================================

/// Take bytes as text up to the first NUL.
pub fn passthrough_ascii(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Decode a payload with the given coding scheme, tagging how faithful the result is.
pub fn decode_text(scheme: CodingScheme, bytes: &[u8]) -> DecodedText {
    match scheme {
        CodingScheme::Gsm7 => decode_gsm7(bytes),
        CodingScheme::Ucs2 => decode_ucs2_checked(bytes),
        CodingScheme::Unknown => DecodedText {
            text: passthrough_ascii(bytes),
            outcome: DecodeOutcome::Fallback,
        },
    }
}
