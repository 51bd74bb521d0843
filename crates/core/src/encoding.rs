use crate::models::PathRewrite;

/// Windows-1252 characters for bytes 0x80..=0x9F. `None` slots keep the raw code point.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

fn is_c1(code: u32) -> bool {
    (0x80..=0x9F).contains(&code)
}

fn push_legacy(output: &mut String, code: u32) {
    let mapped = if is_c1(code) {
        CP1252_HIGH[(code - 0x80) as usize]
    } else {
        None
    };
    if let Some(ch) = mapped.or_else(|| char::from_u32(code)) {
        output.push(ch);
    }
}

fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

/// Decodes the multi-byte sequence starting at `bytes[0]`, if there is one.
fn decode_sequence(bytes: &[u8]) -> Option<(char, usize)> {
    let len = sequence_len(*bytes.first()?)?;
    let sequence = bytes.get(..len)?;
    if !sequence[1..].iter().all(|byte| byte & 0xC0 == 0x80) {
        return None;
    }

    // Overlong forms, surrogates and out-of-range scalars fall back to bytes.
    let decoded = std::str::from_utf8(sequence).ok()?;
    decoded.chars().next().map(|ch| (ch, len))
}

/// Decodes a buffer mixing Windows-1252 bytes and UTF-8 sequences.
///
/// Never fails: anything that is not a well-formed UTF-8 sequence is read as a
/// single legacy byte.
pub fn decode_mixed(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len());
    let mut cursor = 0;

    while cursor < bytes.len() {
        if let Some((ch, len)) = decode_sequence(&bytes[cursor..]) {
            push_legacy(&mut output, ch as u32);
            cursor += len;
            continue;
        }

        push_legacy(&mut output, u32::from(bytes[cursor]));
        cursor += 1;
    }

    output
}

/// Decodes the raw database bytes and applies the asset path fix-up.
pub fn repair_text(bytes: &[u8], rewrite: &PathRewrite) -> String {
    let decoded = decode_mixed(bytes);
    if rewrite.from.is_empty() {
        return decoded;
    }
    decoded.replace(&rewrite.from, &rewrite.to)
}
