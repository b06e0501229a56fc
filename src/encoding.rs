//! Repair of raw `git log` lines before parsing.
//!
//! Git may print author names and paths in an encoding that does not match
//! the terminal locale, and quotes non-ASCII paths with octal escapes
//! (`"\303\251t\303\251.txt"`). Each raw line goes through three stages:
//!
//! 1. backslash escapes are decoded, every other byte is taken as a Latin-1
//!    code point, and escapes that do not decode are kept verbatim;
//! 2. the code points are written back as single Latin-1 bytes, with `?`
//!    standing in for anything above U+00FF;
//! 3. the bytes are decoded as UTF-8, with U+FFFD for invalid sequences.
//!
//! The result is lossy but never fails.

/// Normalize one raw log line (surrounding ASCII whitespace is stripped).
pub fn normalize_line(raw: &[u8]) -> String {
    let code_points = decode_escapes(raw.trim_ascii());
    let latin1 = encode_latin1(&code_points);
    String::from_utf8_lossy(&latin1).into_owned()
}

fn decode_escapes(bytes: &[u8]) -> Vec<char> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' {
            out.push(char::from(b));
            i += 1;
            continue;
        }

        match decode_one_escape(&bytes[i + 1..]) {
            Some((c, consumed)) => {
                out.push(c);
                i += 1 + consumed;
            }
            None => {
                out.push('\\');
                i += 1;
            }
        }
    }

    out
}

/// Decode the escape following a backslash. Returns the character and the
/// number of bytes consumed after the backslash.
fn decode_one_escape(rest: &[u8]) -> Option<(char, usize)> {
    let first = *rest.first()?;
    let simple = match first {
        b'\\' => Some('\\'),
        b'\'' => Some('\''),
        b'"' => Some('"'),
        b'a' => Some('\u{07}'),
        b'b' => Some('\u{08}'),
        b'f' => Some('\u{0C}'),
        b'n' => Some('\n'),
        b'r' => Some('\r'),
        b't' => Some('\t'),
        b'v' => Some('\u{0B}'),
        _ => None,
    };
    if let Some(c) = simple {
        return Some((c, 1));
    }

    match first {
        b'0'..=b'7' => {
            let digits = rest.iter().take(3).take_while(|d| matches!(**d, b'0'..=b'7')).count();
            let value = parse_radix(&rest[..digits], 8)?;
            char::from_u32(value).map(|c| (c, digits))
        }
        b'x' => hex_escape(rest, 2),
        b'u' => hex_escape(rest, 4),
        b'U' => hex_escape(rest, 8),
        _ => None,
    }
}

fn hex_escape(rest: &[u8], width: usize) -> Option<(char, usize)> {
    let digits = rest.get(1..=width)?;
    if !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let value = parse_radix(digits, 16)?;
    char::from_u32(value).map(|c| (c, 1 + width))
}

fn parse_radix(digits: &[u8], radix: u32) -> Option<u32> {
    let text = std::str::from_utf8(digits).ok()?;
    u32::from_str_radix(text, radix).ok()
}

fn encode_latin1(code_points: &[char]) -> Vec<u8> {
    code_points
        .iter()
        .map(|&c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
