//! conversion between native (PETSCII) names and host text
//!
//! both directions are deliberately conservative and lossy: anything without an
//! obvious counterpart becomes `?`, so `to_native(to_host(x))` need not equal `x`.

use serde::{Deserialize, Serialize};

/// text conversion mode for names and type tags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    /// map between PETSCII and ASCII
    #[default]
    Convert,
    /// no conversion, names are kept as raw bytes
    Passthrough,
}

const FALLBACK: char = '?';

/// convert native bytes to host text
pub fn to_host(native: &[u8], mode: TextMode) -> String {
    match mode {
        TextMode::Passthrough => String::from_utf8_lossy(native).into_owned(),
        TextMode::Convert => native.iter().map(|&b| native_to_host_char(b)).collect(),
    }
}

/// convert host text to native bytes
pub fn to_native(host: &str, mode: TextMode) -> Vec<u8> {
    match mode {
        TextMode::Passthrough => host.as_bytes().to_vec(),
        TextMode::Convert => host.chars().map(host_to_native_byte).collect(),
    }
}

fn native_to_host_char(b: u8) -> char {
    match b {
        0x00..=0x1F => FALLBACK,
        // lower case range shows as upper case
        0x61..=0x7A => char::from(b - 0x20),
        // shifted upper case
        0xC1..=0xCA => char::from(b - 0x80),
        b'[' | b']' => char::from(b),
        0x5B..=0xFF => FALLBACK,
        _ => char::from(b),
    }
}

fn host_to_native_byte(c: char) -> u8 {
    match c {
        '\0'..='\x1F' => FALLBACK as u8,
        '\\' | '|' => b'/',
        '_' => b' ',
        '`' => b'\'',
        'a'..='z' => c as u8 - 0x20,
        '{' => b'(',
        '}' => b')',
        '\x20'..='\x7C' => c as u8,
        _ => FALLBACK as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_host_control_chars() {
        assert_eq!(to_host(&[0x00, 0x0D, 0x1F], TextMode::Convert), "???");
    }

    #[test]
    fn test_to_host_case_folding() {
        assert_eq!(to_host(b"hello", TextMode::Convert), "HELLO");
        assert_eq!(to_host(b"GAME 1", TextMode::Convert), "GAME 1");
        assert_eq!(to_host(&[0xC1, 0xC2, 0xCA], TextMode::Convert), "ABJ");
    }

    #[test]
    fn test_to_host_high_and_symbols() {
        assert_eq!(to_host(b"[x]", TextMode::Convert), "[X]");
        assert_eq!(to_host(b"\\^_", TextMode::Convert), "???");
        assert_eq!(to_host(&[0x80, 0xCB, 0xFF], TextMode::Convert), "???");
        assert_eq!(to_host(b"@!.", TextMode::Convert), "@!.");
    }

    #[test]
    fn test_to_native_mapping() {
        assert_eq!(to_native("game.prg", TextMode::Convert), b"GAME.PRG");
        assert_eq!(to_native("a_b", TextMode::Convert), b"A B");
        assert_eq!(to_native("x\\y|z", TextMode::Convert), b"X/Y/Z");
        assert_eq!(to_native("`{}`", TextMode::Convert), b"'()'");
        assert_eq!(to_native("~\t\u{e9}", TextMode::Convert), b"???");
    }

    #[test]
    fn test_conversion_is_lossy() {
        let native = b"a\\b".to_vec();
        let host = to_host(&native, TextMode::Convert);
        assert_eq!(host, "A?B");
        assert_ne!(to_native(&host, TextMode::Convert), native);
    }

    #[test]
    fn test_passthrough_keeps_bytes() {
        let native = "caf\u{e9} 1\x01".as_bytes().to_vec();
        let host = to_host(&native, TextMode::Passthrough);
        assert_eq!(host, "caf\u{e9} 1\x01");
        assert_eq!(to_native(&host, TextMode::Passthrough), native);
        assert_eq!(to_native("caf\u{e9}", TextMode::Passthrough), b"caf\xc3\xa9");
    }

    #[test]
    fn test_passthrough_invalid_utf8_is_replaced() {
        assert_eq!(to_host(&[b'a', 0xC1, 0xFF], TextMode::Passthrough), "a\u{fffd}\u{fffd}");
    }
}
