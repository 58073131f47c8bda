//! Mac OS Roman text codec
//!
//! Every name and path exchanged with hfsutils is Mac OS Roman. Bytes coming
//! from the engine go through [`decode`] before they become a `String`; text
//! going to the engine goes through [`encode`].
//!
//! Reference: https://www.unicode.org/Public/MAPPINGS/VENDORS/APPLE/ROMAN.TXT

use super::error::{HfsError, Result};

/// Unicode scalar values for bytes 0x80..=0xFF
const HIGH_HALF: [char; 128] = [
    // 0x80
    '\u{00C4}', '\u{00C5}', '\u{00C7}', '\u{00C9}', '\u{00D1}', '\u{00D6}', '\u{00DC}', '\u{00E1}',
    '\u{00E0}', '\u{00E2}', '\u{00E4}', '\u{00E3}', '\u{00E5}', '\u{00E7}', '\u{00E9}', '\u{00E8}',
    // 0x90
    '\u{00EA}', '\u{00EB}', '\u{00ED}', '\u{00EC}', '\u{00EE}', '\u{00EF}', '\u{00F1}', '\u{00F3}',
    '\u{00F2}', '\u{00F4}', '\u{00F6}', '\u{00F5}', '\u{00FA}', '\u{00F9}', '\u{00FB}', '\u{00FC}',
    // 0xA0
    '\u{2020}', '\u{00B0}', '\u{00A2}', '\u{00A3}', '\u{00A7}', '\u{2022}', '\u{00B6}', '\u{00DF}',
    '\u{00AE}', '\u{00A9}', '\u{2122}', '\u{00B4}', '\u{00A8}', '\u{2260}', '\u{00C6}', '\u{00D8}',
    // 0xB0
    '\u{221E}', '\u{00B1}', '\u{2264}', '\u{2265}', '\u{00A5}', '\u{00B5}', '\u{2202}', '\u{2211}',
    '\u{220F}', '\u{03C0}', '\u{222B}', '\u{00AA}', '\u{00BA}', '\u{03A9}', '\u{00E6}', '\u{00F8}',
    // 0xC0
    '\u{00BF}', '\u{00A1}', '\u{00AC}', '\u{221A}', '\u{0192}', '\u{2248}', '\u{2206}', '\u{00AB}',
    '\u{00BB}', '\u{2026}', '\u{00A0}', '\u{00C0}', '\u{00C3}', '\u{00D5}', '\u{0152}', '\u{0153}',
    // 0xD0
    '\u{2013}', '\u{2014}', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{00F7}', '\u{25CA}',
    '\u{00FF}', '\u{0178}', '\u{2044}', '\u{20AC}', '\u{2039}', '\u{203A}', '\u{FB01}', '\u{FB02}',
    // 0xE0
    '\u{2021}', '\u{00B7}', '\u{201A}', '\u{201E}', '\u{2030}', '\u{00C2}', '\u{00CA}', '\u{00C1}',
    '\u{00CB}', '\u{00C8}', '\u{00CD}', '\u{00CE}', '\u{00CF}', '\u{00CC}', '\u{00D3}', '\u{00D4}',
    // 0xF0
    '\u{F8FF}', '\u{00D2}', '\u{00DA}', '\u{00DB}', '\u{00D9}', '\u{0131}', '\u{02C6}', '\u{02DC}',
    '\u{00AF}', '\u{02D8}', '\u{02D9}', '\u{02DA}', '\u{00B8}', '\u{02DD}', '\u{02DB}', '\u{02C7}',
];

/// Decode a single Mac OS Roman byte
pub fn decode_byte(byte: u8) -> char {
    if byte < 0x80 {
        byte as char
    } else {
        HIGH_HALF[(byte - 0x80) as usize]
    }
}

/// Encode a single character, or `None` if Mac OS Roman has no code for it
pub fn encode_char(ch: char) -> Option<u8> {
    if ch.is_ascii() {
        return Some(ch as u8);
    }
    HIGH_HALF
        .iter()
        .position(|&c| c == ch)
        .map(|index| 0x80 + index as u8)
}

/// Decode Mac OS Roman bytes. Every byte has a mapping, so this never fails.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| decode_byte(b)).collect()
}

/// Encode text as Mac OS Roman
pub fn encode(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|ch| encode_char(ch).ok_or(HfsError::UnsupportedCharacter { ch }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        assert_eq!(encode("System Folder").unwrap(), b"System Folder");
        assert_eq!(decode(b"System Folder"), "System Folder");
    }

    #[test]
    fn test_decode_high_bytes() {
        assert_eq!(decode(&[0xA5]), "\u{2022}");
        assert_eq!(decode(b"Caf\x8E"), "Caf\u{00E9}");
        assert_eq!(decode(&[0xF0]), "\u{F8FF}");
        assert_eq!(decode(&[0xDB]), "\u{20AC}");
    }

    #[test]
    fn test_every_byte_round_trips() {
        let all: Vec<u8> = (0..=255u8).collect();
        let text = decode(&all);
        assert_eq!(text.chars().count(), 256);
        assert_eq!(encode(&text).unwrap(), all);
    }

    #[test]
    fn test_high_half_has_no_duplicates() {
        for (i, a) in HIGH_HALF.iter().enumerate() {
            assert!(!a.is_ascii());
            assert!(HIGH_HALF[i + 1..].iter().all(|b| a != b), "duplicate {:?}", a);
        }
    }

    #[test]
    fn test_unsupported_character() {
        match encode("Kanji \u{6F22}") {
            Err(HfsError::UnsupportedCharacter { ch }) => assert_eq!(ch, '\u{6F22}'),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
