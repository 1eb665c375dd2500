// src/core/output_filter.rs

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    /// ESC `[`, any run of digits, `;` or `?`, then one letter.
    static ref CSI_SEQUENCE: Regex =
        Regex::new(r"\x1b\[[0-9;?]*[a-zA-Z]").expect("CSI pattern is a valid regex");
}

/// Removes ANSI control-sequence-introducer sequences, leaving every other character intact.
///
/// Idempotent: what survives one pass contains no complete sequence, and removing a
/// sequence can only join an `ESC` with text that did not match before.
pub fn strip(text: &str) -> Cow<'_, str> {
    let mut current = CSI_SEQUENCE.replace_all(text, "");
    // A removal can splice a new sequence together (e.g. "\x1b\x1b[0m[1m").
    while CSI_SEQUENCE.is_match(&current) {
        current = Cow::Owned(CSI_SEQUENCE.replace_all(&current, "").into_owned());
    }
    current
}

/// Turns raw pipe chunks into text without splitting multi-byte characters.
///
/// A UTF-8 sequence cut by a chunk boundary is held back and completed by the next chunk.
/// Genuinely invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the next chunk, returning whatever is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let bytes = std::mem::take(&mut self.pending);

        match std::str::from_utf8(&bytes) {
            Ok(text) => text.to_string(),
            Err(e) if e.error_len().is_none() => {
                // Incomplete trailing sequence: keep it for the next chunk.
                let (complete, tail) = bytes.split_at(e.valid_up_to());
                self.pending = tail.to_vec();
                String::from_utf8_lossy(complete).into_owned()
            }
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Flushes any bytes still held back once the stream has ended.
    pub fn finish(&mut self) -> String {
        let bytes = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_color_codes() {
        assert_eq!(strip("\x1b[31mHello\x1b[0m"), "Hello");
    }

    #[test]
    fn test_strip_removes_cursor_and_private_modes() {
        assert_eq!(strip("\x1b[?25lbuilding\x1b[2K\x1b[1;32m done\x1b[?25h"), "building done");
    }

    #[test]
    fn test_strip_preserves_newlines_and_plain_text() {
        let text = "line one\nline two\r\n\tindented [not a sequence]\n";
        assert_eq!(strip(text), text);
        assert_eq!(strip("\x1b[1mA\x1b[0m\nB\n"), "A\nB\n");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let samples = [
            "\x1b[31mHello\x1b[0m",
            "\x1b\x1b[0m[1mnested",
            "plain",
            "\x1b[ not closed",
            "",
        ];
        for sample in samples {
            let once = strip(sample).into_owned();
            let twice = strip(&once).into_owned();
            assert_eq!(once, twice, "strip not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_strip_keeps_lone_escape() {
        assert_eq!(strip("\x1b[ not closed"), "\x1b[ not closed");
        assert_eq!(strip("\x1b]0;title\x07"), "\x1b]0;title\x07");
    }

    #[test]
    fn test_decoder_joins_split_multibyte_character() {
        // --- Setup ---
        let bytes = "héllo ✓".as_bytes();
        let split = bytes.len() - 2; // cut inside the check mark
        let (first, second) = bytes.split_at(split);
        let mut decoder = Utf8ChunkDecoder::new();

        // --- Execute ---
        let a = decoder.decode(first);
        let b = decoder.decode(second);

        // --- Assert ---
        assert_eq!(a, "héllo ");
        assert_eq!(format!("{}{}", a, b), "héllo ✓");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_decoder_replaces_invalid_bytes() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"ok\xffok"), "ok\u{FFFD}ok");
    }

    #[test]
    fn test_decoder_flushes_truncated_tail() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(&[b'a', 0xE2, 0x9C]), "a");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }
}
