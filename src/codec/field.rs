//! Fixed-width field encoding
//!
//! Text fields:
//!
//! ```text
//! +---------------------------+----+-----------------+
//! | transliterated value      | 00 | 00 padding      |
//! +---------------------------+----+-----------------+
//! |<-- at most width - 1 -->|
//! ```
//!
//! Hex fields hold the packed bytes of a hex-digit string, zero padded.

use std::sync::Arc;

use super::charset::{Charset, Ibm1047};
use super::errors::{CodecError, CodecResult};

/// Converts single field values between their external form and the
/// fixed-width internal encoding.
#[derive(Debug, Clone)]
pub struct FieldCodec {
    charset: Arc<dyn Charset>,
}

impl Default for FieldCodec {
    fn default() -> Self {
        Self::new(Arc::new(Ibm1047))
    }
}

impl FieldCodec {
    /// Creates a codec over the given charset
    pub fn new(charset: Arc<dyn Charset>) -> Self {
        Self { charset }
    }

    /// Returns the charset used for text fields
    pub fn charset(&self) -> &dyn Charset {
        self.charset.as_ref()
    }

    /// Encodes a text value into a zeroed field of `width` bytes.
    ///
    /// At most `width - 1` value bytes are kept so the terminator always fits.
    pub fn encode_text(&self, value: &str, width: usize) -> Vec<u8> {
        let mut field = vec![0u8; width];
        let keep = value.len().min(width.saturating_sub(1));
        for (dst, src) in field.iter_mut().zip(value.bytes().take(keep)) {
            *dst = self.charset.to_internal(src);
        }
        field
    }

    /// Decodes a whole text field.
    ///
    /// Padding is not stripped: a field of width `n` holding `"ab"` decodes to
    /// `"ab"` followed by `n - 2` NUL characters. Use [`trim_padding`] for the
    /// bare value.
    pub fn decode_text(&self, field: &[u8]) -> String {
        let external: Vec<u8> = field.iter().map(|&b| self.charset.to_external(b)).collect();
        match String::from_utf8(external) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }

    /// Packs a hex-digit string into a zeroed field of `width` bytes.
    ///
    /// A trailing lone digit is read as that digit followed by `0`. Packed
    /// bytes beyond `width` are dropped.
    pub fn encode_hex(&self, digits: &str, width: usize) -> CodecResult<Vec<u8>> {
        let packed = if digits.len() % 2 == 1 {
            hex::decode(format!("{}0", digits))
        } else {
            hex::decode(digits)
        }
        .map_err(|e| CodecError::InvalidHex(e.to_string()))?;

        let mut field = vec![0u8; width];
        let keep = packed.len().min(width);
        field[..keep].copy_from_slice(&packed[..keep]);
        Ok(field)
    }

    /// Renders a hex field as lowercase digits with trailing zero bytes trimmed.
    ///
    /// At least one byte is always rendered, so an all-zero field is `"00"`.
    pub fn decode_hex(&self, field: &[u8]) -> String {
        let mut digits = hex::encode(field);
        while digits.len() > 2 && digits.ends_with("00") {
            digits.truncate(digits.len() - 2);
        }
        digits
    }
}

/// Strips the trailing NUL padding from a decoded text field.
pub fn trim_padding(decoded: &str) -> &str {
    decoded.trim_end_matches('\0')
}
