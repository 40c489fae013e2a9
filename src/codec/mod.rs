//! Field codec
//!
//! Converts one field at a time between the external representation
//! (UTF-8 text or a hex-digit string) and its fixed-width internal bytes.
//!
//! # Encodings
//!
//! - Text: byte-wise transliteration, NUL terminated, NUL padded
//! - Hex: digit pairs packed into bytes, zero padded, trailing zeros trimmed on decode

mod charset;
mod errors;
mod field;

pub use charset::{charset_by_name, Charset, Ibm1047, Latin1};
pub use errors::{CodecError, CodecResult};
pub use field::{trim_padding, FieldCodec};
