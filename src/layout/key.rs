//! Key arguments for locate operations

/// The key handed to a find, in one of three forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyArgument {
    /// Text matched against a text key field
    Text(String),
    /// Hex digits packed to raw bytes for a hex key field
    Hex(String),
    /// Pre-encoded key bytes, used as given. May be shorter than the key
    /// field, in which case it matches as a prefix.
    Raw(Vec<u8>),
}

impl KeyArgument {
    /// Text key
    pub fn text(value: impl Into<String>) -> Self {
        KeyArgument::Text(value.into())
    }

    /// Hex key
    pub fn hex(digits: impl Into<String>) -> Self {
        KeyArgument::Hex(digits.into())
    }

    /// Raw key made of the first `length` bytes of `bytes`.
    ///
    /// Returns `None` if `length` exceeds the buffer.
    pub fn raw(bytes: &[u8], length: usize) -> Option<Self> {
        bytes.get(..length).map(|b| KeyArgument::Raw(b.to_vec()))
    }
}
