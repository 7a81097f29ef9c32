use std::borrow::Cow;

/// Decodes raw export bytes to text.
///
/// Older exports are ISO-8859-1, newer ones UTF-8. Valid UTF-8 is taken
/// as-is; anything else is decoded byte-wise as Latin-1, where every byte
/// maps 1:1 to the code point of the same value, so the fallback cannot
/// fail.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}
