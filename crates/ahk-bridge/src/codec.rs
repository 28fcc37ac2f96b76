//! UTF-16LE message encoding.
//!
//! Every message on the wire is UTF-16LE text followed by a NUL unit, so an
//! empty reply is still two bytes and the script side can read it with
//! `StrGet`. Decoding stops at the first NUL, drops an odd trailing byte and
//! maps unpaired surrogates to U+FFFD.

/// Encode text as NUL-terminated UTF-16LE bytes.
pub fn encode(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain([0])
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// Decode UTF-16LE bytes up to the first NUL.
pub fn decode(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|u| *u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}
