//! Identifier string handling
//!
//! ISO9660 identifiers come in two repertoires: d-characters (A-Z, 0-9,
//! _) for file and directory names, a-characters (adding punctuation)
//! for the volume descriptor identity fields. Fixed-width fields are
//! space-padded on disc.

/// Trim trailing 0x20 padding from a fixed-width field
pub fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ')
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Decode a d-character field (A-Z, 0-9, _), padding stripped
pub fn dchars_to_str(bytes: &[u8]) -> Result<&str, core::str::Utf8Error> {
    core::str::from_utf8(trim_trailing_spaces(bytes))
}

/// Decode an a-character field (d-characters plus punctuation), padding
/// stripped
pub fn achars_to_str(bytes: &[u8]) -> Result<&str, core::str::Utf8Error> {
    core::str::from_utf8(trim_trailing_spaces(bytes))
}

/// Strip the version suffix from a file identifier, and the trailing
/// dot left by extensionless names ("FILE.TXT;1" -> "FILE.TXT",
/// "FOO.;1" -> "FOO")
pub fn strip_version(name: &str) -> &str {
    let base = name.split(';').next().unwrap_or(name);
    base.strip_suffix('.').unwrap_or(base)
}
