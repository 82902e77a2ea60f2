//! RFC 1459 case mapping.
//!
//! Nicknames and channel names compare case-insensitively, with `[]\~`
//! treated as the uppercase forms of `{}|^`. Every roster and channel key
//! in the engine goes through [`irc_to_lower`].

/// Lowercase one character under the RFC 1459 mapping.
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        _ => c.to_ascii_lowercase(),
    }
}

/// Lowercase a nickname or channel name for use as a map key.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Case-insensitive equality under the RFC 1459 mapping.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.chars()
            .map(irc_lower_char)
            .eq(b.chars().map(irc_lower_char))
}
