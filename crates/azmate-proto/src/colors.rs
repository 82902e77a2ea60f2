//! mIRC formatting code handling.
//!
//! Detection and stripping of inline color and style codes, plus helpers
//! for producing colored text.
//!
//! # Format Codes
//! - 0x02 (^B): Bold
//! - 0x03 (^C): Color, followed by `fg[,bg]` with up to two digits each
//! - 0x0F (^O): Reset all formatting
//! - 0x16 (^V): Reverse
//! - 0x1F (^_): Underline

use std::borrow::Cow;
use std::fmt;

/// Bold toggle.
pub const BOLD: char = '\x02';
/// Color indicator.
pub const COLOR: char = '\x03';
/// Reset all formatting.
pub const RESET: char = '\x0F';
/// Reverse video toggle.
pub const REVERSE: char = '\x16';
/// Underline toggle.
pub const UNDERLINE: char = '\x1F';

const FORMAT_CHARS: &[char] = &[BOLD, COLOR, RESET, REVERSE, UNDERLINE];

/// The sixteen standard mIRC colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Color {
    White = 0,
    Black = 1,
    DarkBlue = 2,
    DarkGreen = 3,
    Red = 4,
    Brown = 5,
    Purple = 6,
    Orange = 7,
    Yellow = 8,
    Green = 9,
    Teal = 10,
    Cyan = 11,
    Blue = 12,
    Magenta = 13,
    DarkGrey = 14,
    LightGrey = 15,
}

impl Color {
    /// Numeric color code as sent on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Always two digits so text starting with a digit is not swallowed.
        write!(f, "{:02}", self.code())
    }
}

/// Wrap `text` in a foreground color, terminated by a reset.
///
/// ```
/// use azmate_proto::{colorize, Color};
///
/// assert_eq!(colorize("hi", Color::Red), "\x0304hi\x0f");
/// ```
pub fn colorize(text: &str, fg: Color) -> String {
    format!("{COLOR}{fg}{text}{RESET}")
}

/// Wrap `text` in a foreground and background color, terminated by a reset.
pub fn colorize_bg(text: &str, fg: Color, bg: Color) -> String {
    format!("{COLOR}{fg},{bg}{text}{RESET}")
}

/// Extension trait for handling formatted IRC strings.
pub trait FormattedStringExt<'a> {
    /// Check if the string contains any formatting codes.
    fn is_formatted(&self) -> bool;

    /// Strip all formatting codes from the string.
    ///
    /// Returns `Cow::Borrowed` if no formatting was present.
    /// Stripping is idempotent.
    fn strip_formatting(self) -> Cow<'a, str>;
}

impl<'a> FormattedStringExt<'a> for &'a str {
    fn is_formatted(&self) -> bool {
        self.contains(FORMAT_CHARS)
    }

    fn strip_formatting(self) -> Cow<'a, str> {
        if !self.is_formatted() {
            return Cow::Borrowed(self);
        }
        Cow::Owned(strip(self))
    }
}

impl FormattedStringExt<'static> for String {
    fn is_formatted(&self) -> bool {
        self.as_str().is_formatted()
    }

    fn strip_formatting(self) -> Cow<'static, str> {
        if !self.is_formatted() {
            return Cow::Owned(self);
        }
        Cow::Owned(strip(&self))
    }
}

fn strip(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut kept_from = 0;
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        match bytes[i] {
            0x03 => {
                i += 1;
                let fg = count_digits(&bytes[i..]);
                i += fg;
                if bytes.get(i) == Some(&b',') {
                    i += 1;
                    i += count_digits(&bytes[i..]);
                }
            }
            0x02 | 0x0F | 0x16 | 0x1F => i += 1,
            _ => {
                i += 1;
                continue;
            }
        }
        // Control codes are ASCII, so both offsets sit on char boundaries.
        out.push_str(&input[kept_from..start]);
        kept_from = i;
    }

    out.push_str(&input[kept_from..]);
    out
}

/// Number of leading ASCII digits, capped at two.
fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take(2).take_while(|b| b.is_ascii_digit()).count()
}
