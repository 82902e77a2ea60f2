//! Channel name helpers.

/// Characters that mark a target as a channel rather than a nickname.
pub const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

/// Whether `c` introduces a channel name.
#[inline]
pub fn is_channel_prefix(c: char) -> bool {
    CHANNEL_PREFIXES.contains(&c)
}

/// Extension trait for telling channel targets from nickname targets.
pub trait ChannelExt {
    /// True if the string starts with a channel prefix (`#&+!`).
    ///
    /// This is the routing test the dispatcher uses: it does not validate
    /// the rest of the name.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        self.starts_with(CHANNEL_PREFIXES)
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}
