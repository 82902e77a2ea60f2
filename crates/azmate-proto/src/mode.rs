//! Channel roles and role-changing MODE parsing.
//!
//! Roles are conveyed twice on the wire: as MODE letters (`+o alice`) and
//! as NAMES prefix characters (`@alice`). Both map onto [`Role`].

use std::fmt;

/// A per-channel privilege.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// `+v`, shown as `+`.
    Voice,
    /// `+h`, shown as `%`.
    HalfOp,
    /// `+o`, shown as `@`.
    Operator,
    /// `+a`, shown as `&`.
    Admin,
    /// `+q`, shown as `~`.
    Founder,
}

impl Role {
    /// Every role, lowest first.
    pub const ALL: [Role; 5] = [
        Role::Voice,
        Role::HalfOp,
        Role::Operator,
        Role::Admin,
        Role::Founder,
    ];

    /// The MODE letter for this role.
    pub fn mode_char(self) -> char {
        match self {
            Role::Voice => 'v',
            Role::HalfOp => 'h',
            Role::Operator => 'o',
            Role::Admin => 'a',
            Role::Founder => 'q',
        }
    }

    /// The NAMES prefix character for this role.
    pub fn prefix_char(self) -> char {
        match self {
            Role::Voice => '+',
            Role::HalfOp => '%',
            Role::Operator => '@',
            Role::Admin => '&',
            Role::Founder => '~',
        }
    }

    /// Look up a role by MODE letter.
    pub fn from_mode_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.mode_char() == c)
    }

    /// Look up a role by NAMES prefix character.
    pub fn from_prefix_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.prefix_char() == c)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Voice => "voice",
            Role::HalfOp => "half-op",
            Role::Operator => "operator",
            Role::Admin => "admin",
            Role::Founder => "founder",
        })
    }
}

/// A role granted to or revoked from one nickname.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleChange {
    /// The role.
    pub role: Role,
    /// `true` for `+`, `false` for `-`.
    pub granted: bool,
    /// The affected nickname.
    pub target: String,
}

impl RoleChange {
    fn new(role: Role, sign: PlusMinus, target: &str) -> Self {
        Self {
            role,
            granted: sign == PlusMinus::Plus,
            target: target.to_owned(),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum PlusMinus {
    Plus,
    Minus,
}

/// Extract role changes from a channel mode string and its arguments.
///
/// Non-role letters that take an argument (`b e I k`, and `l` when set)
/// consume it so later role letters pair with the right nickname. Role
/// letters without a remaining argument are skipped. When the string ends
/// on a role letter and nicknames remain, each remaining nickname gets
/// that role too, so `+v alice bob` voices both.
///
/// ```
/// use azmate_proto::mode::{parse_role_changes, Role};
///
/// let changes = parse_role_changes("+v-o+b", &["alice", "bob", "*!*@spam"]);
/// assert_eq!(changes.len(), 2);
/// assert_eq!(changes[0].role, Role::Voice);
/// assert!(!changes[1].granted);
/// assert_eq!(changes[1].target, "bob");
/// ```
pub fn parse_role_changes(modes: &str, args: &[&str]) -> Vec<RoleChange> {
    let mut args = args.iter().copied();
    let mut sign = PlusMinus::Plus;
    let mut trailing_role = None;
    let mut changes = Vec::new();

    for c in modes.chars() {
        match c {
            '+' => sign = PlusMinus::Plus,
            '-' => sign = PlusMinus::Minus,
            _ => {
                trailing_role = None;
                if let Some(role) = Role::from_mode_char(c) {
                    trailing_role = Some((role, sign));
                    if let Some(target) = args.next() {
                        changes.push(RoleChange::new(role, sign, target));
                    }
                } else if takes_arg(c, sign) {
                    args.next();
                }
            }
        }
    }

    if let Some((role, sign)) = trailing_role {
        changes.extend(args.map(|target| RoleChange::new(role, sign, target)));
    }

    changes
}

fn takes_arg(c: char, sign: PlusMinus) -> bool {
    match c {
        'b' | 'e' | 'I' | 'k' => true,
        'l' => sign == PlusMinus::Plus,
        _ => false,
    }
}

/// Split NAMES-style privilege prefixes off a nickname.
///
/// Returns the first prefix character (the highest role the server chose
/// to show) and the bare nickname.
///
/// ```
/// use azmate_proto::mode::split_prefix;
///
/// assert_eq!(split_prefix("@+alice"), (Some('@'), "alice"));
/// assert_eq!(split_prefix("bob"), (None, "bob"));
/// ```
pub fn split_prefix(name: &str) -> (Option<char>, &str) {
    let bare = name.trim_start_matches(|c| Role::from_prefix_char(c).is_some());
    let prefix = if bare.len() < name.len() {
        name.chars().next()
    } else {
        None
    };
    (prefix, bare)
}
