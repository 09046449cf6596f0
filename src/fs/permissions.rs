//! Permission Codec
//!
//! Decodes `chmod` mode strings. Two syntaxes are accepted:
//! - three octal digits (`755`), which replace the whole set
//! - comma-separated symbolic clauses (`u+x,g-w,a+r`), applied in order on top
//!   of the current set

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid mode: '{spec}'")]
pub struct InvalidModeSpec {
    pub spec: String,
}

/// The nine owner/group/other read/write/execute flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PermissionSet(u16);

impl PermissionSet {
    pub const OWNER_READ: PermissionSet = PermissionSet(0o400);
    pub const OWNER_WRITE: PermissionSet = PermissionSet(0o200);
    pub const OWNER_EXEC: PermissionSet = PermissionSet(0o100);
    pub const GROUP_READ: PermissionSet = PermissionSet(0o040);
    pub const GROUP_WRITE: PermissionSet = PermissionSet(0o020);
    pub const GROUP_EXEC: PermissionSet = PermissionSet(0o010);
    pub const OTHER_READ: PermissionSet = PermissionSet(0o004);
    pub const OTHER_WRITE: PermissionSet = PermissionSet(0o002);
    pub const OTHER_EXEC: PermissionSet = PermissionSet(0o001);

    const MASK: u16 = 0o777;

    pub const fn empty() -> Self {
        PermissionSet(0)
    }

    /// Keep only the rwx bits of a raw st_mode.
    pub const fn from_mode(mode: u32) -> Self {
        PermissionSet((mode & Self::MASK as u32) as u16)
    }

    pub const fn bits(self) -> u32 {
        self.0 as u32
    }

    pub const fn contains(self, other: PermissionSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: PermissionSet) -> Self {
        PermissionSet(self.0 | other.0)
    }

    pub const fn difference(self, other: PermissionSet) -> Self {
        PermissionSet(self.0 & !other.0)
    }

    /// Build a set from an octal string of exactly three digits 0-7.
    pub fn from_octal(spec: &str) -> Option<Self> {
        if spec.len() != 3 || !spec.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return None;
        }
        let mut bits = 0u16;
        for (i, b) in spec.bytes().enumerate() {
            let digit = (b - b'0') as u16;
            bits |= digit << (3 * (2 - i));
        }
        Some(PermissionSet(bits))
    }

    /// `rwxr-xr-x` style rendering.
    pub fn to_rwx_string(self) -> String {
        const FLAGS: [(PermissionSet, char); 9] = [
            (PermissionSet::OWNER_READ, 'r'),
            (PermissionSet::OWNER_WRITE, 'w'),
            (PermissionSet::OWNER_EXEC, 'x'),
            (PermissionSet::GROUP_READ, 'r'),
            (PermissionSet::GROUP_WRITE, 'w'),
            (PermissionSet::GROUP_EXEC, 'x'),
            (PermissionSet::OTHER_READ, 'r'),
            (PermissionSet::OTHER_WRITE, 'w'),
            (PermissionSet::OTHER_EXEC, 'x'),
        ];
        FLAGS
            .iter()
            .map(|&(flag, c)| if self.contains(flag) { c } else { '-' })
            .collect()
    }
}

impl fmt::Octal for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Octal::fmt(&self.0, f)
    }
}

/// Decode `spec` against the `current` permissions.
///
/// Octal input replaces `current` entirely. Symbolic clauses are applied left
/// to right, so a later clause sees the effect of an earlier one. Clauses
/// shorter than three characters (e.g. the empty clause left by a trailing
/// comma) are skipped rather than rejected.
pub fn decode(spec: &str, current: PermissionSet) -> Result<PermissionSet, InvalidModeSpec> {
    if let Some(set) = PermissionSet::from_octal(spec) {
        return Ok(set);
    }

    let invalid = || InvalidModeSpec { spec: spec.to_string() };
    let mut result = current;

    for clause in spec.split(',') {
        if clause.len() < 3 {
            tracing::debug!(clause, "skipping short mode clause");
            continue;
        }
        let mut chars = clause.chars();
        let who = chars.next().ok_or_else(invalid)?;
        let op = chars.next().ok_or_else(invalid)?;

        // bit shift of each selected class within the 9-bit set
        let shifts: &[u32] = match who {
            'u' => &[6],
            'g' => &[3],
            'o' => &[0],
            'a' => &[6, 3, 0],
            _ => return Err(invalid()),
        };

        let mut class_bits = 0u16;
        for p in chars {
            class_bits |= match p {
                'r' => 4,
                'w' => 2,
                'x' => 1,
                _ => return Err(invalid()),
            };
        }

        let bits = PermissionSet(
            shifts.iter().fold(0u16, |acc, &sh| acc | (class_bits << sh)),
        );
        result = match op {
            '+' => result.union(bits),
            '-' => result.difference(bits),
            _ => return Err(invalid()),
        };
    }

    Ok(result)
}
