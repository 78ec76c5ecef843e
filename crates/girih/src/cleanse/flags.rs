use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Bitmask selecting cleanser passes. Passes always run in bit order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CleanseFlags(pub u32);

impl CleanseFlags {
    pub const NONE: Self = Self(0);
    pub const COALESCE_POINTS: Self = Self(0x01);
    pub const JOIN_COLLINEAR: Self = Self(0x02);
    pub const DIVIDE_INTERSECTING: Self = Self(0x04);
    pub const REMOVE_BAD_EDGES: Self = Self(0x08);
    pub const REMOVE_DANGLING: Self = Self(0x10);
    pub const REMOVE_ISOLATED: Self = Self(0x20);
    pub const DEDUP_EDGES: Self = Self(0x40);

    pub const ALL: Self = Self(0x7f);
    /// Repair level used by `Map::verify(true)`.
    pub const VERIFY_FIX: Self = Self(
        Self::COALESCE_POINTS.0
            | Self::REMOVE_BAD_EDGES.0
            | Self::REMOVE_ISOLATED.0
            | Self::DEDUP_EDGES.0,
    );

    /// Every single-pass flag, in execution order.
    pub const PASSES: [Self; 7] = [
        Self::COALESCE_POINTS,
        Self::JOIN_COLLINEAR,
        Self::DIVIDE_INTERSECTING,
        Self::REMOVE_BAD_EDGES,
        Self::REMOVE_DANGLING,
        Self::REMOVE_ISOLATED,
        Self::DEDUP_EDGES,
    ];

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 & Self::ALL.0 == 0
    }

    fn name(self) -> &'static str {
        match self {
            Self::COALESCE_POINTS => "coalesce-points",
            Self::JOIN_COLLINEAR => "join-collinear",
            Self::DIVIDE_INTERSECTING => "divide-intersecting",
            Self::REMOVE_BAD_EDGES => "remove-bad-edges",
            Self::REMOVE_DANGLING => "remove-dangling",
            Self::REMOVE_ISOLATED => "remove-isolated",
            Self::DEDUP_EDGES => "dedup-edges",
            _ => "?",
        }
    }
}

impl BitOr for CleanseFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
impl BitOrAssign for CleanseFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
impl BitAnd for CleanseFlags {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for CleanseFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut first = true;
        for p in Self::PASSES {
            if self.contains(p) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", p.name())?;
                first = false;
            }
        }
        Ok(())
    }
}
