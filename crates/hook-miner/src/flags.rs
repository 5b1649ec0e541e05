//! Hook permission bits.
//!
//! The pool manager reads a hook's permissions from the low 14 bits of its
//! address, so a hook can only be deployed to an address whose bits spell out
//! exactly the callbacks it implements.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};
use core::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{MinerError, Result};

/// Every bit the pool manager inspects.
pub const ALL_HOOK_MASK: u16 = (1 << 14) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct HookFlags(u16);

impl HookFlags {
    pub const NONE: Self = Self(0);
    pub const BEFORE_INITIALIZE: Self = Self(1 << 13);
    pub const AFTER_INITIALIZE: Self = Self(1 << 12);
    pub const BEFORE_ADD_LIQUIDITY: Self = Self(1 << 11);
    pub const AFTER_ADD_LIQUIDITY: Self = Self(1 << 10);
    pub const BEFORE_REMOVE_LIQUIDITY: Self = Self(1 << 9);
    pub const AFTER_REMOVE_LIQUIDITY: Self = Self(1 << 8);
    pub const BEFORE_SWAP: Self = Self(1 << 7);
    pub const AFTER_SWAP: Self = Self(1 << 6);
    pub const BEFORE_DONATE: Self = Self(1 << 5);
    pub const AFTER_DONATE: Self = Self(1 << 4);
    pub const BEFORE_SWAP_RETURNS_DELTA: Self = Self(1 << 3);
    pub const AFTER_SWAP_RETURNS_DELTA: Self = Self(1 << 2);
    pub const AFTER_ADD_LIQUIDITY_RETURNS_DELTA: Self = Self(1 << 1);
    pub const AFTER_REMOVE_LIQUIDITY_RETURNS_DELTA: Self = Self(1 << 0);

    /// Highest bit first, matching the on-chain declaration order.
    pub const NAMED: [(&'static str, HookFlags); 14] = [
        ("before-initialize", Self::BEFORE_INITIALIZE),
        ("after-initialize", Self::AFTER_INITIALIZE),
        ("before-add-liquidity", Self::BEFORE_ADD_LIQUIDITY),
        ("after-add-liquidity", Self::AFTER_ADD_LIQUIDITY),
        ("before-remove-liquidity", Self::BEFORE_REMOVE_LIQUIDITY),
        ("after-remove-liquidity", Self::AFTER_REMOVE_LIQUIDITY),
        ("before-swap", Self::BEFORE_SWAP),
        ("after-swap", Self::AFTER_SWAP),
        ("before-donate", Self::BEFORE_DONATE),
        ("after-donate", Self::AFTER_DONATE),
        ("before-swap-returns-delta", Self::BEFORE_SWAP_RETURNS_DELTA),
        ("after-swap-returns-delta", Self::AFTER_SWAP_RETURNS_DELTA),
        (
            "after-add-liquidity-returns-delta",
            Self::AFTER_ADD_LIQUIDITY_RETURNS_DELTA,
        ),
        (
            "after-remove-liquidity-returns-delta",
            Self::AFTER_REMOVE_LIQUIDITY_RETURNS_DELTA,
        ),
    ];

    /// A returns-delta flag is only honoured alongside the callback it extends.
    const DEPENDENCIES: [(HookFlags, HookFlags); 4] = [
        (Self::BEFORE_SWAP_RETURNS_DELTA, Self::BEFORE_SWAP),
        (Self::AFTER_SWAP_RETURNS_DELTA, Self::AFTER_SWAP),
        (Self::AFTER_ADD_LIQUIDITY_RETURNS_DELTA, Self::AFTER_ADD_LIQUIDITY),
        (
            Self::AFTER_REMOVE_LIQUIDITY_RETURNS_DELTA,
            Self::AFTER_REMOVE_LIQUIDITY,
        ),
    ];

    /// Rejects any bit above the 14 permission bits.
    pub fn from_bits(bits: u64) -> Result<Self> {
        if bits & !(ALL_HOOK_MASK as u64) != 0 {
            return Err(MinerError::InvalidFlagMask {
                bits,
                mask: ALL_HOOK_MASK,
            });
        }
        Ok(Self(bits as u16))
    }

    /// Decode the permission bits an address carries.
    pub fn of_address(address: &Address) -> Self {
        let low = u16::from_be_bytes([address.as_slice()[18], address.as_slice()[19]]);
        Self(low & ALL_HOOK_MASK)
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let wanted = normalize(name);
        Self::NAMED
            .iter()
            .find(|(known, _)| normalize(known) == wanted)
            .map(|(_, flag)| *flag)
            .ok_or_else(|| MinerError::UnknownFlag(name.to_string()))
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Names of the set bits, highest bit first.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Checks the combination is one the pool manager accepts at registration.
    pub fn validate(self) -> Result<()> {
        for (flag, requires) in Self::DEPENDENCIES {
            if self.contains(flag) && !self.contains(requires) {
                return Err(MinerError::InconsistentFlags {
                    flag: flag.name(),
                    requires: requires.name(),
                });
            }
        }
        Ok(())
    }

    /// Exact match: requested bits set and every other permission bit clear.
    #[inline]
    pub fn matches(self, address: &Address) -> bool {
        Self::of_address(address) == self
    }

    fn name(self) -> &'static str {
        Self::NAMED
            .iter()
            .find(|(_, flag)| *flag == self)
            .map(|(name, _)| *name)
            .unwrap_or("composite")
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl BitOr for HookFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for HookFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for HookFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl TryFrom<u64> for HookFlags {
    type Error = MinerError;

    fn try_from(bits: u64) -> Result<Self> {
        Self::from_bits(bits)
    }
}

impl From<HookFlags> for u64 {
    fn from(flags: HookFlags) -> u64 {
        flags.0 as u64
    }
}

/// Accepts a hex mask (`0x1a00`), a decimal mask, or flag names separated by
/// `,` or `|` (`before-swap|afterSwap`).
impl FromStr for HookFlags {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            let bits = u64::from_str_radix(hex, 16)
                .map_err(|_| MinerError::UnknownFlag(s.to_string()))?;
            return Self::from_bits(bits);
        }
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            let bits = s
                .parse::<u64>()
                .map_err(|_| MinerError::UnknownFlag(s.to_string()))?;
            return Self::from_bits(bits);
        }

        let mut flags = Self::NONE;
        for part in s.split(|c: char| c == ',' || c == '|') {
            let part = part.trim();
            if !part.is_empty() {
                flags |= Self::from_name(part)?;
            }
        }
        Ok(flags)
    }
}
