//! General purpose register identifiers.

use core::fmt;

/// Identifier of one of the 32 integer registers.
///
/// Constructed from an index or parsed from a textual name (`x0`..`x31` or
/// an ABI alias, case-insensitive). A name that matches nothing yields
/// [`Reg::INVALID`]; check with [`Reg::is_valid`] before using the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reg(i8);

/// ABI names indexed by register number.
const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1",
    "a2", "a3", "a4", "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7",
    "s8", "s9", "s10", "s11", "t3", "t4", "t5", "t6",
];

impl Reg {
    /// Sentinel for a name that did not resolve to a register.
    pub const INVALID: Reg = Reg(-1);

    /// `x0`, hard-wired zero.
    pub const ZERO: Reg = Reg(0);
    /// `x1`, return address.
    pub const RA: Reg = Reg(1);
    /// `x2`, stack pointer.
    pub const SP: Reg = Reg(2);
    /// `x10`, first argument / return value.
    pub const A0: Reg = Reg(10);
    /// `x11`, second argument.
    pub const A1: Reg = Reg(11);

    /// Register with the given index. Out-of-range indices yield
    /// [`Reg::INVALID`].
    pub const fn new(index: u8) -> Self {
        if index < 32 {
            Self(index as i8)
        } else {
            Self::INVALID
        }
    }

    /// Parse a register name, symbolic or numeric, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower == "fp" {
            return Self(8);
        }
        if let Some(pos) = ABI_NAMES.iter().position(|n| *n == lower) {
            return Self(pos as i8);
        }
        if let Some(num) = lower.strip_prefix('x') {
            // Reject forms like "x07" and "x+1": plain decimal only.
            if !num.is_empty()
                && num.chars().all(|c| c.is_ascii_digit())
                && (num.len() == 1 || !num.starts_with('0'))
            {
                if let Ok(idx) = num.parse::<u8>() {
                    if idx < 32 {
                        return Self(idx as i8);
                    }
                }
            }
        }
        Self::INVALID
    }

    /// Register index in `[0, 31]`, or `-1` for the invalid sentinel.
    pub const fn index(self) -> i8 {
        self.0
    }

    /// Index as a usize. Only meaningful on a valid register.
    pub const fn as_usize(self) -> usize {
        debug_assert!(self.0 >= 0);
        self.0 as usize
    }

    /// Whether the identifier refers to a real register.
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// Whether the register is addressable by the 3-bit `r'` field of the
    /// compressed formats (`x8`..`x15`).
    pub const fn in_compressed_range(self) -> bool {
        self.0 >= 8 && self.0 <= 15
    }

    /// Numeric name, `x0`..`x31`.
    pub fn name(self) -> String {
        if self.is_valid() {
            format!("x{}", self.0)
        } else {
            "x?".to_owned()
        }
    }

    /// Conventional ABI name (`zero`, `ra`, `sp`, ...).
    pub fn abi_name(self) -> &'static str {
        if self.is_valid() {
            ABI_NAMES[self.0 as usize]
        } else {
            "?"
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_names() {
        for i in 0..32u8 {
            let reg = Reg::from_name(&format!("x{i}"));
            assert_eq!(reg.index(), i as i8);
        }
        assert!(!Reg::from_name("x32").is_valid());
        assert!(!Reg::from_name("x07").is_valid());
        assert!(!Reg::from_name("y1").is_valid());
    }

    #[test]
    fn abi_names_round_trip() {
        for i in 0..32u8 {
            let reg = Reg::new(i);
            assert_eq!(Reg::from_name(reg.abi_name()), reg);
        }
        assert_eq!(Reg::from_name("fp"), Reg::new(8));
        assert_eq!(Reg::from_name("s0"), Reg::new(8));
        assert_eq!(Reg::from_name("SP"), Reg::SP);
        assert_eq!(Reg::from_name("Zero"), Reg::ZERO);
    }

    #[test]
    fn compressed_range() {
        assert!(!Reg::new(7).in_compressed_range());
        assert!(Reg::new(8).in_compressed_range());
        assert!(Reg::new(15).in_compressed_range());
        assert!(!Reg::new(16).in_compressed_range());
        assert!(!Reg::INVALID.in_compressed_range());
    }
}
