//! Typed instruction arguments.

use crate::{
    num::{Imm11, Imm12, Imm20, Imm5, Imm6, Imm8, UImm12, UImm20, UImm5, UImm6, UImm8},
    Reg,
};

/// The kind of argument an instruction prototype declares at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArgKind {
    /// No argument at this position.
    None,
    /// Any integer register.
    IntReg,
    /// A register in the compressed range `x8..x15`.
    IntRegP,
    /// 5-bit signed immediate.
    Imm5,
    /// 6-bit signed immediate.
    Imm6,
    /// 8-bit signed immediate.
    Imm8,
    /// 11-bit signed immediate.
    Imm11,
    /// 12-bit signed immediate.
    Imm12,
    /// 20-bit signed immediate.
    Imm20,
    /// 5-bit unsigned immediate.
    UImm5,
    /// 6-bit unsigned immediate.
    UImm6,
    /// 8-bit unsigned immediate.
    UImm8,
    /// 12-bit unsigned immediate.
    UImm12,
    /// 20-bit unsigned immediate.
    UImm20,
}

/// A validated instruction argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstArg {
    /// Empty slot.
    #[default]
    None,
    /// A register operand.
    Reg(Reg),
    /// 5-bit signed immediate.
    Imm5(Imm5),
    /// 6-bit signed immediate.
    Imm6(Imm6),
    /// 8-bit signed immediate.
    Imm8(Imm8),
    /// 11-bit signed immediate.
    Imm11(Imm11),
    /// 12-bit signed immediate.
    Imm12(Imm12),
    /// 20-bit signed immediate.
    Imm20(Imm20),
    /// 5-bit unsigned immediate.
    UImm5(UImm5),
    /// 6-bit unsigned immediate.
    UImm6(UImm6),
    /// 8-bit unsigned immediate.
    UImm8(UImm8),
    /// 12-bit unsigned immediate.
    UImm12(UImm12),
    /// 20-bit unsigned immediate.
    UImm20(UImm20),
}

impl InstArg {
    /// The register operand, if this is one.
    pub const fn reg(self) -> Option<Reg> {
        match self {
            Self::Reg(r) => Some(r),
            _ => None,
        }
    }

    /// The immediate as a 64-bit signed value: sign-extended for the signed
    /// kinds, zero-extended for the unsigned ones.
    pub const fn immediate(self) -> Option<i64> {
        match self {
            Self::Imm5(v) => Some(v.get()),
            Self::Imm6(v) => Some(v.get()),
            Self::Imm8(v) => Some(v.get()),
            Self::Imm11(v) => Some(v.get()),
            Self::Imm12(v) => Some(v.get()),
            Self::Imm20(v) => Some(v.get()),
            Self::UImm5(v) => Some(v.get() as i64),
            Self::UImm6(v) => Some(v.get() as i64),
            Self::UImm8(v) => Some(v.get() as i64),
            Self::UImm12(v) => Some(v.get() as i64),
            Self::UImm20(v) => Some(v.get() as i64),
            Self::None | Self::Reg(_) => None,
        }
    }

    /// The raw field bit pattern of the immediate, zero-extended. This is
    /// what the encoder packs into the instruction word.
    pub const fn field_bits(self) -> Option<u64> {
        match self {
            Self::Imm5(v) => Some(v.zero_extended()),
            Self::Imm6(v) => Some(v.zero_extended()),
            Self::Imm8(v) => Some(v.zero_extended()),
            Self::Imm11(v) => Some(v.zero_extended()),
            Self::Imm12(v) => Some(v.zero_extended()),
            Self::Imm20(v) => Some(v.zero_extended()),
            Self::UImm5(v) => Some(v.get()),
            Self::UImm6(v) => Some(v.get()),
            Self::UImm8(v) => Some(v.get()),
            Self::UImm12(v) => Some(v.get()),
            Self::UImm20(v) => Some(v.get()),
            Self::None | Self::Reg(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_extension() {
        assert_eq!(InstArg::Imm12(Imm12::new(-1)).immediate(), Some(-1));
        assert_eq!(InstArg::UImm12(UImm12::new(0xFFF)).immediate(), Some(0xFFF));
        assert_eq!(InstArg::Reg(Reg::ZERO).immediate(), None);
    }

    #[test]
    fn field_bits_are_masked() {
        assert_eq!(InstArg::Imm12(Imm12::new(-1)).field_bits(), Some(0xFFF));
        assert_eq!(InstArg::Imm6(Imm6::new(-32)).field_bits(), Some(0b10_0000));
        assert_eq!(InstArg::None.field_bits(), None);
    }
}
