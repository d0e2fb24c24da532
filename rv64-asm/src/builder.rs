//! Staged construction of one instruction.
//!
//! The parser feeds raw operands (register names, numeric literals, label
//! references) into a builder; [`InstructionBuilder::resolve_symbols`]
//! replaces the label references once all addresses are known, and
//! [`InstructionBuilder::build`] validates everything against the catalog
//! prototype.

use crate::{
    num::{Imm11, Imm12, Imm20, Imm5, Imm6, Imm8, UImm12, UImm20, UImm5, UImm6, UImm8},
    ArgKind, BuildError, BuildErrorKind, InstArg, Instruction, Opcode, Reg,
};

use hashbrown::HashMap;

/// Parse a numeric literal: decimal, `0x` hex or `0b` binary, with an
/// optional leading sign.
pub fn parse_immediate(text: &str) -> Option<i64> {
    let (negative, rest) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16, hex)
    } else if let Some(bin) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        (2, bin)
    } else {
        (10, rest)
    };
    if digits.is_empty() {
        return None;
    }
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// An operand before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RawArg {
    /// Register name or not-yet-parsed text.
    Text(String),
    /// Numeric immediate.
    Imm(i64),
    /// Reference to a label, plus a constant offset.
    Symbol { name: String, offset: i64 },
}

/// Builds one [`Instruction`] from textual operands.
#[derive(Debug, Clone, Default)]
pub struct InstructionBuilder {
    mnemonic: String,
    args: Vec<RawArg>,
}

impl InstructionBuilder {
    /// A builder for the given mnemonic.
    pub fn new(mnemonic: &str) -> Self {
        Self {
            mnemonic: mnemonic.to_ascii_lowercase(),
            args: Vec::with_capacity(3),
        }
    }

    /// Replace the mnemonic, normalizing to lowercase.
    pub fn set_mnemonic(&mut self, mnemonic: &str) -> &mut Self {
        self.mnemonic = mnemonic.to_ascii_lowercase();
        self
    }

    /// The normalized mnemonic.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Append a textual operand: numeric literals become immediates,
    /// anything else is kept as text (a register name or a symbol).
    /// Additions beyond three operands are silently ignored.
    pub fn add_arg(&mut self, arg: &str) -> &mut Self {
        if self.args.len() >= 3 {
            return self;
        }
        match parse_immediate(arg) {
            Some(value) => self.args.push(RawArg::Imm(value)),
            None => self.args.push(RawArg::Text(arg.to_owned())),
        }
        self
    }

    /// Append a numeric operand.
    pub fn add_imm(&mut self, value: i64) -> &mut Self {
        if self.args.len() < 3 {
            self.args.push(RawArg::Imm(value));
        }
        self
    }

    /// Append an unresolved label reference.
    pub fn add_symbol(&mut self, name: &str, offset: i64) -> &mut Self {
        if self.args.len() < 3 {
            self.args.push(RawArg::Symbol {
                name: name.to_owned(),
                offset,
            });
        }
        self
    }

    /// Replace every symbol operand with its value.
    ///
    /// For PC-relative mnemonics (the conditional branches, `jal`, `c.j`,
    /// `c.beqz`, `c.bnez`) the stored value is the half-word offset
    /// `(target - current_pc) / 2`, relative to the instruction's own
    /// address; for everything else (`jalr`, data references) it is the
    /// absolute address.
    pub fn resolve_symbols(
        &mut self,
        symbols: &HashMap<String, u64>,
        current_pc: u64,
    ) -> Result<(), BuildError> {
        let op = Opcode::from_mnemonic(&self.mnemonic);
        let offset_index = op.filter(|op| op.is_pc_relative()).map(|op| {
            // The PC-relative offset is always the last declared operand.
            op.proto().arg_count().saturating_sub(1)
        });

        for (i, raw) in self.args.iter_mut().enumerate() {
            let RawArg::Symbol { name, offset } = raw else {
                continue;
            };
            let Some(address) = symbols.get(name.as_str()) else {
                return Err(BuildError::new(
                    BuildErrorKind::UnresolvedSymbol,
                    format!("unresolved symbol '{name}'"),
                ));
            };
            let target = address.wrapping_add(*offset as u64);
            *raw = if offset_index == Some(i) {
                RawArg::Imm((target as i64).wrapping_sub(current_pc as i64) / 2)
            } else {
                RawArg::Imm(target as i64)
            };
        }
        Ok(())
    }

    /// Validate against the catalog prototype and produce the instruction.
    pub fn build(&self) -> Result<Instruction, BuildError> {
        let Some(op) = Opcode::from_mnemonic(&self.mnemonic) else {
            return Err(BuildError::new(
                BuildErrorKind::UnknownMnemonic,
                format!("unknown mnemonic '{}'", self.mnemonic),
            ));
        };

        let kinds = op.arg_kinds();
        let mut args = [InstArg::None; 3];

        for (i, kind) in kinds.iter().enumerate() {
            if *kind == ArgKind::None {
                break;
            }
            let Some(raw) = self.args.get(i) else {
                return Err(BuildError::new(
                    BuildErrorKind::MissingArgument,
                    format!(
                        "'{}' expects {} operands, got {}",
                        self.mnemonic,
                        op.proto().arg_count(),
                        self.args.len()
                    ),
                ));
            };

            args[i] = match kind {
                ArgKind::IntReg | ArgKind::IntRegP => {
                    let RawArg::Text(text) = raw else {
                        return Err(BuildError::new(
                            BuildErrorKind::InvalidRegister,
                            format!("operand {} of '{}' must be a register", i + 1, self.mnemonic),
                        ));
                    };
                    let reg = Reg::from_name(text);
                    if !reg.is_valid() {
                        return Err(BuildError::new(
                            BuildErrorKind::InvalidRegister,
                            format!("invalid register '{text}'"),
                        ));
                    }
                    if *kind == ArgKind::IntRegP && !reg.in_compressed_range() {
                        return Err(BuildError::new(
                            BuildErrorKind::RegisterNotCompressible,
                            format!("'{}' requires a register in x8..x15, got {text}", self.mnemonic),
                        ));
                    }
                    InstArg::Reg(reg)
                }
                kind => {
                    let value = match raw {
                        RawArg::Imm(value) => *value,
                        RawArg::Text(text) => parse_immediate(text).ok_or_else(|| {
                            BuildError::new(
                                BuildErrorKind::SyntaxError,
                                format!("'{text}' is not a numeric immediate"),
                            )
                        })?,
                        RawArg::Symbol { name, .. } => {
                            return Err(BuildError::new(
                                BuildErrorKind::UnresolvedSymbol,
                                format!("unresolved symbol '{name}'"),
                            ));
                        }
                    };
                    typed_immediate(*kind, value).ok_or_else(|| {
                        BuildError::new(
                            BuildErrorKind::ImmediateOutOfRange,
                            format!("immediate {value} out of range for '{}'", self.mnemonic),
                        )
                    })?
                }
            };
        }

        Ok(Instruction::new(op, args))
    }

    /// Clear the builder for reuse.
    pub fn reset(&mut self) {
        self.mnemonic.clear();
        self.args.clear();
    }
}

fn typed_immediate(kind: ArgKind, value: i64) -> Option<InstArg> {
    let unsigned = || u64::try_from(value).ok();
    match kind {
        ArgKind::Imm5 => Imm5::checked(value).map(InstArg::Imm5),
        ArgKind::Imm6 => Imm6::checked(value).map(InstArg::Imm6),
        ArgKind::Imm8 => Imm8::checked(value).map(InstArg::Imm8),
        ArgKind::Imm11 => Imm11::checked(value).map(InstArg::Imm11),
        ArgKind::Imm12 => Imm12::checked(value).map(InstArg::Imm12),
        ArgKind::Imm20 => Imm20::checked(value).map(InstArg::Imm20),
        ArgKind::UImm5 => unsigned().and_then(UImm5::checked).map(InstArg::UImm5),
        ArgKind::UImm6 => unsigned().and_then(UImm6::checked).map(InstArg::UImm6),
        ArgKind::UImm8 => unsigned().and_then(UImm8::checked).map(InstArg::UImm8),
        ArgKind::UImm12 => unsigned().and_then(UImm12::checked).map(InstArg::UImm12),
        ArgKind::UImm20 => unsigned().and_then(UImm20::checked).map(InstArg::UImm20),
        ArgKind::None | ArgKind::IntReg | ArgKind::IntRegP => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_literals() {
        assert_eq!(parse_immediate("42"), Some(42));
        assert_eq!(parse_immediate("-42"), Some(-42));
        assert_eq!(parse_immediate("+7"), Some(7));
        assert_eq!(parse_immediate("0x1F"), Some(31));
        assert_eq!(parse_immediate("-0x10"), Some(-16));
        assert_eq!(parse_immediate("0b1010"), Some(10));
        assert_eq!(parse_immediate("0B11"), Some(3));
        assert_eq!(parse_immediate("x1"), None);
        assert_eq!(parse_immediate("0x"), None);
        assert_eq!(parse_immediate(""), None);
        assert_eq!(parse_immediate("12abc"), None);
    }

    #[test]
    fn builds_r_type() {
        let mut b = InstructionBuilder::new("ADD");
        b.add_arg("x3").add_arg("x1").add_arg("x2");
        let inst = b.build().unwrap();
        assert_eq!(inst.op(), Opcode::Add);
        assert_eq!(inst.args()[0].reg(), Some(Reg::new(3)));
        assert_eq!(inst.args()[2].reg(), Some(Reg::new(2)));
    }

    #[test]
    fn rejects_out_of_range_immediate() {
        let mut b = InstructionBuilder::new("addi");
        b.add_arg("x1").add_arg("x0").add_arg("4096");
        let err = b.build().unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::ImmediateOutOfRange);
    }

    #[test]
    fn rejects_register_outside_compressed_range() {
        let mut b = InstructionBuilder::new("c.and");
        b.add_arg("x8").add_arg("x16");
        let err = b.build().unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::RegisterNotCompressible);
    }

    #[test]
    fn rejects_missing_argument() {
        let mut b = InstructionBuilder::new("add");
        b.add_arg("x1").add_arg("x2");
        let err = b.build().unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::MissingArgument);
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        let b = InstructionBuilder::new("frobnicate");
        assert_eq!(b.build().unwrap_err().kind, BuildErrorKind::UnknownMnemonic);
    }

    #[test]
    fn ignores_extra_arguments() {
        let mut b = InstructionBuilder::new("add");
        b.add_arg("x1").add_arg("x2").add_arg("x3").add_arg("x4");
        assert!(b.build().is_ok());
    }

    #[test]
    fn resolves_pc_relative_branch() {
        let mut symbols = HashMap::new();
        symbols.insert("target".to_owned(), 16u64);
        let mut b = InstructionBuilder::new("beq");
        b.add_arg("x1").add_arg("x2").add_symbol("target", 0);
        // Branch sits at byte 4; the offset is relative to the branch
        // itself and stored in half-words: (16 - 4) / 2 = 6.
        b.resolve_symbols(&symbols, 4).unwrap();
        let inst = b.build().unwrap();
        assert_eq!(inst.args()[2].immediate(), Some(6));
    }

    #[test]
    fn resolves_absolute_for_jalr() {
        let mut symbols = HashMap::new();
        symbols.insert("func".to_owned(), 0x40_0010u64);
        let mut b = InstructionBuilder::new("jalr");
        b.add_arg("x1").add_arg("x5").add_symbol("func", 0);
        b.resolve_symbols(&symbols, 0x40_0000).unwrap();
        // jalr takes the absolute address, not a PC-relative offset, so the
        // value exceeds the 12-bit range and validation must reject it.
        assert_eq!(
            b.build().unwrap_err().kind,
            BuildErrorKind::ImmediateOutOfRange
        );
    }

    #[test]
    fn unresolved_symbol_reported() {
        let symbols = HashMap::new();
        let mut b = InstructionBuilder::new("jal");
        b.add_arg("x1").add_symbol("nowhere", 0);
        let err = b.resolve_symbols(&symbols, 0).unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::UnresolvedSymbol);
    }

    #[test]
    fn compressed_jump_offset_uses_two_byte_step() {
        let mut symbols = HashMap::new();
        symbols.insert("back".to_owned(), 0u64);
        let mut b = InstructionBuilder::new("c.j");
        b.add_symbol("back", 0);
        // c.j at byte 6: (0 - 6) / 2 = -3 half-words.
        b.resolve_symbols(&symbols, 6).unwrap();
        let inst = b.build().unwrap();
        assert_eq!(inst.args()[0].immediate(), Some(-3));
    }
}
