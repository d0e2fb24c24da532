//! A resolved, validated instruction.

use crate::{InstArg, InstProto, Opcode};

use core::fmt;

/// One decoded instruction: an opcode plus its validated arguments.
///
/// Only [`InstructionBuilder::build`](crate::InstructionBuilder::build)
/// constructs these, so an `Instruction` always satisfies its prototype's
/// argument signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    op: Opcode,
    args: [InstArg; 3],
}

impl Instruction {
    pub(crate) const fn new(op: Opcode, args: [InstArg; 3]) -> Self {
        Self { op, args }
    }

    /// The opcode.
    pub const fn op(&self) -> Opcode {
        self.op
    }

    /// The argument slots, in assembly order.
    pub const fn args(&self) -> &[InstArg; 3] {
        &self.args
    }

    /// The catalog prototype for this instruction.
    pub const fn proto(&self) -> InstProto {
        self.op.proto()
    }

    /// Encoded size in bytes: 2 for compressed, 4 otherwise.
    pub const fn byte_size(&self) -> u64 {
        self.op.byte_size()
    }

    /// Whether this is a 16-bit compressed instruction.
    pub const fn is_compressed(&self) -> bool {
        self.op.is_compressed()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op.mnemonic())?;
        let mut first = true;
        for arg in &self.args {
            match arg {
                InstArg::None => break,
                InstArg::Reg(r) => {
                    write!(f, "{}{}", if first { " " } else { ", " }, r)?
                }
                imm => write!(
                    f,
                    "{}{}",
                    if first { " " } else { ", " },
                    imm.immediate().unwrap_or_default()
                )?,
            }
            first = false;
        }
        Ok(())
    }
}
