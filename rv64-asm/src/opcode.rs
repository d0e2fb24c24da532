//! The RV64IMC instruction catalog.
//!
//! One macro invocation is the single source of truth for every supported
//! mnemonic: it generates the [`Opcode`] enum (discriminant = stable id),
//! the mnemonic and argument-signature accessors, and the id lookup. The
//! three extensions occupy disjoint id ranges so an id alone identifies its
//! extension.

use crate::ArgKind;

use hashbrown::HashMap;
use std::sync::OnceLock;
use strum::IntoEnumIterator;

/// First id of the base integer set.
pub const BASE_ID_I: i32 = 100;
/// First id of the M extension.
pub const BASE_ID_M: i32 = 200;
/// First id of the C extension.
pub const BASE_ID_C: i32 = 300;

/// The instruction-set extension an opcode belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// Base 64-bit integer instructions.
    I,
    /// Integer multiplication and division.
    M,
    /// Compressed 16-bit instructions.
    C,
}

macro_rules! kinds3 {
    () => {
        [ArgKind::None, ArgKind::None, ArgKind::None]
    };
    ($a:ident) => {
        [ArgKind::$a, ArgKind::None, ArgKind::None]
    };
    ($a:ident $b:ident) => {
        [ArgKind::$a, ArgKind::$b, ArgKind::None]
    };
    ($a:ident $b:ident $c:ident) => {
        [ArgKind::$a, ArgKind::$b, ArgKind::$c]
    };
}

macro_rules! impl_opcodes {
    ($($doc:literal $id:literal $Op:ident $mnemonic:literal [$($kind:ident)*])+) => {
        /// One catalog entry per supported RV64IMC mnemonic.
        ///
        /// The discriminant is the stable catalog id; ids are contiguous per
        /// extension and the three ranges never overlap.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(i32)]
        pub enum Opcode {
            $(
                #[doc = $doc]
                $Op = $id,
            )+
        }

        impl Opcode {
            /// The lowercase textual mnemonic.
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(Self::$Op => $mnemonic,)+
                }
            }

            /// Declared argument kinds, padded with [`ArgKind::None`].
            pub const fn arg_kinds(self) -> [ArgKind; 3] {
                match self {
                    $(Self::$Op => kinds3!($($kind)*),)+
                }
            }

            /// Look an opcode up by its stable catalog id.
            pub fn from_id(id: i32) -> Option<Self> {
                match id {
                    $($id => Some(Self::$Op),)+
                    _ => None,
                }
            }
        }
    };
}

impl_opcodes! {
    "Add immediate: `rd = rs1 + imm12`."
    100 Addi "addi" [IntReg IntReg Imm12]
    "Set if less than, signed: `rd = (rs1 < rs2) ? 1 : 0`."
    101 Slt "slt" [IntReg IntReg IntReg]
    "Set if less than, unsigned."
    102 Sltu "sltu" [IntReg IntReg IntReg]
    "Set if less than immediate, signed."
    103 Slti "slti" [IntReg IntReg Imm12]
    "Set if less than immediate, unsigned; the immediate is sign-extended first."
    104 Sltiu "sltiu" [IntReg IntReg UImm12]
    "AND immediate."
    105 Andi "andi" [IntReg IntReg Imm12]
    "OR immediate."
    106 Ori "ori" [IntReg IntReg Imm12]
    "XOR immediate."
    107 Xori "xori" [IntReg IntReg Imm12]
    "Shift left logical by immediate (6-bit shamt)."
    108 Slli "slli" [IntReg IntReg UImm6]
    "Shift right logical by immediate (6-bit shamt)."
    109 Srli "srli" [IntReg IntReg UImm6]
    "Shift right arithmetic by immediate (6-bit shamt)."
    110 Srai "srai" [IntReg IntReg UImm6]
    "Load upper immediate: `rd = sext(imm20 << 12)`."
    111 Lui "lui" [IntReg UImm20]
    "Add upper immediate to PC: `rd = pc + sext(imm20 << 12)`."
    112 Auipc "auipc" [IntReg UImm20]
    "Add: `rd = rs1 + rs2`."
    113 Add "add" [IntReg IntReg IntReg]
    "Subtract: `rd = rs1 - rs2`."
    114 Sub "sub" [IntReg IntReg IntReg]
    "Bitwise AND."
    115 And "and" [IntReg IntReg IntReg]
    "Bitwise OR."
    116 Or "or" [IntReg IntReg IntReg]
    "Bitwise XOR."
    117 Xor "xor" [IntReg IntReg IntReg]
    "Shift left logical by `rs2[5:0]`."
    118 Sll "sll" [IntReg IntReg IntReg]
    "Shift right logical by `rs2[5:0]`."
    119 Srl "srl" [IntReg IntReg IntReg]
    "Shift right arithmetic by `rs2[5:0]`."
    120 Sra "sra" [IntReg IntReg IntReg]
    "Jump and link: `rd = pc + 4; pc += offset`."
    121 Jal "jal" [IntReg Imm20]
    "Jump and link register: `rd = pc + 4; pc = (rs1 + imm12) & !1`."
    122 Jalr "jalr" [IntReg IntReg Imm12]
    "Branch if equal."
    123 Beq "beq" [IntReg IntReg Imm12]
    "Branch if not equal."
    124 Bne "bne" [IntReg IntReg Imm12]
    "Branch if less than, signed."
    125 Blt "blt" [IntReg IntReg Imm12]
    "Branch if greater or equal, signed."
    126 Bge "bge" [IntReg IntReg Imm12]
    "Branch if less than, unsigned."
    127 Bltu "bltu" [IntReg IntReg Imm12]
    "Branch if greater or equal, unsigned."
    128 Bgeu "bgeu" [IntReg IntReg Imm12]
    "Load 32-bit word, sign-extended."
    129 Lw "lw" [IntReg IntReg Imm12]
    "Load 16-bit halfword, sign-extended."
    130 Lh "lh" [IntReg IntReg Imm12]
    "Load 16-bit halfword, zero-extended."
    131 Lhu "lhu" [IntReg IntReg Imm12]
    "Load byte, sign-extended."
    132 Lb "lb" [IntReg IntReg Imm12]
    "Load byte, zero-extended."
    133 Lbu "lbu" [IntReg IntReg Imm12]
    "Store 32-bit word."
    134 Sw "sw" [IntReg IntReg Imm12]
    "Store 16-bit halfword."
    135 Sh "sh" [IntReg IntReg Imm12]
    "Store byte."
    136 Sb "sb" [IntReg IntReg Imm12]
    "Memory fence; a no-op on this single-threaded machine."
    137 Fence "fence" []
    "Environment call."
    138 Ecall "ecall" []
    "Breakpoint trap."
    139 Ebreak "ebreak" []
    "Add immediate on the low 32 bits, sign-extending the result."
    140 Addiw "addiw" [IntReg IntReg Imm12]
    "Word shift left logical by immediate (5-bit shamt)."
    141 Slliw "slliw" [IntReg IntReg UImm5]
    "Word shift right logical by immediate (5-bit shamt)."
    142 Srliw "srliw" [IntReg IntReg UImm5]
    "Word shift right arithmetic by immediate (5-bit shamt)."
    143 Sraiw "sraiw" [IntReg IntReg UImm5]
    "Word shift left logical by `rs2[4:0]`."
    144 Sllw "sllw" [IntReg IntReg IntReg]
    "Word shift right logical by `rs2[4:0]`."
    145 Srlw "srlw" [IntReg IntReg IntReg]
    "Word shift right arithmetic by `rs2[4:0]`."
    146 Sraw "sraw" [IntReg IntReg IntReg]
    "Add the low 32 bits, sign-extending the result."
    147 Addw "addw" [IntReg IntReg IntReg]
    "Subtract the low 32 bits, sign-extending the result."
    148 Subw "subw" [IntReg IntReg IntReg]
    "Load 64-bit doubleword."
    149 Ld "ld" [IntReg IntReg Imm12]
    "Load 32-bit word, zero-extended."
    150 Lwu "lwu" [IntReg IntReg Imm12]
    "Store 64-bit doubleword."
    151 Sd "sd" [IntReg IntReg Imm12]
    "No operation; encodes as `addi x0, x0, 0`."
    152 Nop "nop" []

    "Multiply, low 64 bits."
    200 Mul "mul" [IntReg IntReg IntReg]
    "Multiply, high 64 bits of the signed 128-bit product."
    201 Mulh "mulh" [IntReg IntReg IntReg]
    "Multiply, high 64 bits of the unsigned 128-bit product."
    202 Mulhu "mulhu" [IntReg IntReg IntReg]
    "Multiply signed by unsigned, high 64 bits."
    203 Mulhsu "mulhsu" [IntReg IntReg IntReg]
    "Multiply the low 32 bits, sign-extending the result."
    204 Mulw "mulw" [IntReg IntReg IntReg]
    "Divide, signed."
    205 Div "div" [IntReg IntReg IntReg]
    "Divide, unsigned."
    206 Divu "divu" [IntReg IntReg IntReg]
    "Remainder, signed."
    207 Rem "rem" [IntReg IntReg IntReg]
    "Remainder, unsigned."
    208 Remu "remu" [IntReg IntReg IntReg]
    "Word divide, signed."
    209 Divw "divw" [IntReg IntReg IntReg]
    "Word divide, unsigned."
    210 Divuw "divuw" [IntReg IntReg IntReg]
    "Word remainder, signed."
    211 Remw "remw" [IntReg IntReg IntReg]
    "Word remainder, unsigned."
    212 Remuw "remuw" [IntReg IntReg IntReg]

    "Load word from `sp + imm6*4`."
    300 CLwsp "c.lwsp" [IntReg Imm6]
    "Load doubleword from `sp + imm6*8`."
    301 CLdsp "c.ldsp" [IntReg Imm6]
    "Store word at `sp + imm6*4`."
    302 CSwsp "c.swsp" [IntReg Imm6]
    "Store doubleword at `sp + imm6*8`."
    303 CSdsp "c.sdsp" [IntReg Imm6]
    "Load word from `rs1' + imm5*4`."
    304 CLw "c.lw" [IntRegP IntRegP Imm5]
    "Load doubleword from `rs1' + imm5*8`."
    305 CLd "c.ld" [IntRegP IntRegP Imm5]
    "Store word at `rs1' + imm5*4`."
    306 CSw "c.sw" [IntRegP IntRegP Imm5]
    "Store doubleword at `rs1' + imm5*8`."
    307 CSd "c.sd" [IntRegP IntRegP Imm5]
    "Unconditional jump, PC-relative."
    308 CJ "c.j" [Imm11]
    "Jump to the address in `rs1`."
    309 CJr "c.jr" [IntReg]
    "Jump to `rs1`, linking into `ra`; `rs1 = x0` is `ebreak`."
    310 CJalr "c.jalr" [IntReg]
    "Branch if `rs1'` is zero."
    311 CBeqz "c.beqz" [IntRegP Imm8]
    "Branch if `rs1'` is not zero."
    312 CBnez "c.bnez" [IntRegP Imm8]
    "Load a 6-bit immediate."
    313 CLi "c.li" [IntReg Imm6]
    "Load upper immediate; `rd = x2` means `c.addi16sp`."
    314 CLui "c.lui" [IntReg Imm6]
    "Add a nonzero 6-bit immediate."
    315 CAddi "c.addi" [IntReg Imm6]
    "Word add of a 6-bit immediate, sign-extending the result."
    316 CAddiw "c.addiw" [IntReg Imm6]
    "Add `imm6*16` to the stack pointer."
    317 CAddi16sp "c.addi16sp" [IntReg Imm6]
    "Add `uimm8*4` to the stack pointer into `rd'`."
    318 CAddi4spn "c.addi4spn" [IntRegP UImm8]
    "Shift left logical by a nonzero immediate."
    319 CSlli "c.slli" [IntReg UImm6]
    "Shift right logical by a nonzero immediate."
    320 CSrli "c.srli" [IntRegP UImm6]
    "Shift right arithmetic by a nonzero immediate."
    321 CSrai "c.srai" [IntRegP UImm6]
    "AND immediate."
    322 CAndi "c.andi" [IntRegP Imm6]
    "Copy register; `rs2 = x0` is `c.jr`."
    323 CMv "c.mv" [IntReg IntReg]
    "Add registers; `rs2 = x0` is `c.jalr`."
    324 CAdd "c.add" [IntReg IntReg]
    "Bitwise AND of compressed-range registers."
    325 CAnd "c.and" [IntRegP IntRegP]
    "Bitwise OR of compressed-range registers."
    326 COr "c.or" [IntRegP IntRegP]
    "Bitwise XOR of compressed-range registers."
    327 CXor "c.xor" [IntRegP IntRegP]
    "Subtract compressed-range registers."
    328 CSub "c.sub" [IntRegP IntRegP]
    "Word add of compressed-range registers."
    329 CAddw "c.addw" [IntRegP IntRegP]
    "Word subtract of compressed-range registers."
    330 CSubw "c.subw" [IntRegP IntRegP]
    "No operation; encodes as `c.addi x0, 0`."
    331 CNop "c.nop" []
}

/// An instruction prototype: mnemonic, declared argument kinds and the
/// catalog id that identifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstProto {
    /// Lowercase mnemonic.
    pub mnemonic: &'static str,
    /// Argument kinds in assembly order, padded with [`ArgKind::None`].
    pub args: [ArgKind; 3],
    /// The opcode this prototype describes.
    pub op: Opcode,
}

impl InstProto {
    /// Number of declared arguments.
    pub fn arg_count(&self) -> usize {
        self.args.iter().filter(|k| **k != ArgKind::None).count()
    }
}

impl Opcode {
    /// Stable catalog id.
    pub const fn id(self) -> i32 {
        self as i32
    }

    /// The full prototype for this opcode.
    pub const fn proto(self) -> InstProto {
        InstProto {
            mnemonic: self.mnemonic(),
            args: self.arg_kinds(),
            op: self,
        }
    }

    /// The extension this opcode belongs to.
    pub const fn extension(self) -> Extension {
        let id = self as i32;
        if id >= BASE_ID_C {
            Extension::C
        } else if id >= BASE_ID_M {
            Extension::M
        } else {
            Extension::I
        }
    }

    /// Whether this is a 16-bit compressed instruction.
    pub const fn is_compressed(self) -> bool {
        matches!(self.extension(), Extension::C)
    }

    /// Encoded size in bytes: 2 for compressed, 4 otherwise.
    pub const fn byte_size(self) -> u64 {
        if self.is_compressed() {
            2
        } else {
            4
        }
    }

    /// The six conditional branches of the base set.
    pub const fn is_cond_branch(self) -> bool {
        matches!(
            self,
            Self::Beq | Self::Bne | Self::Blt | Self::Bge | Self::Bltu | Self::Bgeu
        )
    }

    /// Mnemonics whose label operands resolve PC-relative (stored as
    /// half-word offsets); everything else takes absolute addresses.
    pub const fn is_pc_relative(self) -> bool {
        self.is_cond_branch()
            || matches!(self, Self::Jal | Self::CJ | Self::CBeqz | Self::CBnez)
    }

    /// Case-insensitive lookup by mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        static MAP: OnceLock<HashMap<&'static str, Opcode>> = OnceLock::new();
        let map = MAP.get_or_init(|| {
            Opcode::iter().map(|op| (op.mnemonic(), op)).collect()
        });
        if mnemonic.chars().any(|c| c.is_ascii_uppercase()) {
            map.get(mnemonic.to_ascii_lowercase().as_str()).copied()
        } else {
            map.get(mnemonic).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_partitions() {
        let count = |ext| Opcode::iter().filter(|op| op.extension() == ext).count();
        assert_eq!(count(Extension::I), 53);
        assert_eq!(count(Extension::M), 13);
        assert_eq!(count(Extension::C), 32);
    }

    #[test]
    fn ids_are_unique_and_contiguous_per_extension() {
        let mut base: Vec<i32> = Opcode::iter()
            .filter(|op| op.extension() == Extension::I)
            .map(Opcode::id)
            .collect();
        base.sort_unstable();
        assert_eq!(base.first(), Some(&BASE_ID_I));
        assert!(base.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn mnemonic_lookup() {
        assert_eq!(Opcode::from_mnemonic("add"), Some(Opcode::Add));
        assert_eq!(Opcode::from_mnemonic("ADD"), Some(Opcode::Add));
        assert_eq!(Opcode::from_mnemonic("C.Addi16SP"), Some(Opcode::CAddi16sp));
        assert_eq!(Opcode::from_mnemonic("mv"), None);
        assert_eq!(Opcode::from_mnemonic(""), None);
    }

    #[test]
    fn id_round_trip() {
        for op in Opcode::iter() {
            assert_eq!(Opcode::from_id(op.id()), Some(op));
        }
        assert_eq!(Opcode::from_id(-1), None);
        assert_eq!(Opcode::from_id(0), None);
        assert_eq!(Opcode::from_id(999), None);
    }

    #[test]
    fn byte_sizes() {
        assert_eq!(Opcode::Add.byte_size(), 4);
        assert_eq!(Opcode::CAdd.byte_size(), 2);
        assert!(Opcode::CNop.is_compressed());
        assert!(!Opcode::Nop.is_compressed());
    }

    #[test]
    fn pc_relative_set() {
        for op in [
            Opcode::Beq,
            Opcode::Bne,
            Opcode::Blt,
            Opcode::Bge,
            Opcode::Bltu,
            Opcode::Bgeu,
            Opcode::Jal,
            Opcode::CJ,
            Opcode::CBeqz,
            Opcode::CBnez,
        ] {
            assert!(op.is_pc_relative());
        }
        assert!(!Opcode::Jalr.is_pc_relative());
        assert!(!Opcode::CJr.is_pc_relative());
        assert!(!Opcode::CJalr.is_pc_relative());
    }
}
