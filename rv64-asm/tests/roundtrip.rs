//! Encode/decode round trips over representative programs.

use rv64_asm::{
    assemble, decode_instruction, disassemble, encode_instruction, parse_and_resolve,
    Endianness, Opcode,
};

use rstest::rstest;

/// A program touching every format class of all three extensions.
const KITCHEN_SINK: &str = "\
start:
    addi x1, x0, 10
    slti x2, x1, 20
    sltiu x3, x1, 4095
    andi x4, x1, 0x0F
    slli x5, x1, 3
    srai x6, x1, 1
    lui x7, 0xFFFFF
    auipc x8, 1
    add x9, x1, x2
    sub x10, x1, x2
    sltu x11, x1, x2
    sllw x12, x1, x2
    mul x13, x1, x2
    mulhu x14, x1, x2
    divw x15, x1, x2
    remu x16, x1, x2
    lw x17, 8(sp)
    sd x17, 16(sp)
    beq x1, x2, start
    bne x1, x2, start
    jal x18, start
    jalr x0, 0(x18)
    fence
    ecall
    ebreak
    nop
";

const COMPRESSED_SINK: &str = "\
top:
    c.addi x8, 4
    c.addiw x8, -1
    c.li x9, -17
    c.lui x10, 3
    c.addi16sp sp, -2
    c.addi4spn x11, 9
    c.slli x9, 4
    c.srli x9, 1
    c.srai x9, 1
    c.andi x9, 0x0C
    c.mv x12, x9
    c.add x12, x9
    c.and x8, x9
    c.or x8, x9
    c.xor x8, x9
    c.sub x8, x9
    c.addw x8, x9
    c.subw x8, x9
    c.lwsp x13, 1
    c.ldsp x14, 2
    c.swsp x13, 1
    c.sdsp x14, 2
    c.lw x8, x9, 2
    c.ld x8, x9, 1
    c.sw x8, x9, 2
    c.sd x8, x9, 1
    c.j top
    c.beqz x8, top
    c.bnez x8, top
    c.nop
";

#[rstest]
#[case::wide(KITCHEN_SINK)]
#[case::compressed(COMPRESSED_SINK)]
fn encode_decode_encode_is_identity(#[case] src: &str) {
    for endian in [Endianness::Little, Endianness::Big] {
        let program = parse_and_resolve(src, 0).expect("program assembles");
        let bytes = assemble(&program, endian);
        let insts = disassemble(&bytes, endian).expect("bytecode decodes");
        assert_eq!(insts.len(), program.instructions().count());
        let rebuilt: Vec<u8> = insts
            .iter()
            .flat_map(|inst| encode_instruction(inst, endian).bytes().to_vec())
            .collect();
        assert_eq!(rebuilt, bytes);
    }
}

#[test]
fn decode_recovers_the_source_instructions() {
    let program = parse_and_resolve(KITCHEN_SINK, 0).unwrap();
    let bytes = assemble(&program, Endianness::Little);
    let decoded = disassemble(&bytes, Endianness::Little).unwrap();
    for ((_, original), decoded) in program.instructions().zip(&decoded) {
        match original.op() {
            // The pseudo-instruction comes back in its expanded form.
            Opcode::Nop => assert_eq!(decoded.op(), Opcode::Addi),
            op => {
                assert_eq!(decoded.op(), op);
                assert_eq!(decoded.args(), original.args());
            }
        }
    }
}

#[test]
fn decoded_sizes_match_the_slot_layout() {
    let program = parse_and_resolve(COMPRESSED_SINK, 0).unwrap();
    let bytes = assemble(&program, Endianness::Little);
    let mut offset = 0;
    for (_, inst) in program.instructions() {
        let (_, size) = decode_instruction(&bytes[offset..], Endianness::Little).unwrap();
        assert_eq!(size as u64, inst.byte_size());
        offset += size;
    }
    assert_eq!(offset, bytes.len());
}
