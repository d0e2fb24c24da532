//! Handlers for the compressed instructions that carry extra operand
//! constraints or alias onto other instructions.

use super::{constraint, effective_addr, imm_at, reg_at, ExecError};
use crate::{cpu::Cpu, memory::Memory, sink::EventSink, state::ExecuteState};

use rv64_asm::{Instruction, Opcode, Reg};

/// Stack-pointer-relative loads and stores (CI/CSS formats). The 6-bit
/// offset is scaled by the access width.
pub(super) fn sp_relative(
    inst: &Instruction,
    cpu: &mut Cpu,
    mem: &mut Memory,
) -> Result<(), ExecError> {
    let reg = reg_at(inst, 0);
    let imm = imm_at(inst, 1);
    match inst.op() {
        Opcode::CLwsp => {
            if reg.index() == 0 {
                return Err(constraint("destination register cannot be x0 in c.lwsp instruction"));
            }
            let v: i32 = mem.load(effective_addr(cpu, Reg::SP, imm << 2))?;
            cpu.write_i64(reg, v as i64);
        }
        Opcode::CLdsp => {
            if reg.index() == 0 {
                return Err(constraint("destination register cannot be x0 in c.ldsp instruction"));
            }
            let v: i64 = mem.load(effective_addr(cpu, Reg::SP, imm << 3))?;
            cpu.write_i64(reg, v);
        }
        Opcode::CSwsp => {
            mem.store::<u32>(effective_addr(cpu, Reg::SP, imm << 2), cpu.read_u32(reg))?;
        }
        Opcode::CSdsp => {
            mem.store::<u64>(effective_addr(cpu, Reg::SP, imm << 3), cpu.read(reg))?;
        }
        _ => unreachable!("not an sp-relative compressed op"),
    }
    Ok(())
}

/// Register-relative compressed loads and stores (CL/CS formats) with a
/// 5-bit scaled offset.
pub(super) fn reg_relative(
    inst: &Instruction,
    cpu: &mut Cpu,
    mem: &mut Memory,
) -> Result<(), ExecError> {
    let imm = imm_at(inst, 2);
    match inst.op() {
        Opcode::CLw => {
            let (rd, rs1) = (reg_at(inst, 0), reg_at(inst, 1));
            let v: i32 = mem.load(effective_addr(cpu, rs1, imm << 2))?;
            cpu.write_i64(rd, v as i64);
        }
        Opcode::CLd => {
            let (rd, rs1) = (reg_at(inst, 0), reg_at(inst, 1));
            let v: i64 = mem.load(effective_addr(cpu, rs1, imm << 3))?;
            cpu.write_i64(rd, v);
        }
        Opcode::CSw => {
            let (rs2, rs1) = (reg_at(inst, 0), reg_at(inst, 1));
            mem.store::<u32>(effective_addr(cpu, rs1, imm << 2), cpu.read_u32(rs2))?;
        }
        Opcode::CSd => {
            let (rs2, rs1) = (reg_at(inst, 0), reg_at(inst, 1));
            mem.store::<u64>(effective_addr(cpu, rs1, imm << 3), cpu.read(rs2))?;
        }
        _ => unreachable!("not a register-relative compressed op"),
    }
    Ok(())
}

/// `c.jr`: jump to the address in `rs1`, which must not be x0.
pub(super) fn c_jr(rs1: Reg, cpu: &mut Cpu) -> Result<(), ExecError> {
    if rs1.index() == 0 {
        return Err(constraint("register cannot be x0 in c.jr"));
    }
    cpu.set_pc(cpu.read(rs1));
    Ok(())
}

/// `c.jalr`: link into `ra` and jump; `rs1 = x0` is the `ebreak` encoding.
pub(super) fn c_jalr(rs1: Reg, cpu: &mut Cpu) -> Result<ExecuteState, ExecError> {
    if rs1.index() == 0 {
        return Ok(ExecuteState::Breakpoint);
    }
    cpu.write(Reg::RA, cpu.pc());
    cpu.set_pc(cpu.read(rs1));
    Ok(ExecuteState::Proceed)
}

/// `c.lui`: load a nonzero upper immediate; `rd = x2` disambiguates to
/// `c.addi16sp`.
pub(super) fn c_lui(
    rd: Reg,
    imm: i64,
    cpu: &mut Cpu,
    sink: &mut dyn EventSink,
) -> Result<(), ExecError> {
    if rd.index() == 0 {
        sink.hint("Loading immediate into x0 has no effect.");
    } else if rd.index() == 2 {
        return c_addi16sp(rd, imm, cpu, sink);
    }
    if imm == 0 {
        return Err(constraint("immediate cannot be zero in c.lui instruction"));
    }
    cpu.write_i64(rd, imm << 12);
    Ok(())
}

/// `c.addi16sp`: adjust the stack pointer by `imm * 16`; any other rd is
/// the `c.lui` encoding.
pub(super) fn c_addi16sp(
    rd: Reg,
    imm: i64,
    cpu: &mut Cpu,
    sink: &mut dyn EventSink,
) -> Result<(), ExecError> {
    if imm == 0 {
        return Err(constraint("immediate cannot be zero in c.addi16sp instruction"));
    }
    if rd.index() != 2 {
        return c_lui(rd, imm, cpu, sink);
    }
    cpu.write_i64(Reg::SP, cpu.sread(Reg::SP).wrapping_add(imm << 4));
    Ok(())
}

/// The compressed shifts: zero shift amounts and x0 destinations are
/// no-effect hints, not errors.
pub(super) fn c_shift(
    inst: &Instruction,
    cpu: &mut Cpu,
    sink: &mut dyn EventSink,
    f: impl FnOnce(u64, u32) -> u64,
) {
    let rd = reg_at(inst, 0);
    let amt = imm_at(inst, 1) as u32;
    if amt == 0 {
        sink.hint("Shifting by zero has no effect.");
        return;
    }
    if rd.index() == 0 {
        sink.hint("Shifting zero register has no effect.");
        return;
    }
    cpu.write(rd, f(cpu.read(rd), amt));
}

/// `c.mv`: copy `rs2` into `rd`; `rs2 = x0` is the `c.jr` encoding.
pub(super) fn c_mv(
    inst: &Instruction,
    cpu: &mut Cpu,
    sink: &mut dyn EventSink,
) -> Result<ExecuteState, ExecError> {
    let (rd, rs2) = (reg_at(inst, 0), reg_at(inst, 1));
    if rs2.index() == 0 {
        c_jr(rd, cpu)?;
        return Ok(ExecuteState::Proceed);
    }
    if rd.index() == 0 {
        sink.hint("Moving to zero register has no effect.");
        return Ok(ExecuteState::Proceed);
    }
    cpu.write(rd, cpu.read(rs2));
    Ok(ExecuteState::Proceed)
}

/// `c.add`: accumulate `rs2` into `rd`; `rs2 = x0` is the `c.jalr`
/// encoding.
pub(super) fn c_add(
    inst: &Instruction,
    cpu: &mut Cpu,
    sink: &mut dyn EventSink,
) -> Result<ExecuteState, ExecError> {
    let (rd, rs2) = (reg_at(inst, 0), reg_at(inst, 1));
    if rs2.index() == 0 {
        return c_jalr(rd, cpu);
    }
    if rd.index() == 0 {
        sink.hint("Adding to zero register has no effect.");
        return Ok(ExecuteState::Proceed);
    }
    cpu.write_i64(rd, cpu.sread(rd).wrapping_add(cpu.sread(rs2)));
    Ok(ExecuteState::Proceed)
}
