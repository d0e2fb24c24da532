//! The `ecall` ABI: a0 selects the syscall, a1 carries the argument.
//!
//! The code assignments are compatible with the Venus simulator.

use super::ExecError;
use crate::{cpu::Cpu, memory::Memory, sink::EventSink, state::ExecuteState};

use rv64_asm::Reg;

pub(super) fn ecall(
    cpu: &mut Cpu,
    mem: &mut Memory,
    sink: &mut dyn EventSink,
) -> Result<ExecuteState, ExecError> {
    let code = cpu.sread(Reg::A0);
    let a1 = cpu.read(Reg::A1);

    match code {
        // Print integer.
        1 => sink.output(&(a1 as i64).to_string()),
        // Print NUL-terminated string at a1.
        4 => {
            let text = mem.load_string(a1)?;
            sink.output(&text);
        }
        // a0 <- sbrk(a1).
        9 => {
            let old_brk = mem.sbrk(a1 as i64)?;
            cpu.write(Reg::A0, old_brk);
        }
        // Exit with code 0.
        10 => return Ok(ExecuteState::Terminate(0)),
        // Print the low byte of a1 as an ASCII character.
        11 => sink.output(&((a1 & 0xFF) as u8 as char).to_string()),
        // Exit with code a1.
        17 => return Ok(ExecuteState::Terminate(a1 as i64)),
        other => sink.warning(&format!("Unsupported ecall code: {other}")),
    }
    Ok(ExecuteState::Proceed)
}
