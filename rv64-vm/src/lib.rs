//! RV64IMC virtual machine core.
//!
//! Consumes programs assembled by [`rv64_asm`] and executes them against a
//! paged address space with observable register and memory state. The
//! [`Vm`] drives a synchronous fetch/execute loop; embedders observe it
//! through the [`EventSink`] hooks, the register and memory accessors, and
//! the [`VmState`] machine.
//!
//! ```no_run
//! use rv64_vm::{Vm, VmConfig, VmState};
//!
//! let program = rv64_asm::parse_and_resolve(
//!     "addi a0, x0, 10\necall",
//!     VmConfig::default().layout.data_base,
//! )
//! .expect("assembly is well-formed");
//!
//! let mut vm = Vm::new(VmConfig::default()).expect("default layout is valid");
//! vm.load_program(&program);
//! vm.run_until_stop();
//! assert_eq!(vm.state(), VmState::Finished);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

pub mod cpu;
pub mod interpreter;
pub mod memory;
pub mod paged;
mod sink;
mod state;
mod vm;

pub use cpu::{Cpu, GpReg, INT_REG_COUNT};
pub use interpreter::ExecError;
pub use memory::{
    Layout, LayoutError, Memory, MemoryError, DEFAULT_INITIAL_HEAP, DEFAULT_STACK_SIZE,
    PROGRAM_MEM_LIMIT,
};
pub use paged::{PagedMemory, Scalar, PAGE_SIZE};
pub use sink::{EventSink, RecordingSink, StdioSink};
pub use state::{ExecuteState, VmState};
pub use vm::{SpPos, StopHandle, Vm, VmConfig};

#[doc(no_inline)]
pub use rv64_asm;
