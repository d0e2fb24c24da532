//! The VM controller: owns memory and CPU, drives the fetch/execute loop
//! and the execution state machine.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    cpu::{Cpu, GpReg},
    interpreter,
    memory::{Layout, LayoutError, Memory, MemoryError},
    sink::{EventSink, StdioSink},
    state::{ExecuteState, VmState},
};

use rv64_asm::ParsedProgram;

/// Where the stack pointer is placed when a program is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpPos {
    /// Leave `sp` at zero.
    Zero,
    /// `sp` at the lowest stack address.
    StackBottom,
    /// `sp` one past the highest stack address (the conventional choice for
    /// a downward-growing stack).
    #[default]
    StackTop,
}

/// VM construction parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmConfig {
    /// Memory layout.
    pub layout: Layout,
    /// Initial stack pointer placement.
    pub sp_pos: SpPos,
}

/// Cloneable handle that asks a running [`Vm`] to stop between steps.
///
/// An embedder may hand this to another thread; `run_until_stop` observes
/// the flag with one-instruction granularity and parks the VM in
/// [`VmState::Stopped`].
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request a stop at the next instruction boundary.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

/// A user-mode RV64IMC virtual machine.
pub struct Vm {
    config: VmConfig,
    memory: Memory,
    cpu: Cpu,
    state: VmState,
    current_line: Option<usize>,
    exit_code: Option<i64>,
    stop: StopHandle,
    sink: Box<dyn EventSink>,
}

impl Vm {
    /// A VM with the default stdio sink. Fails if the layout is invalid.
    pub fn new(config: VmConfig) -> Result<Self, LayoutError> {
        Self::with_sink(config, Box::new(StdioSink))
    }

    /// A VM reporting through the given sink.
    pub fn with_sink(
        config: VmConfig,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, LayoutError> {
        config.layout.validate()?;
        Ok(Self {
            memory: Memory::new(config.layout.clone()),
            cpu: Cpu::new(),
            state: VmState::Initializing,
            current_line: None,
            exit_code: None,
            stop: StopHandle::default(),
            sink,
            config,
        })
    }

    /// Replace the event sink.
    pub fn set_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sink = sink;
    }

    /// A handle other threads can use to interrupt `run_until_stop`.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Load a parsed program: copy its bytecode into memory, point the PC
    /// at the first instruction and place the stack pointer.
    pub fn load_program(&mut self, program: &ParsedProgram) {
        if let Err(err) = self.memory.load_program(program) {
            self.sink.error(&err.to_string());
            self.state = VmState::Error;
            return;
        }
        let layout = self.memory.layout();
        let sp = match self.config.sp_pos {
            SpPos::Zero => 0,
            SpPos::StackBottom => layout.stack_base,
            SpPos::StackTop => layout.stack_base + layout.stack_size,
        };
        self.cpu.set_pc(layout.data_base);
        self.cpu.write(rv64_asm::Reg::SP, sp);
        self.current_line = self
            .memory
            .instruction_at(self.cpu.pc())
            .ok()
            .map(|(_, line)| line);
        self.state = VmState::Loaded;
        tracing::debug!(pc = self.cpu.pc(), sp, "program loaded");
    }

    /// Fetch, advance the PC, execute, and settle the next state.
    pub fn run_step(&mut self) {
        debug_assert!(matches!(
            self.state,
            VmState::Loaded | VmState::Running | VmState::Stopped | VmState::Breakpoint
        ));
        self.state = VmState::Running;
        self.cpu.snapshot();

        let inst = match self.memory.instruction_at(self.cpu.pc()) {
            Ok((inst, _)) => inst,
            Err(MemoryError::ProgramExit) => {
                self.state = VmState::Finished;
                return;
            }
            Err(err) => {
                self.sink.error(&err.to_string());
                self.state = VmState::Error;
                return;
            }
        };

        self.cpu.move_pc(inst.byte_size() as i64);
        match interpreter::execute(&inst, &mut self.cpu, &mut self.memory, self.sink.as_mut())
        {
            Ok(ExecuteState::Proceed) => {}
            Ok(ExecuteState::Breakpoint) => self.state = VmState::Breakpoint,
            Ok(ExecuteState::Terminate(code)) => self.terminate(code),
            Err(err) => {
                self.sink.error(&err.to_string());
                self.state = VmState::Error;
            }
        }

        // Track the source line of the next instruction for the embedder's
        // line indicator and for breakpoint checks.
        self.current_line = self
            .memory
            .instruction_at(self.cpu.pc())
            .ok()
            .map(|(_, line)| line);

        if self.state == VmState::Running {
            if self.cpu.pc() >= self.memory.instruction_end_addr() {
                self.state = VmState::Finished;
            } else if self
                .current_line
                .is_some_and(|line| self.cpu.has_breakpoint(line))
            {
                self.state = VmState::Breakpoint;
            }
        }
    }

    /// Step until the state machine leaves `Running`, observing the stop
    /// flag between steps.
    pub fn run_until_stop(&mut self) {
        loop {
            if self.stop.take() {
                self.state = VmState::Stopped;
                tracing::debug!("stop requested");
                return;
            }
            self.run_step();
            if self.state != VmState::Running {
                return;
            }
        }
    }

    /// Finish execution with an exit code.
    pub fn terminate(&mut self, exit_code: i64) {
        self.state = VmState::Finished;
        self.exit_code = Some(exit_code);
        self.sink
            .info(&format!("Program terminated with exit code {exit_code}"));
    }

    /// Park the VM in the error state.
    pub fn error_stop(&mut self) {
        self.state = VmState::Error;
    }

    /// Rebuild memory and CPU, preserving the layout and breakpoints.
    pub fn reset(&mut self) {
        self.memory = Memory::new(self.config.layout.clone());
        self.cpu.reset();
        self.state = VmState::Initializing;
        self.current_line = None;
        self.exit_code = None;
        tracing::debug!("vm reset");
    }

    /// Toggle a breakpoint on a source line; `true` if it is now set.
    pub fn toggle_breakpoint(&mut self, line: usize) -> bool {
        let had = self.cpu.has_breakpoint(line);
        self.cpu.set_breakpoint(line, !had);
        !had
    }

    /// Whether the line carries a breakpoint.
    pub fn has_breakpoint(&self, line: usize) -> bool {
        self.cpu.has_breakpoint(line)
    }

    /// Remove all breakpoints.
    pub fn clear_breakpoints(&mut self) {
        self.cpu.clear_breakpoints();
    }

    /// Current execution state.
    pub const fn state(&self) -> VmState {
        self.state
    }

    /// Source line of the next instruction to execute, if any.
    pub const fn current_line(&self) -> Option<usize> {
        self.current_line
    }

    /// The exit code, once the program terminated through `ecall`.
    pub const fn exit_code(&self) -> Option<i64> {
        self.exit_code
    }

    /// View of general purpose register `index`.
    pub fn reg(&self, index: usize) -> GpReg {
        self.cpu.reg(index)
    }

    /// The processor.
    pub const fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The memory subsystem.
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable access to the memory subsystem.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// The configuration the VM was built with.
    pub const fn config(&self) -> &VmConfig {
        &self.config
    }
}

impl core::fmt::Debug for Vm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Vm")
            .field("state", &self.state)
            .field("pc", &self.cpu.pc())
            .field("current_line", &self.current_line)
            .finish_non_exhaustive()
    }
}
