//! Shared harness for the behavioural suites.

#![allow(dead_code)]

use rv64_vm::{RecordingSink, Vm, VmConfig};

/// A VM wired to a recording sink the test keeps a handle on.
pub fn vm_with_sink(config: VmConfig) -> (Vm, RecordingSink) {
    let sink = RecordingSink::default();
    let vm = Vm::with_sink(config, Box::new(sink.clone())).expect("layout is valid");
    (vm, sink)
}

/// Assemble `src` against the VM's data base and load it.
pub fn load(vm: &mut Vm, src: &str) {
    let program = rv64_asm::parse_and_resolve(src, vm.config().layout.data_base)
        .expect("program assembles");
    vm.load_program(&program);
}

/// Assemble, load and run to completion on a default-layout VM.
pub fn run_program(src: &str) -> (Vm, RecordingSink) {
    let (mut vm, sink) = vm_with_sink(VmConfig::default());
    load(&mut vm, src);
    vm.run_until_stop();
    (vm, sink)
}

/// The default data base, where programs are loaded.
pub fn data_base() -> u64 {
    VmConfig::default().layout.data_base
}
