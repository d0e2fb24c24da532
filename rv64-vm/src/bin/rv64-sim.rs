//! Minimal CLI stepper: assemble standard input, then execute instruction
//! by instruction, dumping the register file after every step.

use std::io::Read;
use std::process::ExitCode;

use rv64_vm::{Vm, VmConfig, VmState};

fn print_separator() {
    println!("{}", "-".repeat(96));
}

fn print_lines(lines: &[String], current: Option<usize>) {
    for (i, line) in lines.iter().enumerate() {
        let marker = if Some(i) == current { "> " } else { "  " };
        println!("{marker}{line}");
    }
}

fn main() -> ExitCode {
    let mut source = String::new();
    if std::io::stdin().read_to_string(&mut source).is_err() {
        eprintln!("error: stdin is not valid UTF-8");
        return ExitCode::FAILURE;
    }
    if source.trim().is_empty() {
        return ExitCode::SUCCESS;
    }
    let lines: Vec<String> = source.lines().map(str::to_owned).collect();

    let config = VmConfig::default();
    let program = match rv64_asm::parse_and_resolve(&source, config.layout.data_base) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("[ERROR] {err}");
            return ExitCode::from(err.exit_code());
        }
    };

    let mut vm = match Vm::new(config) {
        Ok(vm) => vm,
        Err(err) => {
            eprintln!("[ERROR] {err}");
            return ExitCode::FAILURE;
        }
    };
    vm.load_program(&program);

    print_separator();
    print_lines(&lines, vm.current_line());
    print_separator();
    println!("{}", vm.cpu());

    while !matches!(
        vm.state(),
        VmState::Error | VmState::Finished
    ) {
        vm.run_step();
        print_separator();
        print_lines(&lines, vm.current_line());
        print_separator();
        println!("{}", vm.cpu());
    }

    match vm.state() {
        VmState::Error => ExitCode::FAILURE,
        _ => ExitCode::from(vm.exit_code().unwrap_or(0).rem_euclid(256) as u8),
    }
}
