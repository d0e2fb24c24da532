//! Event reporting seam between the core and its embedder.
//!
//! The five hook points the GUI, CLI and tests care about. The VM owns one
//! sink as a trait object; embedders swap it at any time with
//! [`crate::Vm::set_sink`].

/// Receiver for everything the simulated program and the VM want to tell
/// the user.
pub trait EventSink {
    /// Program output (`ecall` print syscalls).
    fn output(&mut self, msg: &str);

    /// Informational messages, e.g. program termination.
    fn info(&mut self, msg: &str);

    /// Something suspicious the VM carried on past.
    fn warning(&mut self, msg: &str);

    /// No-effect instruction diagnostics; purely advisory.
    fn hint(&mut self, msg: &str);

    /// Errors that stop execution.
    fn error(&mut self, msg: &str);
}

/// Default sink: output and info to stdout, warnings and errors to stderr,
/// hints dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioSink;

impl EventSink for StdioSink {
    fn output(&mut self, msg: &str) {
        println!("{msg}");
    }

    fn info(&mut self, msg: &str) {
        println!("[INFO] {msg}");
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("[WARNING] {msg}");
    }

    fn hint(&mut self, _msg: &str) {}

    fn error(&mut self, msg: &str) {
        eprintln!("[ERROR] {msg}");
    }
}

/// A sink that records every event, for tests and embedders that render
/// output themselves.
///
/// Clones share one buffer, so a copy kept by the embedder still sees
/// everything the VM-owned copy records.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    inner: std::sync::Arc<std::sync::Mutex<Events>>,
}

#[derive(Debug, Default)]
struct Events {
    outputs: Vec<String>,
    infos: Vec<String>,
    warnings: Vec<String>,
    hints: Vec<String>,
    errors: Vec<String>,
}

impl RecordingSink {
    fn lock(&self) -> std::sync::MutexGuard<'_, Events> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Program output, one entry per `output` call.
    pub fn outputs(&self) -> Vec<String> {
        self.lock().outputs.clone()
    }

    /// Program output concatenated in order.
    pub fn stdout(&self) -> String {
        self.lock().outputs.concat()
    }

    /// Informational messages.
    pub fn infos(&self) -> Vec<String> {
        self.lock().infos.clone()
    }

    /// Warnings.
    pub fn warnings(&self) -> Vec<String> {
        self.lock().warnings.clone()
    }

    /// Hints.
    pub fn hints(&self) -> Vec<String> {
        self.lock().hints.clone()
    }

    /// Errors.
    pub fn errors(&self) -> Vec<String> {
        self.lock().errors.clone()
    }
}

impl EventSink for RecordingSink {
    fn output(&mut self, msg: &str) {
        self.lock().outputs.push(msg.to_owned());
    }

    fn info(&mut self, msg: &str) {
        self.lock().infos.push(msg.to_owned());
    }

    fn warning(&mut self, msg: &str) {
        self.lock().warnings.push(msg.to_owned());
    }

    fn hint(&mut self, msg: &str) {
        self.lock().hints.push(msg.to_owned());
    }

    fn error(&mut self, msg: &str) {
        self.lock().errors.push(msg.to_owned());
    }
}
