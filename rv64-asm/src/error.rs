//! Assembly pipeline errors.

/// What went wrong while lexing, parsing, resolving or validating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuildErrorKind {
    /// Mnemonic not present in the catalog.
    UnknownMnemonic,
    /// Fewer operands than the prototype declares.
    MissingArgument,
    /// A token that fits no operand grammar.
    SyntaxError,
    /// Operand is not a register name where one is required.
    InvalidRegister,
    /// Register is outside `x8..x15` where a compressed register is required.
    RegisterNotCompressible,
    /// Immediate outside the declared kind's range.
    ImmediateOutOfRange,
    /// Label defined more than once.
    DuplicateLabel,
    /// Reference to a label that was never defined.
    UnresolvedSymbol,
}

/// An error produced by the assembly pipeline, tagged with the source line
/// it originates from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct BuildError {
    /// Error category.
    pub kind: BuildErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Zero-based source line.
    pub line: usize,
}

impl BuildError {
    /// A new error with no line attribution yet.
    pub fn new(kind: BuildErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: 0,
        }
    }

    /// Attach the source line.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

/// Which pipeline stage rejected the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Lexing or parsing failed.
    #[error("parse error: {0}")]
    Parse(BuildError),
    /// A symbol reference could not be resolved.
    #[error("symbol resolution error: {0}")]
    Resolve(BuildError),
    /// Argument validation rejected an instruction.
    #[error("validation error: {0}")]
    Validate(BuildError),
}

impl PipelineError {
    /// The historical pipeline exit code: 1 for parse, 2 for resolve, 3 for
    /// validation failures (0 being success).
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Parse(_) => 1,
            Self::Resolve(_) => 2,
            Self::Validate(_) => 3,
        }
    }

    /// The underlying build error.
    pub const fn inner(&self) -> &BuildError {
        match self {
            Self::Parse(e) | Self::Resolve(e) | Self::Validate(e) => e,
        }
    }
}
