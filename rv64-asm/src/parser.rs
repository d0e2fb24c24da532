//! Two-phase parser: a first pass collects labels and instruction builders,
//! a second pass resolves symbols and validates every instruction.
//!
//! The parsed program is a vector of 2-byte slots: a 4-byte instruction
//! contributes its entry plus one padding slot, so slot index times two is
//! always the instruction's byte offset from the program base.

use crate::{
    builder::parse_immediate,
    lexer::{tokenize_line, Token, TokenKind},
    BuildError, BuildErrorKind, Instruction, InstructionBuilder, Opcode, PipelineError,
    Reg, SymbolTable,
};

/// One 2-byte slot of the parsed instruction stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramSlot {
    /// An instruction together with the source line that produced it.
    Inst {
        /// Zero-based source line.
        line: usize,
        /// The resolved instruction.
        inst: Instruction,
    },
    /// The upper half of a 4-byte instruction.
    Padding,
}

impl ProgramSlot {
    /// Whether this slot is the padding half of a wide instruction.
    pub const fn is_padding(&self) -> bool {
        matches!(self, Self::Padding)
    }
}

/// A fully resolved program: the instruction stream in 2-byte slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedProgram {
    slots: Vec<ProgramSlot>,
}

impl ParsedProgram {
    /// All slots in program order.
    pub fn slots(&self) -> &[ProgramSlot] {
        &self.slots
    }

    /// Number of 2-byte slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total encoded size in bytes.
    pub fn byte_len(&self) -> u64 {
        self.slots.len() as u64 * 2
    }

    /// The slot at the given index.
    pub fn get(&self, index: usize) -> Option<&ProgramSlot> {
        self.slots.get(index)
    }

    /// Iterate over the instructions, skipping padding.
    pub fn instructions(&self) -> impl Iterator<Item = (usize, &Instruction)> {
        self.slots.iter().filter_map(|slot| match slot {
            ProgramSlot::Inst { line, inst } => Some((*line, inst)),
            ProgramSlot::Padding => None,
        })
    }
}

#[derive(Debug, Clone)]
enum PendingSlot {
    Entry {
        line: usize,
        builder: InstructionBuilder,
    },
    Padding,
}

/// Output of the first pass: unresolved builders plus the symbol table.
#[derive(Debug, Clone, Default)]
pub struct ParsingResult {
    pending: Vec<PendingSlot>,
    /// Labels recorded during the pass.
    pub symbols: SymbolTable,
    /// First error encountered, if any.
    pub error: Option<BuildError>,
}

impl ParsingResult {
    /// Second pass: resolve symbols against `data_offset` (the load address
    /// of the program) and validate every instruction.
    pub fn resolve(&self, data_offset: u64) -> Result<ParsedProgram, PipelineError> {
        if let Some(error) = &self.error {
            return Err(PipelineError::Parse(error.clone()));
        }

        let symbols = self.symbols.export(data_offset);
        let mut current_pc = data_offset;
        let mut slots = Vec::with_capacity(self.pending.len());

        for pending in &self.pending {
            match pending {
                PendingSlot::Padding => slots.push(ProgramSlot::Padding),
                PendingSlot::Entry { line, builder } => {
                    let mut builder = builder.clone();
                    builder
                        .resolve_symbols(&symbols, current_pc)
                        .map_err(|e| PipelineError::Resolve(e.at_line(*line)))?;
                    let inst = builder
                        .build()
                        .map_err(|e| PipelineError::Validate(e.at_line(*line)))?;
                    current_pc = current_pc.wrapping_add(inst.byte_size());
                    slots.push(ProgramSlot::Inst { line: *line, inst });
                }
            }
        }

        tracing::debug!(slots = slots.len(), "program resolved");
        Ok(ParsedProgram { slots })
    }
}

/// Accumulates labels and instruction builders while the token stream is
/// walked.
#[derive(Debug, Default)]
pub struct ParserProcessor {
    params: Vec<String>,
    pending: Vec<PendingSlot>,
    symbols: SymbolTable,
    byte_offset: u64,
    error: Option<BuildError>,
}

impl ParserProcessor {
    /// A fresh processor.
    pub fn new() -> Self {
        Self::default()
    }

    fn record_error(&mut self, error: BuildError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Record a label at the current byte offset. The first definition of a
    /// duplicate wins; the error is still reported downstream.
    pub fn add_label(&mut self, name: &str, line: usize) {
        if let Err(error) = self.symbols.add_label(name, self.byte_offset) {
            self.record_error(error.at_line(line));
        }
    }

    /// Queue one operand for the instruction under construction. Operands
    /// beyond the third are dropped.
    pub fn push_param(&mut self, param: &str) {
        if self.params.len() < 3 {
            self.params.push(param.to_owned());
        }
    }

    /// Close the instruction under construction and advance the byte offset.
    ///
    /// For the six conditional branches and `jal`, a literal immediate
    /// operand in offset position is a byte offset and is stored divided by
    /// two, matching what symbol resolution produces for labels.
    pub fn push_instruction(&mut self, mnemonic: &str, line: usize) {
        let mnemonic = mnemonic.to_ascii_lowercase();
        let mut builder = InstructionBuilder::new(&mnemonic);

        let op = Opcode::from_mnemonic(&mnemonic);
        let is_cond_branch = op.is_some_and(Opcode::is_cond_branch);
        let is_jal = op == Some(Opcode::Jal);

        for (i, param) in self.params.iter().enumerate() {
            let offset_arg = (is_cond_branch && i == 2) || (is_jal && i == 1);
            if offset_arg {
                match parse_immediate(param) {
                    Some(value) => builder.add_imm(value / 2),
                    None => builder.add_symbol(param, 0),
                };
            } else if parse_immediate(param).is_some() || Reg::from_name(param).is_valid() {
                builder.add_arg(param);
            } else {
                // Neither a literal nor a register: a label reference.
                builder.add_symbol(param, 0);
            }
        }
        self.params.clear();

        self.pending.push(PendingSlot::Entry { line, builder });
        if mnemonic.starts_with("c.") {
            self.byte_offset += 2;
        } else {
            // Keep slot index aligned with 2-byte granularity.
            self.pending.push(PendingSlot::Padding);
            self.byte_offset += 4;
        }
    }

    /// Finish the first pass.
    pub fn finish(self) -> ParsingResult {
        ParsingResult {
            pending: self.pending,
            symbols: self.symbols,
            error: self.error,
        }
    }
}

/// Collect the operands following an instruction token, normalizing
/// `imm(reg)` into the register followed by the immediate.
fn collect_operands(
    processor: &mut ParserProcessor,
    tokens: &[Token],
    line: usize,
) {
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        match token.kind {
            TokenKind::Comment => break,
            TokenKind::Comma => {}
            TokenKind::Number => {
                // `imm(reg)` pushes the register first: the catalog orders
                // indexed operands as base register then displacement.
                if tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::LeftParen)
                    && tokens.get(i + 2).map(|t| t.kind) == Some(TokenKind::Identifier)
                    && tokens.get(i + 3).map(|t| t.kind) == Some(TokenKind::RightParen)
                {
                    processor.push_param(&tokens[i + 2].text);
                    processor.push_param(&token.text);
                    i += 4;
                    continue;
                }
                processor.push_param(&token.text);
            }
            TokenKind::Identifier => processor.push_param(&token.text),
            _ => {
                processor.record_error(
                    BuildError::new(
                        BuildErrorKind::SyntaxError,
                        format!("unexpected token '{}'", token.text),
                    )
                    .at_line(line),
                );
                break;
            }
        }
        i += 1;
    }
}

/// First pass: tokenize every line and collect labels, builders and the
/// first error.
pub fn parse(source: &str) -> ParsingResult {
    let mut processor = ParserProcessor::new();

    for (line_no, line) in source.lines().enumerate() {
        let tokens = tokenize_line(line);
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            match token.kind {
                TokenKind::Comment => break,
                TokenKind::Label => processor.add_label(&token.text, line_no),
                TokenKind::Directive => break,
                TokenKind::Instruction => {
                    collect_operands(&mut processor, &tokens[i + 1..], line_no);
                    processor.push_instruction(&token.text, line_no);
                    break;
                }
                _ => {
                    processor.record_error(
                        BuildError::new(
                            BuildErrorKind::SyntaxError,
                            format!("unexpected token '{}'", token.text),
                        )
                        .at_line(line_no),
                    );
                    break;
                }
            }
            i += 1;
        }
    }

    let result = processor.finish();
    tracing::debug!(
        labels = result.symbols.len(),
        error = result.error.is_some(),
        "parse pass complete"
    );
    result
}

/// Run both passes. On failure, [`PipelineError::exit_code`] distinguishes
/// parse (1), resolution (2) and validation (3) errors.
pub fn parse_and_resolve(
    source: &str,
    data_offset: u64,
) -> Result<ParsedProgram, PipelineError> {
    parse(source).resolve(data_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InstArg;

    #[test]
    fn slot_offsets_match_byte_offsets() {
        let program = parse_and_resolve("addi x1, x0, 1\nc.addi x1, 1\nadd x2, x1, x1", 0)
            .unwrap();
        // 4-byte, 2-byte, 4-byte: slots = inst, pad, inst, inst, pad.
        assert_eq!(program.len(), 5);
        assert!(program.get(1).unwrap().is_padding());
        assert!(!program.get(2).unwrap().is_padding());
        assert_eq!(program.byte_len(), 10);
    }

    #[test]
    fn labels_resolve_forward_and_backward() {
        let src = "start: addi x1, x0, 1\nbeq x1, x1, start\njal x2, end\nend: addi x3, x0, 3";
        let program = parse_and_resolve(src, 0).unwrap();
        let insts: Vec<_> = program.instructions().collect();
        // beq at byte 4 branching back to 0: (0 - 4) / 2 = -2.
        assert_eq!(insts[1].1.args()[2].immediate(), Some(-2));
        // jal at byte 8 jumping to 12: (12 - 8) / 2 = 2.
        assert_eq!(insts[2].1.args()[1].immediate(), Some(2));
    }

    #[test]
    fn literal_branch_offsets_are_byte_offsets() {
        let program = parse_and_resolve("beq x1, x2, 8", 0).unwrap();
        let (_, inst) = program.instructions().next().unwrap();
        assert_eq!(inst.args()[2].immediate(), Some(4));
    }

    #[test]
    fn duplicate_label_is_a_parse_error() {
        let err = parse_and_resolve("a: addi x1, x0, 1\na: addi x2, x0, 2", 0).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.inner().kind, BuildErrorKind::DuplicateLabel);
        assert_eq!(err.inner().line, 1);
    }

    #[test]
    fn unresolved_symbol_is_a_resolution_error() {
        let err = parse_and_resolve("jal x1, nowhere", 0).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.inner().kind, BuildErrorKind::UnresolvedSymbol);
    }

    #[test]
    fn bad_immediate_is_a_validation_error() {
        let err = parse_and_resolve("addi x1, x0, 99999", 0).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.inner().kind, BuildErrorKind::ImmediateOutOfRange);
    }

    #[test]
    fn indexed_addressing_operand_order() {
        let program = parse_and_resolve("lw x1, 8(x2)", 0).unwrap();
        let (_, inst) = program.instructions().next().unwrap();
        assert_eq!(inst.args()[1], InstArg::Reg(crate::Reg::SP));
        assert_eq!(inst.args()[2].immediate(), Some(8));
    }

    #[test]
    fn comments_blank_lines_and_directives_are_skipped() {
        let src = "# header\n.text\n\naddi x1, x0, 1 ; trailing\n";
        let program = parse_and_resolve(src, 0).unwrap();
        assert_eq!(program.instructions().count(), 1);
    }

    #[test]
    fn data_offset_rebases_absolute_references() {
        let src = "jalr x1, x0, func\nfunc: addi x0, x0, 0";
        // With a zero data offset the absolute address 4 fits imm12.
        let program = parse_and_resolve(src, 0).unwrap();
        let (_, inst) = program.instructions().next().unwrap();
        assert_eq!(inst.args()[2].immediate(), Some(4));
        // Rebased beyond the 12-bit range the same source must fail.
        let err = parse_and_resolve(src, 0x40_0000).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn pc_relative_resolution_is_load_address_independent() {
        let src = "loop: addi x1, x1, 1\nbne x1, x2, loop";
        let at_zero = parse_and_resolve(src, 0).unwrap();
        let rebased = parse_and_resolve(src, 0x40_0000).unwrap();
        let a: Vec<_> = at_zero.instructions().map(|(_, i)| *i).collect();
        let b: Vec<_> = rebased.instructions().map(|(_, i)| *i).collect();
        assert_eq!(a, b);
    }
}
