//! Line-oriented tokenizer for the assembly source.

/// Classification of one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `name:` at the start of a line.
    Label,
    /// `.name` at the start of a line.
    Directive,
    /// A mnemonic at the start of a line (or right after a label).
    Instruction,
    /// A register name or symbol reference.
    Identifier,
    /// A numeric literal (decimal, `0x...` or `0b...`, optional sign).
    Number,
    /// `,` separating operands.
    Comma,
    /// `(` of an indexed-addressing operand.
    LeftParen,
    /// `)` of an indexed-addressing operand.
    RightParen,
    /// `#` or `;` to end of line.
    Comment,
    /// Anything that fits no other class.
    SyntaxError,
}

/// One token with its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What the text was classified as.
    pub kind: TokenKind,
    /// The token text; labels carry their name without the trailing colon.
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_owned(),
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_number(text: &str) -> bool {
    let rest = text.strip_prefix(['-', '+']).unwrap_or(text);
    if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
    } else if let Some(bin) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        !bin.is_empty() && bin.chars().all(|c| c == '0' || c == '1')
    } else {
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
    }
}

/// Mnemonics are one to three dot-joined segments, each a letter followed
/// by letters or digits (`add`, `c.addi`, `c.addi16sp`, `fence.i`).
fn is_mnemonic(text: &str) -> bool {
    let segments: Vec<&str> = text.split('.').collect();
    (1..=3).contains(&segments.len())
        && segments.iter().all(|s| {
            let mut chars = s.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric())
        })
}

/// Classify an operand word, splitting `imm(reg)` forms into their parts.
fn push_operand(tokens: &mut Vec<Token>, word: &str) {
    if is_number(word) {
        tokens.push(Token::new(TokenKind::Number, word));
        return;
    }
    if is_identifier(word) {
        tokens.push(Token::new(TokenKind::Identifier, word));
        return;
    }
    if word.contains('(') || word.contains(')') {
        let mut rest = word;
        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix('(') {
                tokens.push(Token::new(TokenKind::LeftParen, "("));
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix(')') {
                tokens.push(Token::new(TokenKind::RightParen, ")"));
                rest = tail;
            } else {
                let end = rest.find(['(', ')']).unwrap_or(rest.len());
                let (chunk, tail) = rest.split_at(end);
                if is_number(chunk) {
                    tokens.push(Token::new(TokenKind::Number, chunk));
                } else if is_identifier(chunk) {
                    tokens.push(Token::new(TokenKind::Identifier, chunk));
                } else {
                    tokens.push(Token::new(TokenKind::SyntaxError, chunk));
                }
                rest = tail;
            }
        }
        return;
    }
    tokens.push(Token::new(TokenKind::SyntaxError, word));
}

/// Tokenize one source line.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut at_head = true;

    let mut rest = line;
    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            tokens.push(Token::new(TokenKind::Comment, trimmed));
            break;
        }
        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        let mut word = &trimmed[..end];
        rest = &trimmed[end..];

        let mut trailing_comma = false;
        if let Some(stripped) = word.strip_suffix(',') {
            trailing_comma = true;
            word = stripped;
        }
        if word.is_empty() {
            if trailing_comma {
                tokens.push(Token::new(TokenKind::Comma, ","));
            }
            continue;
        }

        if at_head {
            at_head = false;
            if let Some(name) = word.strip_suffix(':') {
                if is_identifier(name) {
                    tokens.push(Token::new(TokenKind::Label, name));
                    // A mnemonic may follow the label on the same line.
                    at_head = true;
                    continue;
                }
            }
            if word.starts_with('.') && is_identifier(&word[1..]) {
                tokens.push(Token::new(TokenKind::Directive, word));
                continue;
            }
            if is_mnemonic(word) {
                tokens.push(Token::new(TokenKind::Instruction, word));
                continue;
            }
            // Fall through: the head fits no head class; classify it as an
            // operand so the parser can report a meaningful error.
        }

        push_operand(&mut tokens, word);
        if trailing_comma {
            tokens.push(Token::new(TokenKind::Comma, ","));
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<TokenKind> {
        tokenize_line(line).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn instruction_with_operands() {
        assert_eq!(
            kinds("addi x1, x0, 10"),
            vec![
                TokenKind::Instruction,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn indexed_addressing_splits() {
        assert_eq!(
            kinds("lw x1, 8(x2)"),
            vec![
                TokenKind::Instruction,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::LeftParen,
                TokenKind::Identifier,
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn label_then_instruction() {
        let tokens = tokenize_line("loop: addi x1, x1, -1");
        assert_eq!(tokens[0].kind, TokenKind::Label);
        assert_eq!(tokens[0].text, "loop");
        assert_eq!(tokens[1].kind, TokenKind::Instruction);
    }

    #[test]
    fn comments_and_directives() {
        assert_eq!(kinds("# just a comment"), vec![TokenKind::Comment]);
        assert_eq!(
            kinds("add x1, x2, x3 ; trailing"),
            vec![
                TokenKind::Instruction,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Identifier,
                TokenKind::Comment,
            ]
        );
        assert_eq!(kinds(".text"), vec![TokenKind::Directive]);
    }

    #[test]
    fn numbers() {
        assert_eq!(kinds("li"), vec![TokenKind::Instruction]);
        for n in ["10", "-10", "+3", "0x1F", "0b101"] {
            assert!(is_number(n), "{n}");
        }
        assert!(!is_number("10x"));
        assert!(!is_number("0b"));
        assert!(!is_number(""));
    }

    #[test]
    fn compressed_mnemonics() {
        let tokens = tokenize_line("c.addi x8, 4");
        assert_eq!(tokens[0].kind, TokenKind::Instruction);
        assert_eq!(tokens[0].text, "c.addi");
        // Digits are allowed after the leading letter of a segment.
        let tokens = tokenize_line("c.addi16sp sp, -2");
        assert_eq!(tokens[0].kind, TokenKind::Instruction);
        assert_eq!(tokens[0].text, "c.addi16sp");
        let tokens = tokenize_line("c.addi4spn x8, 4");
        assert_eq!(tokens[0].kind, TokenKind::Instruction);
    }

    #[test]
    fn garbage_is_a_syntax_error() {
        let tokens = tokenize_line("add x1, @!, x3");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::SyntaxError));
    }

    #[test]
    fn empty_line() {
        assert!(tokenize_line("").is_empty());
        assert!(tokenize_line("   \t ").is_empty());
    }
}
