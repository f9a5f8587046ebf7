//! # SimpleCPU16 Parser
//!
//! Parses tokenized SimpleCPU16 assembly code into an Abstract Syntax Tree (AST).
//!
//! ## Architecture
//!
//! The parser processes tokens line by line, handling:
//! - Optional labels at the start of lines
//! - Instructions with their operands
//! - Assembler directives (.ORG, .WORD, .STRING/.ASCIIZ)
//!
//! ## Macro-Based Parsing
//!
//! To eliminate code duplication, the parser uses declarative macros to
//! generate parsing functions for similar instruction patterns:
//! - `parse_reg_reg!` - ADD, SUB, MUL, DIV, MOV, AND, OR, XOR, SHL, SHR, SAR, CMP
//! - `parse_single_reg!` - INC, DEC, NOT, PUSH, POP
//! - `parse_no_operands!` - NOP, RET, HALT
//! - `parse_reg_value!` - LDI, ADDI, SUBI (register + immediate-or-label)
//! - `parse_target!` - BEQ..BCC, JMP, CALL (immediate-or-label target)
//!
//! LD and ST are hand-written: which AST variant they produce depends on
//! whether the bracketed operand is a register (indirect) or not (direct),
//! which the macros above don't express.

#[macro_use]
mod macros;
pub mod ast;

#[cfg(test)]
mod tests;

use crate::error::{AsmError, ErrorKind, Span};
use crate::lexer::token::{Token, TokenKind};
use ast::{Instruction, LineContent, Operand, SourceLine};

pub struct ParseResult {
    pub lines: Vec<SourceLine>,
    pub errors: Vec<AsmError>,
}

#[must_use]
pub fn parse_lines(tokens: &[Token]) -> ParseResult {
    let mut lines = Vec::new();
    let mut errors = Vec::new();
    let mut line_start = 0;
    let mut line_number = 1;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Newline => {
                process_line(&tokens[line_start..i], line_number, &mut lines, &mut errors);
                line_start = i + 1;
                line_number += 1;
            }
            TokenKind::Eof => {
                process_line(&tokens[line_start..i], line_number, &mut lines, &mut errors);
                break;
            }
            _ => {}
        }
    }

    ParseResult { lines, errors }
}

fn process_line(
    tokens: &[Token],
    line_number: usize,
    lines: &mut Vec<SourceLine>,
    errors: &mut Vec<AsmError>,
) {
    let span = line_span(tokens, line_number);

    if tokens.is_empty() {
        lines.push(SourceLine { label: None, content: LineContent::Empty, line_number, span });
        return;
    }

    let first = &tokens[0];
    let mut label: Option<String> = None;
    let content_tokens: &[Token];

    match &first.kind {
        TokenKind::LabelDef(name) => {
            label = Some(name.clone());
            if tokens.len() == 1 {
                lines.push(SourceLine { label, content: LineContent::Empty, line_number, span });
                return;
            }
            let next = &tokens[1];
            if next.kind.is_instruction_or_directive() {
                content_tokens = &tokens[1..];
            } else if let TokenKind::Word(name) = &next.kind {
                report_unknown_mnemonic(name, next.span, errors);
                lines.push(SourceLine { label, content: LineContent::UnknownMnemonic(name.clone()), line_number, span });
                return;
            } else {
                errors.push(AsmError {
                    kind: ErrorKind::UnexpectedToken,
                    message: "unexpected token after label".to_string(),
                    span: next.span,
                });
                lines.push(SourceLine { label, content: LineContent::Empty, line_number, span });
                return;
            }
        }
        kind if kind.is_instruction_or_directive() => {
            content_tokens = &tokens[..];
        }
        TokenKind::Word(name) => {
            report_unknown_mnemonic(name, first.span, errors);
            lines.push(SourceLine { label: None, content: LineContent::UnknownMnemonic(name.clone()), line_number, span });
            return;
        }
        _ => {
            errors.push(AsmError {
                kind: ErrorKind::UnexpectedToken,
                message: "unexpected token at start of line".to_string(),
                span: first.span,
            });
            lines.push(SourceLine { label: None, content: LineContent::Empty, line_number, span });
            return;
        }
    }

    let refs: Vec<&Token> = content_tokens.iter().collect();
    match parse_content(&refs) {
        Ok(content) => lines.push(SourceLine { label, content, line_number, span }),
        Err(err) => {
            errors.push(err);
            lines.push(SourceLine { label, content: LineContent::Empty, line_number, span });
        }
    }
}

/// Per spec.md §7: an unrecognized mnemonic is reported but does not abort
/// assembly — the caller still emits a one-word placeholder for it.
fn report_unknown_mnemonic(name: &str, span: Span, errors: &mut Vec<AsmError>) {
    errors.push(AsmError {
        kind: ErrorKind::UnknownMnemonic,
        message: format!("unknown mnemonic: {name}"),
        span,
    });
}

fn line_span(tokens: &[Token], line_number: usize) -> Span {
    if let (Some(first), Some(last)) = (tokens.first(), tokens.last()) {
        Span { start: first.span.start, end: last.span.end, line: first.span.line, col: first.span.col }
    } else {
        Span { start: 0, end: 0, line: line_number, col: 1 }
    }
}

fn parse_content(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    let first = tokens[0];

    match &first.kind {
        TokenKind::OpNop => parse_no_operands!("NOP", Instruction::Nop)(tokens),
        TokenKind::OpRet => parse_no_operands!("RET", Instruction::Ret)(tokens),
        TokenKind::OpHalt => parse_no_operands!("HALT", Instruction::Halt)(tokens),

        TokenKind::OpMov => parse_reg_reg!("MOV", |dr, sr| Instruction::Mov { dr, sr })(tokens),
        TokenKind::OpAdd => parse_reg_reg!("ADD", |dr, sr| Instruction::Add { dr, sr })(tokens),
        TokenKind::OpSub => parse_reg_reg!("SUB", |dr, sr| Instruction::Sub { dr, sr })(tokens),
        TokenKind::OpMul => parse_reg_reg!("MUL", |dr, sr| Instruction::Mul { dr, sr })(tokens),
        TokenKind::OpDiv => parse_reg_reg!("DIV", |dr, sr| Instruction::Div { dr, sr })(tokens),
        TokenKind::OpAnd => parse_reg_reg!("AND", |dr, sr| Instruction::And { dr, sr })(tokens),
        TokenKind::OpOr => parse_reg_reg!("OR", |dr, sr| Instruction::Or { dr, sr })(tokens),
        TokenKind::OpXor => parse_reg_reg!("XOR", |dr, sr| Instruction::Xor { dr, sr })(tokens),
        TokenKind::OpShl => parse_reg_reg!("SHL", |dr, sr| Instruction::Shl { dr, sr })(tokens),
        TokenKind::OpShr => parse_reg_reg!("SHR", |dr, sr| Instruction::Shr { dr, sr })(tokens),
        TokenKind::OpSar => parse_reg_reg!("SAR", |dr, sr| Instruction::Sar { dr, sr })(tokens),
        TokenKind::OpCmp => parse_reg_reg!("CMP", |dr, sr| Instruction::Cmp { dr, sr })(tokens),

        TokenKind::OpInc => parse_single_reg!("INC", |dr| Instruction::Inc { dr })(tokens),
        TokenKind::OpDec => parse_single_reg!("DEC", |dr| Instruction::Dec { dr })(tokens),
        TokenKind::OpNot => parse_single_reg!("NOT", |dr| Instruction::Not { dr })(tokens),
        TokenKind::OpPush => parse_single_reg!("PUSH", |sr| Instruction::Push { sr })(tokens),
        TokenKind::OpPop => parse_single_reg!("POP", |dr| Instruction::Pop { dr })(tokens),

        TokenKind::OpLdi => parse_reg_value!("LDI", |dr, value| Instruction::Ldi { dr, value })(tokens),
        TokenKind::OpAddi => parse_reg_value!("ADDI", |dr, value| Instruction::Addi { dr, value })(tokens),
        TokenKind::OpSubi => parse_reg_value!("SUBI", |dr, value| Instruction::Subi { dr, value })(tokens),

        TokenKind::OpBeq => parse_target!("BEQ", |target| Instruction::Beq { target })(tokens),
        TokenKind::OpBne => parse_target!("BNE", |target| Instruction::Bne { target })(tokens),
        TokenKind::OpBgt => parse_target!("BGT", |target| Instruction::Bgt { target })(tokens),
        TokenKind::OpBlt => parse_target!("BLT", |target| Instruction::Blt { target })(tokens),
        TokenKind::OpBge => parse_target!("BGE", |target| Instruction::Bge { target })(tokens),
        TokenKind::OpBle => parse_target!("BLE", |target| Instruction::Ble { target })(tokens),
        TokenKind::OpBcs => parse_target!("BCS", |target| Instruction::Bcs { target })(tokens),
        TokenKind::OpBcc => parse_target!("BCC", |target| Instruction::Bcc { target })(tokens),
        TokenKind::OpJmp => parse_target!("JMP", |target| Instruction::Jmp { target })(tokens),
        TokenKind::OpCall => parse_target!("CALL", |target| Instruction::Call { target })(tokens),

        TokenKind::OpLd => parse_ld(tokens),
        TokenKind::OpSt => parse_st(tokens),

        TokenKind::DirOrg => parse_org(tokens),
        TokenKind::DirWord => parse_word(tokens),
        TokenKind::DirString => parse_stringz(tokens),

        _ => Err(AsmError {
            kind: ErrorKind::UnexpectedToken,
            message: "unexpected token in line".to_string(),
            span: first.span,
        }),
    }
}

/// `LD Rd, [addr]` (direct) or `LD Rd, [Rs]` (indirect).
fn parse_ld(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    if tokens.len() < 6 {
        return Err(AsmError {
            kind: ErrorKind::TooFewOperands,
            message: "LD requires 2 operands: LD Rd, [addr] or LD Rd, [Rs]".to_string(),
            span: tokens[0].span,
        });
    }
    let dr = expect_register(tokens, 1, "LD first operand must be a register (R0-R7)")?;
    expect_comma(tokens, 2, "expected comma after first operand")?;
    expect_bracket_open(tokens, 3)?;
    let inner = tokens[4];
    expect_bracket_close(tokens, 5)?;
    ensure_no_extra(tokens, 6)?;

    match &inner.kind {
        TokenKind::Register(base) => Ok(LineContent::Instruction(Instruction::LdReg { dr, base: *base })),
        _ => {
            let addr = operand_from_token(inner).ok_or_else(|| AsmError {
                kind: ErrorKind::InvalidOperandType,
                message: "LD bracketed operand must be a register, an immediate address, or a label".to_string(),
                span: inner.span,
            })?;
            Ok(LineContent::Instruction(Instruction::Ld { dr, addr }))
        }
    }
}

/// `ST [addr], Rs` (direct) or `ST [Rd], Rs` (indirect).
fn parse_st(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    if tokens.len() < 6 {
        return Err(AsmError {
            kind: ErrorKind::TooFewOperands,
            message: "ST requires 2 operands: ST [addr], Rs or ST [Rd], Rs".to_string(),
            span: tokens[0].span,
        });
    }
    expect_bracket_open(tokens, 1)?;
    let inner = tokens[2];
    expect_bracket_close(tokens, 3)?;
    expect_comma(tokens, 4, "expected comma after bracketed operand")?;
    let sr = expect_register(tokens, 5, "ST second operand must be a register (R0-R7)")?;
    ensure_no_extra(tokens, 6)?;

    match &inner.kind {
        TokenKind::Register(base) => Ok(LineContent::Instruction(Instruction::StReg { base: *base, sr })),
        _ => {
            let addr = operand_from_token(inner).ok_or_else(|| AsmError {
                kind: ErrorKind::InvalidOperandType,
                message: "ST bracketed operand must be a register, an immediate address, or a label".to_string(),
                span: inner.span,
            })?;
            Ok(LineContent::Instruction(Instruction::St { addr, sr }))
        }
    }
}

fn parse_org(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    if tokens.len() < 2 {
        return Err(AsmError {
            kind: ErrorKind::TooFewOperands,
            message: ".ORG requires a numeric address operand".to_string(),
            span: tokens[0].span,
        });
    }
    let value = token_to_i32(tokens[1]).ok_or_else(|| AsmError {
        kind: ErrorKind::InvalidOperandType,
        message: ".ORG requires a numeric address operand".to_string(),
        span: tokens[1].span,
    })?;
    if !(0..=0xFFFF).contains(&value) {
        return Err(AsmError {
            kind: ErrorKind::InvalidOrgAddress,
            message: ".ORG address must be 0x0000-0xFFFF".to_string(),
            span: tokens[1].span,
        });
    }
    ensure_no_extra(tokens, 2)?;
    Ok(LineContent::Org(value as u16))
}

fn parse_word(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    if tokens.len() < 2 {
        return Err(AsmError {
            kind: ErrorKind::TooFewOperands,
            message: ".WORD requires at least one value".to_string(),
            span: tokens[0].span,
        });
    }
    let mut values = Vec::new();
    let mut idx = 1;
    loop {
        let tok = tokens.get(idx).ok_or_else(|| AsmError {
            kind: ErrorKind::TooFewOperands,
            message: ".WORD expected a value".to_string(),
            span: tokens[idx - 1].span,
        })?;
        let value = operand_from_token(tok).ok_or_else(|| AsmError {
            kind: ErrorKind::InvalidWordValue,
            message: ".WORD values must be numeric or a label".to_string(),
            span: tok.span,
        })?;
        values.push(value);
        idx += 1;
        match tokens.get(idx) {
            Some(t) if t.kind == TokenKind::Comma => {
                idx += 1;
            }
            Some(t) => {
                return Err(AsmError {
                    kind: ErrorKind::UnexpectedToken,
                    message: "expected comma between .WORD values".to_string(),
                    span: t.span,
                });
            }
            None => break,
        }
    }
    Ok(LineContent::Word(values))
}

fn parse_stringz(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    if tokens.len() < 2 {
        return Err(AsmError {
            kind: ErrorKind::TooFewOperands,
            message: ".STRING requires a string literal operand".to_string(),
            span: tokens[0].span,
        });
    }
    match &tokens[1].kind {
        TokenKind::StringLiteral(s) => {
            ensure_no_extra(tokens, 2)?;
            Ok(LineContent::Stringz(s.clone()))
        }
        _ => Err(AsmError {
            kind: ErrorKind::InvalidOperandType,
            message: ".STRING requires a string literal operand".to_string(),
            span: tokens[1].span,
        }),
    }
}

// Helper functions — pub(crate) so macros in macros.rs can call them via
// `$crate::parser::macros::*` without exposing them in the public library API.

pub(crate) fn ensure_no_extra(tokens: &[&Token], expected_len: usize) -> Result<(), AsmError> {
    if tokens.len() > expected_len {
        return Err(AsmError {
            kind: ErrorKind::UnexpectedToken,
            message: "unexpected token after instruction".to_string(),
            span: tokens[expected_len].span,
        });
    }
    Ok(())
}

pub(crate) fn expect_comma(tokens: &[&Token], idx: usize, message: &str) -> Result<(), AsmError> {
    if tokens.len() <= idx {
        return Err(AsmError { kind: ErrorKind::ExpectedComma, message: message.into(), span: tokens[0].span });
    }
    match tokens[idx].kind {
        TokenKind::Comma => Ok(()),
        _ => Err(AsmError { kind: ErrorKind::ExpectedComma, message: message.into(), span: tokens[idx].span }),
    }
}

fn expect_bracket_open(tokens: &[&Token], idx: usize) -> Result<(), AsmError> {
    if tokens.len() <= idx {
        return Err(AsmError {
            kind: ErrorKind::ExpectedBracket,
            message: "expected '['".to_string(),
            span: tokens[0].span,
        });
    }
    match tokens[idx].kind {
        TokenKind::LBracket => Ok(()),
        _ => Err(AsmError { kind: ErrorKind::ExpectedBracket, message: "expected '['".to_string(), span: tokens[idx].span }),
    }
}

fn expect_bracket_close(tokens: &[&Token], idx: usize) -> Result<(), AsmError> {
    if tokens.len() <= idx {
        return Err(AsmError {
            kind: ErrorKind::ExpectedBracket,
            message: "expected ']'".to_string(),
            span: tokens[0].span,
        });
    }
    match tokens[idx].kind {
        TokenKind::RBracket => Ok(()),
        _ => Err(AsmError { kind: ErrorKind::ExpectedBracket, message: "expected ']'".to_string(), span: tokens[idx].span }),
    }
}

pub(crate) fn expect_register(tokens: &[&Token], idx: usize, message: &str) -> Result<u8, AsmError> {
    if tokens.len() <= idx {
        return Err(AsmError { kind: ErrorKind::ExpectedRegister, message: message.into(), span: tokens[0].span });
    }
    token_to_register(tokens[idx]).ok_or_else(|| AsmError {
        kind: ErrorKind::ExpectedRegister,
        message: message.into(),
        span: tokens[idx].span,
    })
}

pub(crate) fn expect_operand(tokens: &[&Token], idx: usize, message: &str) -> Result<Operand, AsmError> {
    if tokens.len() <= idx {
        return Err(AsmError { kind: ErrorKind::ExpectedOperand, message: message.into(), span: tokens[0].span });
    }
    operand_from_token(tokens[idx]).ok_or_else(|| AsmError {
        kind: ErrorKind::ExpectedOperand,
        message: message.into(),
        span: tokens[idx].span,
    })
}

fn token_to_i32(token: &Token) -> Option<i32> {
    match &token.kind {
        TokenKind::NumDecimal(v) | TokenKind::NumHex(v) | TokenKind::NumChar(v) => Some(*v),
        _ => None,
    }
}

fn token_to_register(token: &Token) -> Option<u8> {
    match &token.kind {
        TokenKind::Register(r) => Some(*r),
        _ => None,
    }
}

fn operand_from_token(token: &Token) -> Option<Operand> {
    match &token.kind {
        TokenKind::NumDecimal(v) | TokenKind::NumHex(v) | TokenKind::NumChar(v) => Some(Operand::Immediate(*v)),
        TokenKind::Word(s) => Some(Operand::Label(s.clone())),
        _ => None,
    }
}
