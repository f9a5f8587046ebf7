//! # Parser Macros
//!
//! Declarative macros for generating instruction parsing functions.
//!
//! These macros eliminate repetitive parsing code by generating parsers for
//! similar operand patterns shared across many SimpleCPU16 mnemonics. Each
//! macro validates operand counts, checks for proper comma placement, and
//! constructs the appropriate AST node.

/// Two-register instructions: `OP Rd, Rs` (ADD, SUB, MUL, DIV, MOV, AND, OR,
/// XOR, SHL, SHR, SAR, CMP).
macro_rules! parse_reg_reg {
    ($name:expr, $variant:expr) => {
        |tokens: &[&$crate::lexer::token::Token]| -> Result<$crate::parser::ast::LineContent, $crate::error::AsmError> {
            use $crate::error::{AsmError, ErrorKind};
            use $crate::parser::ast::LineContent;

            if tokens.len() < 4 {
                return Err(AsmError {
                    kind: ErrorKind::TooFewOperands,
                    message: format!("{} requires 2 operands: {} Rd, Rs", $name, $name),
                    span: tokens[0].span,
                });
            }
            $crate::parser::macros::expect_comma(tokens, 2, "Expected comma after first operand")?;
            let dr = $crate::parser::macros::expect_register(tokens, 1, &format!("{} first operand must be a register (R0-R7)", $name))?;
            let sr = $crate::parser::macros::expect_register(tokens, 3, &format!("{} second operand must be a register (R0-R7)", $name))?;
            $crate::parser::macros::ensure_no_extra(tokens, 4)?;
            Ok(LineContent::Instruction($variant(dr, sr)))
        }
    };
}

/// Single-register instructions: `OP Rd` (INC, DEC, NOT, POP) or `OP Rs` (PUSH).
macro_rules! parse_single_reg {
    ($name:expr, $variant:expr) => {
        |tokens: &[&$crate::lexer::token::Token]| -> Result<$crate::parser::ast::LineContent, $crate::error::AsmError> {
            use $crate::error::{AsmError, ErrorKind};
            use $crate::parser::ast::LineContent;

            if tokens.len() < 2 {
                return Err(AsmError {
                    kind: ErrorKind::TooFewOperands,
                    message: format!("{} requires 1 register operand", $name),
                    span: tokens[0].span,
                });
            }
            let reg = $crate::parser::macros::expect_register(tokens, 1, &format!("{} operand must be a register (R0-R7)", $name))?;
            $crate::parser::macros::ensure_no_extra(tokens, 2)?;
            Ok(LineContent::Instruction($variant(reg)))
        }
    };
}

/// No-operand instructions (NOP, RET, HALT).
macro_rules! parse_no_operands {
    ($name:expr, $variant:expr) => {
        |tokens: &[&$crate::lexer::token::Token]| -> Result<$crate::parser::ast::LineContent, $crate::error::AsmError> {
            use $crate::error::{AsmError, ErrorKind};
            use $crate::parser::ast::LineContent;

            if tokens.len() > 1 {
                return Err(AsmError {
                    kind: ErrorKind::TooManyOperands,
                    message: format!("{} takes no operands", $name),
                    span: tokens[1].span,
                });
            }
            Ok(LineContent::Instruction($variant))
        }
    };
}

/// Register + immediate-or-label instructions: `OP Rd, value` (LDI, ADDI, SUBI).
macro_rules! parse_reg_value {
    ($name:expr, $variant:expr) => {
        |tokens: &[&$crate::lexer::token::Token]| -> Result<$crate::parser::ast::LineContent, $crate::error::AsmError> {
            use $crate::error::{AsmError, ErrorKind};
            use $crate::parser::ast::LineContent;

            if tokens.len() < 4 {
                return Err(AsmError {
                    kind: ErrorKind::TooFewOperands,
                    message: format!("{} requires 2 operands: {} Rd, value", $name, $name),
                    span: tokens[0].span,
                });
            }
            $crate::parser::macros::expect_comma(tokens, 2, "Expected comma after first operand")?;
            let dr = $crate::parser::macros::expect_register(tokens, 1, &format!("{} first operand must be a register (R0-R7)", $name))?;
            let value = $crate::parser::macros::expect_operand(tokens, 3, &format!("{} second operand must be an immediate or label", $name))?;
            $crate::parser::macros::ensure_no_extra(tokens, 4)?;
            Ok(LineContent::Instruction($variant(dr, value)))
        }
    };
}

/// Single immediate-or-label target instructions: `OP target` (BEQ, BNE,
/// BGT, BLT, BGE, BLE, BCS, BCC, JMP, CALL).
macro_rules! parse_target {
    ($name:expr, $variant:expr) => {
        |tokens: &[&$crate::lexer::token::Token]| -> Result<$crate::parser::ast::LineContent, $crate::error::AsmError> {
            use $crate::error::{AsmError, ErrorKind};
            use $crate::parser::ast::LineContent;

            if tokens.len() < 2 {
                return Err(AsmError {
                    kind: ErrorKind::TooFewOperands,
                    message: format!("{} requires a target operand", $name),
                    span: tokens[0].span,
                });
            }
            let target = $crate::parser::macros::expect_operand(tokens, 1, &format!("{} requires an immediate or label target", $name))?;
            $crate::parser::macros::ensure_no_extra(tokens, 2)?;
            Ok(LineContent::Instruction($variant(target)))
        }
    };
}

// Helper functions used by macros (must be public for macro access)
pub use super::{ensure_no_extra, expect_comma, expect_operand, expect_register};
