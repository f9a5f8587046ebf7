//! # SimpleCPU16 Assembler
//!
//! A two-pass assembler for SimpleCPU16, a didactic 16-bit virtual computer.
//!
//! ## Pipeline
//!
//! The assembler processes SimpleCPU16 assembly code through four stages:
//!
//! 1. **Lexer** - tokenizes source code into tokens
//! 2. **Parser** - parses tokens into an Abstract Syntax Tree (AST)
//! 3. **First Pass** - builds the symbol table and computes label addresses
//! 4. **Encoder** - generates the binary machine code image
//!
//! ## Example
//!
//! ```rust,no_run
//! use simplecpu16_asm::assemble;
//!
//! let source = std::fs::read_to_string("program.asm").unwrap();
//! let result = assemble(&source);
//!
//! if result.errors.is_empty() {
//!     println!("Success! Generated {} words of machine code", result.machine_code.len());
//! }
//! ```

pub mod encoder;
pub mod encoding;
pub mod error;
pub mod first_pass;
pub mod lexer;
pub mod parser;

use error::AsmError;

/// Result of running the whole assemble pipeline on a source string.
pub struct AssembleResult {
    pub machine_code: Vec<u16>,
    pub errors: Vec<AsmError>,
}

/// Run the full lex → parse → first-pass → encode pipeline over a source
/// string. Errors from every stage are collected; later stages still run
/// on best-effort output from earlier ones so a single invocation surfaces
/// as many diagnostics as possible.
#[must_use]
pub fn assemble(source: &str) -> AssembleResult {
    let lexed = lexer::tokenize(source);
    let parsed = parser::parse_lines(&lexed.tokens);
    let first = first_pass::first_pass(parsed.lines);
    let encoded = encoder::encode(&first);

    let mut errors = lexed.errors;
    errors.extend(parsed.errors);
    errors.extend(first.errors);
    errors.extend(encoded.errors);

    AssembleResult { machine_code: encoded.machine_code, errors }
}
