//! # First Pass
//!
//! Builds the symbol table and computes the final address of every label.
//!
//! ## Responsibilities
//!
//! 1. **Symbol Table Construction**: records every label and the address of
//!    the line it labels.
//! 2. **Address Calculation**: tracks the location counter as it walks each
//!    line, advancing it by that line's `word_count()`.
//! 3. **`.ORG` Handling**: a `.ORG addr` line sets the location counter
//!    directly; it may appear anywhere, any number of times.
//! 4. **Overflow Detection**: flags programs whose location counter would
//!    exceed the 16-bit address space.
//!
//! Unlike an LC-3-style assembler, SimpleCPU16 has no `.ORIG`-must-come-first
//! or `.END`-must-be-present requirement: the location counter simply starts
//! at 0 and `.ORG` is an ordinary directive that can reposition it.

pub mod symbol_table;


use crate::error::{AsmError, ErrorKind, Span};
use crate::parser::ast::{LineContent, SourceLine};
use symbol_table::SymbolTable;

/// Maximum number of distinct labels a program may define.
pub const MAX_LABELS: usize = 256;

pub struct FirstPassResult {
    pub symbol_table: SymbolTable,
    pub source_lines: Vec<SourceLine>,
    pub errors: Vec<AsmError>,
}

/// Perform the first pass of the assembler.
///
/// Takes ownership of the parsed lines so the resulting `FirstPassResult`
/// can store them directly without cloning.
#[must_use]
pub fn first_pass(lines: Vec<SourceLine>) -> FirstPassResult {
    let mut symbol_table = SymbolTable::new();
    let mut errors = Vec::new();
    let mut location_counter: u16 = 0;

    for line in &lines {
        if let Some(label) = &line.label {
            record_label(&mut symbol_table, label, location_counter, line.span, &mut errors);
        }

        if let LineContent::Org(addr) = &line.content {
            location_counter = *addr;
            continue;
        }

        let words = line.content.word_count();
        let new_lc = (location_counter as u32) + words;
        if new_lc > 0x10000 {
            errors.push(AsmError {
                kind: ErrorKind::AddressOverflow,
                message: format!(
                    "address overflow: location counter would exceed 0xFFFF (at 0x{location_counter:04X} + {words} words)"
                ),
                span: line.span,
            });
            location_counter = 0xFFFF;
        } else {
            location_counter = new_lc as u16;
        }
    }

    FirstPassResult { symbol_table, source_lines: lines, errors }
}

fn record_label(
    table: &mut SymbolTable,
    label: &str,
    address: u16,
    span: Span,
    errors: &mut Vec<AsmError>,
) {
    if let Some(first_addr) = table.get(label) {
        errors.push(AsmError {
            kind: ErrorKind::DuplicateLabel,
            message: format!("label '{label}' already defined at address 0x{first_addr:04X}"),
            span,
        });
    } else if table.len() >= MAX_LABELS {
        errors.push(AsmError {
            kind: ErrorKind::TooManyLabels,
            message: format!("too many labels (maximum {MAX_LABELS})"),
            span,
        });
    } else {
        table.insert(label.to_string(), address);
    }
}
