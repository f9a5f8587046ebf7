//! SimpleCPU16 Machine Code Encoder
//!
//! Converts the parsed AST and first-pass symbol table into the final
//! sequence of 16-bit words: this is the assembler's second pass.
//!
//! ## Supported Instructions
//!
//! Every instruction in the SimpleCPU16 ISA: LOAD family (LDI/LD/indirect
//! LD), STORE family (direct/indirect ST), MOVE, arithmetic (ADD/SUB/MUL/DIV/
//! INC/DEC/ADDI/SUBI), logic (AND/OR/XOR/NOT), shifts (SHL/SHR/SAR),
//! conditional branches (BEQ/BNE/BGT/BLT/BGE/BLE/BCS/BCC), JMP, stack
//! (PUSH/POP), CALL/RET, CMP, HALT.
//!
//! ## Directives
//!
//! - **.ORG** - reposition the location counter (no code emitted)
//! - **.WORD** - emit one raw word per value, literal or resolved label
//! - **.STRING**/.ASCIIZ - pack two characters per word, null-terminated

use crate::encoding::*;
use crate::error::{AsmError, ErrorKind, Span};
use crate::first_pass::{symbol_table::SymbolTable, FirstPassResult};
use crate::parser::ast::{Instruction, LineContent, Operand, SourceLine};

/// Result of the encoding process
pub struct EncodeResult {
    /// Generated machine code as 16-bit words, indexed from address 0
    pub machine_code: Vec<u16>,
    /// Errors encountered during encoding
    pub errors: Vec<AsmError>,
}

/// Encode the assembled program into SimpleCPU16 machine code.
///
/// This is the assembler's second pass: it walks the same source lines the
/// first pass walked, this time emitting words into a flat image addressed
/// from 0. `.ORG` moves the write cursor without emitting anything, so gaps
/// between origins are left as zero words.
#[must_use]
pub fn encode(first_pass: &FirstPassResult) -> EncodeResult {
    let mut encoder = Encoder::new(&first_pass.symbol_table);

    for line in &first_pass.source_lines {
        encoder.encode_line(line);
    }

    EncodeResult { machine_code: encoder.machine_code, errors: encoder.errors }
}

struct Encoder<'a> {
    symbol_table: &'a SymbolTable,
    machine_code: Vec<u16>,
    current_address: u16,
    errors: Vec<AsmError>,
}

impl<'a> Encoder<'a> {
    fn new(symbol_table: &'a SymbolTable) -> Self {
        Self { symbol_table, machine_code: Vec::new(), current_address: 0, errors: Vec::new() }
    }

    fn encode_line(&mut self, line: &SourceLine) {
        match &line.content {
            LineContent::Empty => {}
            LineContent::Org(addr) => {
                self.current_address = *addr;
            }
            LineContent::Word(values) => {
                for value in values {
                    let word = self.resolve(value, line.span);
                    self.emit(word);
                }
            }
            LineContent::Stringz(s) => {
                let chars: Vec<char> = s.chars().collect();
                for pair in chars.chunks(2) {
                    let lo = pair[0] as u16;
                    let hi = pair.get(1).copied().map_or(0, |c| c as u16);
                    self.emit(lo | (hi << 8));
                }
                self.emit(0);
            }
            LineContent::Instruction(inst) => {
                self.encode_instruction(inst, line.span);
            }
            LineContent::UnknownMnemonic(_) => {
                // Already reported by the parser (spec.md §7): emit 0 as
                // the control word and keep the location counter in step.
                self.emit(0);
            }
        }
    }

    fn encode_instruction(&mut self, inst: &Instruction, span: Span) {
        match inst {
            Instruction::Nop => self.emit(encode_control(OP_NOP, 0, 0, 0)),

            Instruction::Ldi { dr, value } => {
                self.emit(encode_control(OP_LOAD, *dr as u16, 0, LOAD_IMM));
                let word = self.resolve(value, span);
                self.emit(word);
            }
            Instruction::Ld { dr, addr } => {
                self.emit(encode_control(OP_LOAD, *dr as u16, 0, LOAD_DIR));
                let word = self.resolve(addr, span);
                self.emit(word);
            }
            Instruction::LdReg { dr, base } => {
                self.emit(encode_control(OP_LOAD, *dr as u16, *base as u16, LOAD_IND));
            }
            Instruction::St { addr, sr } => {
                self.emit(encode_control(OP_STORE, 0, *sr as u16, STORE_DIR));
                let word = self.resolve(addr, span);
                self.emit(word);
            }
            Instruction::StReg { base, sr } => {
                self.emit(encode_control(OP_STORE, *base as u16, *sr as u16, STORE_IND));
            }

            Instruction::Mov { dr, sr } => self.emit(encode_control(OP_MOVE, *dr as u16, *sr as u16, 0)),

            Instruction::Add { dr, sr } => self.emit(encode_control(OP_ARITH, *dr as u16, *sr as u16, ARITH_ADD)),
            Instruction::Sub { dr, sr } => self.emit(encode_control(OP_ARITH, *dr as u16, *sr as u16, ARITH_SUB)),
            Instruction::Mul { dr, sr } => self.emit(encode_control(OP_ARITH, *dr as u16, *sr as u16, ARITH_MUL)),
            Instruction::Div { dr, sr } => self.emit(encode_control(OP_ARITH, *dr as u16, *sr as u16, ARITH_DIV)),
            Instruction::Inc { dr } => self.emit(encode_control(OP_ARITH, *dr as u16, 0, ARITH_INC)),
            Instruction::Dec { dr } => self.emit(encode_control(OP_ARITH, *dr as u16, 0, ARITH_DEC)),
            Instruction::Addi { dr, value } => {
                self.emit(encode_control(OP_ARITH, *dr as u16, 0, ARITH_ADDI));
                let word = self.resolve(value, span);
                self.emit(word);
            }
            Instruction::Subi { dr, value } => {
                self.emit(encode_control(OP_ARITH, *dr as u16, 0, ARITH_SUBI));
                let word = self.resolve(value, span);
                self.emit(word);
            }

            Instruction::And { dr, sr } => self.emit(encode_control(OP_LOGIC, *dr as u16, *sr as u16, LOGIC_AND)),
            Instruction::Or { dr, sr } => self.emit(encode_control(OP_LOGIC, *dr as u16, *sr as u16, LOGIC_OR)),
            Instruction::Xor { dr, sr } => self.emit(encode_control(OP_LOGIC, *dr as u16, *sr as u16, LOGIC_XOR)),
            Instruction::Not { dr } => self.emit(encode_control(OP_LOGIC, *dr as u16, 0, LOGIC_NOT)),

            Instruction::Shl { dr, sr } => self.emit(encode_control(OP_SHIFT, *dr as u16, *sr as u16, SHIFT_SHL)),
            Instruction::Shr { dr, sr } => self.emit(encode_control(OP_SHIFT, *dr as u16, *sr as u16, SHIFT_SHR)),
            Instruction::Sar { dr, sr } => self.emit(encode_control(OP_SHIFT, *dr as u16, *sr as u16, SHIFT_SAR)),

            Instruction::Beq { target } => self.encode_branch(BRANCH_EQ, target, span),
            Instruction::Bne { target } => self.encode_branch(BRANCH_NE, target, span),
            Instruction::Bgt { target } => self.encode_branch(BRANCH_GT, target, span),
            Instruction::Blt { target } => self.encode_branch(BRANCH_LT, target, span),
            Instruction::Bge { target } => self.encode_branch(BRANCH_GE, target, span),
            Instruction::Ble { target } => self.encode_branch(BRANCH_LE, target, span),
            Instruction::Bcs { target } => self.encode_branch(BRANCH_CS, target, span),
            Instruction::Bcc { target } => self.encode_branch(BRANCH_CC, target, span),

            Instruction::Jmp { target } => {
                self.emit(encode_control(OP_JUMP, 0, 0, 0));
                let word = self.resolve(target, span);
                self.emit(word);
            }

            Instruction::Push { sr } => self.emit(encode_control(OP_STACK, 0, *sr as u16, STACK_PUSH)),
            Instruction::Pop { dr } => self.emit(encode_control(OP_STACK, *dr as u16, 0, STACK_POP)),

            Instruction::Call { target } => {
                self.emit(encode_control(OP_CALL, 0, 0, 0));
                let word = self.resolve(target, span);
                self.emit(word);
            }
            Instruction::Ret => self.emit(encode_control(OP_RET, 0, 0, 0)),

            Instruction::Cmp { dr, sr } => self.emit(encode_control(OP_CMP, *dr as u16, *sr as u16, 0)),

            Instruction::Halt => self.emit(encode_control(OP_HALT, 0, 0, 0)),
        }
    }

    fn encode_branch(&mut self, mode: u16, target: &Operand, span: Span) {
        self.emit(encode_control(OP_BRANCH, 0, 0, mode));
        let word = self.resolve(target, span);
        self.emit(word);
    }

    /// Resolve an `Operand` to its final 16-bit word: an immediate is taken
    /// as-is, a label is looked up in the symbol table. An undefined label
    /// emits 0 and records an error, so assembly can continue and report
    /// every undefined reference in one pass.
    fn resolve(&mut self, operand: &Operand, span: Span) -> u16 {
        match operand {
            Operand::Immediate(v) => *v as u16,
            Operand::Label(name) => match self.symbol_table.get(name) {
                Some(addr) => addr,
                None => {
                    self.errors.push(AsmError {
                        kind: ErrorKind::UndefinedSymbol,
                        message: format!("undefined symbol '{name}'"),
                        span,
                    });
                    0
                }
            },
        }
    }

    /// Write a word at the current location counter, padding any gap left
    /// by a forward `.ORG` with zero words.
    fn emit(&mut self, word: u16) {
        let idx = self.current_address as usize;
        if idx >= self.machine_code.len() {
            self.machine_code.resize(idx + 1, 0);
        }
        self.machine_code[idx] = word;
        self.current_address = self.current_address.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_span() -> Span {
        Span { start: 0, end: 0, line: 1, col: 1 }
    }

    #[test]
    fn resolve_immediate_passes_through_unchanged() {
        let table = SymbolTable::new();
        let mut encoder = Encoder::new(&table);
        let word = encoder.resolve(&Operand::Immediate(0x1234), dummy_span());
        assert_eq!(word, 0x1234);
        assert!(encoder.errors.is_empty());
    }

    #[test]
    fn resolve_defined_label_looks_up_its_address() {
        let mut table = SymbolTable::new();
        table.insert("LOOP".to_string(), 0x3000);
        let mut encoder = Encoder::new(&table);
        let word = encoder.resolve(&Operand::Label("LOOP".to_string()), dummy_span());
        assert_eq!(word, 0x3000);
        assert!(encoder.errors.is_empty());
    }

    #[test]
    fn resolve_undefined_symbol_emits_zero_and_records_an_error() {
        let table = SymbolTable::new();
        let mut encoder = Encoder::new(&table);
        let span = dummy_span();
        let word = encoder.resolve(&Operand::Label("MISSING".to_string()), span);
        assert_eq!(word, 0);
        assert_eq!(encoder.errors.len(), 1);
        assert_eq!(encoder.errors[0].kind, ErrorKind::UndefinedSymbol);
        assert_eq!(encoder.errors[0].span, span);
    }

    #[test]
    fn emit_appends_sequentially_from_zero() {
        let table = SymbolTable::new();
        let mut encoder = Encoder::new(&table);
        encoder.emit(0xAAAA);
        encoder.emit(0xBBBB);
        assert_eq!(encoder.machine_code, vec![0xAAAA, 0xBBBB]);
    }

    #[test]
    fn emit_after_a_forward_org_zero_fills_the_gap() {
        let table = SymbolTable::new();
        let mut encoder = Encoder::new(&table);
        encoder.emit(0x1111);
        encoder.current_address = 4; // as a forward `.ORG` would set it
        encoder.emit(0x2222);
        assert_eq!(encoder.machine_code, vec![0x1111, 0, 0, 0, 0x2222]);
    }

    #[test]
    fn emit_wraps_the_location_counter_modulo_2_16() {
        let table = SymbolTable::new();
        let mut encoder = Encoder::new(&table);
        encoder.current_address = 0xFFFF;
        encoder.emit(0x9999);
        assert_eq!(encoder.current_address, 0);
        assert_eq!(encoder.machine_code[0xFFFF], 0x9999);
    }
}
