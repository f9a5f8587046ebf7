//! # Token Types
//!
//! Defines all token types for SimpleCPU16 assembly language.
//!
//! ## Token Structure
//!
//! Each token contains:
//! - `kind`: The token type (opcode, register, literal, etc.)
//! - `lexeme`: The original text from source code
//! - `span`: Location in source for error reporting

use crate::error::Span;

/// A single lexical token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

/// Token types for SimpleCPU16 assembly language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Operands ===
    Register(u8), // R0-R7, or SP as an alias for R7

    NumDecimal(i32), // 123 or -45
    NumHex(i32),     // 0x3000
    NumChar(i32),    // 'c'

    StringLiteral(String), // "hello"

    /// A colon-terminated label definition (`loop:`); the name excludes the colon.
    LabelDef(String),
    /// Any other bare word that isn't a recognized mnemonic/directive/register:
    /// an unresolved symbolic reference used as an operand. Mirrors spec.md's
    /// "the parser disambiguates by context."
    Word(String),

    // === Assembler Directives ===
    DirOrg,    // .ORG
    DirWord,   // .WORD
    DirString, // .STRING / .ASCIIZ (synonyms)

    // === Mnemonics ===
    OpNop,
    OpLdi,
    OpLd,
    OpSt,
    OpMov,
    OpAdd,
    OpSub,
    OpMul,
    OpDiv,
    OpInc,
    OpDec,
    OpAddi,
    OpSubi,
    OpAnd,
    OpOr,
    OpXor,
    OpNot,
    OpShl,
    OpShr,
    OpSar,
    OpBeq,
    OpBne,
    OpBgt,
    OpBlt,
    OpBge,
    OpBle,
    OpBcs,
    OpBcc,
    OpJmp,
    OpPush,
    OpPop,
    OpCall,
    OpRet,
    OpCmp,
    OpHalt,

    // === Punctuation & Structural ===
    Comma,
    LBracket,
    RBracket,
    Newline,

    Eof,
}

impl TokenKind {
    pub fn is_mnemonic(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            OpNop
                | OpLdi
                | OpLd
                | OpSt
                | OpMov
                | OpAdd
                | OpSub
                | OpMul
                | OpDiv
                | OpInc
                | OpDec
                | OpAddi
                | OpSubi
                | OpAnd
                | OpOr
                | OpXor
                | OpNot
                | OpShl
                | OpShr
                | OpSar
                | OpBeq
                | OpBne
                | OpBgt
                | OpBlt
                | OpBge
                | OpBle
                | OpBcs
                | OpBcc
                | OpJmp
                | OpPush
                | OpPop
                | OpCall
                | OpRet
                | OpCmp
                | OpHalt
        )
    }

    pub fn is_instruction_or_directive(&self) -> bool {
        self.is_mnemonic() || matches!(self, TokenKind::DirOrg | TokenKind::DirWord | TokenKind::DirString)
    }
}

/// Recognizes a bare word as a register name: `R0`..`R7` (case-insensitive)
/// or `SP` as an alias for R7.
pub fn parse_register_name(word: &str) -> Option<u8> {
    if word.eq_ignore_ascii_case("sp") {
        return Some(7);
    }
    let bytes = word.as_bytes();
    if bytes.len() == 2 && (bytes[0] == b'R' || bytes[0] == b'r') && bytes[1].is_ascii_digit() {
        let n = bytes[1] - b'0';
        if n <= 7 {
            return Some(n);
        }
    }
    None
}

/// Recognizes a bare word as a known mnemonic, returning its `TokenKind`.
pub fn parse_mnemonic(word: &str) -> Option<TokenKind> {
    let upper = word.to_ascii_uppercase();
    Some(match upper.as_str() {
        "NOP" => TokenKind::OpNop,
        "LDI" => TokenKind::OpLdi,
        "LD" => TokenKind::OpLd,
        "ST" => TokenKind::OpSt,
        "MOV" => TokenKind::OpMov,
        "ADD" => TokenKind::OpAdd,
        "SUB" => TokenKind::OpSub,
        "MUL" => TokenKind::OpMul,
        "DIV" => TokenKind::OpDiv,
        "INC" => TokenKind::OpInc,
        "DEC" => TokenKind::OpDec,
        "ADDI" => TokenKind::OpAddi,
        "SUBI" => TokenKind::OpSubi,
        "AND" => TokenKind::OpAnd,
        "OR" => TokenKind::OpOr,
        "XOR" => TokenKind::OpXor,
        "NOT" => TokenKind::OpNot,
        "SHL" => TokenKind::OpShl,
        "SHR" => TokenKind::OpShr,
        "SAR" => TokenKind::OpSar,
        "BEQ" => TokenKind::OpBeq,
        "BNE" => TokenKind::OpBne,
        "BGT" => TokenKind::OpBgt,
        "BLT" => TokenKind::OpBlt,
        "BGE" => TokenKind::OpBge,
        "BLE" => TokenKind::OpBle,
        "BCS" => TokenKind::OpBcs,
        "BCC" => TokenKind::OpBcc,
        "JMP" => TokenKind::OpJmp,
        "PUSH" => TokenKind::OpPush,
        "POP" => TokenKind::OpPop,
        "CALL" => TokenKind::OpCall,
        "RET" => TokenKind::OpRet,
        "CMP" => TokenKind::OpCmp,
        "HALT" => TokenKind::OpHalt,
        _ => return None,
    })
}

/// Recognizes a bare word beginning with `.` as a known directive.
pub fn parse_directive(word: &str) -> Option<TokenKind> {
    let upper = word.to_ascii_uppercase();
    Some(match upper.as_str() {
        ".ORG" => TokenKind::DirOrg,
        ".WORD" => TokenKind::DirWord,
        ".STRING" | ".ASCIIZ" => TokenKind::DirString,
        _ => return None,
    })
}
