//! Canonical SimpleCPU16 instruction bit layout, shared between the
//! assembler's encoder and the emulator's decoder.
//!
//! Control word:
//!
//! ```text
//! bit  15 14 13 12 | 11 10  9 |  8  7  6 |  5  4  3  2  1  0
//!      [  opcode ] | [   Rd  ] | [   Rs  ] | [        mode      ]
//! ```

pub const OP_NOP: u16 = 0x0;
pub const OP_LOAD: u16 = 0x1;
pub const OP_STORE: u16 = 0x2;
pub const OP_MOVE: u16 = 0x3;
pub const OP_ARITH: u16 = 0x4;
pub const OP_LOGIC: u16 = 0x5;
pub const OP_SHIFT: u16 = 0x6;
pub const OP_BRANCH: u16 = 0x7;
pub const OP_JUMP: u16 = 0x8;
pub const OP_STACK: u16 = 0x9;
pub const OP_CALL: u16 = 0xA;
pub const OP_RET: u16 = 0xB;
pub const OP_CMP: u16 = 0xC;
pub const OP_HALT: u16 = 0xF;

pub const LOAD_IMM: u16 = 0;
pub const LOAD_DIR: u16 = 1;
pub const LOAD_IND: u16 = 2;

pub const STORE_DIR: u16 = 0;
pub const STORE_IND: u16 = 1;

pub const ARITH_ADD: u16 = 0;
pub const ARITH_SUB: u16 = 1;
pub const ARITH_MUL: u16 = 2;
pub const ARITH_DIV: u16 = 3;
pub const ARITH_INC: u16 = 4;
pub const ARITH_DEC: u16 = 5;
pub const ARITH_ADDI: u16 = 6;
pub const ARITH_SUBI: u16 = 7;

pub const LOGIC_AND: u16 = 0;
pub const LOGIC_OR: u16 = 1;
pub const LOGIC_XOR: u16 = 2;
pub const LOGIC_NOT: u16 = 3;

pub const SHIFT_SHL: u16 = 0;
pub const SHIFT_SHR: u16 = 1;
pub const SHIFT_SAR: u16 = 2;

pub const BRANCH_EQ: u16 = 0;
pub const BRANCH_NE: u16 = 1;
pub const BRANCH_GT: u16 = 2;
pub const BRANCH_LT: u16 = 3;
pub const BRANCH_GE: u16 = 4;
pub const BRANCH_LE: u16 = 5;
pub const BRANCH_CS: u16 = 6;
pub const BRANCH_CC: u16 = 7;

pub const STACK_PUSH: u16 = 0;
pub const STACK_POP: u16 = 1;

/// Memory-mapped I/O window: everything from here up is dispatched to the
/// host shim instead of plain RAM.
pub const MMIO_START: u16 = 0xF800;

pub const MMIO_CHAR_OUT: u16 = 0xF800;
pub const MMIO_INT_OUT: u16 = 0xF801;
pub const MMIO_STR_OUT: u16 = 0xF802;
pub const MMIO_TIMER: u16 = 0xF810;
pub const MMIO_CHAR_IN: u16 = 0xF820;

pub const STACK_START: u16 = 0xE000;

/// Packs a control word from its four fields. `rd`/`rs` are masked to 3 bits,
/// `mode` to 6 bits.
pub const fn encode_control(opcode: u16, rd: u16, rs: u16, mode: u16) -> u16 {
    (opcode & 0xF) << 12 | (rd & 0x7) << 9 | (rs & 0x7) << 6 | (mode & 0x3F)
}

pub struct DecodedControl {
    pub opcode: u16,
    pub rd: u16,
    pub rs: u16,
    pub mode: u16,
}

pub const fn decode_control(word: u16) -> DecodedControl {
    DecodedControl {
        opcode: (word >> 12) & 0xF,
        rd: (word >> 9) & 0x7,
        rs: (word >> 6) & 0x7,
        mode: word & 0x3F,
    }
}

/// Number of extra (non-control) words a given opcode/mode combination
/// consumes. Used by the assembler's pass-1 sizing and by the emulator's
/// fetch/decode loop.
pub const fn extra_words(opcode: u16, mode: u16) -> u16 {
    match opcode {
        OP_LOAD => match mode {
            LOAD_IMM | LOAD_DIR => 1,
            _ => 0,
        },
        OP_STORE => match mode {
            STORE_DIR => 1,
            _ => 0,
        },
        OP_ARITH => match mode {
            ARITH_ADDI | ARITH_SUBI => 1,
            _ => 0,
        },
        OP_BRANCH | OP_JUMP | OP_CALL => 1,
        _ => 0,
    }
}
