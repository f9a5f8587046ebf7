//! CPU core (spec.md §4.6 / C6): registers, flags, program counter,
//! fetch/decode/execute, call/return via the stack.
//!
//! Dispatch is a single `match` over the 4-bit opcode extracted by
//! [`simplecpu16_asm::encoding::decode_control`] — spec.md §9 explicitly
//! asks for a plain integer switch over virtual dispatch, which is also how
//! the teacher's own encoder/parser pick their instruction variant.

use log::debug;
use simplecpu16_asm::encoding::*;

use crate::error::EmuError;
use crate::host::HostIo;
use crate::memory::Memory;

/// Watchdog against unbounded loops: spec.md §5 names 1,000,000 instructions
/// as the reference budget. Reaching it halts execution and is reported,
/// not silently swallowed.
pub const DEFAULT_INSTRUCTION_BUDGET: u64 = 1_000_000;

/// Z/N/C/V status bits, updated only by arithmetic/logic/shift/compare
/// instructions (spec.md §3). `V` is declared but never computed — an Open
/// Question spec.md §9 explicitly permits leaving permanently false for
/// bit-exact compatibility with the reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub z: bool,
    pub n: bool,
    pub c: bool,
    pub v: bool,
}

/// The full machine state: eight registers (R7 is SP), flags, PC/IR, the
/// 64K-word memory, the halted latch, and a monotonic cycle counter.
/// Created fresh per run — no process-wide mutable state (spec.md §9).
pub struct Cpu {
    pub registers: [u16; 8],
    pub pc: u16,
    pub ir: u16,
    pub flags: Flags,
    pub memory: Memory,
    pub halted: bool,
    pub cycle_count: u64,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Reset state: R0-R6 = 0, SP = `STACK_START` (0xE000), PC = 0, flags
    /// clear, not halted, zero cycles. Memory is zero-initialized.
    pub fn new() -> Self {
        let mut registers = [0u16; 8];
        registers[7] = STACK_START;
        Self {
            registers,
            pc: 0,
            ir: 0,
            flags: Flags::default(),
            memory: Memory::new(),
            halted: false,
            cycle_count: 0,
        }
    }

    /// Copies `program` into memory at `load_base` and sets PC to `load_base`,
    /// matching the reference loader's `cpu_load_program` exactly (including
    /// its size check, here surfaced as an `Err` rather than a stderr print).
    pub fn load_program(&mut self, program: &[u16], load_base: u16) -> Result<(), EmuError> {
        if load_base as usize + program.len() > 0x1_0000 {
            return Err(EmuError::ProgramTooLarge { size: program.len(), load_base });
        }
        self.memory.load(program, load_base);
        self.pc = load_base;
        Ok(())
    }

    fn fetch(&mut self, host: &mut dyn HostIo) -> u16 {
        let word = self.memory.read(self.pc, self.cycle_count, host);
        self.ir = word;
        self.pc = self.pc.wrapping_add(1);
        word
    }

    /// Runs until halted or `budget` instructions have executed. Returns
    /// `Err(BudgetExhausted)` if the watchdog fires, `Err(UnknownOpcode)` if
    /// decode hits an unrecognized opcode (the CPU is left halted either
    /// way — both are terminal for this single thread of control).
    pub fn run_with_budget(&mut self, budget: u64, host: &mut dyn HostIo) -> Result<(), EmuError> {
        while !self.halted {
            if self.cycle_count >= budget {
                self.halted = true;
                return Err(EmuError::BudgetExhausted { budget });
            }
            self.step(host)?;
        }
        Ok(())
    }

    pub fn run(&mut self, host: &mut dyn HostIo) -> Result<(), EmuError> {
        self.run_with_budget(DEFAULT_INSTRUCTION_BUDGET, host)
    }

    /// Executes exactly one instruction: fetch, decode, fetch any extra
    /// word, execute, then bumps the cycle counter. A no-op once halted.
    pub fn step(&mut self, host: &mut dyn HostIo) -> Result<(), EmuError> {
        if self.halted {
            return Ok(());
        }

        let pc_before = self.pc;
        let word = self.fetch(host);
        let decoded = decode_control(word);
        debug!("fetch pc=0x{pc_before:04X} ir=0x{word:04X} op=0x{:X}", decoded.opcode);

        // `extra_words` is the single source of truth (shared with the
        // assembler's pass-1 sizing) for whether this opcode/mode pair
        // consumes a second word; the fetch happens here, once, rather
        // than scattered across each opcode's own handler.
        let extra = (extra_words(decoded.opcode, decoded.mode) > 0).then(|| self.fetch(host));

        let result = self.execute(decoded.opcode, decoded.rd, decoded.rs, decoded.mode, extra, host);
        self.cycle_count += 1;
        result
    }

    fn execute(
        &mut self,
        opcode: u16,
        rd: u16,
        rs: u16,
        mode: u16,
        extra: Option<u16>,
        host: &mut dyn HostIo,
    ) -> Result<(), EmuError> {
        let rd = rd as usize;
        let rs = rs as usize;
        let extra_word = || extra.expect("extra_words() promised a second word for this opcode/mode");

        match opcode {
            OP_NOP => {}

            OP_LOAD => match mode {
                LOAD_IMM => {
                    self.registers[rd] = extra_word();
                }
                LOAD_DIR => {
                    let addr = extra_word();
                    self.registers[rd] = self.memory.read(addr, self.cycle_count, host);
                }
                LOAD_IND => {
                    let addr = self.registers[rs];
                    self.registers[rd] = self.memory.read(addr, self.cycle_count, host);
                }
                _ => {}
            },

            OP_STORE => match mode {
                STORE_DIR => {
                    let addr = extra_word();
                    self.memory.write(addr, self.registers[rs], host);
                }
                STORE_IND => {
                    let addr = self.registers[rd];
                    self.memory.write(addr, self.registers[rs], host);
                }
                _ => {}
            },

            OP_MOVE => self.registers[rd] = self.registers[rs],

            OP_ARITH => self.execute_arith(rd, rs, mode, extra),

            OP_LOGIC => self.execute_logic(rd, rs, mode),

            OP_SHIFT => self.execute_shift(rd, rs, mode),

            OP_BRANCH => {
                let target = extra_word();
                if self.branch_condition(mode) {
                    self.pc = target;
                }
            }

            OP_JUMP => {
                self.pc = extra_word();
            }

            OP_STACK => match mode {
                STACK_PUSH => {
                    self.registers[7] = self.registers[7].wrapping_sub(1);
                    let sp = self.registers[7];
                    self.memory.write(sp, self.registers[rs], host);
                }
                STACK_POP => {
                    let sp = self.registers[7];
                    self.registers[rd] = self.memory.read(sp, self.cycle_count, host);
                    self.registers[7] = self.registers[7].wrapping_add(1);
                }
                _ => {}
            },

            OP_CALL => {
                let target = extra_word();
                self.registers[7] = self.registers[7].wrapping_sub(1);
                let sp = self.registers[7];
                // PC already points past the target word: the address of
                // the instruction following CALL, correct for RET.
                self.memory.write(sp, self.pc, host);
                self.pc = target;
            }

            OP_RET => {
                let sp = self.registers[7];
                self.pc = self.memory.read(sp, self.cycle_count, host);
                self.registers[7] = self.registers[7].wrapping_add(1);
            }

            OP_CMP => {
                let full = (self.registers[rd] as u32).wrapping_sub(self.registers[rs] as u32);
                let result = full as u16;
                self.update_flags(result, Some(full > 0xFFFF));
            }

            OP_HALT => self.halted = true,

            _ => {
                self.halted = true;
                return Err(EmuError::UnknownOpcode { opcode, pc: self.pc.wrapping_sub(1) });
            }
        }
        Ok(())
    }

    fn execute_arith(&mut self, rd: usize, rs: usize, mode: u16, extra: Option<u16>) {
        match mode {
            ARITH_ADD => {
                let full = self.registers[rd] as u32 + self.registers[rs] as u32;
                self.registers[rd] = full as u16;
                self.update_flags(full as u16, Some(full > 0xFFFF));
            }
            ARITH_SUB => {
                let full = (self.registers[rd] as u32).wrapping_sub(self.registers[rs] as u32);
                self.registers[rd] = full as u16;
                self.update_flags(full as u16, Some(full > 0xFFFF));
            }
            ARITH_MUL => {
                let full = self.registers[rd] as u32 * self.registers[rs] as u32;
                self.registers[rd] = full as u16;
                self.update_flags(full as u16, Some(full > 0xFFFF));
            }
            ARITH_DIV => {
                // Division by zero is a deliberate design choice, not an
                // error: Rd and flags are left untouched, no trap.
                if self.registers[rs] != 0 {
                    let result = self.registers[rd] / self.registers[rs];
                    self.registers[rd] = result;
                    self.update_flags(result, None);
                }
            }
            ARITH_INC => {
                self.registers[rd] = self.registers[rd].wrapping_add(1);
                self.update_flags(self.registers[rd], None);
            }
            ARITH_DEC => {
                self.registers[rd] = self.registers[rd].wrapping_sub(1);
                self.update_flags(self.registers[rd], None);
            }
            ARITH_ADDI => {
                let imm = extra.expect("extra_words() promised a second word for ADDI");
                let full = self.registers[rd] as u32 + imm as u32;
                self.registers[rd] = full as u16;
                self.update_flags(full as u16, Some(full > 0xFFFF));
            }
            ARITH_SUBI => {
                let imm = extra.expect("extra_words() promised a second word for SUBI");
                let full = (self.registers[rd] as u32).wrapping_sub(imm as u32);
                self.registers[rd] = full as u16;
                self.update_flags(full as u16, Some(full > 0xFFFF));
            }
            _ => {}
        }
    }

    fn execute_logic(&mut self, rd: usize, rs: usize, mode: u16) {
        let result = match mode {
            LOGIC_AND => self.registers[rd] & self.registers[rs],
            LOGIC_OR => self.registers[rd] | self.registers[rs],
            LOGIC_XOR => self.registers[rd] ^ self.registers[rs],
            LOGIC_NOT => !self.registers[rd],
            _ => return,
        };
        self.registers[rd] = result;
        self.update_flags(result, None);
    }

    fn execute_shift(&mut self, rd: usize, rs: usize, mode: u16) {
        let amount = self.registers[rs] & 0xF;
        let result = match mode {
            SHIFT_SHL => self.registers[rd] << amount,
            SHIFT_SHR => self.registers[rd] >> amount,
            SHIFT_SAR => ((self.registers[rd] as i16) >> amount) as u16,
            _ => return,
        };
        self.registers[rd] = result;
        self.update_flags(result, None);
    }

    fn branch_condition(&self, mode: u16) -> bool {
        let f = &self.flags;
        match mode {
            BRANCH_EQ => f.z,
            BRANCH_NE => !f.z,
            BRANCH_GT => !f.n && !f.z,
            BRANCH_LT => f.n,
            BRANCH_GE => !f.n,
            BRANCH_LE => f.n || f.z,
            BRANCH_CS => f.c,
            BRANCH_CC => !f.c,
            _ => false,
        }
    }

    /// `Z <- result == 0`, `N <- bit 15 of result`. `carry` is `Some(_)` only
    /// for the add/sub/mul/cmp family that touches C; everything else
    /// passes `None` to leave C untouched, per spec.md §4.6.
    fn update_flags(&mut self, result: u16, carry: Option<bool>) {
        self.flags.z = result == 0;
        self.flags.n = (result >> 15) & 1 == 1;
        if let Some(c) = carry {
            self.flags.c = c;
        }
    }
}
