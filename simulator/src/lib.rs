//! # SimpleCPU16 Emulator
//!
//! Instruction-set emulator for SimpleCPU16, a didactic 16-bit virtual
//! computer. Pairs with `simplecpu16_asm` across a single shared contract:
//! the flat binary image of 16-bit words the assembler emits and this crate
//! loads and runs.
//!
//! ## Pipeline
//!
//! 1. **Memory** (`memory`) — the 64K-word address space and its MMIO window.
//! 2. **Host I/O** (`host`) — the sink/source MMIO traffic is dispatched to.
//! 3. **CPU core** (`cpu`) — registers, flags, fetch/decode/execute.
//!
//! ## Example
//!
//! ```rust,no_run
//! let source = std::fs::read_to_string("program.asm").unwrap();
//! let assembled = simplecpu16_asm::assemble(&source);
//! let result = simplecpu16_sim::run_words(&assembled.machine_code, 0x0000);
//! println!("{}", String::from_utf8_lossy(&result.output));
//! ```

pub mod cpu;
pub mod debugger;
pub mod error;
pub mod host;
pub mod memory;

use cpu::{Cpu, Flags};
use error::EmuError;
use host::BufferedHost;

/// Final machine state and captured host output from a completed (or
/// halted-on-error) run — the "run-word-sequence operation producing output
/// bytes and a final machine state for inspection" spec.md §1 names as the
/// emulator's external contract.
pub struct RunResult {
    pub output: Vec<u8>,
    pub registers: [u16; 8],
    pub flags: Flags,
    pub pc: u16,
    pub cycle_count: u64,
    pub halted: bool,
    pub error: Option<EmuError>,
}

/// Loads `words` at `load_base` into a fresh [`Cpu`], runs it to completion
/// against a [`BufferedHost`], and returns the resulting output bytes plus
/// final machine state. This is the collaborator-facing entry point:
/// argument parsing, file I/O, and trace/memdump formatting live in the
/// `scpu16-sim` binary, not here.
#[must_use]
pub fn run_words(words: &[u16], load_base: u16) -> RunResult {
    let mut cpu = Cpu::new();
    let mut host = BufferedHost::new();

    let error = match cpu.load_program(words, load_base) {
        Ok(()) => cpu.run(&mut host).err(),
        Err(err) => Some(err),
    };

    RunResult {
        output: host.output,
        registers: cpu.registers,
        flags: cpu.flags,
        pc: cpu.pc,
        cycle_count: cpu.cycle_count,
        halted: cpu.halted,
        error,
    }
}
