use thiserror::Error;

/// Runtime error surfaced by the emulator. Every variant is recovered in
/// place (the step loop halts) rather than unwound across the call stack,
/// per spec.md §7's "no error is thrown out of the core" rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmuError {
    #[error("unknown opcode 0x{opcode:X} at pc=0x{pc:04X}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("instruction budget of {budget} exhausted (possible infinite loop)")]
    BudgetExhausted { budget: u64 },

    #[error("program of {size} words does not fit at load address 0x{load_base:04X}")]
    ProgramTooLarge { size: usize, load_base: u16 },
}
