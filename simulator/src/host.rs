//! Host I/O shim (spec.md §4.7 / C7): the final sink/source for MMIO traffic.
//!
//! `HostIo` decouples the CPU/memory core from wherever bytes actually go,
//! the same separation `snacchus-vcpu`'s `IOHandler` trait draws between
//! memory-mapped writes and their side effects. [`StdioHost`] is the real
//! terminal-backed implementation the `scpu16-sim` binary uses; [`BufferedHost`]
//! is an in-memory test double that also backs [`crate::run_words`].

use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// Sink/source for the five MMIO ports in spec.md §6. Every method is
/// infallible from the CPU's point of view: a host that can't actually
/// write (a closed pipe, say) has nothing useful to report back into the
/// single-threaded execution loop, so failures are swallowed here rather
/// than threaded through `Cpu::step`.
pub trait HostIo {
    /// `MMIO_CHAR_OUT` (0xF800): emit one character byte.
    fn out_char(&mut self, byte: u8);

    /// `MMIO_INT_OUT` (0xF801): emit a signed decimal integer followed by `\n`.
    fn out_int(&mut self, value: i16);

    /// `MMIO_STR_OUT` (0xF802): emit a run of ASCII bytes already unpacked
    /// from memory by the caller (the packed two-bytes-per-word walk is
    /// [`crate::memory::Memory`]'s job, since it alone owns the word array).
    fn out_string(&mut self, bytes: &[u8]);

    /// `MMIO_CHAR_IN` (0xF820): block until one character is available from
    /// the host and return its code in the low 8 bits.
    fn in_char(&mut self) -> u16;
}

/// Real stdin/stdout, used by the `scpu16-sim` binary.
#[derive(Debug, Default)]
pub struct StdioHost;

impl HostIo for StdioHost {
    fn out_char(&mut self, byte: u8) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(&[byte]);
        let _ = stdout.flush();
    }

    fn out_int(&mut self, value: i16) {
        println!("{value}");
    }

    fn out_string(&mut self, bytes: &[u8]) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(bytes);
        let _ = stdout.flush();
    }

    fn in_char(&mut self) -> u16 {
        let mut byte = [0u8; 1];
        match io::stdin().read_exact(&mut byte) {
            Ok(()) => byte[0] as u16,
            Err(_) => 0,
        }
    }
}

/// In-memory host: output accumulates in a byte buffer, input is drained
/// from a pre-seeded queue. Used by tests and by [`crate::run_words`], the
/// library-level "run a word sequence, get output bytes and final machine
/// state" operation spec.md §1 names as the emulator's external contract.
#[derive(Debug, Default, Clone)]
pub struct BufferedHost {
    pub output: Vec<u8>,
    input: VecDeque<u8>,
}

impl BufferedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the input queue `MMIO_CHAR_IN` will drain from, in order.
    pub fn with_input(bytes: &[u8]) -> Self {
        Self { output: Vec::new(), input: bytes.iter().copied().collect() }
    }

    pub fn push_input(&mut self, byte: u8) {
        self.input.push_back(byte);
    }
}

impl HostIo for BufferedHost {
    fn out_char(&mut self, byte: u8) {
        self.output.push(byte);
    }

    fn out_int(&mut self, value: i16) {
        self.output.extend_from_slice(value.to_string().as_bytes());
        self.output.push(b'\n');
    }

    fn out_string(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    fn in_char(&mut self) -> u16 {
        self.input.pop_front().map_or(0, |b| b as u16)
    }
}
