use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use simplecpu16_sim::cpu::{Cpu, DEFAULT_INSTRUCTION_BUDGET};
use simplecpu16_sim::debugger;
use simplecpu16_sim::host::StdioHost;

/// Instruction-set emulator and TUI step debugger for SimpleCPU16.
#[derive(Parser, Debug)]
#[command(name = "scpu16-sim", version, about)]
struct Cli {
    /// Input binary image (little-endian words), or assembly source when `--asm` is set
    input: PathBuf,

    /// Assemble `input` as SimpleCPU16 source before running, instead of
    /// loading it as a pre-assembled binary image
    #[arg(long)]
    asm: bool,

    /// Address to load the program at
    #[arg(long, value_parser = parse_address, default_value_t = 0)]
    load_base: u16,

    /// Print a per-instruction execution trace to stdout
    #[arg(long)]
    trace: bool,

    /// Write a register dump and every non-zero memory cell to this file after halting
    #[arg(long)]
    memdump: Option<PathBuf>,

    /// Launch the interactive step debugger instead of running to completion
    #[arg(long)]
    debug: bool,

    /// Instruction budget before the watchdog stops execution (spec.md §5)
    #[arg(long, default_value_t = DEFAULT_INSTRUCTION_BUDGET)]
    budget: u64,
}

fn parse_address(s: &str) -> Result<u16, String> {
    let parsed =
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u16::from_str_radix(hex, 16)
        } else {
            s.parse::<u16>()
        };
    parsed.map_err(|e| format!("invalid address '{s}': {e}"))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let program = match load_program_words(&cli) {
        Ok(words) => words,
        Err(code) => return code,
    };

    let mut cpu = Cpu::new();
    if let Err(err) = cpu.load_program(&program, cli.load_base) {
        error!("{err}");
        return ExitCode::FAILURE;
    }
    info!("loaded {} words at 0x{:04X}", program.len(), cli.load_base);

    let mut run_error = None;

    if cli.debug {
        if let Err(err) = debugger::run(&mut cpu) {
            error!("debugger error: {err}");
            return ExitCode::FAILURE;
        }
    } else if cli.trace {
        run_error = run_with_trace(&mut cpu, cli.budget);
    } else {
        let mut host = StdioHost;
        run_error = cpu.run_with_budget(cli.budget, &mut host).err();
    }

    dump_registers(&cpu);

    if let Some(path) = &cli.memdump {
        if let Err(err) = dump_memory(&cpu, path) {
            error!("failed to write memdump {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
        info!("memory dump written to {}", path.display());
    }

    if let Some(err) = run_error {
        error!("{err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn load_program_words(cli: &Cli) -> Result<Vec<u16>, ExitCode> {
    if cli.asm {
        let source = fs::read_to_string(&cli.input).map_err(|err| {
            error!("failed to read {}: {err}", cli.input.display());
            ExitCode::FAILURE
        })?;
        info!("assembling {}", cli.input.display());
        let assembled = simplecpu16_asm::assemble(&source);
        for err in &assembled.errors {
            eprintln!("{err}");
        }
        Ok(assembled.machine_code)
    } else {
        let bytes = fs::read(&cli.input).map_err(|err| {
            error!("failed to read {}: {err}", cli.input.display());
            ExitCode::FAILURE
        })?;
        if bytes.len() % 2 != 0 {
            error!("binary image {} has an odd number of bytes", cli.input.display());
            return Err(ExitCode::FAILURE);
        }
        Ok(bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect())
    }
}

/// Runs to completion printing a per-instruction trace, mirroring the
/// reference's `cpu_step(cpu, trace=true)` console output.
fn run_with_trace(cpu: &mut Cpu, budget: u64) -> Option<simplecpu16_sim::error::EmuError> {
    let mut host = StdioHost;
    while !cpu.halted {
        if cpu.cycle_count >= budget {
            return Some(simplecpu16_sim::error::EmuError::BudgetExhausted { budget });
        }
        let pc_before = cpu.pc;
        let step_result = cpu.step(&mut host);
        println!(
            "[{:>7}] PC=0x{pc_before:04X} IR=0x{:04X} R={:?} SP=0x{:04X} Z={} N={} C={}",
            cpu.cycle_count,
            cpu.ir,
            &cpu.registers[..7],
            cpu.registers[7],
            cpu.flags.z as u8,
            cpu.flags.n as u8,
            cpu.flags.c as u8,
        );
        if let Err(err) = step_result {
            return Some(err);
        }
    }
    None
}

/// Register/flag dump in the reference's `cpu_dump_registers` format.
fn dump_registers(cpu: &Cpu) {
    println!("=== Register Dump ===");
    for (i, value) in cpu.registers.iter().enumerate() {
        println!("R{i}: 0x{value:04X} ({value})");
    }
    println!("PC: 0x{:04X}", cpu.pc);
    println!(
        "Flags: Z={} N={} C={} V={}",
        cpu.flags.z as u8, cpu.flags.n as u8, cpu.flags.c as u8, cpu.flags.v as u8
    );
    println!("Cycles: {}", cpu.cycle_count);
}

/// Non-zero memory cells in the reference's `cpu_dump_memory` format.
fn dump_memory(cpu: &Cpu, path: &PathBuf) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    writeln!(file, "Memory Dump")?;
    writeln!(file, "===========")?;
    writeln!(file)?;
    for (addr, word) in cpu.memory.iter_nonzero() {
        writeln!(file, "0x{addr:04X}: 0x{word:04X} ({word})")?;
    }
    Ok(())
}
