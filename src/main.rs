use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

/// Two-pass assembler for SimpleCPU16, a didactic 16-bit virtual computer.
#[derive(Parser, Debug)]
#[command(name = "scpu16-asm", version, about)]
struct Cli {
    /// Input assembly source file
    input: PathBuf,

    /// Output binary image path
    #[arg(short, long, default_value = "a.bin")]
    output: PathBuf,

    /// Print the resolved symbol table after assembly
    #[arg(long)]
    symbols: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.input) {
        Ok(s) => s,
        Err(err) => {
            error!("failed to read {}: {err}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    info!("assembling {}", cli.input.display());
    let lexed = simplecpu16_asm::lexer::tokenize(&source);
    let parsed = simplecpu16_asm::parser::parse_lines(&lexed.tokens);
    let first = simplecpu16_asm::first_pass::first_pass(parsed.lines);
    let encoded = simplecpu16_asm::encoder::encode(&first);

    let mut had_errors = false;
    for err in lexed.errors.iter().chain(&parsed.errors).chain(&first.errors).chain(&encoded.errors) {
        had_errors = true;
        eprintln!("{err}");
    }

    if cli.symbols {
        first.symbol_table.print_table();
    }

    let mut bytes = Vec::with_capacity(encoded.machine_code.len() * 2);
    for word in &encoded.machine_code {
        bytes.extend_from_slice(&word.to_le_bytes());
    }

    if let Err(err) = fs::write(&cli.output, &bytes) {
        error!("failed to write {}: {err}", cli.output.display());
        return ExitCode::FAILURE;
    }

    info!("wrote {} words ({} bytes) to {}", encoded.machine_code.len(), bytes.len(), cli.output.display());

    if had_errors {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
