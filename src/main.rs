use std::fs;
use std::path::PathBuf;

use clap::Parser;
use intcode::decode::disassemble;
use intcode::ports::{InputError, InputPort, ScriptedInput};
use intcode::program::parse_program;
use intcode::vm::Vm;

#[derive(Parser)]
#[command(name = "intcode", about = "Intcode virtual machine: run or inspect a program image")]
struct Cli {
    /// Path to the program image: one line of comma-separated integers.
    program: PathBuf,

    /// Comma-separated values fed to the input port in order. Without this,
    /// inputs are read interactively from stdin.
    #[arg(long)]
    input: Option<String>,

    /// Render outputs as ASCII characters instead of one integer per line.
    #[arg(long)]
    ascii: bool,

    /// Print each instruction to stderr as it executes.
    #[arg(long)]
    trace: bool,

    /// Print a disassembly of the image instead of running it.
    #[arg(long)]
    disassemble: bool,
}

fn main() {
    let cli = Cli::parse();

    let line = match fs::read_to_string(&cli.program) {
        Ok(line) => line,
        Err(e) => {
            eprintln!("failed to read {}: {e}", cli.program.display());
            std::process::exit(1);
        }
    };
    let image = match parse_program(&line) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("failed to parse {}: {e}", cli.program.display());
            std::process::exit(1);
        }
    };

    if cli.disassemble {
        print!("{}", disassemble(&image));
        return;
    }

    match &cli.input {
        Some(script) => match parse_program(script) {
            Ok(values) => run(&cli, &image, ScriptedInput::new(values)),
            Err(e) => {
                eprintln!("failed to parse --input: {e}");
                std::process::exit(1);
            }
        },
        None => run(&cli, &image, StdinInput),
    }
}

fn run<I: InputPort>(cli: &Cli, image: &[i64], input: I) {
    let ascii = cli.ascii;
    let output = move |value: i64| {
        if ascii {
            // Out-of-range values (e.g. a final score after an ASCII dump)
            // fall back to numeric form.
            match u8::try_from(value) {
                Ok(byte) => print!("{}", byte as char),
                Err(_) => println!("{value}"),
            }
        } else {
            println!("{value}");
        }
    };

    let mut vm = Vm::new(image, input, output);
    vm.set_trace(cli.trace);
    if let Err(e) = vm.run_to_halt() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

/// Interactive input port: prompts on stderr and reads one integer per line.
struct StdinInput;

impl InputPort for StdinInput {
    fn next(&mut self) -> Result<i64, InputError> {
        eprint!("> ");
        let mut line = String::new();
        let n = std::io::stdin()
            .read_line(&mut line)
            .map_err(|e| InputError(e.to_string()))?;
        if n == 0 {
            return Err(InputError("stdin closed".to_string()));
        }
        line.trim()
            .parse::<i64>()
            .map_err(|e| InputError(format!("invalid input {:?}: {e}", line.trim())))
    }
}
