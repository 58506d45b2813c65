use std::{
    fs,
    io::{self, BufRead, Write},
    ops::Range,
    path::PathBuf,
    process::ExitCode,
    sync::atomic::Ordering,
};

use clap::Parser;
use intcode_base::{
    opcode::disassemble,
    parser::parse_program,
    runner::{Machine, MachineConfig, DEFAULT_CAPACITY},
    vm::{Input, Status},
};

#[macro_use]
mod log;

#[derive(Parser)]
#[command(version, about, long_about, arg_required_else_help(true))]
struct Args {
    /// Program file to execute
    file: PathBuf,

    /// Input values, comma separated. Can be repeated
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    input: Vec<i64>,

    /// Cell delimiter of the program file
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Memory size in cells
    #[arg(short, long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Read more input from stdin whenever the program runs out of it
    #[arg(long)]
    interactive: bool,

    /// Print every output value as soon as it is produced
    #[arg(long)]
    pause_on_output: bool,

    /// Print disassembly of the program
    #[arg(long)]
    disassemble: bool,

    /// Do not execute file
    #[arg(short, long)]
    no_exec: bool,

    /// Print memory cells START..END after execution
    #[arg(long, value_name = "START..END", value_parser = parse_range)]
    dump: Option<Range<usize>>,

    /// Print warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let Args {
        file,
        input,
        delimiter,
        capacity,
        interactive,
        pause_on_output,
        disassemble,
        no_exec,
        dump,
        quiet,
    } = Args::parse();
    log::QUIET.store(quiet, Ordering::Relaxed);

    let source = match fs::read_to_string(&file) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to read {}: {e}", file.display());

            return ExitCode::FAILURE;
        }
    };
    let program = match parse_program(&source, delimiter) {
        Ok(v) => v,
        Err(e) => {
            error!("{}: {e}", file.display());

            return ExitCode::FAILURE;
        }
    };
    info!("loaded {} cells from {}", program.len(), file.display());

    if disassemble {
        print_listing(&program);
    }
    if no_exec {
        return ExitCode::SUCCESS;
    }

    let name = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let config = MachineConfig::new()
        .capacity(capacity)
        .pause_on_output(pause_on_output)
        .pause_on_input(interactive)
        .name(name);
    let mut ic = match Machine::with_config(&program, config) {
        Ok(v) => v,
        Err(e) => {
            error!("vm-error: {e}");

            return ExitCode::FAILURE;
        }
    };

    let mut pending = Input::from(input);
    let mut printed = 0;
    let mut stdin = io::stdin().lock();

    loop {
        let result = ic.run(pending);
        pending = ic.take_pending_input();
        printed = print_output(ic.output(), printed);

        let status = match result {
            Ok(s) => s,
            Err(e) => {
                error!("runtime-error: {ic}: {e}");

                return ExitCode::FAILURE;
            }
        };

        match status {
            Status::Halted => break,
            Status::Paused if ic.awaiting_input() => loop {
                eprint!("{ic} input> ");
                match read_input(&mut stdin) {
                    Ok(Some(values)) => {
                        pending.extend(values);
                        break;
                    }
                    Ok(None) => {
                        error!("{ic}: input required but stdin is closed");

                        return ExitCode::FAILURE;
                    }
                    Err(e) => warn!("{e}"),
                }
            },
            Status::Paused | Status::Running => continue,
        }
    }

    if !pending.is_empty() {
        warn!("{} input value(s) left unconsumed", pending.len());
    }
    info!(
        "{ic} halted at {} with {} output value(s)",
        ic.pointer(),
        ic.output().len()
    );

    if let Some(range) = dump {
        dump_memory(ic.memory(), range);
    }

    ExitCode::SUCCESS
}

/// Prints `output[from..]` one value per line, returns the new count.
fn print_output(output: &[i64], from: usize) -> usize {
    let mut stdout = io::stdout().lock();
    for v in &output[from..] {
        _ = writeln!(stdout, "{v}");
    }
    _ = stdout.flush();
    output.len()
}

fn print_listing(program: &[i64]) {
    let mut stdout = io::stdout().lock();
    for (addr, instr) in disassemble(program, 0) {
        _ = match instr {
            Ok(instr) => writeln!(stdout, "{addr:>6}  {instr}"),
            Err(_) => writeln!(stdout, "{addr:>6}  .data {}", program[addr]),
        };
    }
}

fn dump_memory(memory: &[i64], range: Range<usize>) {
    let end = range.end.min(memory.len());
    if end < range.end {
        warn!("dump range clipped to memory size {}", memory.len());
    }

    let mut stdout = io::stdout().lock();
    for addr in range.start..end {
        _ = writeln!(stdout, "{addr:>6}: {}", memory[addr]);
    }
}

/// Reads one line of comma separated values. [`None`] on end of input.
fn read_input(reader: &mut impl BufRead) -> Result<Option<Vec<i64>>, String> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => Ok(None),
        Ok(_) => parse_program(&line, ',')
            .map(Some)
            .map_err(|e| format!("bad input: {e}")),
        Err(e) => Err(format!("failed to read stdin: {e}")),
    }
}

fn parse_range(s: &str) -> Result<Range<usize>, String> {
    let Some((start, end)) = s.split_once("..") else {
        return Err("expected START..END".to_string());
    };
    let start: usize = start.trim().parse().map_err(|e| format!("bad start: {e}"))?;
    let end: usize = end.trim().parse().map_err(|e| format!("bad end: {e}"))?;

    if start > end {
        return Err(format!("start {start} is past end {end}"));
    }
    Ok(start..end)
}
