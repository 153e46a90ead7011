//! rv32i-emu cli

mod cli;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::error;

use cli::Cli;
use logging::init_logger;
use rv32i_core::emu::Emu;
use rv32i_core::error::Error;

fn main() -> ExitCode {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };

    init_logger(args.trace);

    let mut emu = Emu::new(args.memory_size);
    if let Err(err) = emu.load_program(&args.program) {
        eprintln!("{} {err:#}", "failed to load program:".red());
        return ExitCode::from(1);
    }

    match emu.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(fault) => {
            error!(%fault, "emulation halted on fault");
            print_fault_dump(&emu, &fault);
            ExitCode::from(2)
        }
    }
}

fn print_fault_dump(emu: &Emu, fault: &Error) {
    eprintln!("{} {fault}", "fault:".red().bold());
    eprintln!("{}", "register dump".yellow());
    eprintln!("pc  = 0x{:08x}", emu.get_pc());
    for i in 0..8 {
        let row: Vec<String> = (0..4)
            .map(|col| {
                let idx = i * 4 + col;
                let value = emu.get_register(idx).unwrap_or(0);
                format!("x{idx:<2}=0x{value:08x}")
            })
            .collect();
        eprintln!("{}", row.join("  "));
    }
}
