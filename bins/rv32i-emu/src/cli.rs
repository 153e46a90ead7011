//! Command-line argument surface.

use clap::Parser;

use rv32i_core::emu::DEFAULT_MEMORY_SIZE;

#[derive(Debug, Parser)]
#[command(name = "rv32i-emu", about = "Single-hart RV32I pipelined emulator")]
pub struct Cli {
    /// Flat little-endian binary image to load at virtual address 0.
    pub program: String,

    /// Physical memory size in bytes.
    #[arg(long, default_value_t = DEFAULT_MEMORY_SIZE)]
    pub memory_size: usize,

    /// Raise the trace filter to `trace`, overriding `RUST_LOG`.
    #[arg(short = 'v', long = "trace")]
    pub trace: bool,
}
