//! The five-stage in-order pipeline driver.
//!
//! Each stage is a stateless, zero-sized type: all architectural state
//! lives in [`crate::regfile::RegisterBank`], [`crate::memory::PhysicalMemory`],
//! and [`crate::paging::PageTable`], owned by the host ([`crate::emu::Emu`]).
//! A fresh [`crate::mmu::Mmu`] is constructed from borrows of those owned
//! fields for the duration of a single cycle rather than stored
//! long-term, since a `Mmu` borrowing from sibling fields of the same
//! owning struct cannot itself be a field of that struct.

mod decode_stage;
mod execute;
mod fetch;
mod memory_access;
mod write_back;

pub use decode_stage::DecodeStage;
pub use execute::ExecuteStage;
pub use fetch::FetchStage;
pub use memory_access::MemoryAccessStage;
pub use write_back::WriteBackStage;

use tracing::trace;

use crate::error::Result;
use crate::mmu::Mmu;
use crate::regfile::RegisterBank;

/// Execute-stage output: the ALU result plus whether/where to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    pub alu_result: u32,
    pub branch_taken: bool,
    pub branch_target: u32,
}

/// Memory-access stage output: an optional load result and whether a
/// store was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryAccessResult {
    pub load_data: Option<u32>,
    pub store_ok: bool,
}

/// Owns one instance of each pipeline stage and sequences a cycle.
///
/// The stages carry no data of their own; `Pipeline` exists so the
/// host has a single handle to advance, matching the "one instance of
/// each stage" ownership model.
#[derive(Debug, Default)]
pub struct Pipeline {
    fetch: FetchStage,
    decode: DecodeStage,
    execute: ExecuteStage,
    memory_access: MemoryAccessStage,
    write_back: WriteBackStage,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run exactly one cycle: Fetch, Decode, Execute, Memory-Access,
    /// Write-Back, then apply any taken branch to the PC.
    ///
    /// Returns `Err(Error::EndOfProgram)` when the executed instruction
    /// is a jump-to-self (raised by the Execute stage's J-type case
    /// before Memory-Access/Write-Back run), or any other `Error`
    /// raised by a stage.
    pub fn run_cycle(&self, regs: &mut RegisterBank, mmu: &mut Mmu<'_>) -> Result<()> {
        let snapshot_pc = regs.get_pc();
        let raw = self.fetch.fetch(regs, mmu)?;
        let inst = self.decode.decode(raw);

        trace!(pc = snapshot_pc, raw, format = ?inst.format(), "cycle");

        let exec_result = self.execute.execute(&inst, regs, snapshot_pc)?;
        let mem_result = self.memory_access.access(&inst, &exec_result, regs, mmu)?;
        self.write_back.commit(&inst, &exec_result, &mem_result, regs)?;

        if exec_result.branch_taken {
            regs.set_pc(exec_result.branch_target);
        }

        Ok(())
    }
}
