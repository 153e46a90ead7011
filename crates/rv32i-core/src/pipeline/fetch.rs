//! Fetch stage: read the instruction word at the current PC and
//! advance it.

use crate::error::Result;
use crate::mmu::Mmu;
use crate::regfile::RegisterBank;

#[derive(Debug, Default)]
pub struct FetchStage;

impl FetchStage {
    /// Read the word at `regs.get_pc()` through `translate_fetch`,
    /// then advance the PC by 4. Returns the raw word.
    pub fn fetch(&self, regs: &mut RegisterBank, mmu: &Mmu<'_>) -> Result<u32> {
        let pc = regs.get_pc();
        let raw = mmu.fetch_word(pc)?;
        regs.set_pc(pc.wrapping_add(4));
        Ok(raw)
    }
}
