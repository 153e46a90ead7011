//! Memory-access stage: perform the load or store implied by a
//! decoded instruction's format and the Execute stage's effective
//! address.

use crate::decode::Instruction;
use crate::error::Result;
use crate::mmu::Mmu;
use crate::regfile::RegisterBank;

use super::{ExecutionResult, MemoryAccessResult};

const OPCODE_LOAD: u32 = 0x03;

#[derive(Debug, Default)]
pub struct MemoryAccessStage;

impl MemoryAccessStage {
    pub fn access(
        &self,
        inst: &Instruction,
        exec: &ExecutionResult,
        regs: &RegisterBank,
        mmu: &mut Mmu<'_>,
    ) -> Result<MemoryAccessResult> {
        match inst {
            Instruction::I(i) if i.opcode == OPCODE_LOAD => {
                let load_data = mmu.read_word(exec.alu_result)?;
                Ok(MemoryAccessResult {
                    load_data: Some(load_data),
                    store_ok: false,
                })
            }
            Instruction::S(s) => {
                let value = regs.read(s.rs2)?;
                mmu.write_word(exec.alu_result, value)?;
                Ok(MemoryAccessResult {
                    load_data: None,
                    store_ok: true,
                })
            }
            _ => Ok(MemoryAccessResult::default()),
        }
    }
}
