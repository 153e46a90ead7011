//! Write-back stage: commit a result to the destination register,
//! honoring the x0-is-read-only invariant.

use crate::decode::Instruction;
use crate::error::Result;
use crate::regfile::RegisterBank;

use super::{ExecutionResult, MemoryAccessResult};

const OPCODE_LOAD: u32 = 0x03;

#[derive(Debug, Default)]
pub struct WriteBackStage;

impl WriteBackStage {
    pub fn commit(
        &self,
        inst: &Instruction,
        exec: &ExecutionResult,
        mem: &MemoryAccessResult,
        regs: &mut RegisterBank,
    ) -> Result<()> {
        let (rd, value) = match inst {
            Instruction::R(r) => (r.rd, exec.alu_result),
            Instruction::I(i) if i.opcode == OPCODE_LOAD => {
                (i.rd, mem.load_data.unwrap_or(exec.alu_result))
            }
            Instruction::I(i) => (i.rd, exec.alu_result),
            Instruction::U(u) => (u.rd, exec.alu_result),
            Instruction::J(j) => (j.rd, exec.alu_result),
            Instruction::S(_) | Instruction::B(_) | Instruction::Invalid(_) => return Ok(()),
        };

        if rd == 0 {
            return Ok(());
        }
        regs.write(rd, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    #[test]
    fn writes_rd_unless_zero() {
        let mut regs = RegisterBank::new();
        let stage = WriteBackStage;
        let inst = decode(0x0050_0093); // addi x1, x0, 5
        let exec = ExecutionResult {
            alu_result: 5,
            ..Default::default()
        };
        stage
            .commit(&inst, &exec, &MemoryAccessResult::default(), &mut regs)
            .unwrap();
        assert_eq!(regs.read(1).unwrap(), 5);
    }

    #[test]
    fn x0_destination_is_silently_skipped() {
        let mut regs = RegisterBank::new();
        let stage = WriteBackStage;
        let inst = decode(0x0050_0013); // addi x0, x0, 5
        let exec = ExecutionResult {
            alu_result: 5,
            ..Default::default()
        };
        stage
            .commit(&inst, &exec, &MemoryAccessResult::default(), &mut regs)
            .unwrap();
        assert_eq!(regs.read(0).unwrap(), 0);
    }

    #[test]
    fn load_prefers_memory_result_over_alu_result() {
        let mut regs = RegisterBank::new();
        let stage = WriteBackStage;
        let inst = decode(0x0001_2183); // lw x3, 0(x2)
        let exec = ExecutionResult {
            alu_result: 0x100,
            ..Default::default()
        };
        let mem = MemoryAccessResult {
            load_data: Some(0xDEAD_BEEF),
            store_ok: false,
        };
        stage.commit(&inst, &exec, &mem, &mut regs).unwrap();
        assert_eq!(regs.read(3).unwrap(), 0xDEAD_BEEF);
    }
}
