//! Execute stage: ALU, branch-target computation, and jump-to-self
//! end-of-program detection.

use crate::decode::Instruction;
use crate::error::{Error, Result};
use crate::regfile::RegisterBank;

use super::ExecutionResult;

const OPCODE_LOAD: u32 = 0x03;

#[derive(Debug, Default)]
pub struct ExecuteStage;

impl ExecuteStage {
    /// Compute the [`ExecutionResult`] for `inst`, reading operands
    /// from `regs` and using `snapshot_pc` (the PC at fetch time, not
    /// the post-increment PC) for branch/jump target arithmetic.
    pub fn execute(
        &self,
        inst: &Instruction,
        regs: &RegisterBank,
        snapshot_pc: u32,
    ) -> Result<ExecutionResult> {
        match inst {
            Instruction::R(r) => {
                let rs1 = regs.read(r.rs1)?;
                let rs2 = regs.read(r.rs2)?;
                let alu_result = match r.funct3 {
                    0x0 => match r.funct7 {
                        0x20 => rs1.wrapping_sub(rs2),
                        0x00 => rs1.wrapping_add(rs2),
                        _ => return Err(Error::IllegalInstruction(r.raw)),
                    },
                    _ => return Err(Error::IllegalInstruction(r.raw)),
                };
                Ok(ExecutionResult {
                    alu_result,
                    ..Default::default()
                })
            }
            Instruction::I(i) => {
                // Loads compute an effective address; the opcode
                // distinguishes them from register-immediate ALU ops,
                // but both paths put their result in `alu_result`.
                if i.opcode == OPCODE_LOAD {
                    let rs1 = regs.read(i.rs1)?;
                    let alu_result = rs1.wrapping_add(i.immediate() as u32);
                    return Ok(ExecutionResult {
                        alu_result,
                        ..Default::default()
                    });
                }
                let rs1 = regs.read(i.rs1)?;
                let imm = i.immediate();
                let shamt = (imm as u32) & 0x1F;
                let alu_result = match i.funct3 {
                    0x0 => rs1.wrapping_add(imm as u32),
                    0x2 => ((rs1 as i32) < imm) as u32,
                    0x3 => (rs1 < (imm as u32)) as u32,
                    0x4 => rs1 ^ (imm as u32),
                    0x6 => rs1 | (imm as u32),
                    0x7 => rs1 & (imm as u32),
                    0x1 => rs1 << shamt,
                    0x5 => match i.funct7 {
                        0x00 => rs1 >> shamt,
                        0x20 => ((rs1 as i32) >> shamt) as u32,
                        _ => return Err(Error::IllegalInstruction(i.raw)),
                    },
                    _ => return Err(Error::IllegalInstruction(i.raw)),
                };
                Ok(ExecutionResult {
                    alu_result,
                    ..Default::default()
                })
            }
            Instruction::S(s) => {
                let rs1 = regs.read(s.rs1)?;
                let alu_result = rs1.wrapping_add(s.immediate() as u32);
                Ok(ExecutionResult {
                    alu_result,
                    ..Default::default()
                })
            }
            Instruction::B(b) => {
                let rs1 = regs.read(b.rs1)?;
                let rs2 = regs.read(b.rs2)?;
                let taken = match b.funct3 {
                    0x0 => rs1 == rs2,
                    0x1 => rs1 != rs2,
                    _ => return Err(Error::IllegalInstruction(b.raw)),
                };
                if taken {
                    let branch_target = snapshot_pc.wrapping_add(b.immediate() as u32);
                    Ok(ExecutionResult {
                        alu_result: 0,
                        branch_taken: true,
                        branch_target,
                    })
                } else {
                    Ok(ExecutionResult::default())
                }
            }
            Instruction::U(u) => Ok(ExecutionResult {
                alu_result: u.immediate(),
                ..Default::default()
            }),
            Instruction::J(j) => {
                let branch_target = snapshot_pc.wrapping_add(j.immediate() as u32);
                if branch_target == snapshot_pc {
                    return Err(Error::EndOfProgram);
                }
                let alu_result = snapshot_pc.wrapping_add(4);
                Ok(ExecutionResult {
                    alu_result,
                    branch_taken: true,
                    branch_target,
                })
            }
            Instruction::Invalid(raw) => Err(Error::IllegalInstruction(*raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    #[test]
    fn addi_computes_sum() {
        let regs = RegisterBank::new();
        let stage = ExecuteStage;
        let inst = decode(0x0050_0093); // addi x1, x0, 5
        let result = stage.execute(&inst, &regs, 0).unwrap();
        assert_eq!(result.alu_result, 5);
        assert!(!result.branch_taken);
    }

    #[test]
    fn sub_uses_funct7() {
        let mut regs = RegisterBank::new();
        regs.write(1, 10).unwrap();
        regs.write(2, 3).unwrap();
        let stage = ExecuteStage;
        // sub x3, x1, x2
        let inst = decode(0x4020_81B3);
        let result = stage.execute(&inst, &regs, 0).unwrap();
        assert_eq!(result.alu_result, 7);
    }

    #[test]
    fn srai_is_arithmetic_srli_is_logical() {
        let mut regs = RegisterBank::new();
        regs.write(1, 0xFFFF_FFFF).unwrap();
        let stage = ExecuteStage;
        let srai = decode(0x4010_D113); // srai x2, x1, 1
        let srli = decode(0x0010_D193); // srli x3, x1, 1
        assert_eq!(stage.execute(&srai, &regs, 0).unwrap().alu_result, 0xFFFF_FFFF);
        assert_eq!(stage.execute(&srli, &regs, 0).unwrap().alu_result, 0x7FFF_FFFF);
    }

    #[test]
    fn beq_target_is_pc_relative() {
        let mut regs = RegisterBank::new();
        regs.write(1, 1).unwrap();
        regs.write(2, 1).unwrap();
        let stage = ExecuteStage;
        let inst = decode(0x0020_8463); // beq x1, x2, +8
        let result = stage.execute(&inst, &regs, 0x40).unwrap();
        assert!(result.branch_taken);
        assert_eq!(result.branch_target, 0x48);
    }

    #[test]
    fn jal_links_pc_plus_4_and_targets_pc_relative() {
        let regs = RegisterBank::new();
        let stage = ExecuteStage;
        let inst = decode(0x0040_006F); // jal x0, 4
        let result = stage.execute(&inst, &regs, 0x100).unwrap();
        assert!(result.branch_taken);
        assert_eq!(result.branch_target, 0x104);
        assert_eq!(result.alu_result, 0x104);
    }

    #[test]
    fn jal_self_jump_raises_end_of_program() {
        let regs = RegisterBank::new();
        let stage = ExecuteStage;
        let inst = decode(0x0000_006F); // jal x0, 0 (self)
        let result = stage.execute(&inst, &regs, 0x100);
        assert!(matches!(result, Err(Error::EndOfProgram)));
    }

    #[test]
    fn beq_self_branch_does_not_raise_end_of_program() {
        let regs = RegisterBank::new();
        let stage = ExecuteStage;
        let inst = decode(0x0000_0063); // beq x0, x0, 0
        let result = stage.execute(&inst, &regs, 0x40).unwrap();
        assert!(result.branch_taken);
        assert_eq!(result.branch_target, 0x40);
    }

    #[test]
    fn invalid_opcode_is_illegal_instruction() {
        let regs = RegisterBank::new();
        let stage = ExecuteStage;
        let inst = decode(0xFFFF_FFFF);
        assert!(matches!(
            stage.execute(&inst, &regs, 0),
            Err(Error::IllegalInstruction(_))
        ));
    }
}
