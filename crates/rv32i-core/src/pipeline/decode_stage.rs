//! Decode stage: classify a raw word into a tagged [`Instruction`].

use crate::decode::{decode, Instruction};

#[derive(Debug, Default)]
pub struct DecodeStage;

impl DecodeStage {
    pub fn decode(&self, raw: u32) -> Instruction {
        decode(raw)
    }
}
