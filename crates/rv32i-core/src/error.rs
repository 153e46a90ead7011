//! Fault and control-flow taxonomy raised by the core.

use thiserror::Error;

/// Everything a pipeline cycle can produce besides a clean `Ok(())`.
///
/// `EndOfProgram` is not a fault: it is the jump-to-self termination
/// signal, carried through the same `Result` as the real faults so a
/// single `?` chain in the pipeline driver can propagate both without
/// a parallel control-flow type.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No page table entry covers the containing page of `address`.
    #[error("page fault: no mapping for virtual address {address:#010x}")]
    PageFault { address: u32 },

    /// A page table entry exists but denies the requested operation
    /// under the current privilege mode.
    #[error("access violation: {access} not permitted at virtual address {address:#010x}")]
    AccessViolation { address: u32, access: AccessKind },

    /// A physical address fell outside the backing store, or a
    /// register index was >= 32.
    #[error("out of range: {0}")]
    OutOfRange(OutOfRangeKind),

    /// Attempted write to the hard-wired-zero register x0.
    #[error("invalid write: register x0 is read-only")]
    InvalidWrite,

    /// Unknown opcode, or unknown funct3/funct7 sub-encoding for a
    /// recognized format.
    #[error("illegal instruction: {0:#010x}")]
    IllegalInstruction(u32),

    /// Jump-to-self detected: the conventional end-of-program idiom.
    #[error("end of program")]
    EndOfProgram,
}

/// The kind of physical access that overran its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRangeKind {
    PhysicalAddress(u32),
    RegisterIndex(u32),
}

impl std::fmt::Display for OutOfRangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutOfRangeKind::PhysicalAddress(addr) => {
                write!(f, "physical address {addr:#010x} outside backing store")
            }
            OutOfRangeKind::RegisterIndex(index) => {
                write!(f, "register index {index} out of range")
            }
        }
    }
}

/// The permission an MMU access was denied under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
    Execute,
}

impl std::fmt::Display for AccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
            AccessKind::Execute => "execute",
        };
        write!(f, "{s}")
    }
}

pub type Result<T> = std::result::Result<T, Error>;
