//! A single cycle simulator for a small MIPS subset (`add`, `and`, `slt`,
//! `addi`, `ori`, `lui`, `lw`, `sw`, `beq`).
//!
//! Instruction and data memories are word addressed. Every call to
//! [`framework::CpuSim::step`] executes exactly one instruction and commits
//! its register, memory and program counter updates atomically.

pub mod architectures;
mod dsl;
pub mod error;
pub mod framework;
pub mod isa;
pub mod object;
mod utils;

#[cfg(test)]
mod test;

pub use error::{LoadError, SimError};
pub use framework::{CpuSim, MachineConfig, SeqSim};
pub use object::Image;
pub use utils::{mem_diff, mem_print, parse_literal, reg_print};
