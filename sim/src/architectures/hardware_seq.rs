//! This module defines hardware units used in the single cycle MIPS datapath.
//! The combinational units are defined using the `define_units!` macro; the
//! state elements are plain structs owned by the simulator.

use crate::{
    define_units,
    error::{LoadError, SimError},
    isa::{
        decode, funct_code, op_code, reg_code, sign_extend16, zero_extend16, DecodedFields,
        RegFile,
    },
};

/// Source of the second ALU operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AluSrc {
    #[default]
    Register,
    SignExtendedImm,
    ZeroExtendedImm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AluOp {
    #[default]
    Add,
    And,
    SetLessThan,
    Or,
    ShiftLeft16,
    Equal,
}

/// Control signals derived from the opcode and function code.
///
/// The default value is the all-disabled word: nothing is written and the
/// program counter just advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ControlWord {
    pub reg_write: bool,
    /// Write back to `rd` instead of `rt`.
    pub dest_is_rd: bool,
    pub alu_src: AluSrc,
    pub alu_op: AluOp,
    pub mem_read: bool,
    pub mem_write: bool,
    pub branch: bool,
}

impl ControlWord {
    const fn r_type(alu_op: AluOp) -> Self {
        Self {
            reg_write: true,
            dest_is_rd: true,
            alu_src: AluSrc::Register,
            alu_op,
            mem_read: false,
            mem_write: false,
            branch: false,
        }
    }

    const fn i_type(alu_src: AluSrc, alu_op: AluOp) -> Self {
        Self {
            reg_write: true,
            dest_is_rd: false,
            alu_src,
            alu_op,
            mem_read: false,
            mem_write: false,
            branch: false,
        }
    }
}

/// Look up the control word of an instruction. The first matching arm wins;
/// `None` means the encoding is outside the supported table.
pub fn control_word(opcode: u8, funct: u8) -> Option<ControlWord> {
    use funct_code::*;
    use op_code::*;
    use AluOp::*;
    use AluSrc::*;

    let word = match (opcode, funct) {
        (RTYPE, ADD) => ControlWord::r_type(Add),
        (RTYPE, AND) => ControlWord::r_type(And),
        (RTYPE, SLT) => ControlWord::r_type(SetLessThan),
        (LUI, _) => ControlWord::i_type(ZeroExtendedImm, ShiftLeft16),
        (ADDI, _) => ControlWord::i_type(SignExtendedImm, Add),
        (ORI, _) => ControlWord::i_type(ZeroExtendedImm, Or),
        (LW, _) => ControlWord {
            mem_read: true,
            ..ControlWord::i_type(SignExtendedImm, Add)
        },
        (SW, _) => ControlWord {
            alu_src: SignExtendedImm,
            mem_write: true,
            ..ControlWord::default()
        },
        (BEQ, _) => ControlWord {
            alu_op: Equal,
            branch: true,
            ..ControlWord::default()
        },
        _ => return None,
    };
    Some(word)
}

define_units! {
    /// Slices the fetched word into its fields.
    InstructionDecoder dec {
        .input(inst: u32)
        .output(fields: DecodedFields)
    } {
        *fields = decode(inst);
    }

    ControlUnit ctrl {
        .input(opcode: u8, funct: u8)
        .output(
            control: ControlWord,
            /// False if the instruction is not supported. The control word
            /// is then all-disabled and the instruction is a no-op.
            instr_valid: bool
        )
    } {
        match control_word(opcode, funct) {
            Some(word) => {
                *control = word;
                *instr_valid = true;
            }
            None => {
                *control = ControlWord::default();
                *instr_valid = false;
            }
        }
    }

    /// The ALUSrc multiplexer.
    OperandSelect sel {
        .input(alu_src: AluSrc, valt: u32, imm: u16)
        .output(valb: u32)
    } {
        *valb = match alu_src {
            AluSrc::Register => valt,
            AluSrc::SignExtendedImm => sign_extend16(imm),
            AluSrc::ZeroExtendedImm => zero_extend16(imm),
        };
    }

    ArithmeticLogicUnit alu {
        .input(a: u32, b: u32, op: AluOp)
        .output(
            e: u32,
            /// Only driven by [`AluOp::Equal`]; false for every other op.
            equal: bool
        )
    } {
        *equal = false;
        *e = match op {
            AluOp::Add => a.wrapping_add(b),
            AluOp::And => a & b,
            AluOp::SetLessThan => ((a as i32) < (b as i32)) as u32,
            AluOp::Or => a | b,
            AluOp::ShiftLeft16 => b << 16,
            AluOp::Equal => {
                *equal = a == b;
                0
            }
        };
    }

    /// Chooses the write-back value and destination register.
    WriteBackSelect wb {
        .input(
            reg_write: bool,
            dest_is_rd: bool,
            mem_read: bool,
            rt: u8,
            rd: u8,
            vale: u32,
            valm: u32,
        )
        .output(write: bool, dst: u8, value: u32)
    } {
        *write = reg_write;
        *dst = if dest_is_rd { rd } else { rt };
        *value = if mem_read { valm } else { vale };
    }

    PcUnit pc_unit {
        .input(pc: u32, branch: bool, equal: bool, imm: u16)
        .output(
            next_pc: u32,
            taken: bool
        )
    } {
        let valp = pc.wrapping_add(1);
        *taken = branch && equal;
        *next_pc = if *taken {
            valp.wrapping_add(sign_extend16(imm))
        } else {
            valp
        };
    }
}

/// Read-only instruction store. Addresses past the loaded image read as zero.
#[derive(Debug, Clone, Default)]
pub struct InstructionMemory {
    words: Vec<u32>,
}

impl InstructionMemory {
    pub fn new(words: Vec<u32>) -> Self {
        Self { words }
    }

    pub fn fetch(&self, addr: u32) -> u32 {
        self.words.get(addr as usize).copied().unwrap_or(0)
    }
}

/// 32 registers with asynchronous reads and one staged write per cycle.
/// Register 0 always reads as zero.
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    regs: RegFile,
    pending: Option<(u8, u32)>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, index: u8) -> u32 {
        match index & 0x1f {
            reg_code::ZERO => 0,
            i => self.regs[i as usize],
        }
    }

    /// Buffer a write; it takes effect on [`RegisterFile::commit`].
    pub fn stage_write(&mut self, index: u8, value: u32) {
        debug_assert!(self.pending.is_none(), "two register writes in one cycle");
        self.pending = Some((index & 0x1f, value));
    }

    pub fn commit(&mut self) {
        if let Some((index, value)) = self.pending.take() {
            if index == reg_code::ZERO {
                tracing::debug!("write back to $zero ignored");
                return;
            }
            tracing::info!(
                "write back: {} = {:#x}",
                crate::isa::reg_name(index),
                value
            );
            self.regs[index as usize] = value;
        }
    }

    pub fn discard(&mut self) {
        self.pending = None;
    }

    pub fn snapshot(&self) -> RegFile {
        self.regs
    }
}

/// Word addressable data memory with a fixed number of cells.
///
/// Reads observe the committed contents only; a staged write becomes
/// visible after [`DataMemory::commit`].
#[derive(Debug, Clone)]
pub struct DataMemory {
    cells: Vec<u32>,
    pending: Option<(usize, u32)>,
}

impl DataMemory {
    pub fn new(words: usize) -> Self {
        Self {
            cells: vec![0; words],
            pending: None,
        }
    }

    fn index(&self, addr: u32) -> Result<usize, SimError> {
        let idx = addr as usize;
        if idx >= self.cells.len() {
            return Err(SimError::AddressOutOfRange {
                addr,
                bound: self.cells.len(),
            });
        }
        Ok(idx)
    }

    pub fn read(&self, addr: u32) -> Result<u32, SimError> {
        Ok(self.cells[self.index(addr)?])
    }

    pub fn stage_write(&mut self, addr: u32, value: u32) -> Result<(), SimError> {
        let idx = self.index(addr)?;
        debug_assert!(self.pending.is_none(), "two memory writes in one cycle");
        self.pending = Some((idx, value));
        Ok(())
    }

    pub fn commit(&mut self) {
        if let Some((idx, value)) = self.pending.take() {
            tracing::info!("write memory: addr = {:#x}, datain = {:#x}", idx, value);
            self.cells[idx] = value;
        }
    }

    pub fn discard(&mut self) {
        self.pending = None;
    }

    /// Overwrite the start of memory with `values`. Nothing changes if they
    /// do not fit.
    pub fn seed(&mut self, values: &[u32]) -> Result<(), LoadError> {
        if values.len() > self.cells.len() {
            return Err(LoadError::TooLarge {
                words: values.len(),
                capacity: self.cells.len(),
            });
        }
        self.cells[..values.len()].copy_from_slice(values);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn words(&self) -> &[u32] {
        &self.cells
    }
}
