//! Machine state and the cycle-level simulation interface.
//!
//! The simulator owns every piece of architectural state. One call to
//! [`CpuSim::step`] evaluates the whole combinational network over the state
//! committed by the previous cycle and then commits the staged writes at once,
//! so no intermediate state is ever observable from outside.

use crate::{
    architectures::hardware_seq::{
        DataMemory, InstructionMemory, RegisterFile, UnitInputSignal, UnitOutputSignal, Units,
    },
    error::{LoadError, SimError},
    isa::RegFile,
    object::Image,
};

/// Default size of the data memory, in words.
pub const DMEM_WORDS: usize = 1 << 16;

/// Default capacity of the instruction memory, in words.
pub const IMEM_WORDS: usize = 1 << 16;

/// Options for building a simulator.
#[derive(Debug, Clone, Copy)]
pub struct MachineConfig {
    pub(crate) dmem_words: usize,
    pub(crate) imem_words: usize,
    pub(crate) tty_out: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            dmem_words: DMEM_WORDS,
            imem_words: IMEM_WORDS,
            tty_out: false,
        }
    }
}

impl MachineConfig {
    /// Number of addressable data memory words. Any access at or beyond
    /// this bound is fatal.
    pub fn set_dmem_words(mut self, words: usize) -> Self {
        self.dmem_words = words;
        self
    }
    pub fn set_imem_words(mut self, words: usize) -> Self {
        self.imem_words = words;
        self
    }
    /// Print a colored summary of every cycle to stderr.
    pub fn set_tty_out(mut self, tty_out: bool) -> Self {
        self.tty_out = tty_out;
        self
    }
    pub fn dmem_words(&self) -> usize {
        self.dmem_words
    }
}

/// All signals of one cycle.
pub type Signals = (UnitInputSignal, UnitOutputSignal);

/// What happened during one committed cycle.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// Program counter the instruction was fetched from.
    pub pc: u32,
    pub inst: u32,
    pub next_pc: u32,
    /// The instruction was outside the supported table and had no effect.
    pub unsupported: bool,
    pub signals: Signals,
}

/// During a CPU cycle, signals from the state elements are propagated through
/// the combinational logic circuits. The staged writes are then committed at
/// the end of the cycle.
pub trait CpuSim {
    /// Run one cycle. On a fatal fault nothing of this cycle is committed and
    /// the simulator refuses to run any further.
    fn step(&mut self) -> Result<CycleOutcome, SimError>;

    /// Run a fixed number of cycles, stopping at the first fault.
    fn run(&mut self, cycles: u64) -> Result<(), SimError> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    /// Get the current program counter
    fn program_counter(&self) -> u32;

    fn cycle_count(&self) -> u64;

    /// Whether the simulation was stopped by a fatal fault.
    fn is_terminate(&self) -> bool;

    /// Get the registers and their values
    fn registers(&self) -> RegFile;

    fn read_register(&self, index: u8) -> u32 {
        self.registers()[(index & 0x1f) as usize]
    }

    /// `None` if `addr` is outside the data memory.
    fn read_memory(&self, addr: u32) -> Option<u32>;
}

/// Single cycle simulator. Owns the instruction memory, register file, data
/// memory and program counter.
pub struct SeqSim {
    pub(crate) imem: InstructionMemory,
    pub(crate) regs: RegisterFile,
    pub(crate) dmem: DataMemory,
    pub(crate) pc: u32,
    pub(crate) units: Units,
    /// See [`CpuSim::is_terminate`].
    pub(crate) terminate: bool,
    /// Whether to print the output to tty
    pub(crate) tty_out: bool,
    pub(crate) cycle_count: u64,
    pub(crate) unsupported_count: u64,
}

impl SeqSim {
    /// Initialize the simulator with the given program. Registers, data
    /// memory and the program counter start at zero.
    pub fn new(image: &Image, config: MachineConfig) -> Result<Self, LoadError> {
        image.ensure_fits(config.imem_words)?;
        Ok(Self {
            imem: InstructionMemory::new(image.words().to_vec()),
            regs: RegisterFile::new(),
            dmem: DataMemory::new(config.dmem_words),
            pc: 0,
            units: Units::default(),
            terminate: false,
            tty_out: config.tty_out,
            cycle_count: 0,
            unsupported_count: 0,
        })
    }

    /// Preload data memory from address 0. Must be called before the first
    /// cycle; on error the memory is left untouched.
    pub fn seed_memory(&mut self, data: &Image) -> Result<(), LoadError> {
        self.dmem.seed(data.words())
    }

    pub fn mem(&self) -> &[u32] {
        self.dmem.words()
    }

    /// Number of executed instructions that were outside the supported table.
    pub fn unsupported_count(&self) -> u64 {
        self.unsupported_count
    }
}
