//! The standard single cycle datapath.
//!
//! Every instruction passes through all units in one cycle:
//! fetch, decode, control, register read, execute, memory, write back and
//! program counter update. Writes to the register file and data memory are
//! only staged while the signals propagate, and committed together with the
//! new program counter at the end of the cycle.

use ansi_term::Colour;

use super::hardware_seq::{unit_in, Unit, UnitInputSignal, UnitOutputSignal};
use crate::{
    error::SimError,
    framework::{CpuSim, CycleOutcome, SeqSim},
    isa::{DecodedFields, Inst, RegFile},
};

impl SeqSim {
    /// Propagate signals through the combinational logic circuits. Reads see
    /// only the state committed by the previous cycle.
    fn propagate_signals(&mut self) -> Result<CycleOutcome, SimError> {
        let units = &self.units;
        let mut ins = UnitInputSignal::default();
        let mut outs = UnitOutputSignal::default();

        // :======================: Fetch & Decode :======================:

        let pc = self.pc;
        let inst = self.imem.fetch(pc);

        ins.dec = unit_in::InstructionDecoder { inst };
        units.dec.run(&ins, &mut outs);
        let DecodedFields {
            opcode,
            rs,
            rt,
            rd,
            funct,
            imm,
            ..
        } = outs.dec.fields;

        ins.ctrl = unit_in::ControlUnit { opcode, funct };
        units.ctrl.run(&ins, &mut outs);
        let ctrl = outs.ctrl.control;
        if !outs.ctrl.instr_valid {
            tracing::warn!(
                "unsupported instruction {:#010x} at pc {:#x} (opcode {:#04x}, funct {:#04x}), skipped",
                inst,
                pc,
                opcode,
                funct
            );
        }

        let vals = self.regs.read(rs);
        let valt = self.regs.read(rt);

        // :=========================: Execute :==========================:

        ins.sel = unit_in::OperandSelect {
            alu_src: ctrl.alu_src,
            valt,
            imm,
        };
        units.sel.run(&ins, &mut outs);

        ins.alu = unit_in::ArithmeticLogicUnit {
            a: vals,
            b: outs.sel.valb,
            op: ctrl.alu_op,
        };
        units.alu.run(&ins, &mut outs);
        let vale = outs.alu.e;

        // :==========================: Memory :==========================:

        let valm = if ctrl.mem_read {
            self.dmem.read(vale)?
        } else {
            0
        };
        if ctrl.mem_write {
            self.dmem.stage_write(vale, valt)?;
        }

        // :========================: Write Back :========================:

        ins.wb = unit_in::WriteBackSelect {
            reg_write: ctrl.reg_write,
            dest_is_rd: ctrl.dest_is_rd,
            mem_read: ctrl.mem_read,
            rt,
            rd,
            vale,
            valm,
        };
        units.wb.run(&ins, &mut outs);
        if outs.wb.write {
            self.regs.stage_write(outs.wb.dst, outs.wb.value);
        }

        // :==================: Program Counter Update :==================:

        ins.pc_unit = unit_in::PcUnit {
            pc,
            branch: ctrl.branch,
            equal: outs.alu.equal,
            imm,
        };
        units.pc_unit.run(&ins, &mut outs);

        Ok(CycleOutcome {
            pc,
            inst,
            next_pc: outs.pc_unit.next_pc,
            unsupported: !outs.ctrl.instr_valid,
            signals: (ins, outs),
        })
    }

    /// Apply all staged writes and advance the program counter.
    fn commit(&mut self, outcome: &CycleOutcome) {
        self.regs.commit();
        self.dmem.commit();
        self.pc = outcome.next_pc;
        self.cycle_count += 1;
        if outcome.unsupported {
            self.unsupported_count += 1;
        }
    }

    fn print_state(&self, outcome: &CycleOutcome) {
        let text = match Inst::disassemble(outcome.inst) {
            Some(inst) => inst.to_string(),
            None => Colour::Red.paint("unsupported").to_string(),
        };
        eprintln!(
            "{} pc {:#06x}  {:08x}  {}  -> {:#06x}",
            Colour::Cyan.bold().paint(format!("cycle {:>4}", self.cycle_count)),
            outcome.pc,
            outcome.inst,
            text,
            outcome.next_pc
        );
    }
}

impl CpuSim for SeqSim {
    fn step(&mut self) -> Result<CycleOutcome, SimError> {
        if self.terminate {
            return Err(SimError::Terminated);
        }
        match self.propagate_signals() {
            Ok(outcome) => {
                self.commit(&outcome);
                tracing::debug!(
                    "cycle {}: pc {:#x} -> {:#x}",
                    self.cycle_count,
                    outcome.pc,
                    outcome.next_pc
                );
                if self.tty_out {
                    self.print_state(&outcome);
                }
                Ok(outcome)
            }
            Err(err) => {
                self.regs.discard();
                self.dmem.discard();
                self.terminate = true;
                tracing::error!("cycle {}: pc {:#x}: {}", self.cycle_count, self.pc, err);
                Err(err)
            }
        }
    }

    fn program_counter(&self) -> u32 {
        self.pc
    }

    fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    fn is_terminate(&self) -> bool {
        self.terminate
    }

    fn registers(&self) -> RegFile {
        self.regs.snapshot()
    }

    fn read_register(&self, index: u8) -> u32 {
        self.regs.read(index)
    }

    fn read_memory(&self, addr: u32) -> Option<u32> {
        self.dmem.read(addr).ok()
    }
}
