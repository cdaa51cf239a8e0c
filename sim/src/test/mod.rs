//! This module contains utilities for verifying the correctness of the
//! datapath implementation.


use crate::{
    framework::{CpuSim, MachineConfig, SeqSim},
    isa::{reg_code::ZERO, Inst},
    object::Image,
};

/// Small values and the interesting corners of the 32-bit range.
#[allow(non_upper_case_globals)]
const vals: [u32; 7] = [
    0,
    1,
    0x1234_5678,
    0x7fff_ffff,
    0x8000_0000,
    0xffff_ffff,
    -5i32 as u32,
];

macro_rules! test_ensure {
    ($name:expr, $ans:expr, $res:expr $(,)?) => {
        if ($res) != ($ans) {
            anyhow::bail!(
                "test failed: {name}, expected: {answer:#x}, got: {result:#x}",
                name = $name,
                answer = $ans,
                result = $res
            );
        }
    };
}
pub(crate) use test_ensure;

pub struct SimTester {
    config: MachineConfig,
}

impl SimTester {
    pub fn new(dmem_words: usize) -> Self {
        Self {
            config: MachineConfig::default().set_dmem_words(dmem_words),
        }
    }

    fn build(&self, prog: &[Inst]) -> anyhow::Result<SeqSim> {
        Ok(SeqSim::new(&make_image(prog), self.config)?)
    }

    /// Run one cycle per instruction.
    fn simulate(&self, prog: &[Inst]) -> anyhow::Result<SeqSim> {
        let mut sim = self.build(prog)?;
        sim.run(prog.len() as u64)?;
        Ok(sim)
    }
}

fn make_image(prog: &[Inst]) -> Image {
    Image::from_words(prog.iter().map(Inst::encode).collect())
}

/// `lui` + `ori` pair loading an arbitrary constant.
fn load_const(reg: u8, val: u32) -> [Inst; 2] {
    [
        Inst::Lui {
            rt: reg,
            imm: (val >> 16) as u16,
        },
        Inst::Ori {
            rt: reg,
            rs: reg,
            imm: val as u16,
        },
    ]
}

#[test]
fn test_load_const() -> anyhow::Result<()> {
    let tester = SimTester::new(4);
    for v in vals {
        let sim = tester.simulate(&load_const(9, v))?;
        test_ensure!(format!("load-const-{v:#x}"), v, sim.read_register(9));
    }
    // the helper must not depend on any register but its target
    let sim = tester.simulate(&load_const(ZERO, 0xffff_ffff))?;
    anyhow::ensure!(sim.read_register(ZERO) == 0);
    Ok(())
}
