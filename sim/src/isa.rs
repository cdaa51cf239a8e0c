//! Instruction set definition for the supported MIPS subset.
//!
//! Every instruction is a single 32-bit word. Three layouts share the same
//! bit positions:
//!
//! ```text
//!  31    26 25  21 20  16 15  11 10   6 5     0
//! | opcode |  rs  |  rt  |  rd  | shamt | funct |   R-type
//! | opcode |  rs  |  rt  |       imm16          |   I-type
//! ```
//!
//! Addresses (both the program counter and data memory addresses) are word
//! indices, not byte offsets.

use crate::utils::mem_diff;

macro_rules! define_code {
    {
        @mod $modname:ident;
        @type $typ:ty;
        $( $cname:ident = $cval:expr; )*
    } => {
        pub mod $modname {
            $(pub const $cname : $typ = $cval; )*
            #[allow(unused)]
            pub fn name_of(code: $typ) -> &'static str {
                match code {
                    $($cname => stringify!($cname), )*
                    _ => "no name"
                }
            }
        }
    };
}

define_code! {
    @mod op_code;
    @type u8;
    RTYPE = 0x00;
    BEQ = 0x04;
    ADDI = 0x08;
    ORI = 0x0d;
    LUI = 0x0f;
    LW = 0x23;
    SW = 0x2b;
}

define_code! {
    @mod funct_code;
    @type u8;
    ADD = 0x20;
    AND = 0x24;
    SLT = 0x2a;
}

define_code! {
    @mod reg_code;
    @type u8;
    ZERO = 0;
    AT = 1;
    V0 = 2;
    V1 = 3;
    A0 = 4;
    A1 = 5;
    A2 = 6;
    A3 = 7;
    T0 = 8;
    T1 = 9;
    T2 = 10;
    T3 = 11;
    T4 = 12;
    T5 = 13;
    T6 = 14;
    T7 = 15;
    S0 = 16;
    S1 = 17;
    S2 = 18;
    S3 = 19;
    S4 = 20;
    S5 = 21;
    S6 = 22;
    S7 = 23;
    T8 = 24;
    T9 = 25;
    K0 = 26;
    K1 = 27;
    GP = 28;
    SP = 29;
    FP = 30;
    RA = 31;
}

/// Number of architectural registers.
pub const NUM_REGS: usize = 32;

/// we use a 32-bit integer array of length 32 to represent the register file.
pub type RegFile = [u32; NUM_REGS];

/// Assembly name of a register, e.g. `$t0`.
pub fn reg_name(reg: u8) -> String {
    format!("${}", reg_code::name_of(reg & 0x1f).to_lowercase())
}

/// Fields sliced out of an instruction word. Which of them are meaningful
/// depends on the opcode; all of them are always extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedFields {
    pub opcode: u8,
    pub rs: u8,
    pub rt: u8,
    pub rd: u8,
    pub shamt: u8,
    pub funct: u8,
    pub imm: u16,
}

pub fn decode(inst: u32) -> DecodedFields {
    DecodedFields {
        opcode: (inst >> 26) as u8 & 0x3f,
        rs: (inst >> 21) as u8 & 0x1f,
        rt: (inst >> 16) as u8 & 0x1f,
        rd: (inst >> 11) as u8 & 0x1f,
        shamt: (inst >> 6) as u8 & 0x1f,
        funct: inst as u8 & 0x3f,
        imm: inst as u16,
    }
}

pub fn sign_extend16(imm: u16) -> u32 {
    imm as i16 as i32 as u32
}

pub fn zero_extend16(imm: u16) -> u32 {
    imm as u32
}

pub fn encode_r(funct: u8, rs: u8, rt: u8, rd: u8, shamt: u8) -> u32 {
    ((op_code::RTYPE as u32) << 26)
        | ((rs as u32 & 0x1f) << 21)
        | ((rt as u32 & 0x1f) << 16)
        | ((rd as u32 & 0x1f) << 11)
        | ((shamt as u32 & 0x1f) << 6)
        | (funct as u32 & 0x3f)
}

pub fn encode_i(opcode: u8, rs: u8, rt: u8, imm: u16) -> u32 {
    ((opcode as u32 & 0x3f) << 26)
        | ((rs as u32 & 0x1f) << 21)
        | ((rt as u32 & 0x1f) << 16)
        | imm as u32
}

/// A supported instruction in symbolic form.
///
/// This is a convenience for building test programs and printing traces. The
/// simulator itself only ever sees raw words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    Add { rd: u8, rs: u8, rt: u8 },
    And { rd: u8, rs: u8, rt: u8 },
    Slt { rd: u8, rs: u8, rt: u8 },
    Addi { rt: u8, rs: u8, imm: i16 },
    Ori { rt: u8, rs: u8, imm: u16 },
    Lui { rt: u8, imm: u16 },
    Lw { rt: u8, offset: i16, base: u8 },
    Sw { rt: u8, offset: i16, base: u8 },
    /// `offset` is counted in words relative to the next instruction.
    Beq { rs: u8, rt: u8, offset: i16 },
}

impl Inst {
    pub fn encode(&self) -> u32 {
        use funct_code::*;
        use op_code::*;
        match *self {
            Inst::Add { rd, rs, rt } => encode_r(ADD, rs, rt, rd, 0),
            Inst::And { rd, rs, rt } => encode_r(AND, rs, rt, rd, 0),
            Inst::Slt { rd, rs, rt } => encode_r(SLT, rs, rt, rd, 0),
            Inst::Addi { rt, rs, imm } => encode_i(ADDI, rs, rt, imm as u16),
            Inst::Ori { rt, rs, imm } => encode_i(ORI, rs, rt, imm),
            Inst::Lui { rt, imm } => encode_i(LUI, 0, rt, imm),
            Inst::Lw { rt, offset, base } => encode_i(LW, base, rt, offset as u16),
            Inst::Sw { rt, offset, base } => encode_i(SW, base, rt, offset as u16),
            Inst::Beq { rs, rt, offset } => encode_i(BEQ, rs, rt, offset as u16),
        }
    }

    /// Returns `None` for words outside the supported instruction table.
    pub fn disassemble(word: u32) -> Option<Inst> {
        use funct_code::*;
        use op_code::*;
        let DecodedFields {
            opcode,
            rs,
            rt,
            rd,
            funct,
            imm,
            ..
        } = decode(word);
        Some(match (opcode, funct) {
            (RTYPE, ADD) => Inst::Add { rd, rs, rt },
            (RTYPE, AND) => Inst::And { rd, rs, rt },
            (RTYPE, SLT) => Inst::Slt { rd, rs, rt },
            (LUI, _) => Inst::Lui { rt, imm },
            (ADDI, _) => Inst::Addi {
                rt,
                rs,
                imm: imm as i16,
            },
            (ORI, _) => Inst::Ori { rt, rs, imm },
            (LW, _) => Inst::Lw {
                rt,
                offset: imm as i16,
                base: rs,
            },
            (SW, _) => Inst::Sw {
                rt,
                offset: imm as i16,
                base: rs,
            },
            (BEQ, _) => Inst::Beq {
                rs,
                rt,
                offset: imm as i16,
            },
            _ => return None,
        })
    }
}

impl std::fmt::Display for Inst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = reg_name;
        match *self {
            Inst::Add { rd, rs, rt } => write!(f, "add {}, {}, {}", r(rd), r(rs), r(rt)),
            Inst::And { rd, rs, rt } => write!(f, "and {}, {}, {}", r(rd), r(rs), r(rt)),
            Inst::Slt { rd, rs, rt } => write!(f, "slt {}, {}, {}", r(rd), r(rs), r(rt)),
            Inst::Addi { rt, rs, imm } => write!(f, "addi {}, {}, {}", r(rt), r(rs), imm),
            Inst::Ori { rt, rs, imm } => write!(f, "ori {}, {}, {:#x}", r(rt), r(rs), imm),
            Inst::Lui { rt, imm } => write!(f, "lui {}, {:#x}", r(rt), imm),
            Inst::Lw { rt, offset, base } => write!(f, "lw {}, {}({})", r(rt), offset, r(base)),
            Inst::Sw { rt, offset, base } => write!(f, "sw {}, {}({})", r(rt), offset, r(base)),
            Inst::Beq { rs, rt, offset } => write!(f, "beq {}, {}, {}", r(rs), r(rt), offset),
        }
    }
}

/// Simulation result of the machine code on the standard ISA.
pub struct StandardResult {
    pub regs: RegFile,
    pub dmem: Vec<u32>,
    pub pc: u32,
    pub n_insts: u64,
    pub n_unsupported: u64,
}

/// Execute machine code w.r.t. the instruction set semantics, one instruction per
/// step. This function is used to verify the correctness of the single
/// cycle datapath.
///
/// `dmem` is the initial data memory; its length is the address bound.
/// Words outside the supported table are skipped, and fetching past the end
/// of `image` reads zero.
pub fn simulate(
    image: &[u32],
    mut dmem: Vec<u32>,
    steps: u64,
    tty_out: bool,
) -> anyhow::Result<StandardResult> {
    let original = dmem.clone();
    let mut regs: RegFile = [0; NUM_REGS];
    let mut pc: u32 = 0;
    let mut n_unsupported = 0;

    fn ensure_addr(addr: u32, bound: usize) -> anyhow::Result<usize> {
        if addr as usize >= bound {
            anyhow::bail!("invalid memory address: {:#x}", addr);
        }
        Ok(addr as usize)
    }

    fn set(regs: &mut RegFile, reg: u8, val: u32) {
        if reg != reg_code::ZERO {
            regs[reg as usize] = val;
        }
    }

    for _ in 0..steps {
        let word = image.get(pc as usize).copied().unwrap_or(0);
        let mut next_pc = pc.wrapping_add(1);
        match Inst::disassemble(word) {
            Some(Inst::Add { rd, rs, rt }) => {
                let v = regs[rs as usize].wrapping_add(regs[rt as usize]);
                set(&mut regs, rd, v);
            }
            Some(Inst::And { rd, rs, rt }) => {
                let v = regs[rs as usize] & regs[rt as usize];
                set(&mut regs, rd, v);
            }
            Some(Inst::Slt { rd, rs, rt }) => {
                let v = ((regs[rs as usize] as i32) < (regs[rt as usize] as i32)) as u32;
                set(&mut regs, rd, v);
            }
            Some(Inst::Addi { rt, rs, imm }) => {
                let v = regs[rs as usize].wrapping_add(imm as i32 as u32);
                set(&mut regs, rt, v);
            }
            Some(Inst::Ori { rt, rs, imm }) => {
                let v = regs[rs as usize] | imm as u32;
                set(&mut regs, rt, v);
            }
            Some(Inst::Lui { rt, imm }) => set(&mut regs, rt, (imm as u32) << 16),
            Some(Inst::Lw { rt, offset, base }) => {
                let addr = regs[base as usize].wrapping_add(offset as i32 as u32);
                let v = dmem[ensure_addr(addr, dmem.len())?];
                set(&mut regs, rt, v);
            }
            Some(Inst::Sw { rt, offset, base }) => {
                let addr = regs[base as usize].wrapping_add(offset as i32 as u32);
                let idx = ensure_addr(addr, dmem.len())?;
                dmem[idx] = regs[rt as usize];
            }
            Some(Inst::Beq { rs, rt, offset }) => {
                if regs[rs as usize] == regs[rt as usize] {
                    next_pc = next_pc.wrapping_add(offset as i32 as u32);
                }
            }
            None => n_unsupported += 1,
        }
        pc = next_pc;
    }

    if tty_out {
        eprintln!("total instructions: {}", steps);
        mem_diff(&original, &dmem);
    }

    Ok(StandardResult {
        regs,
        dmem,
        pc,
        n_insts: steps,
        n_unsupported,
    })
}

#[cfg(test)]
mod tests {
    use super::{reg_code::*, *};

    #[test]
    fn test_decode_fields() {
        // add $t2, $t0, $t1 with a non-zero shamt to check every slice
        let word = encode_r(funct_code::ADD, T0, T1, T2, 0x15);
        let f = decode(word);
        assert_eq!(f.opcode, op_code::RTYPE);
        assert_eq!(f.rs, T0);
        assert_eq!(f.rt, T1);
        assert_eq!(f.rd, T2);
        assert_eq!(f.shamt, 0x15);
        assert_eq!(f.funct, funct_code::ADD);
        assert_eq!(f.imm, (word & 0xffff) as u16);

        let f = decode(0xffff_ffff);
        assert_eq!(
            f,
            DecodedFields {
                opcode: 0x3f,
                rs: 0x1f,
                rt: 0x1f,
                rd: 0x1f,
                shamt: 0x1f,
                funct: 0x3f,
                imm: 0xffff,
            }
        );
    }

    #[test]
    fn test_extend() {
        assert_eq!(sign_extend16(0xffff), 0xffff_ffff);
        assert_eq!(sign_extend16(0x8000), 0xffff_8000);
        assert_eq!(sign_extend16(0x7fff), 0x0000_7fff);
        assert_eq!(zero_extend16(0xffff), 0x0000_ffff);
    }

    #[test]
    fn test_known_encodings() {
        // addi $t0, $zero, 5
        assert_eq!(Inst::Addi { rt: T0, rs: ZERO, imm: 5 }.encode(), 0x2008_0005);
        // lw $t1, 4($sp)
        assert_eq!(
            Inst::Lw {
                rt: T1,
                offset: 4,
                base: SP
            }
            .encode(),
            0x8fa9_0004
        );
        // add $t2, $t0, $t1
        assert_eq!(Inst::Add { rd: T2, rs: T0, rt: T1 }.encode(), 0x0109_5020);
    }

    #[test]
    fn test_disassemble() {
        let beq = Inst::Beq {
            rs: T0,
            rt: T1,
            offset: -3,
        };
        assert_eq!(Inst::disassemble(beq.encode()), Some(beq));
        assert_eq!(beq.to_string(), "beq $t0, $t1, -3");
        assert_eq!(
            Inst::Sw {
                rt: T3,
                offset: 0,
                base: ZERO
            }
            .to_string(),
            "sw $t3, 0($zero)"
        );
        // R-type with an unknown funct and the all-zero word
        assert_eq!(Inst::disassemble(encode_r(0x22, T0, T1, T2, 0)), None);
        assert_eq!(Inst::disassemble(0), None);
    }

    #[test]
    fn test_simulate_loop() -> anyhow::Result<()> {
        // count $t0 from 0 up to 3
        let prog: Vec<u32> = [
            Inst::Addi { rt: T1, rs: ZERO, imm: 3 },
            Inst::Beq {
                rs: T0,
                rt: T1,
                offset: 2,
            },
            Inst::Addi { rt: T0, rs: T0, imm: 1 },
            Inst::Beq {
                rs: ZERO,
                rt: ZERO,
                offset: -3,
            },
            Inst::Sw {
                rt: T0,
                offset: 1,
                base: ZERO,
            },
        ]
        .iter()
        .map(Inst::encode)
        .collect();

        let r = simulate(&prog, vec![0; 4], 1 + 3 * 3 + 1 + 1, false)?;
        assert_eq!(r.regs[T0 as usize], 3);
        assert_eq!(r.dmem[1], 3);
        assert_eq!(r.pc, 5);
        Ok(())
    }

    #[test]
    fn test_simulate_bad_address() {
        let prog = [Inst::Lw {
            rt: T0,
            offset: 8,
            base: ZERO,
        }
        .encode()];
        assert!(simulate(&prog, vec![0; 8], 1, false).is_err());
    }
}
