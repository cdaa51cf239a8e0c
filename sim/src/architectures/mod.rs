// All hardware modules
pub mod hardware_seq;

// The single cycle datapath built from the units in `hardware_seq`
mod seq_std;

pub use hardware_seq::{AluOp, AluSrc, ControlWord};
