use ansi_term::{Colour, Style};

use crate::isa::{reg_name, RegFile};

/// Parse a numeric literal, either decimal or `0x`-prefixed hexadecimal.
pub fn parse_literal(s: &str) -> Option<u32> {
    if let Ok(r) = s.parse() {
        return Some(r);
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).ok();
    }
    None
}

pub fn format_reg_val(val: u32) -> String {
    let style = if val == 0 {
        Colour::Fixed(8).normal()
    } else {
        Style::new().bold()
    };
    style.paint(format!("{:08x}", val)).to_string()
}

/// Print every word that differs between two memory images.
pub fn mem_diff(left: &[u32], right: &[u32]) {
    for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        if l != r {
            println!("{:#06x}: {:08x} -> {:08x}", i, l, r);
        }
    }
}

/// Print memory up to the last non-zero word.
pub fn mem_print(mem: &[u32]) {
    let Some(max_i) = mem.iter().rposition(|&w| w != 0) else {
        return;
    };
    for (i, word) in mem.iter().enumerate().take(max_i + 1) {
        println!("{:#06x}: {:08x}", i, word);
    }
}

/// Print the register file, four registers per line.
pub fn reg_print(regs: &RegFile) {
    for (i, chunk) in regs.chunks(4).enumerate() {
        let line: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(j, &v)| format!("{:>5} {}", reg_name((i * 4 + j) as u8), format_reg_val(v)))
            .collect();
        println!("{}", line.join("  "));
    }
}
