use crate::opcode_tables::{group_name, group_of, OpGroup};
use std::fmt;

/// A fetched opcode word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// Address the word was fetched from
    pub pc: u32,
    pub byte1: u8,
    pub byte2: u8,
}

impl Opcode {
    pub fn word(&self) -> u16 {
        u16::from_be_bytes([self.byte1, self.byte2])
    }

    pub fn group(&self) -> OpGroup {
        group_of(self.byte1)
    }

    /// Register number in bits 11-9
    pub fn upper_reg(&self) -> usize {
        ((self.byte1 >> 1) & 7) as usize
    }

    /// Register number in bits 2-0
    pub fn lower_reg(&self) -> usize {
        (self.byte2 & 7) as usize
    }

    /// Addressing mode in bits 5-3
    pub fn mode(&self) -> u8 {
        (self.byte2 >> 3) & 7
    }

    /// Bit 8, the direction bit of most two-operand groups
    pub fn direction(&self) -> bool {
        self.byte1 & 1 != 0
    }

    /// Condition code in bits 11-8
    pub fn condition(&self) -> u8 {
        self.byte1 & 0x0f
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:06x}: {:04x} {}",
            self.pc,
            self.word(),
            group_name(self.group())
        )
    }
}
