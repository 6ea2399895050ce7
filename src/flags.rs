//! Condition code flags
//!
//! Only Zero, Negative, Carry and Overflow exist; extend and the supervisor
//! byte are never touched by game code.

use crate::registers::Size;

pub const CARRY: u8 = 0x01;
pub const OVERFLOW: u8 = 0x02;
pub const ZERO: u8 = 0x04;
pub const NEGATIVE: u8 = 0x08;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub zero: bool,
    pub negative: bool,
    pub carry: bool,
    pub overflow: bool,
}

impl Flags {
    /// Recompute Zero and Negative from a result of the given size
    pub fn set_nz(&mut self, value: u32, size: Size) {
        let value = value & size.mask();
        self.zero = value == 0;
        self.negative = value & size.sign_bit() != 0;
    }

    /// Flags packed in CCR bit order
    pub fn ccr(&self) -> u8 {
        let mut ccr = 0;
        if self.carry {
            ccr |= CARRY;
        }
        if self.overflow {
            ccr |= OVERFLOW;
        }
        if self.zero {
            ccr |= ZERO;
        }
        if self.negative {
            ccr |= NEGATIVE;
        }
        ccr
    }

    pub fn set_ccr(&mut self, ccr: u8) {
        self.carry = ccr & CARRY != 0;
        self.overflow = ccr & OVERFLOW != 0;
        self.zero = ccr & ZERO != 0;
        self.negative = ccr & NEGATIVE != 0;
    }

    pub fn clear(&mut self) {
        *self = Flags::default();
    }

    /// Evaluate one of the sixteen condition codes. Codes 10-13 test the
    /// sign flag alone and 14/15 combine it with Zero instead of Overflow.
    pub fn condition(&self, code: u8) -> bool {
        match code & 0x0f {
            0 => true,
            1 => false,
            2 => !(self.zero || self.carry),
            3 => self.zero || self.carry,
            4 => !self.carry,
            5 => self.carry,
            6 => !self.zero,
            7 => self.zero,
            8 => !self.overflow,
            9 => self.overflow,
            10 | 12 => !self.negative,
            11 | 13 => self.negative,
            14 => !(self.zero || self.negative),
            _ => self.zero || self.negative,
        }
    }

    /// `ZCNV` digits as shown in the status dump
    pub fn zcnv(&self) -> String {
        format!(
            "{}{}{}{}",
            self.zero as u8, self.carry as u8, self.negative as u8, self.overflow as u8
        )
    }
}
