use crate::error::EmuError;
use std::fmt;

/// Index of the address register doubling as stack pointer
pub const SP: usize = 15;

/// Operand width selected by an opcode's size bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Byte,
    Word,
    Long,
}

impl Size {
    /// Decode the two-bit size field used by most opcode groups.
    /// The fourth encoding is not a size.
    pub fn from_bits(bits: u8) -> Option<Size> {
        match bits & 3 {
            0 => Some(Size::Byte),
            1 => Some(Size::Word),
            2 => Some(Size::Long),
            _ => None,
        }
    }

    pub fn bytes(self) -> u32 {
        match self {
            Size::Byte => 1,
            Size::Word => 2,
            Size::Long => 4,
        }
    }

    pub fn mask(self) -> u32 {
        match self {
            Size::Byte => 0xff,
            Size::Word => 0xffff,
            Size::Long => 0xffff_ffff,
        }
    }

    pub fn sign_bit(self) -> u32 {
        match self {
            Size::Byte => 0x80,
            Size::Word => 0x8000,
            Size::Long => 0x8000_0000,
        }
    }

    /// Sign-extend the low bits of `value` to 32 bits
    pub fn sign_extend(self, value: u32) -> u32 {
        match self {
            Size::Byte => value as u8 as i8 as i32 as u32,
            Size::Word => value as u16 as i16 as i32 as u32,
            Size::Long => value,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self {
            Size::Byte => "b",
            Size::Word => "w",
            Size::Long => "l",
        };
        write!(f, "{suffix}")
    }
}

/// D0-D7 in slots 0-7, A0-A7 in slots 8-15
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registers {
    slots: [u32; 16],
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slots(slots: [u32; 16]) -> Self {
        Registers { slots }
    }

    pub fn slots(&self) -> &[u32; 16] {
        &self.slots
    }

    /// Sub-long reads see only the least significant byte or word.
    pub fn read(&self, index: usize, size: Size) -> Result<u32, EmuError> {
        let value = *self
            .slots
            .get(index)
            .ok_or(EmuError::InvalidRegister(index))?;
        Ok(value & size.mask())
    }

    /// Sub-long writes leave the untouched upper bits of the slot intact.
    pub fn write(&mut self, index: usize, size: Size, value: u32) -> Result<(), EmuError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(EmuError::InvalidRegister(index))?;
        let mask = size.mask();
        *slot = (*slot & !mask) | (value & mask);
        Ok(())
    }

    pub fn d(&self, n: usize) -> u32 {
        self.slots[n & 7]
    }

    pub fn a(&self, n: usize) -> u32 {
        self.slots[8 + (n & 7)]
    }

    pub fn set_d(&mut self, n: usize, value: u32) {
        self.slots[n & 7] = value;
    }

    pub fn set_a(&mut self, n: usize, value: u32) {
        self.slots[8 + (n & 7)] = value;
    }

    /// Low word of a data register
    pub fn dw(&self, n: usize) -> u16 {
        self.d(n) as u16
    }

    pub fn db(&self, n: usize) -> u8 {
        self.d(n) as u8
    }

    /// Low word of an address register, the pointer width of most services
    pub fn aw(&self, n: usize) -> u16 {
        self.a(n) as u16
    }

    pub fn set_dw(&mut self, n: usize, value: u16) {
        let slot = &mut self.slots[n & 7];
        *slot = (*slot & 0xffff_0000) | value as u32;
    }

    pub fn set_db(&mut self, n: usize, value: u8) {
        let slot = &mut self.slots[n & 7];
        *slot = (*slot & 0xffff_ff00) | value as u32;
    }

    pub fn set_aw(&mut self, n: usize, value: u16) {
        let slot = &mut self.slots[8 + (n & 7)];
        *slot = (*slot & 0xffff_0000) | value as u32;
    }

    pub fn clear(&mut self) {
        self.slots = [0; 16];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_sub_size_writes_keep_upper_bits() {
        let mut regs = Registers::new();
        regs.write(0, Size::Long, 0x1234_5678).unwrap();
        regs.write(0, Size::Byte, 0xff).unwrap();
        assert_eq!(regs.d(0), 0x1234_56ff);
        regs.write(0, Size::Word, 0xabcd).unwrap();
        assert_eq!(regs.d(0), 0x1234_abcd);
        assert_eq!(regs.read(0, Size::Byte).unwrap(), 0xcd);
        assert_eq!(regs.read(0, Size::Word).unwrap(), 0xabcd);
    }

    #[test]
    fn test_address_registers_follow_data_registers() {
        let mut regs = Registers::new();
        regs.write(SP, Size::Long, 0xfffe).unwrap();
        assert_eq!(regs.a(7), 0xfffe);
        regs.set_aw(1, 0x0040);
        assert_eq!(regs.read(9, Size::Long).unwrap(), 0x0040);
    }

    #[test]
    fn test_invalid_register() {
        let regs = Registers::new();
        assert!(matches!(regs.read(16, Size::Byte), Err(EmuError::InvalidRegister(16))));
    }

    #[test]
    fn test_size_helpers() {
        assert_eq!(Size::from_bits(3), None);
        assert_eq!(Size::from_bits(1), Some(Size::Word));
        assert_eq!(Size::Byte.sign_extend(0x80), 0xffff_ff80);
        assert_eq!(Size::Word.sign_extend(0x7fff), 0x7fff);
        assert_eq!(Size::Long.bytes(), 4);
    }
}
