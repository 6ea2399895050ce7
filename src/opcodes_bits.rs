/// Single-bit test and modify: BTST, BCHG, BCLR, BSET
///
/// A data register operand is addressed as 32 bits (bit number mod 32);
/// anything else as a single byte (bit number mod 8). Z reports the state of
/// the bit before it is modified.
use crate::ea::Ea;
use crate::error::EmuError;
use crate::host::Host;
use crate::instruction::Opcode;
use crate::interpreter::Interpreter;
use crate::registers::Size;
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    Test,
    Change,
    Clear,
    Set,
}

impl BitOp {
    /// Selector in bits 7-6 of the second opcode byte
    pub fn from_selector(byte2: u8) -> BitOp {
        match byte2 & 0xc0 {
            0x00 => BitOp::Test,
            0x40 => BitOp::Change,
            0x80 => BitOp::Clear,
            _ => BitOp::Set,
        }
    }

    fn apply(self, value: u32, mask: u32) -> u32 {
        match self {
            BitOp::Test => value,
            BitOp::Change => value ^ mask,
            BitOp::Clear => value & !mask,
            BitOp::Set => value | mask,
        }
    }
}

impl<H: Host> Interpreter<H> {
    pub(crate) fn bit_op(&mut self, op: BitOp, target: &Ea, bit: u8) -> Result<(), EmuError> {
        let target = if target.mode == 0 {
            target.with_size(Size::Long)
        } else {
            target.with_size(Size::Byte)
        };
        let bit = if target.mode == 0 { bit & 0x1f } else { bit & 0x07 };
        let mask = 1u32 << bit;
        let value = self.vm.read_ea(&target)?;
        self.vm.flags.zero = value & mask == 0;
        trace!("{op:?} bit {bit} of {:?}", target.operand);
        if op != BitOp::Test {
            self.vm.write_ea(&target, op.apply(value, mask))?;
        }
        Ok(())
    }

    /// Bit number held in the low byte of a data register
    pub(crate) fn dynamic_bit_op(&mut self, op: Opcode) -> Result<(), EmuError> {
        let target = self.vm.resolve_field(op.byte2 & 0x3f, Size::Byte)?;
        let bit = self.vm.regs.db(op.upper_reg());
        self.bit_op(BitOp::from_selector(op.byte2), &target, bit)
    }

    /// Bit number in an extension word ahead of the operand's own extensions
    pub(crate) fn static_bit_op(&mut self, op: Opcode) -> Result<(), EmuError> {
        let bit = self.vm.read8(self.vm.pc.wrapping_add(1))?;
        self.vm.pc = self.vm.pc.wrapping_add(2);
        let target = self.vm.resolve_field(op.byte2 & 0x3f, Size::Byte)?;
        self.bit_op(BitOp::from_selector(op.byte2), &target, bit)
    }
}
