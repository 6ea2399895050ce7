/// Shifts and rotates, one bit per iteration
///
/// Only the rotate type feeds the outgoing bit back in; the arithmetic
/// types behave like the logical ones. The memory form always works on a
/// long and shifts once.
use crate::error::EmuError;
use crate::host::Host;
use crate::instruction::Opcode;
use crate::interpreter::Interpreter;
use crate::registers::Size;
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftKind {
    Arithmetic,
    Logical,
    RotateExtend,
    Rotate,
}

impl ShiftKind {
    fn from_bits(bits: u8) -> ShiftKind {
        match bits & 3 {
            0 => ShiftKind::Arithmetic,
            1 => ShiftKind::Logical,
            2 => ShiftKind::RotateExtend,
            _ => ShiftKind::Rotate,
        }
    }
}

/// Shift `value` by `count` single steps. Returns the result and the last
/// bit shifted out, or `None` when nothing moved.
pub fn shift(value: u32, size: Size, kind: ShiftKind, left: bool, count: u32) -> (u32, Option<bool>) {
    let mask = size.mask();
    let top = size.sign_bit();
    let mut value = value & mask;
    let mut carry = None;
    for _ in 0..count {
        let out = if left { value & top != 0 } else { value & 1 != 0 };
        value = if left { (value << 1) & mask } else { value >> 1 };
        if out && kind == ShiftKind::Rotate {
            value |= if left { 1 } else { top };
        }
        carry = Some(out);
    }
    (value, carry)
}

impl<H: Host> Interpreter<H> {
    /// 0xE0-0xEF
    pub(crate) fn execute_shift(&mut self, op: Opcode) -> Result<(), EmuError> {
        let (target, count, kind) = if op.byte2 & 0xc0 == 0xc0 {
            let target = self.vm.resolve_field(op.byte2 & 0x3f, Size::Long)?;
            (target, 1, ShiftKind::from_bits(op.byte1 >> 1))
        } else {
            let size = self.vm.field_size(op.byte2)?;
            let target = self.vm.resolve(0, op.byte2 & 7, size)?;
            let count = if op.byte2 & 0x20 == 0 {
                match op.upper_reg() {
                    0 => 8,
                    n => n as u32,
                }
            } else {
                self.vm.regs.db(op.upper_reg()) as u32
            };
            (target, count, ShiftKind::from_bits(op.byte2 >> 3))
        };
        let left = op.direction();
        let value = self.vm.read_ea(&target)?;
        let (result, carry) = shift(value, target.size, kind, left, count);
        trace!(
            "{kind:?} {} {count} of {:?}",
            if left { "left" } else { "right" },
            target.operand
        );
        self.vm.write_ea(&target, result)?;
        if let Some(carry) = carry {
            self.vm.flags.carry = carry;
        }
        self.vm.flags.overflow = false;
        self.vm.flags.set_nz(result, target.size);
        Ok(())
    }
}
