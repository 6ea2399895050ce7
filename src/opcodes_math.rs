/// Arithmetic and logical operations
///
/// This module handles the two-operand ALU groups:
/// - ADD/SUB in register, memory, address-register and quick forms
/// - CMP/CMPA and the immediate group (ORI/ANDI/SUBI/ADDI/EORI/CMPI)
/// - AND/OR/EOR and the immediate-to-CCR variants
///
/// Carry is an unsigned compare of the operands; overflow is never computed
/// and always ends up clear.
use crate::ea::Ea;
use crate::error::EmuError;
use crate::header::Version;
use crate::host::Host;
use crate::instruction::Opcode;
use crate::interpreter::Interpreter;
use crate::registers::Size;
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogicOp {
    And,
    Or,
    Eor,
}

impl<H: Host> Interpreter<H> {
    /// N/Z/V are skipped for quick forms to an address register from version 3 on
    fn arithmetic_flags_enabled(&self) -> bool {
        self.vm.version() < Version::V3 || !self.vm.quick_flag
    }

    /// ADD without an address-register destination
    pub(crate) fn do_add(&mut self, dst: &Ea, src: &Ea) -> Result<(), EmuError> {
        let size = dst.size;
        let a = self.vm.read_ea(dst)?;
        let b = self.vm.read_ea(src)?;
        let result = a.wrapping_add(b) & size.mask();
        self.vm.write_ea(dst, result)?;
        // the source is read again so ADD Dn,Dn compares against the sum
        let b_after = self.vm.read_ea(src)?;
        self.vm.flags.carry = b_after > result;
        if self.arithmetic_flags_enabled() {
            self.vm.flags.overflow = false;
            self.vm.flags.set_nz(result, size);
        }
        Ok(())
    }

    /// SUB without an address-register destination
    pub(crate) fn do_sub(&mut self, dst: &Ea, src: &Ea) -> Result<(), EmuError> {
        let size = dst.size;
        let a = self.vm.read_ea(dst)?;
        let b = self.vm.read_ea(src)?;
        self.vm.flags.carry = b > a;
        let result = a.wrapping_sub(b) & size.mask();
        self.vm.write_ea(dst, result)?;
        if self.arithmetic_flags_enabled() {
            self.vm.flags.overflow = false;
            self.vm.flags.set_nz(result, size);
        }
        Ok(())
    }

    /// ADDA/SUBA: sign-extended source applied to the whole register, no flags
    fn do_address_arith(&mut self, areg: usize, src: &Ea, subtract: bool) -> Result<(), EmuError> {
        let value = src.size.sign_extend(self.vm.read_ea(src)?);
        let current = self.vm.regs.a(areg);
        let result = if subtract {
            current.wrapping_sub(value)
        } else {
            current.wrapping_add(value)
        };
        self.vm.regs.set_a(areg, result);
        Ok(())
    }

    /// Subtraction into a scratch value; only the flags survive
    pub(crate) fn do_cmp(&mut self, dst: &Ea, src: &Ea) -> Result<(), EmuError> {
        self.vm.quick_flag = false;
        let size = dst.size;
        let a = self.vm.read_ea(dst)?;
        let b = self.vm.read_ea(src)?;
        self.vm.flags.carry = b > a;
        self.vm.flags.overflow = false;
        self.vm.flags.set_nz(a.wrapping_sub(b), size);
        Ok(())
    }

    pub(crate) fn do_logic(&mut self, op: LogicOp, dst: &Ea, src: &Ea) -> Result<(), EmuError> {
        let a = self.vm.read_ea(dst)?;
        let b = self.vm.read_ea(src)?;
        let result = match op {
            LogicOp::And => a & b,
            LogicOp::Or => a | b,
            LogicOp::Eor => a ^ b,
        };
        self.vm.write_ea(dst, result)?;
        self.vm.flags.carry = false;
        self.vm.flags.overflow = false;
        self.vm.flags.set_nz(result, dst.size);
        Ok(())
    }

    /// Immediate source followed by the destination described by byte 2
    fn immediate_operands(&mut self, op: Opcode) -> Result<(Ea, Ea), EmuError> {
        let size = self.vm.field_size(op.byte2)?;
        let src = self.vm.immediate(size);
        let dst = self.vm.resolve_field(op.byte2, size)?;
        Ok((dst, src))
    }

    /// Effective address from byte 2 and the data register from byte 1.
    /// With the direction bit clear the data register is the destination.
    fn ea_and_data_reg(&mut self, op: Opcode) -> Result<(Ea, Ea), EmuError> {
        let size = self.vm.field_size(op.byte2)?;
        let ea = self.vm.resolve_field(op.byte2, size)?;
        let dn = Ea::register(op.upper_reg(), size);
        if op.direction() {
            Ok((ea, dn))
        } else {
            Ok((dn, ea))
        }
    }

    /// Size of ADDA/SUBA/CMPA from bit 8
    fn address_op_size(op: Opcode) -> Size {
        if op.direction() {
            Size::Long
        } else {
            Size::Word
        }
    }

    fn ccr_immediate(&mut self, logic: LogicOp) -> Result<(), EmuError> {
        let mask = self.vm.fetch_extension()? as u8 & 0x0f;
        let ccr = self.vm.flags.ccr();
        let ccr = match logic {
            LogicOp::Or => ccr | mask,
            LogicOp::And => ccr & mask,
            LogicOp::Eor => ccr ^ mask,
        };
        trace!("{logic:?} to ccr #{mask:x}");
        self.vm.flags.set_ccr(ccr);
        Ok(())
    }

    /// 0x00-0x0F: immediate group and bit operations
    pub(crate) fn execute_immediate(&mut self, op: Opcode) -> Result<(), EmuError> {
        let to_ccr = op.byte2 == 0x3c || op.byte2 == 0x7c;
        match op.byte1 {
            0x00 if to_ccr => self.ccr_immediate(LogicOp::Or),
            0x02 if to_ccr => self.ccr_immediate(LogicOp::And),
            0x0a if to_ccr => self.ccr_immediate(LogicOp::Eor),
            0x00 => {
                let (dst, src) = self.immediate_operands(op)?;
                self.do_logic(LogicOp::Or, &dst, &src)
            }
            0x02 => {
                let (dst, src) = self.immediate_operands(op)?;
                self.do_logic(LogicOp::And, &dst, &src)
            }
            0x04 => {
                let (dst, src) = self.immediate_operands(op)?;
                self.do_sub(&dst, &src)
            }
            0x06 => {
                let (dst, src) = self.immediate_operands(op)?;
                self.do_add(&dst, &src)
            }
            0x08 => self.static_bit_op(op),
            0x0a => {
                let (dst, src) = self.immediate_operands(op)?;
                self.do_logic(LogicOp::Eor, &dst, &src)
            }
            0x0c => {
                let (dst, src) = self.immediate_operands(op)?;
                self.do_cmp(&dst, &src)
            }
            _ => self.dynamic_bit_op(op),
        }
    }

    /// 0x50-0x5F with a size field: ADDQ/SUBQ
    pub(crate) fn quick_arith(&mut self, op: Opcode) -> Result<(), EmuError> {
        let size = self.vm.field_size(op.byte2)?;
        let dst = self.vm.resolve_field(op.byte2, size)?;
        self.vm.quick_flag = dst.is_address_register();
        let n = op.upper_reg() as u32;
        let src = Ea::value(if n == 0 { 8 } else { n }, size);
        if op.direction() {
            self.do_sub(&dst, &src)
        } else {
            self.do_add(&dst, &src)
        }
    }

    /// 0x80-0x8F: OR
    pub(crate) fn execute_or_group(&mut self, op: Opcode) -> Result<(), EmuError> {
        if op.byte2 & 0xc0 == 0xc0 {
            return Err(self.unimplemented(op, "DIVS/DIVU"));
        }
        if op.byte2 & 0xf0 == 0 && op.direction() {
            return Err(self.unimplemented(op, "SBCD"));
        }
        let (dst, src) = self.ea_and_data_reg(op)?;
        self.do_logic(LogicOp::Or, &dst, &src)
    }

    /// 0x90-0x9F and 0xD0-0xDF: SUB/SUBA and ADD/ADDA
    pub(crate) fn execute_add_sub_group(&mut self, op: Opcode, subtract: bool) -> Result<(), EmuError> {
        self.vm.quick_flag = false;
        if op.byte2 & 0xc0 == 0xc0 {
            let size = Self::address_op_size(op);
            let src = self.vm.resolve_field(op.byte2, size)?;
            return self.do_address_arith(op.upper_reg(), &src, subtract);
        }
        let (dst, src) = self.ea_and_data_reg(op)?;
        if subtract {
            self.do_sub(&dst, &src)
        } else {
            self.do_add(&dst, &src)
        }
    }

    /// 0xB0-0xBF: CMP, CMPA, EOR
    pub(crate) fn execute_cmp_eor_group(&mut self, op: Opcode) -> Result<(), EmuError> {
        if op.byte2 & 0xc0 == 0xc0 {
            // CMPA compares the low word or long of An without extension
            let size = Self::address_op_size(op);
            let src = self.vm.resolve_field(op.byte2, size)?;
            let dst = Ea::register(8 + op.upper_reg(), size);
            return self.do_cmp(&dst, &src);
        }
        let size = self.vm.field_size(op.byte2)?;
        let ea = self.vm.resolve_field(op.byte2, size)?;
        let dn = Ea::register(op.upper_reg(), size);
        if op.direction() {
            self.do_logic(LogicOp::Eor, &ea, &dn)
        } else {
            self.do_cmp(&dn, &ea)
        }
    }

    /// 0xC0-0xCF: AND and EXG
    pub(crate) fn execute_and_exg_group(&mut self, op: Opcode) -> Result<(), EmuError> {
        if op.direction() {
            match op.byte2 & 0xf8 {
                0x40 | 0x48 | 0x88 => return self.exchange(op),
                _ => {}
            }
        }
        if op.byte2 & 0xc0 == 0xc0 {
            return Err(self.unimplemented(op, if op.direction() { "MULS" } else { "MULU" }));
        }
        let (dst, src) = self.ea_and_data_reg(op)?;
        self.do_logic(LogicOp::And, &dst, &src)
    }
}
