/// Data movement and single-operand instructions
///
/// MOVE, MOVEQ, MOVEM, LEA, PEA, EXG and the 0x40-0x4D group of
/// single-operand operations (CLR, NEG, NOT, TST, SWAP, EXT, MOVE to CCR).
use crate::ea::Ea;
use crate::error::EmuError;
use crate::header::Version;
use crate::host::Host;
use crate::instruction::Opcode;
use crate::interpreter::Interpreter;
use crate::opcodes_math::LogicOp;
use crate::registers::Size;
use log::trace;

impl<H: Host> Interpreter<H> {
    /// 0x10-0x3F: MOVE.B/.L/.W
    pub(crate) fn execute_move(&mut self, op: Opcode, size: Size) -> Result<(), EmuError> {
        let src = self.vm.resolve_field(op.byte2 & 0x3f, size)?;
        let dst_mode = ((op.byte2 >> 6) & 3) | ((op.byte1 & 1) << 2);
        let dst = self.vm.resolve(dst_mode, op.upper_reg() as u8, size)?;
        // register sources are read after the destination side effects
        let value = self.vm.read_ea(&src)?;
        trace!("move.{size} {:?} -> {:?}", src.operand, dst.operand);
        self.vm.write_ea(&dst, value)?;
        // later games rely on MOVE to An leaving the flags alone
        if self.vm.version() < Version::V2 || !dst.is_address_register() {
            self.vm.flags.carry = false;
            self.vm.flags.overflow = false;
            self.vm.flags.set_nz(value, size);
        }
        Ok(())
    }

    /// 0x70-0x7F: MOVEQ. C and V are not touched.
    pub(crate) fn execute_moveq(&mut self, op: Opcode) -> Result<(), EmuError> {
        let value = op.byte2 as i8 as i32 as u32;
        self.vm.regs.set_d(op.upper_reg(), value);
        self.vm.flags.negative = op.byte2 > 0x7f;
        self.vm.flags.zero = op.byte2 == 0;
        Ok(())
    }

    /// 0x40-0x4F
    pub(crate) fn execute_misc(&mut self, op: Opcode) -> Result<(), EmuError> {
        if op.byte1 & 1 != 0 {
            return self.load_effective_address(op);
        }
        let sized = op.byte2 & 0xc0 != 0xc0;
        match op.byte1 {
            0x40 => Err(self.unimplemented(op, "NEGX/MOVE from SR")),
            0x42 if sized => self.clear(op),
            0x42 => Err(self.unimplemented(op, "MOVE from CCR")),
            0x44 if sized => self.negate(op),
            0x44 => self.move_to_ccr(op),
            0x46 if sized => {
                let size = self.vm.field_size(op.byte2)?;
                let dst = self.vm.resolve_field(op.byte2, size)?;
                self.do_logic(LogicOp::Eor, &dst, &Ea::value(0xffff_ffff, size))
            }
            0x46 => Err(self.unimplemented(op, "MOVE to SR")),
            0x48 => self.execute_group_48(op),
            0x4a if sized => self.test(op),
            0x4a => Err(self.unimplemented(op, "TAS")),
            0x4c => self.movem_load(op),
            _ => self.execute_jump_group(op),
        }
    }

    fn load_effective_address(&mut self, op: Opcode) -> Result<(), EmuError> {
        if op.byte2 & 0xc0 != 0xc0 {
            return Err(self.unimplemented(op, "CHK"));
        }
        let ea = self.vm.resolve_field(op.byte2, Size::Long)?;
        let addr = self.vm.require_address(&ea, "LEA")?;
        trace!("lea {addr:06x} -> a{}", op.upper_reg());
        self.vm.regs.set_a(op.upper_reg(), addr);
        Ok(())
    }

    /// CLR: N and C cleared, Z set, V untouched
    fn clear(&mut self, op: Opcode) -> Result<(), EmuError> {
        let size = self.vm.field_size(op.byte2)?;
        let dst = self.vm.resolve_field(op.byte2, size)?;
        self.vm.write_ea(&dst, 0)?;
        self.vm.flags.negative = false;
        self.vm.flags.carry = false;
        self.vm.flags.zero = true;
        Ok(())
    }

    fn negate(&mut self, op: Opcode) -> Result<(), EmuError> {
        let size = self.vm.field_size(op.byte2)?;
        let dst = self.vm.resolve_field(op.byte2, size)?;
        let result = self.vm.read_ea(&dst)?.wrapping_neg() & size.mask();
        self.vm.write_ea(&dst, result)?;
        self.vm.flags.carry = result != 0;
        self.vm.flags.overflow = false;
        self.vm.flags.set_nz(result, size);
        Ok(())
    }

    fn move_to_ccr(&mut self, op: Opcode) -> Result<(), EmuError> {
        self.vm.flags.clear();
        let src = self.vm.resolve_field(op.byte2 & 0x3f, Size::Word)?;
        let ccr = self.vm.read_ea(&src)? as u8;
        self.vm.flags.set_ccr(ccr);
        Ok(())
    }

    fn test(&mut self, op: Opcode) -> Result<(), EmuError> {
        let size = self.vm.field_size(op.byte2)?;
        let src = self.vm.resolve_field(op.byte2, size)?;
        let value = self.vm.read_ea(&src)?;
        self.vm.flags.carry = false;
        self.vm.flags.overflow = false;
        self.vm.flags.set_nz(value, size);
        Ok(())
    }

    /// 0x48: SWAP, EXT, PEA, MOVEM to memory
    fn execute_group_48(&mut self, op: Opcode) -> Result<(), EmuError> {
        let reg = op.lower_reg();
        match op.byte2 & 0xf8 {
            0x40 => {
                let value = self.vm.regs.d(reg).rotate_left(16);
                self.vm.regs.set_d(reg, value);
                self.vm.flags.set_nz(value, Size::Long);
            }
            0x80 => {
                let value = Size::Byte.sign_extend(self.vm.regs.db(reg) as u32);
                self.vm.regs.set_dw(reg, value as u16);
                self.vm.flags.set_nz(value, Size::Word);
            }
            0xc0 => {
                let value = Size::Word.sign_extend(self.vm.regs.dw(reg) as u32);
                self.vm.regs.set_d(reg, value);
                self.vm.flags.set_nz(value, Size::Long);
            }
            _ if op.byte2 & 0xc0 == 0x40 => {
                let ea = self.vm.resolve_field(op.byte2 & 0x3f, Size::Long)?;
                let addr = self.vm.require_address(&ea, "PEA")?;
                self.vm.push(addr)?;
            }
            _ => self.movem_store(op)?,
        }
        Ok(())
    }

    /// Size, mode and register of a MOVEM opcode followed by its register mask
    fn movem_operands(&mut self, op: Opcode) -> Result<(Size, u8, u8, u16), EmuError> {
        let field = op.byte2.wrapping_sub(0x40);
        let size = self.vm.field_size(field)?;
        // the game compiler never emits a byte MOVEM; treat one as corrupt code
        if size == Size::Byte {
            return Err(EmuError::IllegalAddressing {
                pc: op.pc,
                what: "MOVEM byte size",
            });
        }
        let mask = self.vm.fetch_extension()?;
        Ok((size, (field >> 3) & 7, field & 7, mask))
    }

    /// Registers in store order: the low mask byte walks down from A7,
    /// the high byte from D7
    fn movem_store_order(mask: u16) -> impl Iterator<Item = usize> {
        let [hi, lo] = mask.to_be_bytes();
        let low = (0..8).filter(move |bit| lo & (1 << bit) != 0).map(|bit| 15 - bit);
        let high = (0..8).filter(move |bit| hi & (1 << bit) != 0).map(|bit| 7 - bit);
        low.chain(high)
    }

    /// Registers in load order: D0-D7 from the low byte, then A0-A7
    fn movem_load_order(mask: u16) -> impl Iterator<Item = usize> {
        let [hi, lo] = mask.to_be_bytes();
        let low = (0..8).filter(move |bit| lo & (1 << bit) != 0);
        let high = (0..8).filter(move |bit| hi & (1 << bit) != 0).map(|bit| 8 + bit);
        low.chain(high)
    }

    /// 0x48 and 0xA8: registers to memory. The operand is resolved once per
    /// register so pre-decrement steps through the block.
    pub(crate) fn movem_store(&mut self, op: Opcode) -> Result<(), EmuError> {
        let (size, mode, reg, mask) = self.movem_operands(op)?;
        for index in Self::movem_store_order(mask) {
            let dst = self.vm.resolve(mode, reg, size)?;
            let value = self.vm.regs.read(index, size)?;
            self.vm.write_ea(&dst, value)?;
        }
        Ok(())
    }

    /// 0x4C and 0xAA: memory to registers
    pub(crate) fn movem_load(&mut self, op: Opcode) -> Result<(), EmuError> {
        let (size, mode, reg, mask) = self.movem_operands(op)?;
        for index in Self::movem_load_order(mask) {
            let src = self.vm.resolve(mode, reg, size)?;
            let value = self.vm.read_ea(&src)?;
            self.vm.regs.write(index, size, value)?;
        }
        Ok(())
    }

    /// EXG in its three register pairings
    pub(crate) fn exchange(&mut self, op: Opcode) -> Result<(), EmuError> {
        let (x, y) = match op.byte2 & 0xf8 {
            0x40 => (op.lower_reg(), op.upper_reg()),
            0x48 => (8 + op.lower_reg(), 8 + op.upper_reg()),
            _ => (8 + op.lower_reg(), op.upper_reg()),
        };
        let vx = self.vm.regs.read(x, Size::Long)?;
        let vy = self.vm.regs.read(y, Size::Long)?;
        self.vm.regs.write(x, Size::Long, vy)?;
        self.vm.regs.write(y, Size::Long, vx)?;
        Ok(())
    }
}
