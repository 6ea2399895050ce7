#[cfg(test)]
mod tests {
    use crate::error::EmuError;
    use crate::test_utils::interpreter_with_code;
    use test_log::test;

    #[test]
    fn test_add_then_sub_restores_every_size() {
        // ADD.x D1,D0 followed by SUB.x D1,D0
        for (add, sub) in [(0x01, 0x01), (0x41, 0x41), (0x81, 0x81)] {
            let mut interp = interpreter_with_code(2, &[0xd0, add, 0x90, sub]);
            interp.vm.regs.set_d(0, 0x1234_5678);
            interp.vm.regs.set_d(1, 0x9abc_def0);
            interp.step().unwrap();
            interp.step().unwrap();
            assert_eq!(interp.vm.regs.d(0), 0x1234_5678);
            assert_eq!(interp.vm.regs.d(1), 0x9abc_def0);
        }
    }

    #[test]
    fn test_add_carry_on_wrap() {
        // ADD.B D1,D0
        let mut interp = interpreter_with_code(2, &[0xd0, 0x01]);
        interp.vm.regs.set_d(0, 0x1ff);
        interp.vm.regs.set_d(1, 1);
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(0), 0x100);
        assert!(interp.vm.flags.carry);
        assert!(interp.vm.flags.zero);
        assert!(!interp.vm.flags.overflow);
    }

    #[test]
    fn test_sub_borrow_and_sign() {
        // SUB.W D1,D0
        let mut interp = interpreter_with_code(2, &[0x90, 0x41]);
        interp.vm.regs.set_d(0, 1);
        interp.vm.regs.set_d(1, 2);
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.dw(0), 0xffff);
        assert!(interp.vm.flags.carry);
        assert!(interp.vm.flags.negative);
    }

    #[test]
    fn test_cmp_register_with_itself() {
        // CMP.L D0,D0
        let mut interp = interpreter_with_code(2, &[0xb0, 0x80]);
        interp.vm.regs.set_d(0, 0x8000_0000);
        interp.vm.flags.carry = true;
        interp.step().unwrap();
        assert!(interp.vm.flags.zero);
        assert!(!interp.vm.flags.carry);
        assert!(!interp.vm.flags.negative);
        assert_eq!(interp.vm.regs.d(0), 0x8000_0000);
    }

    #[test]
    fn test_addq_to_address_register_keeps_flags_from_version_3() {
        // ADDQ.W #1,A0
        let mut interp = interpreter_with_code(3, &[0x52, 0x48]);
        interp.vm.regs.set_a(0, 0x100);
        interp.vm.flags.zero = true;
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.a(0), 0x101);
        assert!(interp.vm.flags.zero);

        let mut interp = interpreter_with_code(2, &[0x52, 0x48]);
        interp.vm.regs.set_a(0, 0x100);
        interp.vm.flags.zero = true;
        interp.step().unwrap();
        assert!(!interp.vm.flags.zero);
    }

    #[test]
    fn test_subq_eight_encoded_as_zero() {
        // SUBQ.L #8,D2
        let mut interp = interpreter_with_code(2, &[0x51, 0x82]);
        interp.vm.regs.set_d(2, 10);
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(2), 2);
    }

    #[test]
    fn test_adda_sign_extends_word_source() {
        // ADDA.W D1,A0
        let mut interp = interpreter_with_code(2, &[0xd0, 0xc1]);
        interp.vm.regs.set_a(0, 0x100);
        interp.vm.regs.set_d(1, 0xffff);
        interp.vm.flags.zero = true;
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.a(0), 0xff);
        assert!(interp.vm.flags.zero);
    }

    #[test]
    fn test_logic_ops_clear_carry_and_overflow() {
        // EOR.W D1,D0 ; ANDI.B #$0f,D0 ; ORI.L #$100,D0
        let code = [
            0xb3, 0x40, //
            0x02, 0x00, 0x00, 0x0f, //
            0x00, 0x80, 0x00, 0x00, 0x01, 0x00,
        ];
        let mut interp = interpreter_with_code(2, &code);
        interp.vm.regs.set_d(0, 0xffff_00ff);
        interp.vm.regs.set_d(1, 0x0000_ffff);
        interp.vm.flags.carry = true;
        interp.vm.flags.overflow = true;
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(0), 0xffff_ff00);
        assert!(interp.vm.flags.negative);
        assert!(!interp.vm.flags.carry);
        assert!(!interp.vm.flags.overflow);
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(0), 0xffff_ff00);
        assert!(interp.vm.flags.zero);
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(0), 0xffff_ff00 | 0x100);
        assert_eq!(interp.vm.pc, 12);
    }

    #[test]
    fn test_immediate_to_ccr() {
        // ORI #4,CCR ; EORI #5,CCR ; ANDI #1,CCR
        let code = [0x00, 0x3c, 0x00, 0x04, 0x0a, 0x3c, 0x00, 0x05, 0x02, 0x3c, 0x00, 0x01];
        let mut interp = interpreter_with_code(2, &code);
        interp.step().unwrap();
        assert!(interp.vm.flags.zero);
        interp.step().unwrap();
        assert!(!interp.vm.flags.zero);
        assert!(interp.vm.flags.carry);
        interp.step().unwrap();
        assert_eq!(interp.vm.flags.ccr(), 1);
    }

    #[test]
    fn test_bit_set_then_test() {
        // BSET #3,D0 ; BTST #3,D0 ; BCLR D1,D0
        let code = [0x08, 0xc0, 0x00, 0x03, 0x08, 0x00, 0x00, 0x03, 0x03, 0x80];
        let mut interp = interpreter_with_code(2, &code);
        interp.vm.regs.set_d(1, 35);
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(0), 8);
        assert!(interp.vm.flags.zero);
        interp.step().unwrap();
        assert!(!interp.vm.flags.zero);
        // bit numbers of a data register wrap at 32
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(0), 0);
        assert!(!interp.vm.flags.zero);
    }

    #[test]
    fn test_bit_op_on_memory_is_byte_wide() {
        // BCHG #9,(A0)
        let mut interp = interpreter_with_code(2, &[0x08, 0x50, 0x00, 0x09]);
        interp.vm.regs.set_a(0, 0x400);
        interp.step().unwrap();
        assert_eq!(interp.vm.read8(0x400).unwrap(), 0x02);
    }

    #[test]
    fn test_divide_is_fatal() {
        // DIVU D1,D0
        let mut interp = interpreter_with_code(2, &[0x80, 0xc1]);
        let err = interp.step().unwrap_err();
        assert!(matches!(err, EmuError::Unimplemented { what: "DIVS/DIVU", .. }));
        assert!(!interp.vm.is_running());
        assert!(interp.host.fatal.is_some());
        assert!(!interp.step().unwrap());
    }

    #[test]
    fn test_multiply_is_fatal() {
        let mut interp = interpreter_with_code(2, &[0xc0, 0xc1]);
        assert!(interp.step().is_err());
    }

    #[test]
    fn test_shift_immediate_recomputes_flags() {
        // LSL.W #1,D0
        let mut interp = interpreter_with_code(2, &[0xe3, 0x48]);
        interp.vm.regs.set_d(0, 0xffff_c001);
        interp.vm.flags.overflow = true;
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(0), 0xffff_8002);
        assert!(interp.vm.flags.carry);
        assert!(interp.vm.flags.negative);
        assert!(!interp.vm.flags.zero);
        assert!(!interp.vm.flags.overflow);
    }

    #[test]
    fn test_shift_immediate_zero_means_eight() {
        // LSL.W #8,D0
        let mut interp = interpreter_with_code(2, &[0xe1, 0x48]);
        interp.vm.regs.set_d(0, 0xaaaa_1234);
        interp.vm.flags.carry = true;
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(0), 0xaaaa_3400);
        assert!(!interp.vm.flags.carry);
    }

    #[test]
    fn test_shift_count_from_low_byte_of_register() {
        // LSR.L D1,D0
        let mut interp = interpreter_with_code(2, &[0xe2, 0xa8]);
        interp.vm.regs.set_d(0, 0x8000_0003);
        interp.vm.regs.set_d(1, 0x102);
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(0), 0x2000_0000);
        assert!(interp.vm.flags.carry);
        assert!(!interp.vm.flags.negative);
    }

    #[test]
    fn test_shift_by_zero_register_keeps_carry() {
        // LSR.L D1,D0 with D1.b = 0
        let mut interp = interpreter_with_code(2, &[0xe2, 0xa8]);
        interp.vm.regs.set_d(0, 0);
        interp.vm.regs.set_d(1, 0x100);
        interp.vm.flags.carry = true;
        interp.vm.flags.overflow = true;
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(0), 0);
        assert!(interp.vm.flags.carry);
        assert!(interp.vm.flags.zero);
        assert!(!interp.vm.flags.overflow);
    }

    #[test]
    fn test_memory_shift_rotates_a_long_once() {
        // ROL (A0)
        let mut interp = interpreter_with_code(2, &[0xe7, 0xd0]);
        interp.vm.regs.set_a(0, 0x100);
        interp.vm.write32(0x100, 0x8000_0001).unwrap();
        interp.step().unwrap();
        assert_eq!(interp.vm.read32(0x100).unwrap(), 3);
        assert!(interp.vm.flags.carry);
        assert!(!interp.vm.flags.negative);
    }
}
