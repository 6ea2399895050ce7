#[cfg(test)]
mod tests {
    use crate::test_utils::interpreter_with_code;
    use crate::vm::INITIAL_SP;
    use test_log::test;

    #[test]
    fn test_word_branch_counts_from_extension() {
        let mut interp = interpreter_with_code(2, &[0x60, 0x00, 0x00, 0x10]);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 0x12);
    }

    #[test]
    fn test_short_branch_backwards() {
        let mut code = vec![0u8; 0x20];
        code[0x10] = 0x60;
        code[0x11] = 0xf0;
        let mut interp = interpreter_with_code(2, &code);
        interp.vm.pc = 0x10;
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 0x02);
    }

    #[test]
    fn test_branch_to_self_stops() {
        let mut interp = interpreter_with_code(2, &[0x60, 0xfe]);
        assert!(!interp.step().unwrap());
        assert!(!interp.vm.is_running());
        assert!(interp.host.flushes > 0);
        assert!(interp.host.fatal.is_none());
    }

    #[test]
    fn test_bsr_and_rts() {
        // BSR.W +6 ; ... ; RTS at 8
        let code = [0x61, 0x00, 0x00, 0x06, 0x4e, 0x71, 0x4e, 0x71, 0x4e, 0x75];
        let mut interp = interpreter_with_code(2, &code);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 8);
        assert_eq!(interp.vm.regs.a(7), INITIAL_SP - 4);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 4);
        assert_eq!(interp.vm.regs.a(7), INITIAL_SP);
    }

    #[test]
    fn test_short_opcodes_bsr_rts() {
        // 0xA4: BSR.S +2 ; 0xA2: RTS
        let code = [0xa4, 0x02, 0x4e, 0x71, 0xa2, 0x00];
        let mut interp = interpreter_with_code(2, &code);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 4);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 2);
    }

    #[test]
    fn test_untaken_word_bcc_skips_displacement() {
        // BEQ.W with Z clear
        let mut interp = interpreter_with_code(2, &[0x67, 0x00, 0x00, 0x10]);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 4);
        let mut interp = interpreter_with_code(2, &[0x67, 0x00, 0x00, 0x10]);
        interp.vm.flags.zero = true;
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 0x12);
    }

    #[test]
    fn test_dbf_loops_until_minus_one() {
        // DBF D0,* (displacement -2 from the extension word)
        let mut interp = interpreter_with_code(2, &[0x51, 0xc8, 0xff, 0xfe]);
        interp.vm.regs.set_d(0, 0x0001_0002);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 0);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 0);
        assert_eq!(interp.vm.regs.d(0), 0x0001_0000);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 4);
        assert_eq!(interp.vm.regs.d(0), 0x0001_ffff);
    }

    #[test]
    fn test_dbcc_with_true_condition_falls_through() {
        // DBT D3
        let mut interp = interpreter_with_code(2, &[0x50, 0xcb, 0x00, 0x10]);
        interp.vm.regs.set_d(3, 5);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 4);
        assert_eq!(interp.vm.regs.d(3), 5);
    }

    #[test]
    fn test_scc_writes_byte() {
        // SEQ D0 ; SNE D1
        let mut interp = interpreter_with_code(2, &[0x57, 0xc0, 0x56, 0xc1]);
        interp.vm.flags.zero = true;
        interp.vm.regs.set_d(1, 0x1234);
        interp.step().unwrap();
        interp.step().unwrap();
        assert_eq!(interp.vm.regs.d(0), 0xff);
        assert_eq!(interp.vm.regs.d(1), 0x1200);
    }

    #[test]
    fn test_jsr_and_jmp_through_address_register() {
        // JSR (A0) ; at 0x20: JMP (A1)
        let mut code = vec![0u8; 0x30];
        code[..2].copy_from_slice(&[0x4e, 0x90]);
        code[0x20..0x22].copy_from_slice(&[0x4e, 0xd1]);
        let mut interp = interpreter_with_code(2, &code);
        interp.vm.regs.set_a(0, 0x20);
        interp.vm.regs.set_a(1, 0x28);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 0x20);
        assert_eq!(interp.vm.pop().unwrap(), 2);
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 0x28);
    }

    #[test]
    fn test_jmp_to_register_is_fatal() {
        // JMP D0
        let mut interp = interpreter_with_code(2, &[0x4e, 0xc0]);
        assert!(interp.step().is_err());
        assert!(interp.host.fatal.is_some());
    }

    #[test]
    fn test_short_tst_sets_flags() {
        // 0xA6: TST.W D2
        let mut interp = interpreter_with_code(2, &[0xa6, 0x42]);
        interp.vm.regs.set_d(2, 0x8000);
        interp.step().unwrap();
        assert!(interp.vm.flags.negative);
        assert!(!interp.vm.flags.zero);
    }

    #[test]
    fn test_line_f_prints_d1_in_version_0() {
        let mut interp = interpreter_with_code(0, &[0xf0, 0x00]);
        interp.vm.regs.set_d(1, b'x' as u32);
        interp.step().unwrap();
        assert_eq!(interp.host.get_output(), "x");
    }

    #[test]
    fn test_line_f_calls_fl_sub_in_version_1() {
        let mut interp = interpreter_with_code(1, &[0xf1, 0x23]);
        interp.vm.tables.fl_sub = 0x400;
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 0x400);
        assert_eq!(interp.vm.pop().unwrap(), 2);
    }

    #[test]
    fn test_line_f_table_jump() {
        let mut code = vec![0u8; 0x1200];
        code[..2].copy_from_slice(&[0xf0, 0x01]);
        // entry 0xf801 selects the word at fl_tab + 0x7fe * 2
        code[0x10fc..0x10fe].copy_from_slice(&[0x00, 0x10]);
        let mut interp = interpreter_with_code(2, &code);
        interp.vm.tables.fl_tab = 0x100;
        interp.vm.tables.fl_size = 0;
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 0x110c);
        assert_eq!(interp.vm.pop().unwrap(), 2);
    }

    #[test]
    fn test_line_f_below_fl_size_calls_fl_sub() {
        let mut interp = interpreter_with_code(3, &[0xf0, 0x05]);
        interp.vm.tables.fl_sub = 0x300;
        interp.vm.tables.fl_size = 0x10;
        interp.step().unwrap();
        assert_eq!(interp.vm.pc, 0x300);
    }
}
