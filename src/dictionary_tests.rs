#[cfg(test)]
mod tests {
    use crate::error::EmuError;
    use crate::test_utils::{vm_from_image, vm_with_code, ImageBuilder};
    use crate::vm::VM;
    use test_log::test;

    const INPUT: u32 = 0x1000;
    const OUTPUT: u32 = 0x2000;
    const TYPED_ADJECTIVES: u32 = 0x3000;
    const ADJECTIVE_LISTS: u32 = 0x3100;

    fn lookup_vm(dictionary: &[u8], input: &[u8]) -> VM {
        let mut vm = vm_from_image(ImageBuilder::new(2).dictionary(dictionary).build());
        let bytes = vm.game.memory.bytes_mut();
        bytes[INPUT as usize..INPUT as usize + input.len()].copy_from_slice(input);
        vm.regs.set_a(6, INPUT);
        vm.regs.set_a(2, OUTPUT);
        vm.regs.set_a(3, 0);
        vm.regs.set_a(1, TYPED_ADJECTIVES);
        vm.regs.set_a(0, ADJECTIVE_LISTS);
        vm.regs.set_d(6, 0);
        vm
    }

    fn entry(vm: &VM, n: u32) -> (u8, u8, u16) {
        let at = OUTPUT + 4 * n;
        (
            vm.read8(at).unwrap(),
            vm.read8(at + 1).unwrap(),
            vm.read16(at + 2).unwrap(),
        )
    }

    #[test]
    fn test_whole_word_match() {
        // NORTH and N; only the full word matches
        let mut vm = lookup_vm(b"NORT\xc8\xce\x81", b"north\0");
        let summary = vm.dict_lookup().unwrap();
        assert_eq!(summary.matches, 1);
        assert_eq!(summary.longest, 4);
        assert_eq!(entry(&vm, 0), (0, 0, 0));
        assert_eq!(vm.read16(OUTPUT + 4).unwrap(), 0xffff);
        assert_eq!(vm.regs.a(2), OUTPUT + 4);
        assert_eq!(vm.regs.a(6), INPUT + 1);
        assert_eq!(vm.regs.dw(0), 0);
    }

    #[test]
    fn test_bank_change_resets_word_number() {
        let mut vm = lookup_vm(b"A\xc2\x82CA\xd4\x81", b"cat\0");
        let summary = vm.dict_lookup().unwrap();
        assert_eq!(summary.matches, 1);
        assert_eq!(entry(&vm, 0), (0, 1, 0));
    }

    #[test]
    fn test_apostrophe_reports_following_char() {
        let mut vm = lookup_vm(b"CA\xd4\x81", b"cat's\0");
        vm.dict_lookup().unwrap();
        assert_eq!(vm.regs.dw(0), 0x200 + b's' as u16);
    }

    #[test]
    fn test_synonym_is_replaced() {
        // the synonym table at dictionary offset 4 maps word 0 to bank 6 word 3
        let mut vm = lookup_vm(b"CA\xd4\x81\x00\x66", b"cat\0");
        vm.regs.set_d(6, 0x0b);
        vm.regs.set_a(5, 4);
        vm.dict_lookup().unwrap();
        assert_eq!(entry(&vm, 0), (0, 6, 3));
    }

    #[test]
    fn test_bank_marker_does_not_read_input() {
        // memory ends at 0x2100 and A6 points past it
        let image = ImageBuilder::new(4)
            .code(&vec![0; 0x2100])
            .dictionary(b"\x82\x81")
            .build();
        let mut vm = vm_from_image(image);
        vm.regs.set_a(6, 0x3000);
        vm.regs.set_a(2, OUTPUT);
        vm.regs.set_a(3, 0);
        let summary = vm.dict_lookup().unwrap();
        assert_eq!(summary.matches, 0);
        assert_eq!(vm.read16(OUTPUT).unwrap(), 0xffff);
        assert_eq!(vm.regs.a(6), 0x3001);
    }

    #[test]
    fn test_no_match() {
        let mut vm = lookup_vm(b"CA\xd4\x81", b"dog\0");
        let summary = vm.dict_lookup().unwrap();
        assert_eq!(summary.matches, 0);
        assert_eq!(vm.read16(OUTPUT).unwrap(), 0xffff);
    }

    fn noun_vm(valid_adjectives: &[u8]) -> VM {
        let mut vm = lookup_vm(b"\x82\x82\x82\x82\x82\x82CA\xd4\x81", b"cat\0");
        let bytes = vm.game.memory.bytes_mut();
        // one typed adjective, number 5
        bytes[TYPED_ADJECTIVES as usize..TYPED_ADJECTIVES as usize + 2].copy_from_slice(&[0, 5]);
        let lists = ADJECTIVE_LISTS as usize;
        bytes[lists..lists + valid_adjectives.len()].copy_from_slice(valid_adjectives);
        vm
    }

    #[test]
    fn test_noun_kept_when_adjective_applies() {
        // list entries are adjective numbers plus 3
        let mut vm = noun_vm(&[8, 0]);
        let summary = vm.dict_lookup().unwrap();
        assert_eq!(summary.matches, 1);
        assert_eq!(entry(&vm, 0), (0, 6, 0));
        assert_eq!(vm.regs.db(1), 0);
    }

    #[test]
    fn test_noun_dropped_when_adjective_does_not_apply() {
        let mut vm = noun_vm(&[9, 0]);
        let summary = vm.dict_lookup().unwrap();
        assert_eq!(summary.matches, 0);
        assert_eq!(vm.regs.a(2), OUTPUT);
        assert_eq!(vm.regs.db(1), 1);
    }

    #[test]
    fn test_lookup_in_memory_without_dictionary_bank() {
        let mut vm = vm_with_code(1, &[]);
        let bytes = vm.game.memory.bytes_mut();
        bytes[0x500..0x504].copy_from_slice(b"CA\xd4\x81");
        bytes[INPUT as usize..INPUT as usize + 4].copy_from_slice(b"cat\0");
        vm.regs.set_a(6, INPUT);
        vm.regs.set_a(2, OUTPUT);
        vm.regs.set_a(3, 0x500);
        vm.regs.set_a(1, TYPED_ADJECTIVES);
        let summary = vm.dict_lookup().unwrap();
        assert_eq!(summary.matches, 1);
    }

    #[test]
    fn test_bank_services() {
        let mut vm = vm_from_image(ImageBuilder::new(2).dictionary(b"AB\xc3D\xc5\x81").build());
        vm.regs.set_a(1, 1);
        vm.peek_dict().unwrap();
        assert_eq!(vm.regs.db(1), b'B');

        vm.regs.set_d(1, b'X' as u32);
        vm.poke_dict().unwrap();
        assert_eq!(vm.game.dictionary.as_deref().unwrap()[1], b'X');

        vm.regs.set_a(0, 0x600);
        vm.regs.set_a(1, 0);
        vm.copy_dict_word().unwrap();
        assert_eq!(vm.game.memory.bytes()[0x600..0x603], *b"AX\xc3");
        assert_eq!((vm.regs.a(0), vm.regs.a(1)), (0x603, 3));

        vm.regs.set_a(1, 0);
        vm.regs.set_d(2, 2);
        vm.skip_dict_words().unwrap();
        assert_eq!(vm.regs.a(1), 5);
    }

    #[test]
    fn test_skip_entries_and_parallel_strings() {
        let mut vm = vm_from_image(ImageBuilder::new(2).dictionary(b"A\xc2C\xc4\x81").build());
        vm.game.memory.bytes_mut()[0x700..0x706].copy_from_slice(b"one\0x\0");
        vm.regs.set_a(0, 0);
        vm.regs.set_a(1, 0x700);
        vm.regs.set_d(0, 2);
        vm.skip_dict_and_strings().unwrap();
        assert_eq!(vm.regs.a(0), 4);
        assert_eq!(vm.regs.a(1), 0x706);
    }

    #[test]
    fn test_bank_services_need_a_bank() {
        let mut vm = vm_with_code(2, &[]);
        assert!(matches!(vm.peek_dict(), Err(EmuError::MissingBank("dictionary"))));
        assert!(matches!(vm.copy_dict_word(), Err(EmuError::MissingBank("dictionary"))));
    }
}
