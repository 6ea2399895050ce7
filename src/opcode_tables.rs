/// Major opcode groups, selected by the top seven bits of the first byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpGroup {
    /// 0x00-0x0F: immediate logic/arithmetic, CCR ops, bit operations
    Immediate,
    MoveByte,
    MoveLong,
    MoveWord,
    /// 0x40-0x4F: single-operand ops, LEA, MOVEM, JMP/JSR/RTS
    Misc,
    /// 0x50-0x5F: ADDQ, SUBQ, Scc, DBcc
    QuickScc,
    /// 0x60/0x61
    BraBsr,
    /// 0x62-0x6F
    Bcc,
    Moveq,
    /// 0x80-0x8F: OR (DIVx and SBCD are not supported)
    OrDiv,
    Sub,
    /// Vendor trap range 0xA0, 0xAC-0xAF
    LineA,
    /// 0xA2: short RTS
    Rts,
    /// 0xA4: short BSR
    Bsr,
    /// 0xA6: short TST
    Tst,
    /// 0xA8: short MOVEM store
    MovemStore,
    /// 0xAA: short MOVEM load
    MovemLoad,
    CmpEor,
    AndExg,
    Add,
    Shift,
    /// 0xF0-0xFF: programmable shortcuts
    LineF,
}

const fn build_groups() -> [OpGroup; 128] {
    let mut table = [OpGroup::LineA; 128];
    let mut i = 0;
    while i < 128 {
        table[i] = match i {
            0x00..=0x07 => OpGroup::Immediate,
            0x08..=0x0f => OpGroup::MoveByte,
            0x10..=0x17 => OpGroup::MoveLong,
            0x18..=0x1f => OpGroup::MoveWord,
            0x20..=0x27 => OpGroup::Misc,
            0x28..=0x2f => OpGroup::QuickScc,
            0x30 => OpGroup::BraBsr,
            0x31..=0x37 => OpGroup::Bcc,
            0x38..=0x3f => OpGroup::Moveq,
            0x40..=0x47 => OpGroup::OrDiv,
            0x48..=0x4f => OpGroup::Sub,
            0x51 => OpGroup::Rts,
            0x52 => OpGroup::Bsr,
            0x53 => OpGroup::Tst,
            0x54 => OpGroup::MovemStore,
            0x55 => OpGroup::MovemLoad,
            0x50 | 0x56 | 0x57 => OpGroup::LineA,
            0x58..=0x5f => OpGroup::CmpEor,
            0x60..=0x67 => OpGroup::AndExg,
            0x68..=0x6f => OpGroup::Add,
            0x70..=0x77 => OpGroup::Shift,
            _ => OpGroup::LineF,
        };
        i += 1;
    }
    table
}

/// Indexed by `byte1 >> 1`
pub static GROUPS: [OpGroup; 128] = build_groups();

pub fn group_of(byte1: u8) -> OpGroup {
    GROUPS[(byte1 >> 1) as usize]
}

/// Get a short name for a group, used by the trace log
pub fn group_name(group: OpGroup) -> &'static str {
    match group {
        OpGroup::Immediate => "imm/bitop",
        OpGroup::MoveByte => "move.b",
        OpGroup::MoveLong => "move.l",
        OpGroup::MoveWord => "move.w",
        OpGroup::Misc => "misc",
        OpGroup::QuickScc => "addq/subq/scc/dbcc",
        OpGroup::BraBsr => "bra/bsr",
        OpGroup::Bcc => "bcc",
        OpGroup::Moveq => "moveq",
        OpGroup::OrDiv => "or",
        OpGroup::Sub => "sub",
        OpGroup::LineA => "line_a",
        OpGroup::Rts => "rts",
        OpGroup::Bsr => "bsr",
        OpGroup::Tst => "tst",
        OpGroup::MovemStore => "movem",
        OpGroup::MovemLoad => "movem",
        OpGroup::CmpEor => "cmp/eor",
        OpGroup::AndExg => "and/exg",
        OpGroup::Add => "add",
        OpGroup::Shift => "shift",
        OpGroup::LineF => "line_f",
    }
}

/// Line-A services start at this second byte
pub const LINE_A_BASE: u8 = 0xdd;

/// Get the name of a Line-A service by second byte
pub fn line_a_name(byte2: u8) -> &'static str {
    match byte2 {
        0xdd => "nop_dd",
        0xde => "manual_check",
        0xdf => "window_request",
        0xe0 => "nop_e0",
        0xe1 => "read_line",
        0xe2 => "nop_e2",
        0xe3 => "clear_picture",
        0xe4 => "drop_return",
        0xe5 => "return_z",
        0xe6 => "return_nz",
        0xe7 => "set_z",
        0xe8 => "clear_z",
        0xe9 => "copy_dict_word",
        0xea => "print_dict_word",
        0xeb => "poke_dict",
        0xec => "peek_dict",
        0xed => "halt",
        0xee => "restart",
        0xef => "printer",
        0xf0 => "show_picture",
        0xf1 => "nth_string",
        0xf2 => "find_parent",
        0xf3 => "print_char",
        0xf4 => "save",
        0xf5 => "load",
        0xf6 => "random",
        0xf7 => "random_byte",
        0xf8 => "write_string",
        0xf9 => "inventory_item",
        0xfa => "scan_properties",
        0xfb => "skip_dict_words",
        0xfc => "skip_dict_and_strings",
        0xfd => "set_properties",
        0xfe => "find_property",
        0xff => "dict_lookup",
        _ => "read_key",
    }
}
