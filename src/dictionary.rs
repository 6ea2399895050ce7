//! Dictionary matching and the dictionary-bank services
//!
//! Dictionary entries are runs of characters whose last byte has bit 7 set.
//! 0x82 starts the next word bank and 0x81 ends the dictionary. Images with a
//! separate dictionary bank keep it outside the addressable memory; older
//! images keep the dictionary in memory and the same pointers are used.

use crate::error::EmuError;
use crate::header::Version;
use crate::vm::VM;
use log::debug;

const END_OF_DICTIONARY: u8 = 0x81;
const NEXT_BANK: u8 = 0x82;
/// Bank whose entries redirect to another bank and word
const SYNONYM_BANK: u8 = 0x0b;
/// Bank of nouns that can carry adjective restrictions
const NOUN_BANK: u8 = 0x06;
const END_OF_MATCHES: u16 = 0xffff;

/// Outcome of one lookup, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupSummary {
    /// Entries left in the match table after the adjective pass
    pub matches: usize,
    /// Characters matched before the terminator by the longest entry
    pub longest: u8,
}

enum Step {
    Continue,
    Accept,
    Restart,
}

impl VM {
    fn dictionary_bank(&self) -> Result<&[u8], EmuError> {
        self.game
            .dictionary
            .as_deref()
            .ok_or(EmuError::MissingBank("dictionary"))
    }

    fn dict_byte(&self, offset: u16) -> Result<u8, EmuError> {
        match &self.game.dictionary {
            Some(dict) => dict.get(offset as usize).copied().ok_or(EmuError::MemoryOutOfRange {
                addr: offset as u32,
                len: 1,
            }),
            None => self.read8(offset as u32),
        }
    }

    fn dict_word(&self, offset: u32) -> Result<u16, EmuError> {
        match &self.game.dictionary {
            Some(dict) => dict
                .get(offset as usize..offset as usize + 2)
                .map(|b| u16::from_be_bytes([b[0], b[1]]))
                .ok_or(EmuError::MemoryOutOfRange { addr: offset, len: 2 }),
            None => self.read16(offset),
        }
    }

    /// Offset just past the entry starting at `offset`
    fn skip_dict_entry(&self, mut offset: u16) -> Result<u16, EmuError> {
        loop {
            let c = self.dict_byte(offset)?;
            offset = offset.wrapping_add(1);
            if c >= 0x80 {
                return Ok(offset);
            }
        }
    }

    /// Offset just past the zero-terminated string at `ptr` in memory
    pub(crate) fn skip_c_string(&self, mut ptr: u16) -> Result<u16, EmuError> {
        loop {
            let c = self.read8(ptr as u32)?;
            ptr = ptr.wrapping_add(1);
            if c == 0 {
                return Ok(ptr);
            }
        }
    }

    /// A0FF: match the input word at A6 against the dictionary at A3.
    ///
    /// Inputs: A5 synonym table, A2 match table, A0 adjective lists, A1 the
    /// adjectives typed for this word, D6.b first bank number. On return A2
    /// points past the valid matches, A6 past the matched input, and D0.w
    /// holds 0x200 plus the character after an apostrophe.
    pub fn dict_lookup(&mut self) -> Result<LookupSummary, EmuError> {
        let version = self.version();
        let dtab = self.regs.aw(5);
        let mut output = self.regs.aw(2);
        self.regs.set_aw(5, self.regs.aw(6));
        let mut doff = self.regs.aw(3);
        let adjlist_base = self.regs.aw(0);

        let mut bank = self.regs.db(6);
        let mut flag: u8 = 0;
        let mut word: u16 = 0;
        let mut matchlen: u8 = 0;
        let mut longest: u8 = 0;
        self.regs.set_dw(0, 0);

        loop {
            let c = self.dict_byte(doff)?;
            if c == END_OF_DICTIONARY {
                break;
            }
            if c == NEXT_BANK {
                flag = 0;
                matchlen = 0;
                word = 0;
                self.regs.set_aw(6, self.regs.aw(5));
                bank = bank.wrapping_add(1);
                doff = doff.wrapping_add(1);
                continue;
            }
            let input = self.read8(self.regs.aw(6) as u32)? & 0x5f;
            let step = if c >= 0x80 {
                if input == c & 0x5f {
                    self.regs.set_aw(6, self.regs.aw(6).wrapping_add(1));
                    let next = self.read8(self.regs.aw(6) as u32)?;
                    let word_ends = next == 0 || next == b' ' || next == b'\'';
                    if word_ends || (version == Version::V0 && matchlen > 6) {
                        if next == b'\'' {
                            self.regs.set_aw(6, self.regs.aw(6).wrapping_add(1));
                            let after = self.read8(self.regs.aw(6) as u32)?;
                            self.regs.set_dw(0, 0x200 + after as u16);
                        }
                        // 0xa0 marks an entry that may not end a word in version 4
                        if version < Version::V4 || c != 0xa0 {
                            Step::Accept
                        } else {
                            Step::Continue
                        }
                    } else {
                        Step::Restart
                    }
                } else if version == Version::V0 && matchlen > 6 && input == 0 {
                    Step::Accept
                } else {
                    Step::Restart
                }
            } else {
                let c = c & 0x5f;
                let wildcard = version > Version::V0 && input == 0 && c == 0x5f;
                if (input == c && c != 0) || wildcard {
                    if wildcard {
                        flag = 0x80;
                    }
                    matchlen = matchlen.wrapping_add(1);
                    self.regs.set_aw(6, self.regs.aw(6).wrapping_add(1));
                    doff = doff.wrapping_add(1);
                    Step::Continue
                } else if version == Version::V0 && matchlen > 6 && input == 0 {
                    Step::Accept
                } else {
                    Step::Restart
                }
            };

            match step {
                Step::Continue => {}
                Step::Accept | Step::Restart => {
                    if let Step::Accept = step {
                        let out = self.regs.aw(2) as u32;
                        self.write8(out, if version > Version::V0 { flag } else { 0 })?;
                        self.write8(out + 1, bank)?;
                        self.write16(out + 2, word)?;
                        self.regs.set_aw(2, self.regs.aw(2).wrapping_add(4));
                        longest = longest.max(matchlen);
                    }
                    self.regs.set_aw(6, self.regs.aw(5));
                    flag = 0;
                    matchlen = 0;
                    word = word.wrapping_add(1);
                    doff = self.skip_dict_entry(doff)?;
                }
            }
        }
        self.write16(self.regs.aw(2) as u32, END_OF_MATCHES)?;

        if version > Version::V0 {
            self.resolve_synonyms(output, dtab)?;
        }

        let (compacted, flag2) = self.filter_adjectives(output, adjlist_base)?;
        self.regs.set_aw(2, compacted);
        let matches = (compacted.wrapping_sub(output) / 4) as usize;

        if flag2 & 0x80 != 0 {
            let start = output;
            output = output.wrapping_sub(4);
            loop {
                output = output.wrapping_add(4);
                if self.read8(output as u32)? & 0x80 != 0 {
                    break;
                }
            }
            let entry = self.read32(output as u32)? & 0x7fff_ffff;
            self.write32(start as u32, entry)?;
            self.regs.set_a(2, start as u32 + 4);
            if longest > 1 {
                let a5 = self.regs.aw(5).wrapping_add(longest as u16).wrapping_sub(2);
                self.regs.set_aw(5, a5);
            }
        }
        self.regs.set_aw(6, self.regs.aw(5).wrapping_add(1));

        debug!("dict_lookup: {matches} matches, longest {longest}");
        Ok(LookupSummary { matches, longest })
    }

    /// Replace synonym-bank matches by the bank and word they stand for
    fn resolve_synonyms(&mut self, mut output: u16, dtab: u16) -> Result<(), EmuError> {
        loop {
            let bank = self.read8(output as u32 + 1)?;
            if bank == 0xff {
                return Ok(());
            }
            if bank == SYNONYM_BANK {
                let word = self.read16(output as u32 + 2)?;
                let target = self.dict_word(dtab as u32 + word as u32 * 2)?;
                self.write8(output as u32 + 1, (target & 0x1f) as u8)?;
                self.write16(output as u32 + 2, target >> 5)?;
            }
            output = output.wrapping_add(4);
        }
    }

    /// Drop noun matches whose typed adjectives do not apply, compacting the
    /// table in place. Returns the end of the kept entries and the OR of
    /// their flags. D1.b ends non-zero when the last entry was dropped.
    fn filter_adjectives(&mut self, output: u16, adjlist_base: u16) -> Result<(u16, u8), EmuError> {
        self.regs.set_dw(1, 0);
        let mut flag2: u8 = 0;
        let mut write = output;
        let mut read = output;
        loop {
            let bank = self.read8(read as u32 + 1)?;
            if bank == 0xff {
                break;
            }
            let mut obj_adj = self.regs.aw(1);
            self.regs.set_db(1, 0);
            let flag = self.read8(read as u32)?;
            let word = self.read16(read as u32 + 2)?;
            read = read.wrapping_add(4);

            if bank == NOUN_BANK && self.read16(obj_adj as u32)? != 0 {
                let mut adjlist = adjlist_base;
                for _ in 0..word {
                    adjlist = self.skip_c_string(adjlist)?;
                }
                let valid_start = adjlist;
                loop {
                    let given = self.read8(obj_adj as u32 + 1)?;
                    let pending = self.read16(obj_adj as u32)?;
                    if pending != 0 {
                        obj_adj = obj_adj.wrapping_add(2);
                        let mut ptr = valid_start;
                        let found = loop {
                            let c = self.read8(ptr as u32)?;
                            ptr = ptr.wrapping_add(1);
                            if c == 0 {
                                break false;
                            }
                            if c as i32 - 3 == given as i32 {
                                break true;
                            }
                        };
                        if !found {
                            self.regs.set_db(1, 1);
                        }
                    }
                    if pending == 0 || self.regs.db(1) != 0 {
                        break;
                    }
                }
            }
            if self.regs.db(1) == 0 {
                flag2 |= flag;
                self.write8(write as u32, flag2)?;
                self.write8(write as u32 + 1, bank)?;
                self.write16(write as u32 + 2, word)?;
                write = write.wrapping_add(4);
            }
        }
        Ok((write, flag2))
    }

    /// A0E9: copy one entry from the dictionary bank at A1 into memory at A0
    pub fn copy_dict_word(&mut self) -> Result<(), EmuError> {
        let mut dst = self.regs.aw(0);
        let mut src = self.regs.aw(1);
        loop {
            let c = *self
                .dictionary_bank()?
                .get(src as usize)
                .ok_or(EmuError::MemoryOutOfRange { addr: src as u32, len: 1 })?;
            src = src.wrapping_add(1);
            self.write8(dst as u32, c)?;
            dst = dst.wrapping_add(1);
            if c & 0x80 != 0 {
                break;
            }
        }
        self.regs.set_aw(0, dst);
        self.regs.set_aw(1, src);
        Ok(())
    }

    /// A0EB: dictionary[A1.w] = D1.b
    pub fn poke_dict(&mut self) -> Result<(), EmuError> {
        let offset = self.regs.aw(1) as usize;
        let value = self.regs.db(1);
        let dict = self
            .game
            .dictionary
            .as_deref_mut()
            .ok_or(EmuError::MissingBank("dictionary"))?;
        let slot = dict.get_mut(offset).ok_or(EmuError::MemoryOutOfRange {
            addr: offset as u32,
            len: 1,
        })?;
        *slot = value;
        Ok(())
    }

    /// A0EC: D1.b = dictionary[A1.w]
    pub fn peek_dict(&mut self) -> Result<(), EmuError> {
        let offset = self.regs.aw(1);
        let value = *self
            .dictionary_bank()?
            .get(offset as usize)
            .ok_or(EmuError::MemoryOutOfRange { addr: offset as u32, len: 1 })?;
        self.regs.set_db(1, value);
        Ok(())
    }

    /// A0FB: advance A1 over D2.w dictionary entries (at least one)
    pub fn skip_dict_words(&mut self) -> Result<(), EmuError> {
        let mut ptr = self.regs.aw(1);
        loop {
            ptr = self.skip_dict_entry(ptr)?;
            self.regs.set_dw(2, self.regs.dw(2).wrapping_sub(1));
            if self.regs.dw(2) == 0 {
                break;
            }
        }
        self.regs.set_aw(1, ptr);
        Ok(())
    }

    /// A0FC: advance A0 over dictionary entries and A1 over the parallel
    /// zero-terminated strings, D0.w times (at least once)
    pub fn skip_dict_and_strings(&mut self) -> Result<(), EmuError> {
        let mut ptr = self.regs.aw(0);
        let mut ptr2 = self.regs.aw(1);
        loop {
            ptr = self.skip_dict_entry(ptr)?;
            ptr2 = self.skip_c_string(ptr2)?;
            self.regs.set_dw(0, self.regs.dw(0).wrapping_sub(1));
            if self.regs.dw(0) == 0 {
                break;
            }
        }
        self.regs.set_aw(0, ptr);
        self.regs.set_aw(1, ptr2);
        Ok(())
    }
}
