//! Online hints of the windowed releases
//!
//! A hint file starts with the `MaHt` magic followed by little-endian words:
//! the block count, then per block its element count, node type, the
//! elements (length-prefixed, zero-terminated text), one link per element
//! for folder nodes, and the parent block (0xffff at the root).

use crate::error::EmuError;
use crate::host::{Host, KeyInput};
use crate::interpreter::Interpreter;
use crate::memory::{read_u16_swapped, read_u32_be};
use log::{debug, info};
use std::path::Path;

pub const HINT_MAGIC: u32 = 0x4d61_4874;
pub const NO_PARENT: u16 = 0xffff;

pub const NODE_FOLDER: u16 = 1;
pub const NODE_HINTS: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub nodetype: u16,
    pub elements: Vec<String>,
    /// Target block of each element, folders only
    pub links: Vec<u16>,
    pub parent: u16,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn word(&mut self) -> Result<u16, EmuError> {
        let w = read_u16_swapped(self.bytes, self.pos)
            .ok_or_else(|| EmuError::BadImage("hint file truncated".to_string()))?;
        self.pos += 2;
        Ok(w)
    }

    fn text(&mut self, len: usize) -> Result<String, EmuError> {
        let raw = self
            .bytes
            .get(self.pos..self.pos + len)
            .ok_or_else(|| EmuError::BadImage("hint text truncated".to_string()))?;
        self.pos += len;
        // the last byte is a terminator whatever it holds
        let body = &raw[..len.saturating_sub(1)];
        let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
        Ok(String::from_utf8_lossy(&body[..end]).into_owned())
    }
}

/// Parse the contents of a hint file
pub fn parse_hints(bytes: &[u8]) -> Result<Vec<Hint>, EmuError> {
    if read_u32_be(bytes, 0) != Some(HINT_MAGIC) {
        return Err(EmuError::BadImage("not a hint file".to_string()));
    }
    let mut r = Reader { bytes, pos: 4 };
    let blocks = r.word()?;
    let mut hints = Vec::with_capacity(blocks as usize);
    for _ in 0..blocks {
        let count = r.word()?;
        let nodetype = r.word()?;
        let mut elements = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = r.word()? as usize;
            elements.push(r.text(len)?);
        }
        let mut links = Vec::new();
        if nodetype == NODE_FOLDER {
            for _ in 0..count {
                links.push(r.word()?);
            }
        }
        let parent = r.word()?;
        hints.push(Hint {
            nodetype,
            elements,
            links,
            parent,
        });
    }
    debug!("parsed {} hint blocks", hints.len());
    Ok(hints)
}

pub fn load_hint_file(path: &Path) -> Result<Vec<Hint>, EmuError> {
    let bytes = std::fs::read(path)?;
    let hints = parse_hints(&bytes)?;
    info!("Loaded {} hint blocks from {}", hints.len(), path.display());
    Ok(hints)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HintCommand {
    Abort,
    End,
    Next,
    Parent,
    Number(u16),
    Unknown,
}

/// How the menu at one level was left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    /// Back to the parent menu
    Parent,
    /// Leave the hints entirely
    Close,
}

impl<H: Host> Interpreter<H> {
    fn hint_key(&mut self) -> Result<Option<u8>, EmuError> {
        Ok(match self.host.read_char(false)? {
            KeyInput::Char(c) => Some(c),
            KeyInput::Undo => Some(0),
            KeyInput::Abort => None,
        })
    }

    /// Read one command line: a one or two digit number, or E, N, P
    fn hint_input(&mut self) -> Result<HintCommand, EmuError> {
        self.output_text(">>")?;
        self.host.flush_output()?;
        let c1 = loop {
            match self.hint_key()? {
                None => return Ok(HintCommand::Abort),
                Some(b'\n') => continue,
                Some(c) => break c,
            }
        };
        let Some(c2) = self.hint_key()? else {
            return Ok(HintCommand::Abort);
        };
        let mut rest = c2;
        while rest != b'\n' {
            match self.hint_key()? {
                None => return Ok(HintCommand::Abort),
                Some(c) => rest = c,
            }
        }
        self.host.output_char(b'\n')?;

        if c1.is_ascii_digit() {
            let mut number = (c1 - b'0') as u16;
            if c2.is_ascii_digit() {
                number = number * 10 + (c2 - b'0') as u16;
            }
            return Ok(HintCommand::Number(number));
        }
        Ok(match c1.to_ascii_lowercase() {
            b'e' => HintCommand::End,
            b'n' => HintCommand::Next,
            b'p' => HintCommand::Parent,
            _ => HintCommand::Unknown,
        })
    }

    /// Text-mode hint browser starting at block `index`
    pub fn show_hints_text(&mut self, index: usize) -> Result<MenuExit, EmuError> {
        let Some(hint) = self.hints.as_ref().and_then(|h| h.get(index)).cloned() else {
            return Ok(MenuExit::Parent);
        };
        let mut shown = 0;
        loop {
            match hint.nodetype {
                NODE_FOLDER => {
                    self.output_text("Hint categories:\n")?;
                    for (i, text) in hint.elements.iter().enumerate() {
                        self.output_text(&format!("{}. {}\n", i + 1, text))?;
                    }
                    self.output_text("Enter hint category number, ")?;
                    if hint.parent != NO_PARENT {
                        self.output_text("P for the parent hint menu, ")?;
                    }
                    self.output_text("or E to end hints.\n")?;
                    match self.hint_input()? {
                        HintCommand::Abort | HintCommand::End => return Ok(MenuExit::Close),
                        HintCommand::Parent if hint.parent != NO_PARENT => return Ok(MenuExit::Parent),
                        HintCommand::Number(n) if n > 0 && (n as usize) <= hint.elements.len() => {
                            if let Some(&link) = hint.links.get(n as usize - 1) {
                                if self.show_hints_text(link as usize)? == MenuExit::Close {
                                    return Ok(MenuExit::Close);
                                }
                            }
                        }
                        _ => {}
                    }
                }
                NODE_HINTS => {
                    let Some(text) = hint.elements.get(shown) else {
                        return Ok(MenuExit::Parent);
                    };
                    self.output_text(&format!("{}. {}", shown + 1, text))?;
                    if shown + 1 == hint.elements.len() {
                        self.output_text("\nNo more hints.\n")?;
                        return Ok(MenuExit::Parent);
                    }
                    self.output_text("\nEnter N for the next hint, ")?;
                    self.output_text("P for the parent hint menu, ")?;
                    self.output_text("or E to end hints.\n")?;
                    match self.hint_input()? {
                        HintCommand::Abort | HintCommand::End => return Ok(MenuExit::Close),
                        HintCommand::Next => shown += 1,
                        HintCommand::Parent => return Ok(MenuExit::Parent),
                        _ => {}
                    }
                }
                other => {
                    debug!("hint block {index} has unknown node type {other}");
                    return Ok(MenuExit::Parent);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn word(out: &mut Vec<u8>, w: u16) {
        out.extend_from_slice(&w.to_le_bytes());
    }

    fn text(out: &mut Vec<u8>, s: &str) {
        word(out, s.len() as u16 + 1);
        out.extend_from_slice(s.as_bytes());
        out.push(0);
    }

    fn sample_hint_file() -> Vec<u8> {
        let mut out = b"MaHt".to_vec();
        word(&mut out, 2);
        // block 0: folder with one category
        word(&mut out, 1);
        word(&mut out, NODE_FOLDER);
        text(&mut out, "Getting started");
        word(&mut out, 1);
        word(&mut out, NO_PARENT);
        // block 1: two hints
        word(&mut out, 2);
        word(&mut out, NODE_HINTS);
        text(&mut out, "Look around.");
        text(&mut out, "Open the door.");
        word(&mut out, 0);
        out
    }

    #[test]
    fn test_parse_hint_tree() {
        let hints = parse_hints(&sample_hint_file()).unwrap();
        assert_eq!(hints.len(), 2);
        assert_eq!(hints[0].nodetype, NODE_FOLDER);
        assert_eq!(hints[0].elements, vec!["Getting started".to_string()]);
        assert_eq!(hints[0].links, vec![1]);
        assert_eq!(hints[0].parent, NO_PARENT);
        assert_eq!(hints[1].elements.len(), 2);
        assert!(hints[1].links.is_empty());
        assert_eq!(hints[1].parent, 0);
    }

    #[test]
    fn test_rejects_bad_magic_and_truncation() {
        assert!(parse_hints(b"MaSc\x00\x00").is_err());
        let mut file = sample_hint_file();
        file.truncate(20);
        assert!(parse_hints(&file).is_err());
    }
}
