//! Terminal host using stdin/stdout
//!
//! Input is read a line at a time and handed to the game one byte per
//! request. Typing `#undo` on a line of its own asks for an undo. The status
//! line of older games is drawn in reverse video when stdout is a terminal.

use crate::host::{Host, HostError, KeyInput};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::{queue, terminal};
use log::{debug, info};
use std::collections::VecDeque;
use std::io::{self, BufRead, BufWriter, Stdout, Write};
use std::path::PathBuf;

pub const UNDO_COMMAND: &str = "#undo";

const DEFAULT_WIDTH: u16 = 80;

pub struct TerminalHost {
    stdout: BufWriter<Stdout>,
    pending: VecDeque<u8>,
    status: Vec<u8>,
    show_status: bool,
    interactive: bool,
    save_dir: PathBuf,
}

impl TerminalHost {
    pub fn new(show_status: bool) -> Self {
        let interactive = atty::is(atty::Stream::Stdin);
        let has_terminal = atty::is(atty::Stream::Stdout);
        debug!("terminal host: interactive={interactive}, terminal={has_terminal}");
        TerminalHost {
            stdout: BufWriter::new(io::stdout()),
            pending: VecDeque::new(),
            status: Vec::new(),
            show_status: show_status && has_terminal,
            interactive,
            save_dir: PathBuf::from("."),
        }
    }

    pub fn with_save_dir(mut self, dir: PathBuf) -> Self {
        self.save_dir = dir;
        self
    }

    /// Read one line from stdin, `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>, HostError> {
        self.stdout.flush()?;
        let mut line = String::new();
        let n = io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        if !self.interactive {
            // echo scripted input so transcripts read naturally
            write!(self.stdout, "{line}")?;
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn draw_status(&mut self) -> Result<(), HostError> {
        let line = String::from_utf8_lossy(&self.status).into_owned();
        self.status.clear();
        if !self.show_status {
            return Ok(());
        }
        let width = terminal::size().map(|(w, _)| w).unwrap_or(DEFAULT_WIDTH) as usize;
        // a tab right-justifies the rest of the line
        let text = match line.split_once('\t') {
            Some((left, right)) => {
                let gap = width.saturating_sub(left.len() + right.len()).max(1);
                format!("{left}{}{right}", " ".repeat(gap))
            }
            None => format!("{line:width$}"),
        };
        queue!(
            self.stdout,
            SetAttribute(Attribute::Reverse),
            Print(text),
            SetAttribute(Attribute::Reset),
            Print("\n")
        )?;
        Ok(())
    }

    fn file_for(&mut self, name: Option<&str>) -> Result<PathBuf, HostError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                write!(self.stdout, "\nFilename: ")?;
                self.read_line()?
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| HostError::new("no file name given"))?
            }
        };
        Ok(self.save_dir.join(name))
    }
}

impl Host for TerminalHost {
    fn output_char(&mut self, c: u8) -> Result<(), HostError> {
        self.stdout.write_all(&[c])?;
        Ok(())
    }

    fn flush_output(&mut self) -> Result<(), HostError> {
        self.stdout.flush()?;
        Ok(())
    }

    fn read_char(&mut self, allow_undo: bool) -> Result<KeyInput, HostError> {
        if self.pending.is_empty() {
            let Some(line) = self.read_line()? else {
                info!("end of input");
                return Ok(KeyInput::Abort);
            };
            if allow_undo && line.trim() == UNDO_COMMAND {
                return Ok(KeyInput::Undo);
            }
            self.pending.extend(line.bytes());
            self.pending.push_back(b'\n');
        }
        Ok(self.pending.pop_front().map_or(KeyInput::Abort, KeyInput::Char))
    }

    fn status_char(&mut self, c: u8) -> Result<(), HostError> {
        if c == b'\n' {
            self.draw_status()
        } else {
            self.status.push(c);
            Ok(())
        }
    }

    fn save(&mut self, name: Option<&str>, data: &[u8]) -> Result<(), HostError> {
        let path = self.file_for(name)?;
        std::fs::write(&path, data)?;
        info!("saved {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    fn load(&mut self, name: Option<&str>, buffer: &mut [u8]) -> Result<(), HostError> {
        let path = self.file_for(name)?;
        let data = std::fs::read(&path)?;
        if data.len() != buffer.len() {
            return Err(HostError::new(format!(
                "{} holds {} bytes, expected {}",
                path.display(),
                data.len(),
                buffer.len()
            )));
        }
        buffer.copy_from_slice(&data);
        info!("loaded {}", path.display());
        Ok(())
    }

    fn fatal(&mut self, message: &str) {
        let _ = self.stdout.flush();
        eprintln!("\nFatal error: {message}");
    }
}
