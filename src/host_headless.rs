//! Headless host for testing and scripted runs
//!
//! Input comes from a queue of scripted keys; an exhausted queue aborts the
//! pending read. Everything the game sends out is recorded for inspection.

use crate::hints::Hint;
use crate::host::{Host, HostError, KeyInput, PictureRef};
use log::debug;
use std::collections::{HashMap, VecDeque};

/// Save slot used when the game leaves the file name to the host
pub const DEFAULT_SLOT: &str = "default";

#[derive(Debug, Default)]
pub struct HeadlessHost {
    input: VecDeque<KeyInput>,
    output: Vec<u8>,
    status: Vec<u8>,
    pub pictures: Vec<(PictureRef, u8)>,
    /// Music requests, `None` for stop
    pub music: Vec<Option<String>>,
    pub saves: HashMap<String, Vec<u8>>,
    /// Whether `show_hints` claims to have displayed the hints
    pub native_hints: bool,
    pub flushes: usize,
    pub fatal: Option<String>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every byte of `text` as a key press
    pub fn type_text(&mut self, text: &str) {
        self.input.extend(text.bytes().map(KeyInput::Char));
    }

    pub fn push_key(&mut self, key: KeyInput) {
        self.input.push_back(key);
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Everything printed so far
    pub fn get_output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn take_output(&mut self) -> String {
        let out = self.get_output();
        self.output.clear();
        out
    }

    pub fn get_status(&self) -> String {
        String::from_utf8_lossy(&self.status).into_owned()
    }
}

impl Host for HeadlessHost {
    fn output_char(&mut self, c: u8) -> Result<(), HostError> {
        self.output.push(c);
        Ok(())
    }

    fn flush_output(&mut self) -> Result<(), HostError> {
        self.flushes += 1;
        Ok(())
    }

    fn read_char(&mut self, _allow_undo: bool) -> Result<KeyInput, HostError> {
        Ok(self.input.pop_front().unwrap_or(KeyInput::Abort))
    }

    fn status_char(&mut self, c: u8) -> Result<(), HostError> {
        self.status.push(c);
        Ok(())
    }

    fn show_picture(&mut self, picture: PictureRef, mode: u8) -> Result<(), HostError> {
        debug!("Headless: show_picture({:?}, {})", picture, mode);
        self.pictures.push((picture, mode));
        Ok(())
    }

    fn play_music(&mut self, name: Option<&str>) -> Result<(), HostError> {
        debug!("Headless: play_music({:?})", name);
        self.music.push(name.map(str::to_string));
        Ok(())
    }

    fn show_hints(&mut self, hints: &[Hint]) -> bool {
        debug!("Headless: show_hints({} blocks)", hints.len());
        self.native_hints
    }

    fn save(&mut self, name: Option<&str>, data: &[u8]) -> Result<(), HostError> {
        let slot = name.unwrap_or(DEFAULT_SLOT).to_string();
        debug!("Headless: save {} bytes to {}", data.len(), slot);
        self.saves.insert(slot, data.to_vec());
        Ok(())
    }

    fn load(&mut self, name: Option<&str>, buffer: &mut [u8]) -> Result<(), HostError> {
        let slot = name.unwrap_or(DEFAULT_SLOT);
        let data = self
            .saves
            .get(slot)
            .ok_or_else(|| HostError::new(format!("no saved game named {slot}")))?;
        if data.len() != buffer.len() {
            return Err(HostError::new(format!(
                "saved game {slot} has {} bytes, expected {}",
                data.len(),
                buffer.len()
            )));
        }
        buffer.copy_from_slice(data);
        Ok(())
    }

    fn fatal(&mut self, message: &str) {
        self.fatal = Some(message.to_string());
    }
}
