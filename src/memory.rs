//! Flat, bounds-checked memory arena for the game image
//!
//! All instruction-level memory traffic goes through `Memory`. Values are
//! big-endian like the original 68000 target. The byte-swapped `*_swapped`
//! readers serve the little-endian side files (hints) and host format code,
//! never instruction execution.
//!
//! Images for versions below 4 that occupy exactly 64 KiB wrap every address
//! modulo 65536. Some games rely on this, so it is applied before every
//! access rather than treated as an error.

use crate::error::EmuError;

/// A virtual address inside the game image
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Addr(pub u32);

impl Addr {
    pub fn offset(self, delta: u32) -> Addr {
        Addr(self.0.wrapping_add(delta))
    }
}

/// Read a little-endian word out of a raw byte slice
pub fn read_u16_swapped(bytes: &[u8], offset: usize) -> Option<u16> {
    let lo = *bytes.get(offset)?;
    let hi = *bytes.get(offset + 1)?;
    Some(((hi as u16) << 8) | lo as u16)
}

/// Read a big-endian long out of a raw byte slice
pub fn read_u32_be(bytes: &[u8], offset: usize) -> Option<u32> {
    let b = bytes.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
    wrap16: bool,
}

impl Memory {
    pub fn new(bytes: Vec<u8>, wrap16: bool) -> Self {
        Memory { bytes, wrap16 }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn wraps(&self) -> bool {
        self.wrap16
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    fn translate(&self, addr: Addr) -> Result<usize, EmuError> {
        if self.wrap16 {
            return Ok((addr.0 & 0xffff) as usize);
        }
        let index = addr.0 as usize;
        if index >= self.bytes.len() {
            return Err(EmuError::MemoryOutOfRange {
                addr: addr.0,
                len: self.bytes.len(),
            });
        }
        Ok(index)
    }

    pub fn read8(&self, addr: Addr) -> Result<u8, EmuError> {
        let index = self.translate(addr)?;
        Ok(self.bytes[index])
    }

    pub fn read16(&self, addr: Addr) -> Result<u16, EmuError> {
        let hi = self.read8(addr)? as u16;
        let lo = self.read8(addr.offset(1))? as u16;
        Ok((hi << 8) | lo)
    }

    pub fn read32(&self, addr: Addr) -> Result<u32, EmuError> {
        let hi = self.read16(addr)? as u32;
        let lo = self.read16(addr.offset(2))? as u32;
        Ok((hi << 16) | lo)
    }

    pub fn write8(&mut self, addr: Addr, value: u8) -> Result<(), EmuError> {
        let index = self.translate(addr)?;
        self.bytes[index] = value;
        Ok(())
    }

    pub fn write16(&mut self, addr: Addr, value: u16) -> Result<(), EmuError> {
        self.write8(addr, (value >> 8) as u8)?;
        self.write8(addr.offset(1), value as u8)
    }

    pub fn write32(&mut self, addr: Addr, value: u32) -> Result<(), EmuError> {
        self.write16(addr, (value >> 16) as u16)?;
        self.write16(addr.offset(2), value as u16)
    }

    pub fn read16_swapped(&self, addr: Addr) -> Result<u16, EmuError> {
        let lo = self.read8(addr)? as u16;
        let hi = self.read8(addr.offset(1))? as u16;
        Ok((hi << 8) | lo)
    }

    pub fn read32_swapped(&self, addr: Addr) -> Result<u32, EmuError> {
        let hi = self.read16_swapped(addr)? as u32;
        let lo = self.read16_swapped(addr.offset(2))? as u32;
        Ok((hi << 16) | lo)
    }

    pub fn write16_swapped(&mut self, addr: Addr, value: u16) -> Result<(), EmuError> {
        self.write8(addr, value as u8)?;
        self.write8(addr.offset(1), (value >> 8) as u8)
    }

    pub fn write32_swapped(&mut self, addr: Addr, value: u32) -> Result<(), EmuError> {
        self.write16_swapped(addr, (value >> 16) as u16)?;
        self.write16_swapped(addr.offset(2), value as u16)
    }

    /// Zero-terminated byte string starting at `addr`, terminator excluded
    pub fn c_string(&self, addr: Addr) -> Result<Vec<u8>, EmuError> {
        let mut out = Vec::new();
        let mut cur = addr;
        loop {
            let b = self.read8(cur)?;
            if b == 0 {
                return Ok(out);
            }
            out.push(b);
            cur = cur.offset(1);
        }
    }

    /// Contiguous window used for save/load blobs
    pub fn slice(&self, addr: Addr, len: usize) -> Result<&[u8], EmuError> {
        let start = self.translate(addr)?;
        self.bytes
            .get(start..start + len)
            .ok_or(EmuError::MemoryOutOfRange {
                addr: addr.0.wrapping_add(len as u32),
                len: self.bytes.len(),
            })
    }

    pub fn slice_mut(&mut self, addr: Addr, len: usize) -> Result<&mut [u8], EmuError> {
        let start = self.translate(addr)?;
        let total = self.bytes.len();
        self.bytes
            .get_mut(start..start + len)
            .ok_or(EmuError::MemoryOutOfRange {
                addr: addr.0.wrapping_add(len as u32),
                len: total,
            })
    }
}
