use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    #[error("access of {width} byte(s) at {addr} is outside memory of {capacity} bytes")]
    OutOfRange {
        addr: u32,
        width: u32,
        capacity: usize,
    },
}

pub type Result<T> = std::result::Result<T, MemoryError>;

/// Byte-addressable, little-endian data memory.
pub trait Bus {
    fn capacity(&self) -> usize;
    fn read_u8(&mut self, addr: u32) -> Result<u8>;
    fn read_u32(&mut self, addr: u32) -> Result<u32>;
    fn write_u8(&mut self, addr: u32, val: u8) -> Result<()>;
    fn write_u32(&mut self, addr: u32, val: u32) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<u8>,
}

impl LinearMemory {
    pub fn new(size: usize) -> Self {
        Self { mem: vec![0; size] }
    }

    /// Offset of a `width`-byte access, if it lies fully inside memory.
    fn span(&self, addr: u32, width: u32) -> Result<usize> {
        let off = addr as usize;
        match off.checked_add(width as usize) {
            Some(end) if end <= self.mem.len() => Ok(off),
            _ => Err(MemoryError::OutOfRange {
                addr,
                width,
                capacity: self.mem.len(),
            }),
        }
    }

    fn load_le_u32(&self, off: usize) -> u32 {
        u32::from_le_bytes([
            self.mem[off],
            self.mem[off + 1],
            self.mem[off + 2],
            self.mem[off + 3],
        ])
    }

    fn store_le_u32(&mut self, off: usize, v: u32) {
        self.mem[off..off + 4].copy_from_slice(&v.to_le_bytes());
    }

    /// Reads a word without going through [`Bus`]; `None` when out of range.
    pub fn peek_u32(&self, addr: u32) -> Option<u32> {
        self.span(addr, 4).ok().map(|off| self.load_le_u32(off))
    }

    /// Word view of `[start, start + len)` clipped to capacity, one entry per 4 bytes.
    /// Words straddling the end of memory read as 0.
    pub fn window(&self, start: u32, len: u32) -> Vec<(u32, i32)> {
        let cap = self.mem.len() as u64;
        let start64 = start as u64;
        if start64 >= cap {
            return Vec::new();
        }
        let end = (start64 + len as u64).min(cap);
        (start64..end)
            .step_by(4)
            .map(|addr| {
                let addr = addr as u32;
                (addr, self.peek_u32(addr).map_or(0, |v| v as i32))
            })
            .collect()
    }
}

impl Bus for LinearMemory {
    fn capacity(&self) -> usize {
        self.mem.len()
    }
    fn read_u8(&mut self, addr: u32) -> Result<u8> {
        let off = self.span(addr, 1)?;
        Ok(self.mem[off])
    }
    fn read_u32(&mut self, addr: u32) -> Result<u32> {
        let off = self.span(addr, 4)?;
        Ok(self.load_le_u32(off))
    }
    fn write_u8(&mut self, addr: u32, val: u8) -> Result<()> {
        let off = self.span(addr, 1)?;
        self.mem[off] = val;
        Ok(())
    }
    fn write_u32(&mut self, addr: u32, val: u32) -> Result<()> {
        let off = self.span(addr, 4)?;
        self.store_le_u32(off, val);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_little_endian() {
        let mut m = LinearMemory::new(16);
        m.write_u32(4, 0x1122_3344).unwrap();
        assert_eq!(&m.mem[4..8], &[0x44, 0x33, 0x22, 0x11]);
        assert_eq!(m.read_u8(7).unwrap(), 0x11);
    }

    #[test]
    fn last_word_fits_and_next_does_not() {
        let mut m = LinearMemory::new(16);
        assert!(m.write_u32(12, 1).is_ok());
        assert_eq!(
            m.write_u32(13, 1),
            Err(MemoryError::OutOfRange {
                addr: 13,
                width: 4,
                capacity: 16
            })
        );
        assert!(m.read_u32(u32::MAX).is_err());
    }

    #[test]
    fn window_clips_to_capacity() {
        let mut m = LinearMemory::new(16);
        m.write_u32(8, 7).unwrap();
        assert_eq!(m.window(4, 100), vec![(4, 0), (8, 7), (12, 0)]);
        assert_eq!(m.window(14, 8), vec![(14, 0)]);
        assert!(m.window(16, 4).is_empty());
    }
}
