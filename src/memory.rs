use super::*;

/// Size of the 6502's address space; every u16 is a valid index.
pub const MEM_SIZE: usize = 0x10000;
/// Page 1 holds the hardware stack.
pub const STACK_PAGE: u16 = 0x0100;

/// Flat 64K address space. No banking, no protection, no mapped devices.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Box<[u8; MEM_SIZE]>,
}

impl Default for Memory {
    fn default() -> Self { Memory::new() }
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            bytes: Box::new([0; MEM_SIZE]),
        }
    }
    pub fn read_u8(&self, addr: u16) -> u8 { self.bytes[addr as usize] }
    pub fn write_u8(&mut self, addr: u16, data: u8) { self.bytes[addr as usize] = data; }
    // reads two bytes as a u16 (low order byte first); wraps from $FFFF to $0000
    pub fn read_u16(&self, addr: u16) -> u16 {
        let lo = self.read_u8(addr);
        let hi = self.read_u8(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }
    // pointer stored in the zero page; $FF pairs with $00, never $0100
    pub fn read_u16_zp(&self, zp: u8) -> u16 {
        let lo = self.read_u8(zp as u16);
        let hi = self.read_u8(zp.wrapping_add(1) as u16);
        u16::from_le_bytes([lo, hi])
    }
    /// Word read with the JMP ($xxFF) quirk: the high byte comes from the start of the
    /// same page rather than the next one.
    pub fn read_u16_page_wrap(&self, addr: u16) -> u16 {
        let lo = self.read_u8(addr);
        let hi = self.read_u8((addr & 0xff00) | (addr.wrapping_add(1) & 0x00ff));
        u16::from_le_bytes([lo, hi])
    }
    /// Copies an image into memory at addr. Returns the number of bytes loaded.
    pub fn load(&mut self, bytes: &[u8], addr: u16) -> Result<usize, Error> {
        let start = addr as usize;
        if start + bytes.len() > MEM_SIZE {
            return Err(Error::new(
                ErrorKind::Memory,
                None,
                format!(
                    "image overflowed the address space ({} byte image at {:04X})",
                    bytes.len(),
                    addr
                )
                .as_str(),
            ));
        }
        self.bytes[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }
    /// Formats count bytes starting at addr, 16 to a line.
    pub fn dump(&self, addr: u16, count: u16) -> String {
        let mut out = String::new();
        for i in 0..count {
            let a = addr.wrapping_add(i);
            if i % 16 == 0 {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(format!("{:04X}:", a).as_str());
            }
            out.push_str(format!(" {:02X}", self.read_u8(a)).as_str());
        }
        out
    }
}
