/// MOS 6502 register set helpers
use std::fmt;

/// Enumeration of the status flags
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flag {
    N = 0,
    V = 1,
    B = 2,
    D = 3,
    I = 4,
    Z = 5,
    C = 6,
}

/// Helper struct to map metadata about status flags.
pub struct FlagInfo {
    pub flag: Flag,
    /// position of the flag when the status is packed into a byte (PHP/PLP)
    pub mask: u8,
    pub short: char,
}

/// Metadata for each status flag, in display order.
#[rustfmt::skip]
pub static FLAG_TABLE: [FlagInfo; 7] = [
    FlagInfo {flag: Flag::N, mask: 0x80, short: 'N'},
    FlagInfo {flag: Flag::V, mask: 0x40, short: 'V'},
    FlagInfo {flag: Flag::B, mask: 0x10, short: 'B'},
    FlagInfo {flag: Flag::D, mask: 0x08, short: 'D'},
    FlagInfo {flag: Flag::I, mask: 0x04, short: 'I'},
    FlagInfo {flag: Flag::Z, mask: 0x02, short: 'Z'},
    FlagInfo {flag: Flag::C, mask: 0x01, short: 'C'},
];

/// Bit 5 of the packed status byte has no flag behind it and always reads as 1.
pub const STATUS_UNUSED: u8 = 0x20;

impl Flag {
    pub fn info(&self) -> &'static FlagInfo { &FLAG_TABLE[*self as usize] }
    pub fn from_char(c: char) -> Option<Flag> {
        FLAG_TABLE
            .iter()
            .find(|t| t.short == c.to_ascii_uppercase())
            .map(|t| t.flag)
    }
}

/// The seven status flags.
/// Like the condition code register in a real part, this struct doubles as the ALU:
/// each helper updates exactly the flags its instruction defines and leaves the rest alone.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Flags {
    pub n: bool,
    pub v: bool,
    pub b: bool,
    pub d: bool,
    pub i: bool,
    pub z: bool,
    pub c: bool,
}

impl Flags {
    pub fn set(&mut self, flag: Flag, val: bool) {
        match flag {
            Flag::N => self.n = val,
            Flag::V => self.v = val,
            Flag::B => self.b = val,
            Flag::D => self.d = val,
            Flag::I => self.i = val,
            Flag::Z => self.z = val,
            Flag::C => self.c = val,
        }
    }
    pub fn is_set(&self, flag: Flag) -> bool {
        match flag {
            Flag::N => self.n,
            Flag::V => self.v,
            Flag::B => self.b,
            Flag::D => self.d,
            Flag::I => self.i,
            Flag::Z => self.z,
            Flag::C => self.c,
        }
    }
    /// Packs the flags into NV1BDIZC form.
    pub fn to_byte(&self) -> u8 {
        FLAG_TABLE
            .iter()
            .filter(|t| self.is_set(t.flag))
            .fold(STATUS_UNUSED, |acc, t| acc | t.mask)
    }
    /// Unpacks a status byte pulled from the stack. B has no storage on the real part,
    /// so a pulled byte never changes it.
    pub fn set_from_byte(&mut self, byte: u8) {
        for t in FLAG_TABLE.iter().filter(|t| t.flag != Flag::B) {
            self.set(t.flag, byte & t.mask != 0);
        }
    }
    pub fn set_nz(&mut self, result: u8) {
        self.n = result & 0x80 != 0;
        self.z = result == 0;
    }

    // binary mode only; D is tracked but never consulted
    pub fn adc_u8(&mut self, a: u8, m: u8) -> u8 {
        let sum = a as u16 + m as u16 + u16::from(self.c);
        let result = sum as u8;
        self.c = sum > 0xff;
        self.v = (a ^ result) & (m ^ result) & 0x80 != 0;
        self.set_nz(result);
        result
    }
    // subtraction is addition of the one's complement with carry acting as "not borrow"
    pub fn sbc_u8(&mut self, a: u8, m: u8) -> u8 { self.adc_u8(a, !m) }
    pub fn and_u8(&mut self, a: u8, m: u8) -> u8 {
        let result = a & m;
        self.set_nz(result);
        result
    }
    pub fn or_u8(&mut self, a: u8, m: u8) -> u8 {
        let result = a | m;
        self.set_nz(result);
        result
    }
    pub fn xor_u8(&mut self, a: u8, m: u8) -> u8 {
        let result = a ^ m;
        self.set_nz(result);
        result
    }
    pub fn bit_u8(&mut self, a: u8, m: u8) {
        self.z = a & m == 0;
        self.n = m & 0x80 != 0;
        self.v = m & 0x40 != 0;
    }
    pub fn cmp_u8(&mut self, reg: u8, m: u8) {
        self.c = reg >= m;
        self.set_nz(reg.wrapping_sub(m));
    }
    pub fn inc_u8(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        self.set_nz(result);
        result
    }
    pub fn dec_u8(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        self.set_nz(result);
        result
    }
    pub fn asl_u8(&mut self, val: u8) -> u8 {
        let result = val << 1;
        self.c = val & 0x80 != 0;
        self.set_nz(result);
        result
    }
    pub fn lsr_u8(&mut self, val: u8) -> u8 {
        let result = val >> 1;
        self.c = val & 1 != 0;
        self.set_nz(result);
        result
    }
    pub fn rol_u8(&mut self, val: u8) -> u8 {
        let result = (val << 1) | u8::from(self.c);
        self.c = val & 0x80 != 0;
        self.set_nz(result);
        result
    }
    pub fn ror_u8(&mut self, val: u8) -> u8 {
        let result = (val >> 1) | (u8::from(self.c) << 7);
        self.c = val & 1 != 0;
        self.set_nz(result);
        result
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, t) in FLAG_TABLE.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, concat!(green!("{}:"), "{}"), t.short, self.is_set(t.flag) as usize)?;
        }
        Ok(())
    }
}

/// Enumeration of all registers and a placeholder, invalid register called 'Z'.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Name {
    A,
    X,
    Y,
    SP,
    PC,
    P,
    Z, // no register; the instruction works on memory or on nothing at all
}
const REG_NAMES: &[&str] = &["A", "X", "Y", "SP", "PC", "P", "Z"];

impl Name {
    pub fn to_str(self) -> &'static str { REG_NAMES[self as usize] }
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "A" => Name::A,
            "X" => Name::X,
            "Y" => Name::Y,
            "SP" | "S" => Name::SP,
            "PC" => Name::PC,
            "P" => Name::P,
            _ => Name::Z,
        }
    }
}
pub fn reg_size(reg: Name) -> u16 {
    match reg {
        Name::A | Name::X | Name::Y | Name::SP | Name::P => 1,
        Name::PC => 2,
        Name::Z => 0,
    }
}

/// Provides storage and helpers for the full set of 6502 registers.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Set {
    pub a: u8,     // accumulator
    pub x: u8,     // index register
    pub y: u8,     // index register
    pub sp: u8,    // stack pointer (offset into page 1)
    pub pc: u16,   // program counter
    pub p: Flags,  // processor status
}
impl Set {
    pub fn set_register(&mut self, reg: Name, val: u16) {
        match reg {
            Name::A => self.a = val as u8,
            Name::X => self.x = val as u8,
            Name::Y => self.y = val as u8,
            Name::SP => self.sp = val as u8,
            Name::PC => self.pc = val,
            Name::P => self.p.set_from_byte(val as u8),
            Name::Z => panic!("invalid register"),
        }
    }
    pub fn get_register(&self, reg: Name) -> u16 {
        match reg {
            Name::A => self.a as u16,
            Name::X => self.x as u16,
            Name::Y => self.y as u16,
            Name::SP => self.sp as u16,
            Name::PC => self.pc,
            Name::P => self.p.to_byte() as u16,
            Name::Z => panic!("invalid register"),
        }
    }
}
impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { <Set as fmt::Display>::fmt(self, f) }
}
impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            concat!(
                blue!("PC:"),
                "{:04x} ",
                blue!("A:"),
                "{:02x} ",
                blue!("X:"),
                "{:02x} ",
                blue!("Y:"),
                "{:02x} ",
                blue!("SP:"),
                "{:02x} ",
                blue!("P:"),
                "{:02x}"
            ),
            self.pc,
            self.a,
            self.x,
            self.y,
            self.sp,
            self.p.to_byte()
        )
    }
}
