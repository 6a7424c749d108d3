//! Operand resolution for the 6502 addressing modes.
//!
//! Zero-page modes wrap their index arithmetic at 8 bits and never leave page 0.
//! Absolute modes wrap at 16 bits.
use super::*;
use memory::Memory;

/// All the 6502 addressing modes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddressingMode {
    /// no operand; the opcode is the whole instruction
    Implied,
    /// #$nn
    Immediate,
    /// $nn
    ZeroPage,
    /// $nn,X
    ZeroPageX,
    /// $nn,Y
    ZeroPageY,
    /// ($nn,X)
    IndexedIndirectX,
    /// ($nn),Y
    IndirectIndexedY,
    /// $nnnn
    Absolute,
    /// $nnnn,X
    AbsoluteX,
    /// $nnnn,Y
    AbsoluteY,
    /// ($nnnn) -- JMP only
    Indirect,
    /// signed displacement from the address of the next instruction
    Relative,
    /// A
    Accumulator,
}

impl AddressingMode {
    /// Number of bytes that follow the opcode.
    pub fn operand_size(&self) -> u16 {
        use AddressingMode::*;
        match self {
            Implied | Accumulator => 0,
            Immediate | ZeroPage | ZeroPageX | ZeroPageY | IndexedIndirectX | IndirectIndexedY | Relative => 1,
            Absolute | AbsoluteX | AbsoluteY | Indirect => 2,
        }
    }
}

/// Where a read-modify-write instruction puts its result.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Target {
    /// implied, immediate and relative operands have nowhere to write back to
    None,
    Accumulator,
    Memory(u16),
}

impl Target {
    pub fn address(&self) -> Option<u16> {
        match self {
            Target::Memory(addr) => Some(*addr),
            _ => None,
        }
    }
}

/// The result of resolving an instruction's operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operand {
    /// the byte the instruction operates on: memory at the effective address, the immediate
    /// byte, the accumulator, or the raw displacement for branches
    pub value: u8,
    /// write-back destination (and effective address for memory modes)
    pub target: Target,
    /// the human readable operand
    pub text: String,
}

/// Resolves the operand of the instruction whose opcode sits at reg.pc.
/// Reads memory but never writes it, so resolution can be repeated freely.
pub fn resolve(reg: &registers::Set, mem: &Memory, mode: AddressingMode) -> Operand {
    use AddressingMode::*;
    let arg = mem.read_u8(reg.pc.wrapping_add(1));
    let word = mem.read_u16(reg.pc.wrapping_add(1));
    let (target, text) = match mode {
        Implied => (Target::None, String::new()),
        Accumulator => (Target::Accumulator, String::from("A")),
        Immediate => (Target::None, format!("#${:02X}", arg)),
        Relative => {
            let dest = reg
                .pc
                .wrapping_add(1 + mode.operand_size())
                .wrapping_add(arg as i8 as u16);
            (Target::None, format!("${:04X}", dest))
        }
        ZeroPage => (Target::Memory(arg as u16), format!("${:02X}", arg)),
        ZeroPageX => (Target::Memory(arg.wrapping_add(reg.x) as u16), format!("${:02X},X", arg)),
        ZeroPageY => (Target::Memory(arg.wrapping_add(reg.y) as u16), format!("${:02X},Y", arg)),
        IndexedIndirectX => {
            let ptr = mem.read_u16_zp(arg.wrapping_add(reg.x));
            (Target::Memory(ptr), format!("(${:02X},X)", arg))
        }
        IndirectIndexedY => {
            let ptr = mem.read_u16_zp(arg).wrapping_add(reg.y as u16);
            (Target::Memory(ptr), format!("(${:02X}),Y", arg))
        }
        Absolute => (Target::Memory(word), format!("${:04X}", word)),
        AbsoluteX => (Target::Memory(word.wrapping_add(reg.x as u16)), format!("${:04X},X", word)),
        AbsoluteY => (Target::Memory(word.wrapping_add(reg.y as u16)), format!("${:04X},Y", word)),
        Indirect => (Target::Memory(mem.read_u16_page_wrap(word)), format!("(${:04X})", word)),
    };
    let value = match target {
        Target::Memory(addr) => mem.read_u8(addr),
        Target::Accumulator => reg.a,
        Target::None if mode == Implied => 0,
        Target::None => arg,
    };
    Operand { value, target, text }
}
