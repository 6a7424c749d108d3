use super::*;
use addressing::{AddressingMode, Operand, Target};
use lazy_static::lazy_static;
use registers::{Flags, Name};
use std::fmt::{self, Debug};

lazy_static! {
    /// Opcode -> Flavor lookup, built once from DESCRIPTORS and never modified afterwards.
    static ref FLAVOR_TABLE: [Option<Flavor>; 256] = {
        let mut table = [None; 256];
        for desc in DESCRIPTORS {
            for detail in desc.md {
                table[detail.op as usize] = Some(Flavor {
                    desc,
                    mode: detail.am,
                    detail,
                });
            }
        }
        table
    };
}
pub fn opcode_to_flavor(op: u8) -> Option<&'static Flavor> { FLAVOR_TABLE[op as usize].as_ref() }
/// Initialize static lookup tables.
pub fn init() { lazy_static::initialize(&FLAVOR_TABLE); }

/// Events that the run loop, rather than the instruction itself, has to act on.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Meta {
    /// BRK executed; vectoring through $FFFE is left to the host
    Brk,
}
/// How the program counter moves once an instruction has been evaluated.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Flow {
    /// fall through to the instruction that follows this one
    Next,
    /// the instruction retargeted PC; the engine must not add the instruction size on top
    Jump(u16),
}
/// Tracks a write operation prior to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord {
    pub addr: u16,
    pub val: u8,
}
/// Contains all the information about an instruction and the results of executing the instruction in the given context.
/// Instructions are executed virtually first, with their results recorded in Outcome object.
/// Thereafter, the results of the instruction may be committed to the simulator's registers and memory.
pub struct Outcome {
    /// the full instance info for this instruction
    pub inst: Instance,
    /// register set as a result of this instruction
    pub new_ctx: registers::Set,
    /// indicates if this instruction needs attention from the run loop
    pub meta: Option<Meta>,
    /// all the writes that result from this instruction
    pub writes: Option<Vec<WriteRecord>>,
}
impl Outcome {
    pub fn new(inst: Instance, new_ctx: registers::Set) -> Outcome {
        Outcome {
            inst,
            new_ctx,
            meta: None,
            writes: None,
        }
    }
    pub fn write(&mut self, addr: u16, val: u8) { self.writes.get_or_insert_with(Vec::new).push(WriteRecord { addr, val }); }
    pub fn mnemonic(&self) -> &'static str { self.inst.flavor.desc.name }
    pub fn operand(&self) -> &str { self.inst.operand.text.as_str() }
    /// One line rendering of the executed instruction and the registers it left behind.
    pub fn trace_line(&self) -> String {
        let bytes = self
            .inst
            .bytes()
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{:04X}: {:8} {} {:10} [{} -> ({})]",
            self.inst.ctx.pc,
            bytes,
            self.mnemonic(),
            self.operand(),
            self.new_ctx,
            self.new_ctx.p
        )
    }
}
/// Information about a specific instance of an instruction in the context of a running program.
/// This includes the current values of all the registers and the resolved operand
/// along with all the specifics of the instruction itself (Flavor, etc.)
pub struct Instance {
    /// Context before this instruction executes (ctx.pc points to this instruction)
    pub ctx: registers::Set,
    /// the Flavor of this instruction
    pub flavor: &'static Flavor,
    /// Full size in bytes of this instruction instance
    pub size: u16,
    /// Copy of full instruction bytes (only <size> bytes are valid)
    pub buf: [u8; 3],
    /// operand value, write-back target and disassembly
    pub operand: Operand,
    /// address of the instruction that follows this one
    pub next_pc: u16,
}
impl Instance {
    pub fn new(core: &Core, flavor: &'static Flavor) -> Instance {
        let ctx = core.reg;
        let size = flavor.detail.sz;
        let mut buf = [0u8; 3];
        for (i, b) in buf.iter_mut().enumerate().take(size as usize) {
            *b = core.mem.read_u8(ctx.pc.wrapping_add(i as u16));
        }
        Instance {
            ctx,
            flavor,
            size,
            buf,
            operand: addressing::resolve(&ctx, &core.mem, flavor.mode),
            next_pc: ctx.pc.wrapping_add(size),
        }
    }
    pub fn bytes(&self) -> &[u8] { &self.buf[..self.size as usize] }
}
/// Properties of an instruction that vary depending on addressing mode.
#[derive(Debug)]
pub struct ModeDetail {
    /// op code
    pub op: u8,
    /// min clock cycle cost (advisory; page crossing penalties aren't modeled)
    pub clk: u8,
    /// total size of instruction
    pub sz: u16,
    /// addressing mode
    pub am: AddressingMode,
}
type M = ModeDetail;

/// 6502 instructions are executed by the simulator via evaluation functions that have this signature.
type EvalFn = fn(&Core, &mut Outcome) -> Result<Flow, Error>;

/// Information about all the instruction variations that share a common name.
/// Each variation has an associated ModeDetail. The variations are called flavors.
pub struct Descriptor {
    /// the instruction name
    pub name: &'static str,
    /// the register this instruction is focused on (e.g. for LDX this is X)
    pub reg: Name,
    /// the evaluation function for this instruction
    pub eval: EvalFn,
    /// details for all the addressing modes supported for this instruction
    pub md: &'static [ModeDetail],
}
// Can't use default impl of Debug because it doesn't know what to do with EvalFn.
impl Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("reg", &self.reg)
            .field("md", &self.md)
            .finish()
    }
}
/// Represents a fully specified instruction -- one that maps to a specific op code.
/// It combines a Descriptor with a specific ModeDetail
#[derive(Clone, Copy, Debug)]
pub struct Flavor {
    /// the Descriptor for this instruction
    pub desc: &'static Descriptor,
    /// the addressing mode for this instruction
    pub mode: AddressingMode,
    /// the ModeDetail for this instruction
    pub detail: &'static ModeDetail,
}

//
// instruction implementations and helpers
//
fn effective_address(o: &Outcome) -> Result<u16, Error> {
    o.inst.operand.target.address().ok_or_else(|| {
        runtime_err!(
            ErrorKind::Unimplemented,
            Some(o.inst.ctx),
            "{} has no effective address in {:?} mode",
            o.mnemonic(),
            o.inst.flavor.mode
        )
    })
}
/// Stores the result of a read-modify-write instruction wherever its operand came from.
fn write_back(o: &mut Outcome, val: u8) -> Result<(), Error> {
    let target = o.inst.operand.target;
    match target {
        Target::Accumulator => o.new_ctx.a = val,
        Target::Memory(addr) => o.write(addr, val),
        Target::None => {
            return Err(runtime_err!(
                ErrorKind::Unimplemented,
                Some(o.inst.ctx),
                "{} has no write-back target in {:?} mode",
                o.mnemonic(),
                o.inst.flavor.mode
            ))
        }
    }
    Ok(())
}
fn __push(o: &mut Outcome, val: u8) {
    o.write(memory::STACK_PAGE | o.new_ctx.sp as u16, val);
    o.new_ctx.sp = o.new_ctx.sp.wrapping_sub(1);
}
fn __pull(c: &Core, o: &mut Outcome) -> u8 {
    o.new_ctx.sp = o.new_ctx.sp.wrapping_add(1);
    c.mem.read_u8(memory::STACK_PAGE | o.new_ctx.sp as u16)
}
fn __nop(_: &Core, _: &mut Outcome) -> Result<Flow, Error> {
    // do nothing
    Ok(Flow::Next)
}
fn __adc(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.a = o.new_ctx.p.adc_u8(o.new_ctx.a, o.inst.operand.value);
    Ok(Flow::Next)
}
fn __sbc(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.a = o.new_ctx.p.sbc_u8(o.new_ctx.a, o.inst.operand.value);
    Ok(Flow::Next)
}
fn __and(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.a = o.new_ctx.p.and_u8(o.new_ctx.a, o.inst.operand.value);
    Ok(Flow::Next)
}
fn __ora(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.a = o.new_ctx.p.or_u8(o.new_ctx.a, o.inst.operand.value);
    Ok(Flow::Next)
}
fn __eor(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.a = o.new_ctx.p.xor_u8(o.new_ctx.a, o.inst.operand.value);
    Ok(Flow::Next)
}
fn __bit(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.p.bit_u8(o.new_ctx.a, o.inst.operand.value);
    Ok(Flow::Next)
}
fn __cmp(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    let reg_val = o.new_ctx.get_register(o.inst.flavor.desc.reg) as u8;
    o.new_ctx.p.cmp_u8(reg_val, o.inst.operand.value);
    Ok(Flow::Next)
}
fn __rmw(o: &mut Outcome, op: fn(&mut Flags, u8) -> u8) -> Result<Flow, Error> {
    let new_val = op(&mut o.new_ctx.p, o.inst.operand.value);
    write_back(o, new_val)?;
    Ok(Flow::Next)
}
fn __asl(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __rmw(o, Flags::asl_u8) }
fn __lsr(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __rmw(o, Flags::lsr_u8) }
fn __rol(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __rmw(o, Flags::rol_u8) }
fn __ror(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __rmw(o, Flags::ror_u8) }
// INC/DEC work on memory; INX/INY/DEX/DEY name their register
fn __inc_dec(o: &mut Outcome, op: fn(&mut Flags, u8) -> u8) -> Result<Flow, Error> {
    let reg = o.inst.flavor.desc.reg;
    if reg == Name::Z {
        __rmw(o, op)
    } else {
        let data = o.new_ctx.get_register(reg) as u8;
        let new_val = op(&mut o.new_ctx.p, data);
        o.new_ctx.set_register(reg, new_val as u16);
        Ok(Flow::Next)
    }
}
fn __inc(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __inc_dec(o, Flags::inc_u8) }
fn __dec(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __inc_dec(o, Flags::dec_u8) }
fn __ld(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    let val = o.inst.operand.value;
    o.new_ctx.set_register(o.inst.flavor.desc.reg, val as u16);
    o.new_ctx.p.set_nz(val);
    Ok(Flow::Next)
}
fn __st(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    // stores don't touch the flags
    let val = o.inst.ctx.get_register(o.inst.flavor.desc.reg) as u8;
    let addr = effective_address(o)?;
    o.write(addr, val);
    Ok(Flow::Next)
}
fn __transfer(o: &mut Outcome, src: Name, dst: Name) -> Result<Flow, Error> {
    let val = o.new_ctx.get_register(src);
    o.new_ctx.set_register(dst, val);
    // TXS is the only transfer that leaves N and Z alone
    if dst != Name::SP {
        o.new_ctx.p.set_nz(val as u8);
    }
    Ok(Flow::Next)
}
fn __tax(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __transfer(o, Name::A, Name::X) }
fn __tay(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __transfer(o, Name::A, Name::Y) }
fn __txa(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __transfer(o, Name::X, Name::A) }
fn __tya(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __transfer(o, Name::Y, Name::A) }
fn __tsx(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __transfer(o, Name::SP, Name::X) }
fn __txs(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __transfer(o, Name::X, Name::SP) }
fn __clc(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.p.c = false;
    Ok(Flow::Next)
}
fn __cld(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.p.d = false;
    Ok(Flow::Next)
}
fn __cli(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.p.i = false;
    Ok(Flow::Next)
}
fn __clv(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.p.v = false;
    Ok(Flow::Next)
}
fn __sec(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.p.c = true;
    Ok(Flow::Next)
}
fn __sed(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.p.d = true;
    Ok(Flow::Next)
}
fn __sei(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.p.i = true;
    Ok(Flow::Next)
}
// displacement is relative to the instruction that follows the branch
fn __branch(o: &Outcome, cond: bool) -> Result<Flow, Error> {
    if cond {
        let offset = o.inst.operand.value as i8;
        Ok(Flow::Jump(o.inst.next_pc.wrapping_add(offset as u16)))
    } else {
        Ok(Flow::Next)
    }
}
fn __bcc(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __branch(o, !o.new_ctx.p.c) }
fn __bcs(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __branch(o, o.new_ctx.p.c) }
fn __beq(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __branch(o, o.new_ctx.p.z) }
fn __bne(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __branch(o, !o.new_ctx.p.z) }
fn __bmi(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __branch(o, o.new_ctx.p.n) }
fn __bpl(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __branch(o, !o.new_ctx.p.n) }
fn __bvc(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __branch(o, !o.new_ctx.p.v) }
fn __bvs(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { __branch(o, o.new_ctx.p.v) }
fn __jmp(_: &Core, o: &mut Outcome) -> Result<Flow, Error> { Ok(Flow::Jump(effective_address(o)?)) }
fn __jsr(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    let addr = effective_address(o)?;
    // the pushed address is the last byte of the JSR itself
    let [lo, hi] = o.inst.next_pc.wrapping_sub(1).to_le_bytes();
    __push(o, hi);
    __push(o, lo);
    Ok(Flow::Jump(addr))
}
fn __rts(c: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    let lo = __pull(c, o);
    let hi = __pull(c, o);
    Ok(Flow::Jump(u16::from_le_bytes([lo, hi]).wrapping_add(1)))
}
fn __rti(c: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    let status = __pull(c, o);
    o.new_ctx.p.set_from_byte(status);
    let lo = __pull(c, o);
    let hi = __pull(c, o);
    Ok(Flow::Jump(u16::from_le_bytes([lo, hi])))
}
fn __pha(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    let a = o.new_ctx.a;
    __push(o, a);
    Ok(Flow::Next)
}
fn __php(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    // the pushed copy always has B set
    let status = o.new_ctx.p.to_byte() | registers::Flag::B.info().mask;
    __push(o, status);
    Ok(Flow::Next)
}
fn __pla(c: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.a = __pull(c, o);
    o.new_ctx.p.set_nz(o.new_ctx.a);
    Ok(Flow::Next)
}
fn __plp(c: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    let status = __pull(c, o);
    o.new_ctx.p.set_from_byte(status);
    Ok(Flow::Next)
}
fn __brk(_: &Core, o: &mut Outcome) -> Result<Flow, Error> {
    o.new_ctx.p.b = true;
    o.new_ctx.p.i = true;
    o.meta = Some(Meta::Brk);
    Ok(Flow::Next)
}

const IMP: AddressingMode = AddressingMode::Implied;
const IMM: AddressingMode = AddressingMode::Immediate;
const ZP: AddressingMode = AddressingMode::ZeroPage;
const ZPX: AddressingMode = AddressingMode::ZeroPageX;
const ZPY: AddressingMode = AddressingMode::ZeroPageY;
const IZX: AddressingMode = AddressingMode::IndexedIndirectX;
const IZY: AddressingMode = AddressingMode::IndirectIndexedY;
const ABS: AddressingMode = AddressingMode::Absolute;
const ABX: AddressingMode = AddressingMode::AbsoluteX;
const ABY: AddressingMode = AddressingMode::AbsoluteY;
const IND: AddressingMode = AddressingMode::Indirect;
const REL: AddressingMode = AddressingMode::Relative;
const ACC: AddressingMode = AddressingMode::Accumulator;

// Reference: http://nesdev.com/6502.txt
#[rustfmt::skip]
pub const DESCRIPTORS: &[Descriptor] = &[
 Descriptor{name:"ADC", eval:__adc, reg: Name::A, md:&[M{op:0x69,clk:2,sz:2,am:IMM},M{op:0x65,clk:3,sz:2,am:ZP},M{op:0x75,clk:4,sz:2,am:ZPX},M{op:0x6D,clk:4,sz:3,am:ABS},M{op:0x7D,clk:4,sz:3,am:ABX},M{op:0x79,clk:4,sz:3,am:ABY},M{op:0x61,clk:6,sz:2,am:IZX},M{op:0x71,clk:5,sz:2,am:IZY},]},
 Descriptor{name:"AND", eval:__and, reg: Name::A, md:&[M{op:0x29,clk:2,sz:2,am:IMM},M{op:0x25,clk:3,sz:2,am:ZP},M{op:0x35,clk:4,sz:2,am:ZPX},M{op:0x2D,clk:4,sz:3,am:ABS},M{op:0x3D,clk:4,sz:3,am:ABX},M{op:0x39,clk:4,sz:3,am:ABY},M{op:0x21,clk:6,sz:2,am:IZX},M{op:0x31,clk:5,sz:2,am:IZY},]},
 Descriptor{name:"ASL", eval:__asl, reg: Name::Z, md:&[M{op:0x0A,clk:2,sz:1,am:ACC},M{op:0x06,clk:5,sz:2,am:ZP},M{op:0x16,clk:6,sz:2,am:ZPX},M{op:0x0E,clk:6,sz:3,am:ABS},M{op:0x1E,clk:7,sz:3,am:ABX},]},
 Descriptor{name:"BCC", eval:__bcc, reg: Name::Z, md:&[M{op:0x90,clk:2,sz:2,am:REL},]},
 Descriptor{name:"BCS", eval:__bcs, reg: Name::Z, md:&[M{op:0xB0,clk:2,sz:2,am:REL},]},
 Descriptor{name:"BEQ", eval:__beq, reg: Name::Z, md:&[M{op:0xF0,clk:2,sz:2,am:REL},]},
 Descriptor{name:"BIT", eval:__bit, reg: Name::A, md:&[M{op:0x24,clk:3,sz:2,am:ZP},M{op:0x2C,clk:4,sz:3,am:ABS},]},
 Descriptor{name:"BMI", eval:__bmi, reg: Name::Z, md:&[M{op:0x30,clk:2,sz:2,am:REL},]},
 Descriptor{name:"BNE", eval:__bne, reg: Name::Z, md:&[M{op:0xD0,clk:2,sz:2,am:REL},]},
 Descriptor{name:"BPL", eval:__bpl, reg: Name::Z, md:&[M{op:0x10,clk:2,sz:2,am:REL},]},
 Descriptor{name:"BRK", eval:__brk, reg: Name::Z, md:&[M{op:0x00,clk:7,sz:1,am:IMP},]},
 Descriptor{name:"BVC", eval:__bvc, reg: Name::Z, md:&[M{op:0x50,clk:2,sz:2,am:REL},]},
 Descriptor{name:"BVS", eval:__bvs, reg: Name::Z, md:&[M{op:0x70,clk:2,sz:2,am:REL},]},
 Descriptor{name:"CLC", eval:__clc, reg: Name::Z, md:&[M{op:0x18,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"CLD", eval:__cld, reg: Name::Z, md:&[M{op:0xD8,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"CLI", eval:__cli, reg: Name::Z, md:&[M{op:0x58,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"CLV", eval:__clv, reg: Name::Z, md:&[M{op:0xB8,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"CMP", eval:__cmp, reg: Name::A, md:&[M{op:0xC9,clk:2,sz:2,am:IMM},M{op:0xC5,clk:3,sz:2,am:ZP},M{op:0xD5,clk:4,sz:2,am:ZPX},M{op:0xCD,clk:4,sz:3,am:ABS},M{op:0xDD,clk:4,sz:3,am:ABX},M{op:0xD9,clk:4,sz:3,am:ABY},M{op:0xC1,clk:6,sz:2,am:IZX},M{op:0xD1,clk:5,sz:2,am:IZY},]},
 Descriptor{name:"CPX", eval:__cmp, reg: Name::X, md:&[M{op:0xE0,clk:2,sz:2,am:IMM},M{op:0xE4,clk:3,sz:2,am:ZP},M{op:0xEC,clk:4,sz:3,am:ABS},]},
 Descriptor{name:"CPY", eval:__cmp, reg: Name::Y, md:&[M{op:0xC0,clk:2,sz:2,am:IMM},M{op:0xC4,clk:3,sz:2,am:ZP},M{op:0xCC,clk:4,sz:3,am:ABS},]},
 Descriptor{name:"DEC", eval:__dec, reg: Name::Z, md:&[M{op:0xC6,clk:5,sz:2,am:ZP},M{op:0xD6,clk:6,sz:2,am:ZPX},M{op:0xCE,clk:6,sz:3,am:ABS},M{op:0xDE,clk:7,sz:3,am:ABX},]},
 Descriptor{name:"DEX", eval:__dec, reg: Name::X, md:&[M{op:0xCA,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"DEY", eval:__dec, reg: Name::Y, md:&[M{op:0x88,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"EOR", eval:__eor, reg: Name::A, md:&[M{op:0x49,clk:2,sz:2,am:IMM},M{op:0x45,clk:3,sz:2,am:ZP},M{op:0x55,clk:4,sz:2,am:ZPX},M{op:0x4D,clk:4,sz:3,am:ABS},M{op:0x5D,clk:4,sz:3,am:ABX},M{op:0x59,clk:4,sz:3,am:ABY},M{op:0x41,clk:6,sz:2,am:IZX},M{op:0x51,clk:5,sz:2,am:IZY},]},
 Descriptor{name:"INC", eval:__inc, reg: Name::Z, md:&[M{op:0xE6,clk:5,sz:2,am:ZP},M{op:0xF6,clk:6,sz:2,am:ZPX},M{op:0xEE,clk:6,sz:3,am:ABS},M{op:0xFE,clk:7,sz:3,am:ABX},]},
 Descriptor{name:"INX", eval:__inc, reg: Name::X, md:&[M{op:0xE8,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"INY", eval:__inc, reg: Name::Y, md:&[M{op:0xC8,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"JMP", eval:__jmp, reg: Name::Z, md:&[M{op:0x4C,clk:3,sz:3,am:ABS},M{op:0x6C,clk:5,sz:3,am:IND},]},
 Descriptor{name:"JSR", eval:__jsr, reg: Name::Z, md:&[M{op:0x20,clk:6,sz:3,am:ABS},]},
 Descriptor{name:"LDA", eval:__ld,  reg: Name::A, md:&[M{op:0xA9,clk:2,sz:2,am:IMM},M{op:0xA5,clk:3,sz:2,am:ZP},M{op:0xB5,clk:4,sz:2,am:ZPX},M{op:0xAD,clk:4,sz:3,am:ABS},M{op:0xBD,clk:4,sz:3,am:ABX},M{op:0xB9,clk:4,sz:3,am:ABY},M{op:0xA1,clk:6,sz:2,am:IZX},M{op:0xB1,clk:5,sz:2,am:IZY},]},
 Descriptor{name:"LDX", eval:__ld,  reg: Name::X, md:&[M{op:0xA2,clk:2,sz:2,am:IMM},M{op:0xA6,clk:3,sz:2,am:ZP},M{op:0xB6,clk:4,sz:2,am:ZPY},M{op:0xAE,clk:4,sz:3,am:ABS},M{op:0xBE,clk:4,sz:3,am:ABY},]},
 Descriptor{name:"LDY", eval:__ld,  reg: Name::Y, md:&[M{op:0xA0,clk:2,sz:2,am:IMM},M{op:0xA4,clk:3,sz:2,am:ZP},M{op:0xB4,clk:4,sz:2,am:ZPX},M{op:0xAC,clk:4,sz:3,am:ABS},M{op:0xBC,clk:4,sz:3,am:ABX},]},
 Descriptor{name:"LSR", eval:__lsr, reg: Name::Z, md:&[M{op:0x4A,clk:2,sz:1,am:ACC},M{op:0x46,clk:5,sz:2,am:ZP},M{op:0x56,clk:6,sz:2,am:ZPX},M{op:0x4E,clk:6,sz:3,am:ABS},M{op:0x5E,clk:7,sz:3,am:ABX},]},
 Descriptor{name:"NOP", eval:__nop, reg: Name::Z, md:&[M{op:0xEA,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"ORA", eval:__ora, reg: Name::A, md:&[M{op:0x09,clk:2,sz:2,am:IMM},M{op:0x05,clk:3,sz:2,am:ZP},M{op:0x15,clk:4,sz:2,am:ZPX},M{op:0x0D,clk:4,sz:3,am:ABS},M{op:0x1D,clk:4,sz:3,am:ABX},M{op:0x19,clk:4,sz:3,am:ABY},M{op:0x01,clk:6,sz:2,am:IZX},M{op:0x11,clk:5,sz:2,am:IZY},]},
 Descriptor{name:"PHA", eval:__pha, reg: Name::A, md:&[M{op:0x48,clk:3,sz:1,am:IMP},]},
 Descriptor{name:"PHP", eval:__php, reg: Name::P, md:&[M{op:0x08,clk:3,sz:1,am:IMP},]},
 Descriptor{name:"PLA", eval:__pla, reg: Name::A, md:&[M{op:0x68,clk:4,sz:1,am:IMP},]},
 Descriptor{name:"PLP", eval:__plp, reg: Name::P, md:&[M{op:0x28,clk:4,sz:1,am:IMP},]},
 Descriptor{name:"ROL", eval:__rol, reg: Name::Z, md:&[M{op:0x2A,clk:2,sz:1,am:ACC},M{op:0x26,clk:5,sz:2,am:ZP},M{op:0x36,clk:6,sz:2,am:ZPX},M{op:0x2E,clk:6,sz:3,am:ABS},M{op:0x3E,clk:7,sz:3,am:ABX},]},
 Descriptor{name:"ROR", eval:__ror, reg: Name::Z, md:&[M{op:0x6A,clk:2,sz:1,am:ACC},M{op:0x66,clk:5,sz:2,am:ZP},M{op:0x76,clk:6,sz:2,am:ZPX},M{op:0x6E,clk:6,sz:3,am:ABS},M{op:0x7E,clk:7,sz:3,am:ABX},]},
 Descriptor{name:"RTI", eval:__rti, reg: Name::Z, md:&[M{op:0x40,clk:6,sz:1,am:IMP},]},
 Descriptor{name:"RTS", eval:__rts, reg: Name::Z, md:&[M{op:0x60,clk:6,sz:1,am:IMP},]},
 Descriptor{name:"SBC", eval:__sbc, reg: Name::A, md:&[M{op:0xE9,clk:2,sz:2,am:IMM},M{op:0xE5,clk:3,sz:2,am:ZP},M{op:0xF5,clk:4,sz:2,am:ZPX},M{op:0xED,clk:4,sz:3,am:ABS},M{op:0xFD,clk:4,sz:3,am:ABX},M{op:0xF9,clk:4,sz:3,am:ABY},M{op:0xE1,clk:6,sz:2,am:IZX},M{op:0xF1,clk:5,sz:2,am:IZY},]},
 Descriptor{name:"SEC", eval:__sec, reg: Name::Z, md:&[M{op:0x38,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"SED", eval:__sed, reg: Name::Z, md:&[M{op:0xF8,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"SEI", eval:__sei, reg: Name::Z, md:&[M{op:0x78,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"STA", eval:__st,  reg: Name::A, md:&[M{op:0x85,clk:3,sz:2,am:ZP},M{op:0x95,clk:4,sz:2,am:ZPX},M{op:0x8D,clk:4,sz:3,am:ABS},M{op:0x9D,clk:5,sz:3,am:ABX},M{op:0x99,clk:5,sz:3,am:ABY},M{op:0x81,clk:6,sz:2,am:IZX},M{op:0x91,clk:6,sz:2,am:IZY},]},
 Descriptor{name:"STX", eval:__st,  reg: Name::X, md:&[M{op:0x86,clk:3,sz:2,am:ZP},M{op:0x96,clk:4,sz:2,am:ZPY},M{op:0x8E,clk:4,sz:3,am:ABS},]},
 Descriptor{name:"STY", eval:__st,  reg: Name::Y, md:&[M{op:0x84,clk:3,sz:2,am:ZP},M{op:0x94,clk:4,sz:2,am:ZPX},M{op:0x8C,clk:4,sz:3,am:ABS},]},
 Descriptor{name:"TAX", eval:__tax, reg: Name::X, md:&[M{op:0xAA,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"TAY", eval:__tay, reg: Name::Y, md:&[M{op:0xA8,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"TSX", eval:__tsx, reg: Name::X, md:&[M{op:0xBA,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"TXA", eval:__txa, reg: Name::A, md:&[M{op:0x8A,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"TXS", eval:__txs, reg: Name::SP, md:&[M{op:0x9A,clk:2,sz:1,am:IMP},]},
 Descriptor{name:"TYA", eval:__tya, reg: Name::A, md:&[M{op:0x98,clk:2,sz:1,am:IMP},]},
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_documented_opcodes() {
        init();
        let known = (0..=255u8).filter(|op| opcode_to_flavor(*op).is_some()).count();
        assert_eq!(known, 151);
        assert_eq!(DESCRIPTORS.len(), 56);
        for op in [0x02u8, 0x03, 0x80, 0xff] {
            assert!(opcode_to_flavor(op).is_none(), "{:02X} should be undefined", op);
        }
    }

    #[test]
    fn opcodes_are_unique_and_sized_by_mode() {
        let mut seen = [false; 256];
        for desc in DESCRIPTORS {
            for detail in desc.md {
                assert!(!seen[detail.op as usize], "{} reuses {:02X}", desc.name, detail.op);
                seen[detail.op as usize] = true;
                assert_eq!(detail.sz, 1 + detail.am.operand_size(), "{} {:02X}", desc.name, detail.op);
                assert!(detail.clk >= 2);
            }
        }
    }

    #[test]
    fn well_known_opcodes() {
        let check = |op: u8, name: &str, mode: AddressingMode| {
            let flavor = opcode_to_flavor(op).unwrap();
            assert_eq!(flavor.desc.name, name);
            assert_eq!(flavor.mode, mode);
        };
        check(0x60, "RTS", IMP);
        check(0x70, "BVS", REL);
        check(0x6D, "ADC", ABS);
        check(0x7D, "ADC", ABX);
        check(0x00, "BRK", IMP);
        check(0x6C, "JMP", IND);
        check(0xB6, "LDX", ZPY);
        check(0x96, "STX", ZPY);
        check(0x4A, "LSR", ACC);
        check(0xEA, "NOP", IMP);
    }

    #[test]
    fn missing_target_is_an_error() {
        // a read-modify-write forced into immediate mode has nowhere to put its result
        let desc = DESCRIPTORS.iter().find(|d| d.name == "ASL").unwrap();
        let detail: &'static ModeDetail = Box::leak(Box::new(M {
            op: 0x0A,
            clk: 2,
            sz: 2,
            am: IMM,
        }));
        let flavor: &'static Flavor = Box::leak(Box::new(Flavor {
            desc,
            mode: IMM,
            detail,
        }));
        let core = Core::new();
        let mut o = Outcome::new(Instance::new(&core, flavor), core.reg);
        let e = (desc.eval)(&core, &mut o).err().unwrap();
        assert_eq!(e.kind, ErrorKind::Unimplemented);
        assert!(o.writes.is_none());
        assert_eq!(effective_address(&o).err().map(|e| e.kind), Some(ErrorKind::Unimplemented));
    }

    #[test]
    fn trace_line_format() {
        let mut core = Core::new();
        core.mem.load(&[0xa9, 0x42], 0x0200).unwrap();
        core.reg.pc = 0x0200;
        let o = core.exec_next(false).unwrap();
        let line = o.trace_line();
        assert!(line.starts_with("0200: A9 42    LDA #$42"), "{}", line);
        assert_eq!(o.new_ctx.a, 0x42);
    }
}
