//! Post-run criteria enable automated checking of a program by the 6502 simulator.
//!
//! Each criterion (passed with `--expect`) is an assertion of the form:
//! ```text
//! <lhs>=<rhs>
//! ```
//! where:
//! ```text
//! lhs := register | flag | address
//! rhs := constant | address
//! register := a | x | y | sp | pc | p
//! flag := n | v | b | d | i | z | c
//! constant := '#' ( '$' hex | '%' binary | decimal )
//! address := '$' hex
//! ```
//!
//! Bit-width rules:
//!
//!| LHS | Result |
//!| --- | --- |
//!| 8-bit register | 8-bit comparison with the constant or the byte at the rhs address |
//!| PC | 16-bit comparison with the constant or the word at the rhs address |
//!| flag | 0 or 1 compared with the constant or the byte at the rhs address |
//!| address | byte comparison, or word comparison when the constant doesn't fit in a byte |
//!
//! Examples:
//! - `a=#$55` Passes if register A contains the value 55 hex when the program is done
//! - `$0100=$0101` Passes if address 100 (hex) holds the same byte as address 101
//! - `c=#1` Passes if the carry flag is set
//! - `$0200=#%10000001` Passes if the byte at $0200 equals 81 hex
//! - `$0300=#$1234` Passes if the word at $0300 (little-endian) equals 1234 hex
use super::*;
use lazy_static::lazy_static;
use registers::{Flag, Name};
use regex::Regex;

lazy_static! {
    static ref RE_CRITERION: Regex = Regex::new(r"^\s*([^=\s]+)\s*=\s*([^=\s]+)\s*$").unwrap();
    static ref RE_REGISTER: Regex = Regex::new(r"(?i)^(a|x|y|sp|s|pc|p)$").unwrap();
    static ref RE_FLAG: Regex = Regex::new(r"(?i)^([nvbdizc])$").unwrap();
    static ref RE_ADDR: Regex = Regex::new(r"(?i)^\$([0-9a-f]{1,4})$").unwrap();
    static ref RE_CONST: Regex = Regex::new(r"(?i)^#(?:\$([0-9a-f]{1,4})|%([01]{1,16})|([0-9]{1,5}))$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lhs {
    Reg(Name),
    Flag(Flag),
    Addr(u16),
}
impl fmt::Display for Lhs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Lhs::Reg(r) => write!(f, "{}", r.to_str()),
            Lhs::Flag(flag) => write!(f, "{}", flag.info().short),
            Lhs::Addr(a) => write!(f, "${:04X}", a),
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rhs {
    Addr(u16),
    Val(u16),
}
impl fmt::Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rhs::Addr(a) => write!(f, "${:04X}", a),
            Rhs::Val(v) => write!(f, "#${:02X}", v),
        }
    }
}

#[derive(Debug)]
pub struct Criterion {
    pub src: String, // the assertion as the user wrote it
    pub lhs: Lhs,
    pub rhs: Rhs,
}
impl Criterion {
    pub fn parse(src: &str) -> Result<Criterion, Error> {
        let caps = RE_CRITERION
            .captures(src)
            .ok_or_else(|| test_err!(None, "Malformed criterion \"{}\" (expected lhs=rhs)", src))?;
        let (lhs_src, rhs_src) = (&caps[1], &caps[2]);

        let lhs = if RE_REGISTER.is_match(lhs_src) {
            Lhs::Reg(Name::from_str(lhs_src))
        } else if let Some(c) = RE_FLAG.captures(lhs_src) {
            let flag = c[1]
                .chars()
                .next()
                .and_then(Flag::from_char)
                .ok_or_else(|| test_err!(None, "Invalid flag \"{}\" in criterion", lhs_src))?;
            Lhs::Flag(flag)
        } else if let Some(c) = RE_ADDR.captures(lhs_src) {
            Lhs::Addr(parse_num(&c[1], 16, src)?)
        } else {
            return Err(test_err!(None, "Invalid LHS \"{}\" in criterion \"{}\"", lhs_src, src));
        };

        let rhs = if let Some(c) = RE_CONST.captures(rhs_src) {
            let val = if let Some(hex) = c.get(1) {
                parse_num(hex.as_str(), 16, src)?
            } else if let Some(bin) = c.get(2) {
                parse_num(bin.as_str(), 2, src)?
            } else {
                parse_num(&c[3], 10, src)?
            };
            Rhs::Val(val)
        } else if let Some(c) = RE_ADDR.captures(rhs_src) {
            Rhs::Addr(parse_num(&c[1], 16, src)?)
        } else {
            return Err(test_err!(None, "Invalid RHS \"{}\" in criterion \"{}\"", rhs_src, src));
        };

        Ok(Criterion {
            src: src.trim().to_string(),
            lhs,
            rhs,
        })
    }
    pub fn eval(&self, core: &Core) -> Result<(), Error> {
        let (lhs_val, size) = match self.lhs {
            Lhs::Reg(reg) => (core.reg.get_register(reg), registers::reg_size(reg)),
            Lhs::Flag(flag) => (core.reg.p.is_set(flag) as u16, 1),
            Lhs::Addr(addr) => {
                let size = match self.rhs {
                    Rhs::Val(v) if v > 0xff => 2,
                    _ => 1,
                };
                (read_sized(core, addr, size), size)
            }
        };
        let rhs_val = match self.rhs {
            Rhs::Addr(addr) => read_sized(core, addr, size),
            Rhs::Val(v) => v,
        };
        if lhs_val == rhs_val {
            Ok(())
        } else {
            Err(test_err!(
                Some(core.reg),
                "{} (${:02X}) != {} (${:02X})",
                self.lhs,
                lhs_val,
                self.rhs,
                rhs_val
            ))
        }
    }
}
impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let actual = format!("({} = {})", self.lhs, self.rhs);
        write!(f, "{:20} {:16}", self.src, actual)
    }
}

fn parse_num(digits: &str, radix: u32, src: &str) -> Result<u16, Error> {
    u16::from_str_radix(digits, radix).map_err(|e| test_err!(None, "Bad number \"{}\" in criterion \"{}\": {}", digits, src, e))
}
fn read_sized(core: &Core, addr: u16, size: u16) -> u16 {
    if size == 2 {
        core.mem.read_u16(addr)
    } else {
        core.mem.read_u8(addr) as u16
    }
}

/// Parses every criterion up front so that typos are reported before the program runs.
pub fn parse_all(srcs: &[String]) -> Result<Vec<Criterion>, Error> { srcs.iter().map(|s| Criterion::parse(s)).collect() }

impl Core {
    /// Evaluates all criteria against the current machine state, printing PASS/FAIL for each.
    pub fn check_criteria(&self, criteria: &[Criterion]) -> Result<(), Error> {
        if criteria.is_empty() {
            return Ok(());
        }
        info!(
            "Validating {} criteri{}",
            criteria.len(),
            if criteria.len() == 1 { "on" } else { "a" }
        );
        let mut error_count = 0;
        for tc in criteria {
            print!("\t{} --> ", tc);
            match tc.eval(self) {
                Ok(_) => println!(green!("PASS")),
                Err(e) => {
                    error_count += 1;
                    println!(red!("FAIL {}"), e.msg)
                }
            }
        }
        if error_count == 0 {
            Ok(())
        } else {
            Err(Error {
                kind: ErrorKind::Test,
                ctx: None,
                msg: format!("Failed {error_count} criteria"),
            })
        }
    }
}
