use crate::registers;
use std::{convert::From, fmt};

/// Simple custom Error for the 6502 project
pub struct Error {
    pub kind: ErrorKind,
    pub ctx: Option<registers::Set>,
    pub msg: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// fetched byte has no entry in the instruction table
    UnknownOpcode,
    /// an instruction was dispatched with an addressing mode its handler can't honor
    Unimplemented,
    /// program image doesn't fit in the address space
    Memory,
    /// underlying io error
    IO,
    /// a post-run criterion evaluated to false (or failed to parse)
    Test,
    /// normal exit (not really an error)
    Exit,
    /// catch-all for other errors
    General,
}

impl Error {
    pub fn new(kind: ErrorKind, ctx: Option<registers::Set>, message: &str) -> Error {
        Error {
            kind,
            ctx,
            msg: String::from(message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self { Error::new(ErrorKind::IO, None, e.to_string().as_str()) }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: ({:?}) {}", red!("cpu::Error"), self.kind, self.msg)
    }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut res = write!(f, "{}", self.msg);
        if res.is_ok() {
            if let Some(ctx) = self.ctx {
                res = write!(f, "\nContext: {} -> ({})", ctx, ctx.p);
            }
        }
        res
    }
}
impl std::error::Error for Error {}
