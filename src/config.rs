use clap::{Parser, ValueEnum};
use clap_num::maybe_hex;
use lazy_static::lazy_static;

/// What the run loop does when it fetches a byte with no instruction table entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnUnknown {
    /// stop executing and report the error
    Halt,
    /// report a warning, step over the byte and keep going
    Skip,
}

#[derive(Parser, Debug)]
#[command(author,version,about,long_about=None)]
pub struct Args {
    /// Raw binary image to load and run
    pub file: String,

    /// Address at which to load the image (hex ok with '0x')
    #[arg(short, long, value_parser=maybe_hex::<u16>, default_value_t=0x0000_u16)]
    pub origin: u16,

    /// Initial program counter; defaults to the load address
    #[arg(long, value_parser=maybe_hex::<u16>)]
    pub pc: Option<u16>,

    /// Initial stack pointer
    #[arg(long, value_parser=maybe_hex::<u8>, default_value_t=0xff_u8)]
    pub sp: u8,

    /// Stop after this many instructions if BRK hasn't been reached
    #[arg(short, long, default_value_t = 1_000_000)]
    pub max_steps: u64,

    /// What to do when an unknown opcode is fetched
    #[arg(long, value_enum, default_value_t = OnUnknown::Halt)]
    pub on_unknown: OnUnknown,

    /// Post-run assertion of the form lhs=rhs, e.g. a=#$19 or $0200=#%1010 (repeatable)
    #[arg(short, long)]
    pub expect: Vec<String>,

    /// The number of executed instructions to keep for display when the program faults
    #[arg(long, default_value_t = 20)]
    pub history: usize,

    /// Display perf data (only interesting for longer-running programs)
    #[arg(long)]
    pub perf: bool,

    /// Trace each machine instruction as it is executed
    #[arg(short, long)]
    pub trace: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

lazy_static! {
    pub static ref ARGS: Args = if cfg!(test) {
        // manually set parameters for running tests
        Args::parse_from(["test", "test.bin"])
    } else {
        Args::parse()
    };
}

pub fn init() { lazy_static::initialize(&ARGS); }
