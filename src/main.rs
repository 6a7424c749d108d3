//! # A MOS 6502 Simulator written in Rust.
//!
//! ## Getting Started
//! To load a raw binary image at $0600 and run it until BRK:
//! ```
//! cargo run -- --origin 0x0600 /path/to/program.bin
//! ```
//! ...or if you've already built the binary then just...
//! ```
//! 6502 --origin 0x0600 --trace --expect 'a=#$37' /path/to/program.bin
//! ```
//! ## Options
//! Help for command line options is available using -h or --help.
#[macro_use]
mod macros;
mod addressing;
mod config;
mod core;
mod criteria;
mod error;
mod instructions;
mod memory;
mod registers;
mod runtime;
use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::result::Result;
use std::time::Instant;
pub(crate) use {crate::core::Core, crate::error::*};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::init();
    // process_file does all the work
    if let Err(e) = process_file(config::ARGS.file.as_str(), &config::ARGS) {
        println!("{}", e);
        return Err(Box::new(e));
    }
    Ok(())
}
/// process_file drives the top level functionality (load, run, check) of the app
fn process_file(filename: &str, args: &config::Args) -> Result<(), Error> {
    // parse criteria before running anything so a typo doesn't waste a long run
    let criteria = criteria::parse_all(&args.expect)?;
    let image = fs::read(filename)?;
    if image.is_empty() {
        return Err(general_err!(format!("{} is empty", filename)));
    }

    let mut core = Core::new();
    core.load_image(&image, args.origin)?;
    core.reg.pc = args.pc.unwrap_or(args.origin);
    core.reg.sp = args.sp;
    core.trace = args.trace;
    core.history_len = args.history;

    info!("Executing {} from {:04X}", filename, core.reg.pc);
    core.exec(args.max_steps, args.on_unknown)?;
    verbose_println!("Final state: {} -> ({})", core.reg, core.reg.p);

    // if there are any criteria then check them now
    core.check_criteria(&criteria)
}
