use super::*;
use memory::Memory;
use std::time::Duration;

/// The Core struct implements one 6502 processor instance: its registers, its private 64K address space
/// and some bookkeeping for the run loop.
/// Its implementation spans multiple files: runtime.rs, memory.rs, registers.rs, addressing.rs
pub struct Core {
    pub reg: registers::Set, // the full set of 6502 registers
    pub mem: Memory,         // flat address space owned by this instance
    /* perf measurement */
    pub start_time: Instant,    // the most recent time at which self.exec() started a program
    pub instruction_count: u64, // the number of instructions executed since the most recent program started
    pub clock_cycles: u64,      // advisory clock cycles consumed since the most recent program started
    pub eval_time: Duration,    // the total time spent in the eval method of instructions
    pub prep_time: Duration,    // the total time spent preparing to call eval methods for all instructions
    pub commit_time: Duration,  // the total time spent committing the Outcome of all instructions
    /* fields for tracing */
    pub trace: bool,                       // if true then display each instruction as it's executed
    pub history: Option<VecDeque<String>>, // list of instructions that have been recently executed
    pub history_len: usize,                // maximum length of history; 0 disables it
}
impl Default for Core {
    fn default() -> Self { Core::new() }
}
impl Core {
    pub fn new() -> Core {
        instructions::init();

        Core {
            reg: Default::default(),
            mem: Memory::new(),
            start_time: Instant::now(),
            instruction_count: 0,
            clock_cycles: 0,
            eval_time: Duration::ZERO,
            prep_time: Duration::ZERO,
            commit_time: Duration::ZERO,
            trace: false,
            history: None,
            history_len: 0,
        }
    }

    /// load_image copies a raw binary image into simulator memory at addr
    pub fn load_image(&mut self, bytes: &[u8], addr: u16) -> Result<usize, Error> {
        let extent = self.mem.load(bytes, addr)?;
        verbose_println!("loaded {} bytes at {:04X}", extent, addr);
        Ok(extent)
    }

    pub fn dump_mem(&self, addr: u16, count: u16) {
        for line in self.mem.dump(addr, count).lines() {
            println!("{}\r", line);
        }
    }
}
