/// Implements the runtime engine of the simulator.
use super::*;
use config::OnUnknown;
use instructions::{Flow, Instance, Meta, Outcome};

impl Core {
    /// Displays current perf information to stdout
    fn report_perf(&self) {
        if !config::ARGS.perf {
            return;
        }
        let delta = self.start_time.elapsed().as_secs_f64();
        info!(
            "Executed {} instructions in {:.2} sec; {:.3} MIPS; effective clock: {:.3} MHz",
            self.instruction_count,
            delta,
            self.instruction_count as f64 / (delta * 1.0e6),
            self.clock_cycles as f64 / (delta * 1.0e6)
        );
        info!(
            "prep_time = {:.3} sec; eval_time = {:.3} sec; commit_time = {:.3} sec",
            self.prep_time.as_secs_f64(),
            self.eval_time.as_secs_f64(),
            self.commit_time.as_secs_f64()
        );
    }
    /// Starts executing instructions at the current program counter.  
    /// Does not set or read any registers before attempting to execute.  
    /// Executes until BRK, a fault, or max_steps instructions have run.
    /// A normal exit (BRK or reaching max_steps) results in Ok; anything else results in Err.
    pub fn exec(&mut self, max_steps: u64, on_unknown: OnUnknown) -> Result<(), Error> {
        self.start_time = Instant::now();
        self.instruction_count = 0;
        self.clock_cycles = 0;
        for _ in 0..max_steps {
            let temp_pc = self.reg.pc;
            match self.exec_one() {
                Ok(()) => {}
                Err(e) if e.kind == ErrorKind::Exit => {
                    // this is a normal exit; return Ok
                    self.report_perf();
                    return Ok(());
                }
                Err(e) if e.kind == ErrorKind::UnknownOpcode && on_unknown == OnUnknown::Skip => {
                    warn!("{} (skipped)", e.msg);
                    self.reg.pc = temp_pc.wrapping_add(1);
                }
                Err(e) => {
                    self.fault(temp_pc, &e);
                    return Err(e);
                }
            }
        }
        warn!("Stopped after {} instructions without reaching BRK", max_steps);
        self.report_perf();
        Ok(())
    }
    /// Helper function for exec.  
    /// Wraps calls to step and adds tracing and BRK checks.
    fn exec_one(&mut self) -> Result<(), Error> {
        let outcome = self.step()?;
        if self.trace || self.history_len > 0 {
            self.record(&outcome);
        }
        if outcome.meta == Some(Meta::Brk) {
            info!(
                "Encountered BRK at {:04X}. Program execution terminated.",
                outcome.inst.ctx.pc
            );
            return Err(Error::new(ErrorKind::Exit, None, ""));
        }
        Ok(())
    }
    /// Executes exactly one instruction at PC and commits the result.
    pub fn step(&mut self) -> Result<Outcome, Error> { self.exec_next(true) }
    /// Attempt to execute the next instruction at PC.  
    /// If commit=true then commit any/all changes to the machine state.
    /// Otherwise, the changes are only reflected in the instructions::Outcome object
    /// and the same call can be repeated with identical results.
    pub fn exec_next(&mut self, commit: bool) -> Result<Outcome, Error> {
        let mut start = Instant::now();

        // fetch
        let op = self.mem.read_u8(self.reg.pc);
        let flavor = if let Some(flavor) = instructions::opcode_to_flavor(op) {
            flavor
        } else {
            return Err(runtime_err!(
                ErrorKind::UnknownOpcode,
                Some(self.reg),
                "Unknown opcode: {:02X} found at {:04X}",
                op,
                self.reg.pc
            ));
        };
        // resolve
        let inst = Instance::new(self, flavor);
        let mut o = Outcome::new(inst, self.reg);
        self.prep_time += start.elapsed();
        start = Instant::now();

        // dispatch
        let flow = (flavor.desc.eval)(self, &mut o)?;
        // advance
        o.new_ctx.pc = match flow {
            Flow::Next => o.inst.next_pc,
            Flow::Jump(addr) => addr,
        };
        self.eval_time += start.elapsed();
        start = Instant::now();

        if commit {
            self.reg = o.new_ctx;
            // and complete any writes to the address space
            if let Some(v) = o.writes.as_ref() {
                for w in v {
                    self.mem.write_u8(w.addr, w.val);
                }
            }
        }
        self.commit_time += start.elapsed();

        self.instruction_count += 1;
        self.clock_cycles += flavor.detail.clk as u64;
        Ok(o)
    }
    /// Prints (when tracing) and remembers (when keeping history) the executed instruction.
    fn record(&mut self, outcome: &Outcome) {
        let line = outcome.trace_line();
        if self.trace {
            println!("{}\r", line);
        }
        if self.history_len > 0 {
            let history = self.history.get_or_insert_with(VecDeque::new);
            history.push_back(line);
            if history.len() > self.history_len {
                history.pop_front();
            }
        }
    }
    fn show_history(&self) {
        match self.history.as_ref() {
            Some(history) if !history.is_empty() => {
                println!("Showing executed instruction history (length = {})\r", history.len());
                for line in history {
                    println!("{}\r", line);
                }
            }
            _ => println!("No history available.\r"),
        }
    }
    /// Reports a fault at addr along with what led up to it.
    pub fn fault(&self, addr: u16, e: &Error) {
        warn!("Execution faulted at {:04X}: {}", addr, e.msg);
        if self.history_len > 0 {
            self.show_history();
        }
        self.dump_mem(addr, 8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core_with(program: &[u8], origin: u16) -> Core {
        let mut core = Core::new();
        core.load_image(program, origin).unwrap();
        core.reg.pc = origin;
        core.reg.sp = 0xff;
        core
    }

    #[test]
    fn and_immediate_advances_by_length() -> Result<(), Error> {
        let mut core = core_with(&[0x29, 0x19], 0);
        core.reg.a = 0x19;
        let o = core.step()?;
        assert_eq!(o.mnemonic(), "AND");
        assert_eq!(o.operand(), "#$19");
        assert_eq!(core.reg.a, 0x19);
        assert!(!core.reg.p.n && !core.reg.p.z);
        assert_eq!(core.reg.pc, 2);
        assert_eq!(o.new_ctx, core.reg);
        Ok(())
    }

    #[test]
    fn branch_displacement_is_signed() -> Result<(), Error> {
        // BCC -2 at $0410 lands back on itself
        let mut core = core_with(&[0x90, 0xfe], 0x0410);
        core.step()?;
        assert_eq!(core.reg.pc, 0x0410);

        // not taken: falls through, no double advance
        core.reg.p.c = true;
        core.step()?;
        assert_eq!(core.reg.pc, 0x0412);
        Ok(())
    }

    #[test]
    fn branches_test_one_flag_and_touch_none() -> Result<(), Error> {
        // (opcode, flag setter, taken when set)
        let cases: [(u8, fn(&mut registers::Flags, bool), bool); 8] = [
            (0x90, |p, v| p.c = v, false),
            (0xb0, |p, v| p.c = v, true),
            (0xf0, |p, v| p.z = v, true),
            (0xd0, |p, v| p.z = v, false),
            (0x30, |p, v| p.n = v, true),
            (0x10, |p, v| p.n = v, false),
            (0x50, |p, v| p.v = v, false),
            (0x70, |p, v| p.v = v, true),
        ];
        for (op, setter, taken_when_set) in cases {
            for state in [false, true] {
                let mut core = core_with(&[op, 0x10], 0x0200);
                setter(&mut core.reg.p, state);
                let flags_before = core.reg.p;
                core.step()?;
                let expected = if state == taken_when_set { 0x0212 } else { 0x0202 };
                assert_eq!(core.reg.pc, expected, "opcode {:02X} flag {}", op, state);
                assert_eq!(core.reg.p, flags_before);
            }
        }
        Ok(())
    }

    #[test]
    fn branch_wraps_across_address_zero() -> Result<(), Error> {
        let mut core = core_with(&[0xd0, 0x80], 0x0010);
        core.step()?;
        assert_eq!(core.reg.pc, 0x0012u16.wrapping_sub(0x80));
        Ok(())
    }

    #[test]
    fn clear_flag_leaves_others() -> Result<(), Error> {
        let mut core = core_with(&[0x18, 0xd8, 0x58, 0xb8], 0);
        core.reg.p = registers::Flags {
            n: true,
            v: true,
            b: true,
            d: true,
            i: true,
            z: true,
            c: true,
        };
        core.step()?;
        assert!(!core.reg.p.c && core.reg.p.n && core.reg.p.z && core.reg.p.v);
        core.step()?;
        assert!(!core.reg.p.d && core.reg.p.i);
        core.step()?;
        assert!(!core.reg.p.i && core.reg.p.v);
        core.step()?;
        assert!(!core.reg.p.v && core.reg.p.n && core.reg.p.z && core.reg.p.b);
        Ok(())
    }

    #[test]
    fn unknown_opcode_is_reported() {
        let mut core = core_with(&[0x02], 0x0300);
        let e = core.step().err().unwrap();
        assert_eq!(e.kind, ErrorKind::UnknownOpcode);
        assert_eq!(e.ctx.map(|ctx| ctx.pc), Some(0x0300));
        assert_eq!(core.reg.pc, 0x0300);
    }

    #[test]
    fn peek_is_repeatable_and_commits_nothing() -> Result<(), Error> {
        // ASL $10
        let mut core = core_with(&[0x06, 0x10], 0);
        core.mem.write_u8(0x10, 0xc1);
        let before_reg = core.reg;
        let before_mem = core.mem.clone();
        let first = core.exec_next(false)?;
        let second = core.exec_next(false)?;
        assert_eq!(first.new_ctx, second.new_ctx);
        assert_eq!(first.writes, second.writes);
        assert_eq!(first.trace_line(), second.trace_line());
        assert_eq!(core.reg, before_reg);
        assert!(core.mem == before_mem);
        Ok(())
    }

    #[test]
    fn shift_writes_back_to_its_operand() -> Result<(), Error> {
        // ASL $10 ; ASL A ; LSR $0300,X ; ROL A ; ROR $11
        let mut core = core_with(&[0x06, 0x10, 0x0a, 0x5e, 0x00, 0x03, 0x2a, 0x66, 0x11], 0x0400);
        core.mem.write_u8(0x10, 0x81);
        core.mem.write_u8(0x11, 0x01);
        core.mem.write_u8(0x0305, 0x03);
        core.reg.a = 0x40;
        core.reg.x = 0x05;
        core.step()?;
        assert_eq!(core.mem.read_u8(0x10), 0x02);
        assert_eq!(core.reg.a, 0x40);
        assert!(core.reg.p.c);
        core.step()?;
        assert_eq!(core.reg.a, 0x80);
        assert!(!core.reg.p.c && core.reg.p.n);
        core.step()?;
        assert_eq!(core.mem.read_u8(0x0305), 0x01);
        assert!(core.reg.p.c);
        core.step()?;
        assert_eq!(core.reg.a, 0x01);
        assert!(core.reg.p.c);
        core.step()?;
        assert_eq!(core.mem.read_u8(0x11), 0x80);
        assert!(core.reg.p.c && core.reg.p.n);
        Ok(())
    }

    #[test]
    fn loads_stores_and_transfers() -> Result<(), Error> {
        // LDX #$00 ; LDA #$80 ; STA $0200,X ; TAY ; INY ; STY $20 ; TXS ; TSX
        let program = [0xa2, 0x00, 0xa9, 0x80, 0x9d, 0x00, 0x02, 0xa8, 0xc8, 0x84, 0x20, 0x9a, 0xba];
        let mut core = core_with(&program, 0x0600);
        core.step()?;
        assert!(core.reg.p.z);
        core.step()?;
        assert!(core.reg.p.n && !core.reg.p.z);
        let o = core.step()?;
        assert_eq!(o.writes.as_deref(), Some(&[instructions::WriteRecord { addr: 0x0200, val: 0x80 }][..]));
        assert_eq!(core.mem.read_u8(0x0200), 0x80);
        core.step()?;
        assert_eq!(core.reg.y, 0x80);
        core.step()?;
        assert_eq!(core.reg.y, 0x81);
        core.step()?;
        assert_eq!(core.mem.read_u8(0x20), 0x81);
        core.reg.p.n = true;
        core.step()?;
        // TXS leaves the flags alone
        assert_eq!(core.reg.sp, 0x00);
        assert!(core.reg.p.n && !core.reg.p.z);
        core.step()?;
        assert_eq!(core.reg.x, 0x00);
        assert!(core.reg.p.z && !core.reg.p.n);
        Ok(())
    }

    #[test]
    fn compare_leaves_register() -> Result<(), Error> {
        // CMP #$10 ; CPX $40 ; CPY #$90
        let mut core = core_with(&[0xc9, 0x10, 0xe4, 0x40, 0xc0, 0x90], 0);
        core.reg.a = 0x10;
        core.reg.x = 0x05;
        core.reg.y = 0x80;
        core.mem.write_u8(0x40, 0x06);
        core.step()?;
        assert!(core.reg.p.z && core.reg.p.c);
        assert_eq!(core.reg.a, 0x10);
        core.step()?;
        assert!(!core.reg.p.c && core.reg.p.n && !core.reg.p.z);
        assert_eq!(core.reg.x, 0x05);
        core.step()?;
        assert!(!core.reg.p.c && core.reg.p.n);
        Ok(())
    }

    #[test]
    fn subroutine_round_trip() -> Result<(), Error> {
        // $0600: JSR $0610 ; NOP    $0610: RTS
        let mut core = core_with(&[0x20, 0x10, 0x06, 0xea], 0x0600);
        core.mem.write_u8(0x0610, 0x60);
        core.step()?;
        assert_eq!(core.reg.pc, 0x0610);
        assert_eq!(core.reg.sp, 0xfd);
        assert_eq!(core.mem.read_u8(0x01ff), 0x06);
        assert_eq!(core.mem.read_u8(0x01fe), 0x02);
        core.step()?;
        assert_eq!(core.reg.pc, 0x0603);
        assert_eq!(core.reg.sp, 0xff);
        Ok(())
    }

    #[test]
    fn stack_push_pull() -> Result<(), Error> {
        // PHA ; PHP ; LDA #$00 ; PLP ; PLA
        let mut core = core_with(&[0x48, 0x08, 0xa9, 0x00, 0x28, 0x68], 0);
        core.reg.a = 0x9c;
        core.reg.p.c = true;
        core.reg.p.n = true;
        core.step()?;
        core.step()?;
        assert_eq!(core.mem.read_u8(0x01ff), 0x9c);
        assert_eq!(core.mem.read_u8(0x01fe), 0xb1);
        assert_eq!(core.reg.sp, 0xfd);
        core.step()?;
        assert!(core.reg.p.z && !core.reg.p.n);
        core.step()?;
        assert!(core.reg.p.c && core.reg.p.n && !core.reg.p.z && !core.reg.p.b);
        core.step()?;
        assert_eq!(core.reg.a, 0x9c);
        assert_eq!(core.reg.sp, 0xff);
        Ok(())
    }

    #[test]
    fn stack_pointer_wraps() -> Result<(), Error> {
        let mut core = core_with(&[0x48, 0x68], 0);
        core.reg.sp = 0x00;
        core.reg.a = 0x11;
        core.step()?;
        assert_eq!(core.mem.read_u8(0x0100), 0x11);
        assert_eq!(core.reg.sp, 0xff);
        core.step()?;
        assert_eq!(core.reg.sp, 0x00);
        Ok(())
    }

    #[test]
    fn rti_restores_status_and_pc() -> Result<(), Error> {
        let mut core = core_with(&[0x40], 0);
        core.reg.sp = 0xfc;
        core.mem.load(&[0xc3, 0x34, 0x12], 0x01fd)?;
        core.step()?;
        assert_eq!(core.reg.pc, 0x1234);
        assert_eq!(core.reg.sp, 0xff);
        assert!(core.reg.p.n && core.reg.p.v && core.reg.p.z && core.reg.p.c && !core.reg.p.d);
        Ok(())
    }

    #[test]
    fn jmp_indirect_page_quirk() -> Result<(), Error> {
        let mut core = core_with(&[0x6c, 0xff, 0x30], 0);
        core.mem.write_u8(0x30ff, 0x80);
        core.mem.write_u8(0x3000, 0x50);
        core.mem.write_u8(0x3100, 0x40);
        let o = core.step()?;
        assert_eq!(core.reg.pc, 0x5080);
        assert_eq!(o.operand(), "($30FF)");
        Ok(())
    }

    #[test]
    fn adc_and_sbc_through_memory() -> Result<(), Error> {
        // CLC ; ADC $0200 ; SEC ; SBC ($10),Y
        let mut core = core_with(&[0x18, 0x6d, 0x00, 0x02, 0x38, 0xf1, 0x10], 0);
        core.mem.write_u8(0x0200, 0x01);
        core.mem.write_u8(0x10, 0x00);
        core.mem.write_u8(0x11, 0x03);
        core.mem.write_u8(0x0302, 0x01);
        core.reg.a = 0x7f;
        core.reg.y = 0x02;
        core.step()?;
        core.step()?;
        assert_eq!(core.reg.a, 0x80);
        assert!(core.reg.p.v && core.reg.p.n && !core.reg.p.c && !core.reg.p.z);
        core.step()?;
        core.step()?;
        assert_eq!(core.reg.a, 0x7f);
        assert!(core.reg.p.v && core.reg.p.c && !core.reg.p.n);
        Ok(())
    }

    #[test]
    fn inc_dec_memory_and_registers() -> Result<(), Error> {
        // INC $80 ; DEC $81 ; DEX ; INY
        let mut core = core_with(&[0xe6, 0x80, 0xc6, 0x81, 0xca, 0xc8], 0);
        core.mem.write_u8(0x80, 0xff);
        core.mem.write_u8(0x81, 0x00);
        core.reg.y = 0x7f;
        core.reg.p.c = true;
        core.step()?;
        assert_eq!(core.mem.read_u8(0x80), 0x00);
        assert!(core.reg.p.z && core.reg.p.c);
        core.step()?;
        assert_eq!(core.mem.read_u8(0x81), 0xff);
        assert!(core.reg.p.n);
        core.step()?;
        assert_eq!(core.reg.x, 0xff);
        core.step()?;
        assert_eq!(core.reg.y, 0x80);
        assert!(core.reg.p.n && core.reg.p.c);
        Ok(())
    }

    #[test]
    fn brk_stops_the_run_loop() -> Result<(), Error> {
        // LDA #$05 ; BRK ; LDA #$06
        let mut core = core_with(&[0xa9, 0x05, 0x00, 0xa9, 0x06], 0);
        core.exec(100, OnUnknown::Halt)?;
        assert_eq!(core.reg.a, 0x05);
        assert!(core.reg.p.b && core.reg.p.i);
        assert_eq!(core.instruction_count, 2);
        assert_eq!(core.clock_cycles, 9);
        Ok(())
    }

    #[test]
    fn run_loop_unknown_opcode_policy() -> Result<(), Error> {
        // NOP ; ??? ; LDA #$01 ; BRK
        let program = [0xea, 0xff, 0xa9, 0x01, 0x00];
        let mut core = core_with(&program, 0);
        core.history_len = 4;
        let e = core.exec(100, OnUnknown::Halt).err().unwrap();
        assert_eq!(e.kind, ErrorKind::UnknownOpcode);
        assert_eq!(core.reg.pc, 1);
        assert_eq!(core.history.as_ref().map(|h| h.len()), Some(1));

        let mut core = core_with(&program, 0);
        core.exec(100, OnUnknown::Skip)?;
        assert_eq!(core.reg.a, 0x01);
        Ok(())
    }

    #[test]
    fn run_loop_respects_max_steps() -> Result<(), Error> {
        // JMP $0000
        let mut core = core_with(&[0x4c, 0x00, 0x00], 0);
        core.exec(10, OnUnknown::Halt)?;
        assert_eq!(core.instruction_count, 10);
        assert_eq!(core.reg.pc, 0);
        Ok(())
    }
}
