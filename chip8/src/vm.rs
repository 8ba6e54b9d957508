//! Virtual machine.
use std::{fmt::Write, time::Duration};

use log::{debug, info};
use rand::prelude::*;

use crate::{
    clock::Clock,
    constants::*,
    cpu::Chip8Cpu,
    display::{Chip8DisplayBuffer, Display},
    error::{Chip8Error, Chip8Result},
    font::{glyph_address, FONTSET},
    keypad::KeyCode,
    memory::check_program_size,
    opcode::{Instr, Opcode},
    stack::StackError,
};

pub struct Chip8Vm {
    cpu: Chip8Cpu,
    clock: Clock,
    timer: Clock,
    rng: StdRng,
    conf: Chip8Conf,
}

impl Chip8Vm {
    pub fn new(conf: Chip8Conf) -> Self {
        let rng = match conf.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Chip8Vm {
            cpu: Chip8Cpu::new(),
            clock: Clock::new(conf.frequency().into()),
            timer: Clock::timer(),
            rng,
            conf,
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &Chip8Conf {
        &self.conf
    }

    /// Replace the glyphs at `FONTSET_START` with a custom font.
    pub fn load_font(&mut self, fontset: &[u8]) -> Chip8Result<()> {
        let fontset: &[u8; FONTSET_DATA_LENGTH] = fontset.try_into().map_err(|_| {
            Chip8Error::Font(format!(
                "fontset data must be {FONTSET_DATA_LENGTH} bytes, got {}",
                fontset.len()
            ))
        })?;

        self.cpu.install_font(fontset);

        Ok(())
    }

    /// Install a program image and put the machine in its power-on state.
    ///
    /// The image is rejected before anything is touched if it does not fit.
    pub fn load_rom(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if !check_program_size(bytecode) {
            return Err(Chip8Error::RomTooLarge {
                size: bytecode.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        // Start with clean memory to avoid leaking previous program.
        self.cpu.clear_memory();

        // Reset fonts
        self.cpu.install_font(&FONTSET);

        // Load program into virtual RAM
        self.cpu.ram.load_program(bytecode)?;

        self.reset();

        info!("loaded {} byte program", bytecode.len());

        Ok(())
    }

    /// Restart the loaded program from `MEM_START`.
    ///
    /// Registers, stack, display and keys are cleared. Memory is kept,
    /// including anything the program wrote to it.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.clock.reset();
        self.timer.reset();
    }

    pub fn cpu(&self) -> &Chip8Cpu {
        &self.cpu
    }

    pub fn display(&self) -> &Display {
        &self.cpu.display
    }

    pub fn display_buffer(&self) -> Chip8DisplayBuffer {
        self.cpu.display.buffer()
    }

    pub fn sound_timer(&self) -> u8 {
        self.cpu.sound_timer()
    }

    pub fn is_sound_active(&self) -> bool {
        self.cpu.is_sound_active()
    }
}

/// Outcome of a single interpreter cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    ///
    /// This is useful for the caller to avoid being
    /// blocked on infinite or long running loops.
    ///
    /// This is returned when the interpreter encounters:
    ///
    /// - 1nnn (`JP addr`)
    /// - 2nnn (`CALL addr`)
    /// - 00EE (`RET`)
    /// - Bnnn (`JP V0, addr`)
    Jump,
    /// Display buffer changed, by either `CLS` or `DRW`.
    Draw,
    /// Sound timer was loaded.
    Sound,
    /// Wait for a keypress.
    ///
    /// This is triggered by the opcode `Fx0A` (`LD Vx, K`), which stops
    /// execution until a key is pressed, and loads the key value into `Vx`.
    KeyWait,
}

/// VM Configuration Parameters.
#[derive(Debug, Default, Clone)]
pub struct Chip8Conf {
    /// Instructions executed per second. Defaults to `DEFAULT_CLOCK_FREQUENCY`.
    pub clock_frequency: Option<Hz>,
    /// Seed for the `RND` instruction. Seeded from the OS when not set.
    pub seed: Option<u64>,
}

impl Chip8Conf {
    pub fn frequency(&self) -> Hz {
        self.clock_frequency
            .unwrap_or(Hz(DEFAULT_CLOCK_FREQUENCY))
    }

    /// Number of instructions that fit in one 60 Hz timer period.
    ///
    /// An unthrottled clock (0 Hz) runs at the default rate when driven by frames.
    pub fn cycles_per_frame(&self) -> usize {
        let hz = match self.frequency() {
            Hz(0) => DEFAULT_CLOCK_FREQUENCY,
            Hz(hz) => hz,
        };
        let cycles = (hz.saturating_add(DELAY_FREQUENCY / 2) / DELAY_FREQUENCY).max(1);
        usize::try_from(cycles).unwrap_or(usize::MAX)
    }
}

/// CPU clock frequency, in hertz (per second)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Hz(pub u64);

impl From<Hz> for Duration {
    fn from(freq: Hz) -> Self {
        if freq.0 == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(NANOS_IN_SECOND / freq.0)
        }
    }
}

/// Interpreter
impl Chip8Vm {
    /// Sets the keyboard key input state.
    ///
    /// If the VM is waiting for keyboard input, the `key_wait` flag will
    /// be cleared so it can be resumed.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        self.cpu.keypad.set(key.as_u8(), pressed);
        self.cpu.key_wait = false;
    }

    /// Clear the keyboard input state, setting all keys to up.
    pub fn clear_keys(&mut self) {
        self.cpu.keypad.clear()
    }

    /// Count down the delay and sound timers by one 60 Hz period.
    pub fn tick_timers(&mut self) {
        self.cpu.regs.tick_timers();
    }

    /// Wall clock driven cycle.
    ///
    /// Timers are counted down whenever a 60 Hz period has elapsed since the
    /// last count, then one instruction is executed. With the `throttle` feature
    /// the call blocks until the next CPU clock cycle.
    pub fn tick(&mut self) -> Chip8Result<Flow> {
        #[cfg(feature = "throttle")]
        self.clock.wait();

        if self.timer.tick() {
            self.tick_timers();
        }

        self.step()
    }

    /// Execute one frame: `cycles_per_frame` instructions followed by a
    /// single timer count down.
    ///
    /// Returns whether the display changed during the frame. A key wait ends
    /// the frame early, since the remaining cycles would not make progress.
    pub fn run_frame(&mut self) -> Chip8Result<bool> {
        let mut redraw = false;

        for _ in 0..self.conf.cycles_per_frame() {
            match self.step()? {
                Flow::Draw => redraw = true,
                Flow::KeyWait => break,
                _ => {}
            }
        }

        self.tick_timers();

        Ok(redraw)
    }

    /// Execute up to `step_count` instructions, stopping early on a key wait.
    pub fn run_steps(&mut self, step_count: usize) -> Chip8Result<Flow> {
        let mut control_flow = Flow::Ok;

        for _ in 0..step_count {
            control_flow = self.step()?;
            if control_flow == Flow::KeyWait {
                break;
            }
        }

        Ok(control_flow)
    }

    /// Fetch, decode and execute a single instruction.
    ///
    /// On error the program counter is left pointing at the faulting instruction.
    pub fn step(&mut self) -> Chip8Result<Flow> {
        let pc = self.cpu.regs.pc;

        // Each instruction is two bytes, with the opcode identity in the first 4-bit nibble.
        let opcode = self.cpu.instr();
        let instr = Instr::decode(opcode).ok_or(Chip8Error::UnknownOpcode {
            opcode: opcode.0,
            pc,
        })?;

        op_trace(pc, opcode, instr);

        // Advance before executing, so jumps land exactly where they point.
        self.cpu.regs.skip();

        self.exec(pc, instr).map_err(|err| {
            debug!("fault at {pc:04X}: {err}");
            self.cpu.regs.pc = pc;
            err
        })
    }

    fn exec(&mut self, pc: Address, instr: Instr) -> Chip8Result<Flow> {
        use Instr::*;

        let cpu = &mut self.cpu;
        let mut control_flow = Flow::Ok;

        match instr {
            // 00E0 (CLS)
            //
            // Clear display
            Cls => {
                cpu.display.clear();
                control_flow = Flow::Draw;
            }
            // 00EE (RET)
            //
            // Return from a subroutine.
            // Set the program counter to the value at the top of the stack.
            Ret => {
                let addr = cpu
                    .stack
                    .pop()
                    .map_err(|err| stack_error(err, pc))?;
                cpu.regs.jump(addr as usize);
                control_flow = Flow::Jump;
            }
            // 1NNN (JP addr)
            //
            // Jump to address.
            Jump(nnn) => {
                cpu.regs.jump(nnn as usize);
                control_flow = Flow::Jump;
            }
            // 2NNN (CALL addr)
            //
            // Call subroutine at NNN. The return address is the instruction after the call.
            Call(nnn) => {
                cpu.stack
                    .push(cpu.regs.pc)
                    .map_err(|err| stack_error(err, pc))?;
                cpu.regs.jump(nnn as usize);
                control_flow = Flow::Jump;
            }
            // 3XNN (SE Vx, byte)
            //
            // Skip the next instruction if register VX equals value NN.
            SkipEqByte(x, nn) => {
                if cpu.regs.get(x) == nn {
                    cpu.regs.skip();
                }
            }
            // 4XNN (SNE Vx, byte)
            //
            // Skip the next instruction if register VX does not equal value NN.
            SkipNeByte(x, nn) => {
                if cpu.regs.get(x) != nn {
                    cpu.regs.skip();
                }
            }
            // 5XY0 (SE Vx, Vy)
            //
            // Skip the next instruction if register VX equals value VY.
            SkipEqReg(x, y) => {
                if cpu.regs.get(x) == cpu.regs.get(y) {
                    cpu.regs.skip();
                }
            }
            // 6XNN (LD Vx, byte)
            //
            // Set register VX to value NN.
            LoadByte(x, nn) => cpu.regs.set(x, nn),
            // 7xnn (ADD Vx, byte)
            //
            // Add value NN to register VX. Carry flag is not set.
            AddByte(x, nn) => cpu.regs.set(x, cpu.regs.get(x).wrapping_add(nn)),
            // Arithmetic instructions, 8XYN
            Load(..) | Or(..) | And(..) | Xor(..) | Add(..) | Sub(..) | Shr(..) | SubN(..)
            | Shl(..) => self.exec_math(instr),
            // 9xy0 (SNE Vx, Vy)
            //
            // Skip next instruction if Vx != Vy.
            SkipNeReg(x, y) => {
                if cpu.regs.get(x) != cpu.regs.get(y) {
                    cpu.regs.skip();
                }
            }
            // Annn (LD I, addr)
            //
            // Set address register I to value NNN.
            LoadIndex(nnn) => cpu.regs.set_index(nnn as usize),
            // Bnnn (JP V0, addr)
            //
            // Jump to address NNN offset by V0.
            JumpOffset(nnn) => {
                cpu.regs.jump(nnn as usize + cpu.regs.get(0) as usize);
                control_flow = Flow::Jump;
            }
            // CXNN (RND Vx, byte)
            //
            // Generate random number.
            // Set register VX to the result of bitwise AND between a random number and NN.
            Random(x, nn) => cpu.regs.set(x, nn & self.rng.gen::<u8>()),
            // Dxyn (DRW Vx, Vy, nibble)
            //
            // Draw sprite to the display buffer, at coordinate as per registers Vx and Vy.
            // Sprite is encoded as 8 pixels wide, N pixels high, stored in bits located in
            // memory pointed to by address register I.
            //
            // If the sprite is drawn outside of the display area, it is wrapped around to the other side.
            //
            // If the drawing operation erases existing pixels in the display buffer, register VF is set to
            // 1, and set to 0 if no display bits are unset. This is used for collision detection.
            Draw(x, y, n) => {
                let (vx, vy) = (cpu.regs.get(x) as usize, cpu.regs.get(y) as usize);
                let addr = cpu.regs.index as usize;

                let mut sprite = [0; 0xF];
                let sprite = &mut sprite[..n as usize];
                for (r, row) in sprite.iter_mut().enumerate() {
                    *row = cpu.ram.read(addr + r);
                }

                let is_erased = cpu.display.draw_sprite(vx, vy, sprite);

                // If a pixel was erased, then a collision occurred.
                cpu.regs.set_flag(is_erased);
                control_flow = Flow::Draw;
            }
            // Ex9E (SKP Vx)
            //
            // Skip next instruction if the key with the value of Vx is pressed.
            SkipKeyDown(x) => {
                if cpu.keypad.is_down(cpu.regs.get(x)) {
                    cpu.regs.skip();
                }
            }
            // ExA1 (SKNP Vx)
            //
            // Skip next instruction if the key with the value of Vx is not pressed.
            SkipKeyUp(x) => {
                if !cpu.keypad.is_down(cpu.regs.get(x)) {
                    cpu.regs.skip();
                }
            }
            // Fx07 (LD Vx, DT)
            //
            // Set Vx = delay timer value.
            LoadDelay(x) => cpu.regs.set(x, cpu.regs.delay_timer),
            // Fx0A (LD Vx, K)
            //
            // Wait for a key press, store the value of the key in Vx.
            // All execution stops until a key is pressed, then the value of that key is stored in Vx.
            WaitKey(x) => {
                if let Some(k) = cpu.keypad.any_pressed() {
                    cpu.regs.set(x, k);
                    cpu.key_wait = false;
                } else {
                    // rewind the program counter to stall the machine
                    cpu.regs.jump(pc as usize);
                    cpu.key_wait = true;
                    control_flow = Flow::KeyWait;
                }
            }
            // Fx15 (LD DT, Vx)
            //
            // Set delay timer = Vx.
            SetDelay(x) => cpu.regs.delay_timer = cpu.regs.get(x),
            // Fx18 (LD ST, Vx)
            //
            // Set sound timer = Vx.
            SetSound(x) => {
                cpu.regs.sound_timer = cpu.regs.get(x);
                control_flow = Flow::Sound;
            }
            // Fx1E (ADD I, Vx)
            //
            // Add Vx to I, wrapping within the address space. VF is not affected.
            AddIndex(x) => {
                let addr = cpu.regs.index as usize + cpu.regs.get(x) as usize;
                cpu.regs.set_index(addr);
            }
            // Fx29 (LD F, Vx)
            //
            // Set I = location of sprite for digit Vx.
            LoadGlyph(x) => cpu.regs.set_index(glyph_address(cpu.regs.get(x))),
            // Fx33 (LD B, Vx)
            //
            // Store the binary-coded decimal representation of Vx
            // in the memory locations I, I+1, and I+2.
            #[rustfmt::skip]
            StoreBcd(x) => {
                let addr = cpu.regs.index as usize;
                let x = cpu.regs.get(x);
                cpu.ram.write(addr,     x / 100 % 10);
                cpu.ram.write(addr + 1, x / 10  % 10);
                cpu.ram.write(addr + 2, x       % 10);
            }
            // Fx55 (LD [I], Vx)
            //
            // Store registers V0 through Vx in memory starting at location I.
            // I is left unchanged.
            StoreRegs(x) => {
                let addr = cpu.regs.index as usize;
                for v in 0..=x {
                    cpu.ram.write(addr + v as usize, cpu.regs.get(v));
                }
            }
            // Fx65 (LD Vx, [I])
            //
            // Read registers V0 through Vx from memory starting at location I.
            // I is left unchanged.
            LoadRegs(x) => {
                let addr = cpu.regs.index as usize;
                for v in 0..=x {
                    cpu.regs.set(v, cpu.ram.read(addr + v as usize));
                }
            }
        }

        Ok(control_flow)
    }

    /// Execute an arithmetic instruction
    ///
    /// Instructions that set VF write the flag last, so the flag wins
    /// when VF is also the destination.
    #[inline]
    fn exec_math(&mut self, instr: Instr) {
        use Instr::*;

        let regs = &mut self.cpu.regs;

        match instr {
            // 8XY0 (LD Vx, Vy)
            //
            // Store the value of register VY in register VX.
            Load(x, y) => regs.set(x, regs.get(y)),
            // 8XY1 (OR Vx, Vy)
            //
            // Performs bitwise OR on VX and VY, and stores the result in VX.
            Or(x, y) => regs.set(x, regs.get(x) | regs.get(y)),
            // 8XY2 (AND Vx, Vy)
            //
            // Performs bitwise AND on VX and VY, and stores the result in VX.
            And(x, y) => regs.set(x, regs.get(x) & regs.get(y)),
            // 8XY3 (XOR Vx, Vy)
            //
            // Performs bitwise XOR on VX and VY, and stores the result in VX.
            Xor(x, y) => regs.set(x, regs.get(x) ^ regs.get(y)),
            // 8XY4 (ADD Vx, Vy)
            //
            // ADDs VX to VY, and stores the result in VX.
            // Overflow is wrapped.
            // If overflow, set VF to 1, else 0.
            Add(x, y) => {
                let (result, carry) = regs.get(x).overflowing_add(regs.get(y));
                regs.set(x, result);
                regs.set_flag(carry);
            }
            // 8XY5 (SUB Vx, Vy)
            //
            // Subtracts VY from VX, and stores the result in VX.
            // VF is set to 0 when there is a borrow, set to 1 when there isn't.
            Sub(x, y) => {
                let (result, borrow) = regs.get(x).overflowing_sub(regs.get(y));
                regs.set(x, result);
                regs.set_flag(!borrow);
            }
            // 8XY6 (SHR Vx)
            //
            // If the least-significant bit of Vx is 1, then VF is set to 1, otherwise 0.
            // Shift VX right by 1.
            // VY is unused.
            Shr(x, _) => {
                let vx = regs.get(x);
                regs.set(x, vx >> 1);
                regs.set_flag(vx & 1 == 1);
            }
            // 8XY7 (SUBN Vx, Vy)
            //
            // Subtracts VX from VY, and stores the result in VX.
            // VF is set to 0 when there is a borrow, set to 1 when there isn't.
            SubN(x, y) => {
                let (result, borrow) = regs.get(y).overflowing_sub(regs.get(x));
                regs.set(x, result);
                regs.set_flag(!borrow);
            }
            // 8XYE (SHL Vx)
            //
            // If the most-significant bit of Vx is 1, then VF is set to 1, otherwise 0.
            // Shift VX left by 1.
            // VY is unused.
            Shl(x, _) => {
                let vx = regs.get(x);
                regs.set(x, vx << 1);
                regs.set_flag(vx >> 7 == 1);
            }
            _ => unreachable!("not an arithmetic instruction: {instr}"),
        }
    }
}

fn stack_error(err: StackError, pc: Address) -> Chip8Error {
    match err {
        StackError::Overflow => Chip8Error::StackOverflow { pc },
        StackError::Underflow => Chip8Error::StackUnderflow { pc },
    }
}

/// Troubleshooting
impl Chip8Vm {
    /// Returns the program memory as a human readable listing of words.
    pub fn dump_ram(&self, count: usize) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();

        for addr in (MEM_START..(MEM_START + count).min(MEM_SIZE)).step_by(2) {
            writeln!(buf, "{:04X}: {:04X}", addr, self.cpu.ram.read_word(addr))?;
        }

        Ok(buf)
    }

    pub fn dump_display(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();
        write!(buf, "{}", self.cpu.display)?;
        Ok(buf)
    }

    pub fn dump_keys(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();

        if self.cpu.keypad.any_key() {
            write!(buf, "keys: ")?;
            for key in self.cpu.keypad.pressed() {
                write!(buf, "{key}")?;
            }
        }

        Ok(buf)
    }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(pc: Address, opcode: Opcode, instr: Instr) {
    log::trace!("{pc:04X}: {opcode}  {instr}");
}

#[cfg(not(feature = "op_trace"))]
#[inline]
fn op_trace(_: Address, _: Opcode, _: Instr) {}
