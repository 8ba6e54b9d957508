use std::fs;

use chip8::{prelude::*, Clock};
use log::{debug, info, warn};

use crate::{
    error::AppError,
    inputmap::InputMap,
    term::{HostEvent, Terminal},
};

/// Command line options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub filepath: String,
    pub clock_frequency: Option<Hz>,
    /// Stop after this many frames.
    pub frames: Option<u64>,
    /// Run without the terminal frontend, printing the final display.
    pub headless: bool,
}

/// Chip8 Application
pub struct Chip8App {
    vm: Chip8Vm,
    input_map: InputMap,
    opts: Options,
    /// Switch tracking whether the buzzer is on or off.
    buzzer_state: bool,
}

impl Chip8App {
    pub fn new(opts: Options) -> Self {
        let vm = Chip8Vm::new(Chip8Conf {
            clock_frequency: opts.clock_frequency,
            ..Default::default()
        });

        Self {
            vm,
            input_map: InputMap::new(),
            opts,
            buzzer_state: false,
        }
    }

    /// Load ROM file into VM
    pub fn load_rom(&mut self) -> Result<(), AppError> {
        let filepath = self.opts.filepath.as_str();
        info!("load rom: {filepath}");

        let buf = fs::read(filepath)?;
        self.vm.load_rom(&buf)?;

        if log::max_level() >= log::Level::Debug {
            debug!("program listing:\n{}", self.vm.dump_ram(buf.len())?);
        }

        Ok(())
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        info!(
            "running at {} instructions per frame",
            self.vm.config().cycles_per_frame()
        );

        if self.opts.headless {
            self.run_headless()
        } else {
            self.run_terminal()
        }
    }

    fn is_done(&self, frame: u64) -> bool {
        self.opts.frames.map_or(false, |limit| frame >= limit)
    }

    /// Run frames as fast as possible, then print the display as text.
    fn run_headless(&mut self) -> Result<(), AppError> {
        let mut frame = 0;

        while !self.is_done(frame) {
            self.vm.run_frame()?;
            frame += 1;
        }

        print!("{}", self.vm.dump_display()?);

        Ok(())
    }

    /// Event Loop.
    fn run_terminal(&mut self) -> Result<(), AppError> {
        let mut term = Terminal::new()?;
        let mut frame_clock = Clock::timer();
        let mut frame = 0;
        let mut redraw = true;

        while !self.is_done(frame) {
            // Frame start
            for event in term.poll_events()? {
                match event {
                    HostEvent::Quit => {
                        info!("exit");
                        return Ok(());
                    }
                    HostEvent::Key(c) => {
                        if self.input_map.press(c).is_none() {
                            debug!("unmapped key {c:?}");
                        }
                    }
                }
            }

            // Merge input stream into VM
            for (keycode, pressed) in self.input_map.iter_chip8() {
                self.vm.set_key(keycode, pressed);
            }

            redraw |= self.vm.run_frame()?;

            // Buzzer should be on while sound timer counts down,
            // then turned off when the timer reaches zero.
            let sound = self.vm.is_sound_active();
            if sound && !self.buzzer_state {
                term.beep()?;
            }
            self.buzzer_state = sound;

            if redraw {
                let status = self.status_line();
                term.draw(self.vm.display(), &status)?;
                redraw = false;
            }

            self.input_map.end_frame();
            frame_clock.wait();
            frame += 1;
        }

        Ok(())
    }

    fn status_line(&self) -> String {
        let cpu = self.vm.cpu();
        let mut status = format!(
            "PC {:04X}  I {:03X}  DT {:02X}  ST {:02X}",
            cpu.pc(),
            cpu.index(),
            cpu.delay_timer(),
            cpu.sound_timer()
        );

        match self.vm.dump_keys() {
            Ok(keys) if !keys.is_empty() => {
                status.push_str("  ");
                status.push_str(&keys);
            }
            Ok(_) => {}
            Err(err) => warn!("{err}"),
        }

        if cpu.is_key_wait() {
            status.push_str("  waiting for key");
        }

        status.push_str("  [esc] quit");
        status
    }
}
