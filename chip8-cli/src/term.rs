//! Terminal frontend: renders the display and collects keyboard input.
use std::{
    io::{self, Stdout, Write},
    time::Duration,
};

use chip8::{constants::*, Display};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode as TermKey, KeyEvent, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

/// Each Chip8 pixel is drawn two cells wide, so it looks square.
const PIXEL_ON: &str = "\u{2588}\u{2588}";
const PIXEL_OFF: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Key(char),
    Quit,
}

/// Raw mode terminal on the alternate screen.
///
/// The terminal is restored when this is dropped.
pub struct Terminal {
    stdout: Stdout,
}

impl Terminal {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

        Ok(Self { stdout })
    }

    /// Paint the whole display, with a status line underneath.
    pub fn draw(&mut self, display: &Display, status: &str) -> io::Result<()> {
        let mut line = String::with_capacity(DISPLAY_WIDTH * PIXEL_ON.len());

        for y in 0..DISPLAY_HEIGHT {
            line.clear();
            for x in 0..DISPLAY_WIDTH {
                line.push_str(if display.pixel(x, y) { PIXEL_ON } else { PIXEL_OFF });
            }
            queue!(self.stdout, MoveTo(0, y as u16), Print(&line))?;
        }

        queue!(
            self.stdout,
            MoveTo(0, DISPLAY_HEIGHT as u16),
            Clear(ClearType::CurrentLine),
            Print(status)
        )?;

        self.stdout.flush()
    }

    /// Ring the terminal bell.
    pub fn beep(&mut self) -> io::Result<()> {
        queue!(self.stdout, Print('\u{7}'))?;
        self.stdout.flush()
    }

    /// Drain pending input without blocking.
    pub fn poll_events(&mut self) -> io::Result<Vec<HostEvent>> {
        let mut events = vec![];

        while poll(Duration::ZERO)? {
            if let Event::Key(KeyEvent {
                code, modifiers, ..
            }) = read()?
            {
                match code {
                    TermKey::Esc => events.push(HostEvent::Quit),
                    TermKey::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        events.push(HostEvent::Quit)
                    }
                    TermKey::Char(c) => events.push(HostEvent::Key(c)),
                    _ => {}
                }
            }
        }

        Ok(events)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Err(err) = execute!(self.stdout, Show, LeaveAlternateScreen) {
            log::error!("failed to restore terminal: {err}");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            log::error!("failed to disable raw mode: {err}");
        }
    }
}
