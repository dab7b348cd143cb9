//! Terminal setup, teardown and painting.

use std::io::{self, Stdout, Write};
use std::panic;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};

use unicode_width::UnicodeWidthStr;

use crate::render::Frame;
use crate::render::fit;

/// Owns the terminal while the app runs and restores it on drop or panic.
pub struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    pub fn new() -> io::Result<Self> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            original_hook(panic_info);
        }));

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;

        Ok(Self { stdout })
    }

    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Paints a full frame.
    pub fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        let (width, height) = terminal::size()?;
        queue!(self.stdout, Hide)?;

        for (y, line) in frame.lines.iter().enumerate().take(usize::from(height)) {
            queue!(self.stdout, MoveTo(0, y as u16))?;
            let mut used = 0usize;
            for span in &line.spans {
                let remaining = usize::from(width).saturating_sub(used);
                if remaining == 0 {
                    break;
                }
                let text = fit(&span.text, remaining.min(span.text.width()));
                used += text.width();
                let weight = if span.bold {
                    Attribute::Bold
                } else {
                    Attribute::NormalIntensity
                };
                queue!(
                    self.stdout,
                    SetForegroundColor(span.fg),
                    SetBackgroundColor(span.bg),
                    SetAttribute(weight),
                    Print(text)
                )?;
            }
            queue!(
                self.stdout,
                SetAttribute(Attribute::Reset),
                SetBackgroundColor(line.fill),
                Clear(ClearType::UntilNewLine)
            )?;
        }

        if let Some((x, y)) = frame.cursor {
            queue!(self.stdout, MoveTo(x, y), Show)?;
        }

        self.stdout.flush()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show)?;
    Ok(())
}
