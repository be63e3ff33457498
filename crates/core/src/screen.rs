//! Terminal rendering context.
//!
//! Rendering goes through an explicitly passed [`Screen`] capability so
//! the visualizer can be exercised against an in-memory double instead of
//! a real terminal. [`TerminalScreen`] is the crossterm-backed
//! implementation used by the player binary.

use std::io::{stdout, Stdout, Write};

use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute, queue};

use crate::error::Result;

/// Cell styling understood by the visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    /// Reverse video. Used to light up jump candidates in the map.
    Reverse,
    /// Bold + reverse. Used for the position marker so it stands out
    /// from highlighted candidates.
    Marker,
}

/// Minimal write-at-position surface shared by the visualizer, the
/// progress bar, and the tests.
pub trait Screen {
    /// Current width in columns. Queried fresh so a resize between steps
    /// re-wraps the map on the next render.
    fn width(&self) -> usize;

    fn clear(&mut self) -> Result<()>;

    /// Write `text` starting at (`row`, `col`), top-left origin.
    fn put(&mut self, row: u16, col: u16, text: &str, style: Style) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// Raw-mode terminal screen. Restores the terminal exactly once, on
/// [`TerminalScreen::restore`] or on drop, whichever comes first.
pub struct TerminalScreen {
    out: Stdout,
    restored: bool,
}

impl TerminalScreen {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(
            out,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            cursor::Hide
        )?;
        Ok(Self {
            out,
            restored: false,
        })
    }

    /// Leave raw mode and show the cursor again. Idempotent, so the
    /// interrupt path and the normal exit path can both call it.
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        execute!(self.out, cursor::Show, SetAttribute(Attribute::Reset))?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Park the cursor on `row` so shell output resumes below the map.
    pub fn move_below(&mut self, row: u16) -> Result<()> {
        execute!(self.out, cursor::MoveTo(0, row), Print("\r\n"))?;
        Ok(())
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::warn!("failed to restore terminal: {e}");
        }
    }
}

impl Screen for TerminalScreen {
    fn width(&self) -> usize {
        terminal::size().map(|(cols, _)| cols as usize).unwrap_or(80)
    }

    fn clear(&mut self) -> Result<()> {
        queue!(self.out, Clear(ClearType::All))?;
        Ok(())
    }

    fn put(&mut self, row: u16, col: u16, text: &str, style: Style) -> Result<()> {
        queue!(self.out, cursor::MoveTo(col, row))?;
        match style {
            Style::Plain => queue!(self.out, Print(text))?,
            Style::Reverse => queue!(
                self.out,
                SetAttribute(Attribute::Reverse),
                Print(text),
                SetAttribute(Attribute::Reset)
            )?,
            Style::Marker => queue!(
                self.out,
                SetAttribute(Attribute::Bold),
                SetAttribute(Attribute::Reverse),
                Print(text),
                SetAttribute(Attribute::Reset)
            )?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
