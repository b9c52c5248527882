//! Terminal setup, quit keys and per-frame telemetry for the demo driver

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue, style, terminal,
};
use std::io::{self, BufWriter, Stdout, Write, stdout};
use std::time::Duration;

use crate::renderer::Frame;

/// Buffered stdout that owns the screen while frames are being drawn.
///
/// Raw mode is enabled when available so Ctrl-C arrives as a key and the
/// screen is restored on drop.
pub struct TerminalDisplay {
    buffer: RawLines<BufWriter<Stdout>>,
    raw: bool,
}

impl TerminalDisplay {
    /// Clear the screen, hide the cursor and switch to raw input
    pub fn new() -> io::Result<Self> {
        let mut stdout = stdout();
        execute!(stdout, terminal::Clear(terminal::ClearType::All), cursor::Hide)?;

        let raw = match terminal::enable_raw_mode() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Raw mode unavailable, quit keys disabled: {}", err);
                false
            }
        };

        Ok(Self { buffer: RawLines::new(BufWriter::new(stdout)), raw })
    }

    /// Writer that frames are presented through
    pub fn writer(&mut self) -> &mut RawLines<BufWriter<Stdout>> {
        &mut self.buffer
    }

    /// Drain pending input without blocking, true once a quit key was pressed
    pub fn poll_quit(&self) -> io::Result<bool> {
        if !self.raw {
            return Ok(false);
        }
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key_event) = event::read()? {
                if is_quit_key(&key_event) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Print the telemetry lines below the frame
    pub fn telemetry(&mut self, frame: &Frame) -> io::Result<()> {
        write_telemetry(&mut self.buffer, frame)?;
        self.buffer.flush()
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = self.buffer.flush();
        if self.raw {
            let _ = terminal::disable_raw_mode();
        }
        let _ = execute!(stdout(), style::ResetColor, cursor::Show);
    }
}

/// `q`, `Esc` and Ctrl-C end the demo
pub fn is_quit_key(event: &KeyEvent) -> bool {
    if event.kind == KeyEventKind::Release {
        return false;
    }
    match event.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => event.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Writer that turns `\n` into `\r\n`, since raw mode stops the terminal
/// from returning to column 0 on a line feed
pub struct RawLines<W: Write> {
    inner: W,
}

impl<W: Write> RawLines<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for RawLines<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for (i, line) in buf.split(|&byte| byte == b'\n').enumerate() {
            if i > 0 {
                self.inner.write_all(b"\r\n")?;
            }
            self.inner.write_all(line)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Frames per second for a frame that took `elapsed_ms`
pub fn fps(elapsed_ms: f64) -> f64 {
    if elapsed_ms > 0.0 {
        1000.0 / elapsed_ms
    } else {
        f64::INFINITY
    }
}

/// Bold fps/render-time line followed by the frame number.
/// The current line is cleared first so shorter numbers leave no residue.
pub fn write_telemetry<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    queue!(out, terminal::Clear(terminal::ClearType::CurrentLine))?;
    writeln!(
        out,
        "\x1b[1mfps: {:.1} / render time: {:.3}ms\x1b[0m",
        fps(frame.elapsed_ms),
        frame.elapsed_ms
    )?;
    queue!(out, terminal::Clear(terminal::ClearType::CurrentLine))?;
    write!(out, " frame: {}", frame.number)
}
