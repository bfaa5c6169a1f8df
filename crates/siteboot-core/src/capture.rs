//! Scoped output capture.
//!
//! Collaborator output goes through an [`OutputStack`]. Each
//! [`CaptureGuard`] pushes one frame and truncates the stack back to its
//! starting depth when dropped, so the frame is released on every exit path
//! including early `?` returns and unwinding. Frames nest.
//!
//! Nothing is buffered: a write either reaches the sink immediately or is
//! dropped because a discard frame is open, so releasing a frame never writes.

use std::{
    fmt,
    io::{self, Write},
    ops::{Deref, DerefMut},
};

///
/// CaptureMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaptureMode {
    /// Bytes flow to the enclosing frame unchanged.
    Passthrough,
    /// Bytes are dropped while the frame is open.
    Discard,
}

impl CaptureMode {
    /// Quiet invocations discard collaborator output.
    #[must_use]
    pub const fn for_quiet(quiet: bool) -> Self {
        if quiet { Self::Discard } else { Self::Passthrough }
    }
}

///
/// OutputStack
///

pub struct OutputStack {
    sink: Box<dyn Write>,
    frames: Vec<CaptureMode>,
}

impl OutputStack {
    #[must_use]
    pub fn new(sink: Box<dyn Write>) -> Self {
        Self {
            sink,
            frames: Vec::new(),
        }
    }

    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    #[must_use]
    pub fn sink() -> Self {
        Self::new(Box::new(io::sink()))
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Open a capture frame released when the guard drops.
    pub fn capture(&mut self, mode: CaptureMode) -> CaptureGuard<'_> {
        let depth = self.frames.len();
        self.frames.push(mode);

        CaptureGuard { stack: self, depth }
    }

    fn discarding(&self) -> bool {
        self.frames.contains(&CaptureMode::Discard)
    }
}

impl Write for OutputStack {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A discard frame anywhere in the stack swallows the bytes.
        if self.discarding() {
            return Ok(buf.len());
        }

        self.sink.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.discarding() {
            return Ok(());
        }

        self.sink.flush()
    }
}

impl fmt::Debug for OutputStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStack")
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

///
/// CaptureGuard
///

pub struct CaptureGuard<'a> {
    stack: &'a mut OutputStack,
    depth: usize,
}

impl Deref for CaptureGuard<'_> {
    type Target = OutputStack;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl DerefMut for CaptureGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}

impl Write for CaptureGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stack.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stack.flush()
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.stack.frames.truncate(self.depth);
    }
}

///
/// TESTS
///
