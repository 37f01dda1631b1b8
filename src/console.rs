//! Line-oriented console output.
//!
//! The protocol core never reads input itself; an outer loop pushes lines
//! into an interpreter, and every notice flows back out through
//! [`Console::display`].

use std::io::Write;
use std::sync::{Arc, Mutex};

/// Presents one line of text to the human operator or user.
pub trait Console {
    fn display(&self, text: &str);
}

/// Console writing each line to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn display(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        // Nothing sensible to do if stdout is gone
        let _ = writeln!(out, "{}", text);
    }
}

/// Console that records every displayed line.
///
/// Clones share the same buffer, so one handle can be given to a client or
/// server console while another inspects what was shown.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines displayed so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// The most recently displayed line.
    pub fn last(&self) -> Option<String> {
        self.lines.lock().ok().and_then(|l| l.last().cloned())
    }

    /// Remove and return all recorded lines.
    pub fn take(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|mut l| std::mem::take(&mut *l))
            .unwrap_or_default()
    }
}

impl Console for Transcript {
    fn display(&self, text: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(text.to_string());
        }
    }
}
