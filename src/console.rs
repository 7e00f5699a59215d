//! User-facing console output.
//!
//! Status lines, diagnostics and the acknowledgement prompt go through a
//! [`Console`] so the launcher can be driven in tests and so log filtering
//! never hides what the user needs to read.

use std::io::{BufRead, IsTerminal, Write};

/// Where the launcher writes human-readable lines.
pub trait Console: Send + Sync {
    /// A status line (stdout).
    fn line(&self, msg: &str);

    /// A diagnostic line (stderr).
    fn error(&self, msg: &str);

    /// Block until the user acknowledges with Enter.
    fn pause(&self);
}

/// Console bound to the process's stdio.
#[derive(Debug, Clone)]
pub struct TerminalConsole {
    pause_enabled: bool,
}

impl TerminalConsole {
    pub fn new(pause_enabled: bool) -> Self {
        Self { pause_enabled }
    }
}

impl Console for TerminalConsole {
    fn line(&self, msg: &str) {
        println!("{}", msg);
    }

    fn error(&self, msg: &str) {
        eprintln!("{}", msg);
    }

    fn pause(&self) {
        // Nobody can press Enter on a pipe or /dev/null.
        if !self.pause_enabled || !std::io::stdin().is_terminal() {
            return;
        }
        print!("Press Enter to exit...");
        let _ = std::io::stdout().flush();
        let mut input = String::new();
        let _ = std::io::stdin().lock().read_line(&mut input);
    }
}

/// Console that records everything, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingConsole {
    pub lines: std::sync::Mutex<Vec<String>>,
    pub errors: std::sync::Mutex<Vec<String>>,
    pub pauses: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl RecordingConsole {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn pause_count(&self) -> usize {
        self.pauses.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// True if any stdout or stderr line contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.lines()
            .iter()
            .chain(self.errors().iter())
            .any(|l| l.contains(needle))
    }
}

#[cfg(test)]
impl Console for RecordingConsole {
    fn line(&self, msg: &str) {
        self.lines.lock().unwrap().push(msg.to_string());
    }

    fn error(&self, msg: &str) {
        self.errors.lock().unwrap().push(msg.to_string());
    }

    fn pause(&self) {
        self.pauses
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_console_collects() {
        let console = RecordingConsole::default();
        console.line("hello");
        console.error("bad");
        console.pause();
        assert_eq!(console.lines(), vec!["hello"]);
        assert_eq!(console.errors(), vec!["bad"]);
        assert_eq!(console.pause_count(), 1);
        assert!(console.mentions("ba"));
        assert!(!console.mentions("zzz"));
    }

    #[test]
    fn test_disabled_pause_returns_immediately() {
        TerminalConsole::new(false).pause();
    }
}
