//! Colored printing of execution outcomes for the headless `run` command.

use std::io::{self, Write};

use owo_colors::OwoColorize;

use crate::piston::{ExecutionOutcome, NotificationKind};

pub struct OutcomePrinter {
    pub color: bool,
}

impl OutcomePrinter {
    /// Output lines go to stdout, the notification text to stderr.
    pub fn print(&self, outcome: &ExecutionOutcome) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for line in self.render_lines(outcome) {
            writeln!(stdout, "{}", line)?;
        }
        let (message, kind) = outcome.notification();
        let banner = match (self.color, kind) {
            (false, _) => message.to_string(),
            (true, NotificationKind::Success) => message.green().bold().to_string(),
            (true, NotificationKind::Error) => message.red().bold().to_string(),
        };
        eprintln!("{}", banner);
        Ok(())
    }

    pub fn render_lines(&self, outcome: &ExecutionOutcome) -> Vec<String> {
        let lines = outcome.lines();
        if !self.color {
            return lines;
        }
        if outcome.is_error() {
            lines.iter().map(|l| l.red().to_string()).collect()
        } else {
            lines.iter().map(|l| l.green().to_string()).collect()
        }
    }
}
