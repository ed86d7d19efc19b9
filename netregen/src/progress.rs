//! Step-by-step terminal reporting, one line per state change.

use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Ok,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy)]
pub struct Progress {
    quiet: bool,
}

impl Progress {
    pub fn new(quiet: bool) -> Self {
        Progress { quiet }
    }

    pub fn step(&self, label: &str, status: Status) {
        if self.quiet {
            return;
        }
        let tag = match status {
            Status::Running => "...".cyan(),
            Status::Ok => "Ok".green(),
            Status::Warning => "Warning".yellow(),
            Status::Error => "Error".red(),
        };
        println!("{:<58} [ {} ]", label, tag);
    }
}
