//! Progress lines for long-running jobs.
//!
//! Steps and successes go to stdout and respect `--quiet`. Warnings (skipped
//! tasks, missing jobs) go to stderr and are always shown.

use owo_colors::{OwoColorize as _, Style};

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

const STEP: &str = "→";
const SUCCESS: &str = "✓";
const WARNING: &str = "!";

/// `ProgressReporter` that writes indented, glyph-prefixed lines.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    fn progress(&self, glyph: &str, style: Style, message: &str) {
        if !self.ctx.quiet {
            println!("{}", line(glyph, style, message));
        }
    }
}

/// `"  <glyph> <message>"` with the glyph styled.
pub(crate) fn line(glyph: &str, style: Style, message: &str) -> String {
    format!("  {} {message}", glyph.style(style))
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.progress(STEP, self.ctx.styles.step, message);
    }

    fn success(&self, message: &str) {
        self.progress(SUCCESS, self.ctx.styles.success, message);
    }

    fn warn(&self, message: &str) {
        eprintln!("{}", line(WARNING, self.ctx.styles.warning, message));
    }
}
