use clap::ValueEnum;
use console::style;
use serde::Serialize;

use crate::types::Result;

/// Output format for commands that can emit machine-readable results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    pub fn item(&self, message: &str) {
        println!("  {} {}", style("•").dim(), message);
    }

    /// Print pre-rendered text (trees, TOML) as-is
    pub fn block(&self, text: &str) {
        print!("{}", text);
        if !text.ends_with('\n') {
            println!();
        }
    }

    pub fn json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
