use console::style;

use crate::model::{ApeVariant, PromptScore};

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
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        eprintln!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        println!("  {:<14} {}", style(label).dim(), value);
    }

    /// Prompt text, verbatim, framed by blank lines
    pub fn prompt(&self, text: &str) {
        println!();
        println!("{}", text);
        println!();
    }

    pub fn score(&self, score: &PromptScore) {
        let total = score.total();
        let total = if total >= 70 {
            style(total).green()
        } else if total >= 40 {
            style(total).yellow()
        } else {
            style(total).red()
        };
        println!(
            "  {} {}/100  (clarity {}/30, specificity {}/30, structure {}/40)",
            style("Score").bold(),
            total,
            score.clarity(),
            score.specificity(),
            score.structure()
        );
    }

    pub fn variant(&self, rank: usize, variant: &ApeVariant) {
        let label = format!("#{} {} [{}]", rank, variant.meta.variation, variant.id);
        if variant.is_fallback() {
            self.section(&format!("{} {}", label, style("(fallback)").yellow()));
        } else {
            self.section(&label);
        }
        self.score(&variant.score);
        self.prompt(&variant.prompt);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
