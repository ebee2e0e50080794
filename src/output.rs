use std::io;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::UsageTracker;
use crate::state::{OptimizationResult, TestCase};

/// Display sink for the session. Fire-and-forget: callers never consult
/// a return value beyond I/O success.
pub struct OutputHandler {
    debug: bool,
}

impl OutputHandler {
    pub fn new() -> Self {
        Self { debug: false }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Spinner bracketing a blocking model call. The caller finishes it
    /// when the response arrives.
    pub fn spinner(&self, message: &str) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template"),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    pub fn print_welcome(&self) -> io::Result<()> {
        println!();
        println!("{}", style("╔═══════════════════════════════════════╗").magenta().bold());
        println!("{}", style("║            PROMPTFORGE                ║").magenta().bold());
        println!("{}", style("╚═══════════════════════════════════════╝").magenta().bold());
        println!(
            "{}",
            style("Welcome to the prompt refinement workshop. I'll help you turn a rough prompt into a sharp one.").dim()
        );
        Ok(())
    }

    pub fn print_refinement_header(&self) -> io::Result<()> {
        println!();
        println!("{}", style("── Refinement Workshop ────────────────────").green().bold());
        println!(
            "{}",
            style("Let's refine your prompt together. I'll ask targeted questions to understand your needs.").cyan()
        );
        println!("{}", style("Type 'finalize' at any time when you're satisfied.").dim());
        Ok(())
    }

    pub fn print_assistant_message(&self, content: &str) -> io::Result<()> {
        println!();
        println!("{} {}", style("Assistant:").blue().bold(), content);
        Ok(())
    }

    /// Readiness banner with a 20-cell confidence bar.
    pub fn print_ready_banner(&self, confidence: f64) -> io::Result<()> {
        let filled = (confidence.clamp(0.0, 1.0) * 20.0) as usize;
        let bar = "█".repeat(filled) + &"░".repeat(20 - filled);

        println!();
        println!("{}", style("✨ READY TO OPTIMIZE ✨").green().bold());
        println!("I have enough information to create an optimized prompt!");
        println!("Type 'finalize' to see the result, or continue refining.");
        println!(
            "{} [{}] {:.0}%",
            style("Confidence:").dim(),
            style(&bar).green(),
            confidence * 100.0
        );
        Ok(())
    }

    pub fn print_optimized_prompt(&self, result: &OptimizationResult) -> io::Result<()> {
        println!();
        println!("{}", style("── Optimized Prompt ───────────────────────").magenta().bold());
        println!();
        println!("{}", result.optimized_prompt);

        if !result.improvements.is_empty() {
            println!();
            println!("{}", style("Key improvements:").yellow().bold());
            for line in result.improvements.lines() {
                let line = line.trim();
                if !line.is_empty() {
                    println!("  {} {}", style("✓").green(), line);
                }
            }
        }
        Ok(())
    }

    pub fn print_menu(&self) -> io::Result<()> {
        println!();
        println!("{}", style("What would you like to do?").yellow().bold());
        println!("  {} Generate test cases for this prompt", style("1.").cyan());
        println!("  {} Refine the prompt further", style("2.").cyan());
        println!("  {} Start over with a new prompt", style("3.").cyan());
        println!("  {} Exit", style("4.").cyan());
        Ok(())
    }

    pub fn print_test_cases(&self, test_cases: &[TestCase]) -> io::Result<()> {
        println!();
        println!("{}", style("── Test Cases ─────────────────────────────").cyan().bold());
        for (i, case) in test_cases.iter().enumerate() {
            println!();
            println!("{}", style(format!("Test Case {}", i + 1)).cyan().bold());
            println!("  {} {}", style("Scenario:").yellow(), case.scenario);
            println!("  {} {}", style("Input:").yellow(), style(&case.input).dim());
            println!("  {} {}", style("Expected:").yellow(), style(&case.expected_behavior).green());
        }
        println!();
        println!(
            "{}",
            style("Try these test cases with your optimized prompt to make sure it holds up.").dim()
        );
        Ok(())
    }

    pub fn print_system(&self, content: &str) -> io::Result<()> {
        println!("{}", style(content).yellow().dim());
        Ok(())
    }

    pub fn print_error(&self, content: &str) -> io::Result<()> {
        println!("{} {}", style("Error:").red().bold(), content);
        Ok(())
    }

    pub fn print_cancellation(&self) -> io::Result<()> {
        println!();
        println!("{}", style("Optimization cancelled by user.").yellow());
        Ok(())
    }

    pub fn print_usage_summary(&self, usage: &UsageTracker) -> io::Result<()> {
        println!();
        println!("{}", style("┌─ Session Usage ───────────────────────").dim());
        println!("│ {} model calls", usage.calls);
        println!("│ {} tokens total", usage.total_tokens);
        if usage.total_cost > 0.0 {
            println!("│ ${:.4} estimated cost", usage.total_cost);
        } else {
            println!("│ {}", style("no cost estimate for this model").dim());
        }
        println!("{}", style("└───────────────────────────────────────").dim());
        Ok(())
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
