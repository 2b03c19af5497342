//! Terminal rendering and input helpers

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use ragkb_core::{IngestReport, IngestStatus, QueryAnswer, Result, StoreStats};

const PROMPT: &str = "ragkb>";

/// Display the interactive-mode banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(60, terminal_width.saturating_sub(4)).max(40);
    let inner = banner_width - 2;

    let top_border = format!("┌{}┐", "─".repeat(inner));
    let bottom_border = format!("└{}┘", "─".repeat(inner));
    let empty_line = format!("│{}│", " ".repeat(inner));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "RAGKB - Knowledge Base Assistant";
    println!(
        "{}{}{}{}",
        "│  ".blue(),
        title.blue().bold(),
        " ".repeat(inner.saturating_sub(title.chars().count() + 2)),
        "│".blue()
    );
    println!("{}", empty_line.blue());

    for line in [
        "Answers come only from your ingested documents.",
        "Type 'exit', 'quit' or 'q' to leave.",
    ] {
        let padding = " ".repeat(inner.saturating_sub(line.chars().count() + 2));
        println!("{}", format!("│  {}{}│", line, padding).blue());
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
}

/// Whether `input` ends the interactive loop
pub fn is_exit_command(input: &str) -> bool {
    matches!(
        input.trim().to_lowercase().as_str(),
        "exit" | "quit" | "q"
    )
}

pub fn format_ingest_report(report: &IngestReport, directory: &Path) -> String {
    let mut lines = Vec::new();

    if report.cleared > 0 {
        lines.push(format!("{} Removed {} existing chunks", "🗑".yellow(), report.cleared));
    }

    match report.status {
        IngestStatus::NoDocuments => {
            lines.push(format!(
                "{} No documents found in {}",
                "⚠".yellow(),
                directory.display()
            ));
        }
        IngestStatus::Success => {
            lines.push(format!("{} {}", "✓".green(), "Ingestion complete".bold()));
            lines.push(format!("  Documents: {}", report.documents));
            lines.push(format!("  Chunks:    {}", report.chunks));
            lines.push(format!("  Inserted:  {}", report.inserted));
        }
    }

    lines.join("\n")
}

pub fn format_answer(answer: &QueryAnswer) -> String {
    let mut lines = vec![format!("{}", "Answer:".bold()), answer.answer.clone()];

    if !answer.sources.is_empty() {
        lines.push(String::new());
        lines.push(format!("{}", "Sources:".bold()));
        for source in &answer.sources {
            lines.push(format!("  {} {}", "•".cyan(), source));
        }
        lines.push(format!(
            "{}",
            format!("Retrieved {} chunks", answer.chunks.len()).dimmed()
        ));
    }

    lines.join("\n")
}

pub fn format_stats(stats: &StoreStats) -> String {
    [
        format!("{}", "Knowledge base".bold()),
        format!("  Backend:   {}", stats.backend),
        format!("  Location:  {}", stats.location),
        format!("  Chunks:    {}", stats.total_chunks),
        format!("  Documents: {}", stats.total_documents),
    ]
    .join("\n")
}

/// Only an explicit yes confirms
pub fn parse_confirmation(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Ask a yes/no question on stdin, defaulting to no
pub fn confirm(question: &str) -> Result<bool> {
    print!("{} {} [y/N]: ", "?".cyan(), question);
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;

    Ok(parse_confirmation(&response))
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

fn redraw(input: &str) -> Result<()> {
    print!("\r\x1b[2K{} {}", PROMPT.green().bold(), input);
    io::stdout().flush()?;
    Ok(())
}

/// Read one question, with ↑/↓ history navigation on a terminal
///
/// Returns `None` at end of input (closed pipe, Ctrl+C or Ctrl+D).
pub fn read_question(history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(Some(input));
    }

    let guard = RawModeGuard::enable()?;
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    redraw(&input)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        match key_event.code {
            KeyCode::Char('c' | 'd') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                drop(guard);
                println!();
                return Ok(None);
            }
            KeyCode::Enter => {
                drop(guard);
                println!();
                let input = input.trim().to_string();
                if !input.is_empty() {
                    history.push(input.clone());
                }
                return Ok(Some(input));
            }
            KeyCode::Char(c) => {
                input.push(c);
                redraw(&input)?;
            }
            KeyCode::Backspace => {
                input.pop();
                redraw(&input)?;
            }
            KeyCode::Up if !history.is_empty() => {
                let new_index = match history_index {
                    None => history.len() - 1,
                    Some(idx) => idx.saturating_sub(1),
                };
                history_index = Some(new_index);
                input = history[new_index].clone();
                redraw(&input)?;
            }
            KeyCode::Down => {
                if let Some(idx) = history_index {
                    if idx + 1 < history.len() {
                        history_index = Some(idx + 1);
                        input = history[idx + 1].clone();
                    } else {
                        history_index = None;
                        input.clear();
                    }
                    redraw(&input)?;
                }
            }
            KeyCode::Esc => {
                input.clear();
                history_index = None;
                redraw(&input)?;
            }
            _ => {}
        }
    }
}
