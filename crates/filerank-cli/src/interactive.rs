use anyhow::Result;
use colored::*;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use filerank_core::ranking::{resolve_category, Comparison, RankingSession, Side};
use filerank_core::scanner::Category;
use filerank_core::{Database, RankingService, RankingStatus};
use std::io;
use std::path::Path;
use tracing::info;

const PREVIEW_CHARS: usize = 160;

enum Action {
    Choose(Side),
    Undo,
    Quit,
}

/// Raw mode for the lifetime of the value.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_action() -> io::Result<Action> {
    let _raw = RawMode::enable()?;
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('1') => {
                return Ok(Action::Choose(Side::Left))
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('2') => {
                return Ok(Action::Choose(Side::Right))
            }
            KeyCode::Char('u') | KeyCode::Backspace => return Ok(Action::Undo),
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Action::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(Action::Quit)
            }
            _ => {}
        }
    }
}

fn describe(service: &RankingService<Database>, label: &str, path: &str, category: Category) {
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    println!(
        "  {} {} {}",
        label.bold(),
        name.cyan().bold(),
        format!("[{}]", category).dimmed()
    );
    println!("      {}", path.dimmed());
    if category == Category::Text {
        if let Some(text) = service.engine().preview(Path::new(path)) {
            let snippet: String = text
                .chars()
                .take(PREVIEW_CHARS)
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect();
            println!("      {}", snippet.italic());
        }
    }
}

fn show_comparison(
    service: &RankingService<Database>,
    session: &RankingSession,
    comparison: &Comparison,
) {
    let categories = session.record().extension_categories();
    let progress = session.progress();
    println!();
    println!(
        "{} {}  comparison {} of ~{} ({}%)",
        "▶".cyan(),
        session.record().name.bold(),
        progress.done + 1,
        progress.estimated.max(progress.done + 1),
        progress.percent
    );
    describe(
        service,
        "←",
        &comparison.left.path,
        resolve_category(&categories, &comparison.left.path),
    );
    describe(
        service,
        "→",
        &comparison.right.path,
        resolve_category(&categories, &comparison.right.path),
    );
    println!("{}", "  ←/→ pick the better file, u undo, q quit".dimmed());
}

/// Ask comparisons until the ranking is complete or the user quits.
pub fn run_rank(service: &RankingService<Database>, id: &str) -> Result<()> {
    let Some(mut session) = service.open_session(id)? else {
        println!("{}", format!("Ranking {} not found", id).red());
        return Ok(());
    };
    info!(
        "Ranking '{}': {} files, {} recorded matches",
        session.record().name,
        session.record().files.len(),
        session.record().matches.len()
    );

    loop {
        let Some(comparison) = session.current_comparison() else {
            if session.record().status != RankingStatus::Complete {
                service.update_status(id, RankingStatus::Complete)?;
            }
            println!("{}", "Ranking complete.".green().bold());
            break;
        };
        show_comparison(service, &session, &comparison);

        match read_action()? {
            Action::Choose(side) => {
                if service.decide(&mut session, side)?.is_none() {
                    println!("{}", format!("Ranking {} no longer exists", id).red());
                    break;
                }
            }
            Action::Undo => {
                if !service.undo(&mut session)? {
                    println!("{}", "Nothing to undo.".yellow());
                }
            }
            Action::Quit => {
                println!(
                    "Progress saved: {} decisions recorded.",
                    session.record().matches.len()
                );
                break;
            }
        }
    }
    Ok(())
}
