mod commands;
mod export;
mod interactive;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, ExportFormat};
use dotenv::dotenv;
use filerank_core::ranking::{ExtensionSelection, RankedPage};
use filerank_core::scanner::ScanSession;
use filerank_core::{AppConfig, Database, RankingService, RankingStatus, ScanEngine, ScanResult};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match filerank_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let Some(command) = args.command else {
        let _ = Cli::command().print_long_help();
        return;
    };

    if let Err(err) = run(command, &config) {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn open_service(config: &AppConfig) -> Result<RankingService<Database>> {
    let db = Database::open(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path))?;
    Ok(RankingService::new(db, ScanEngine::new(config.clone())))
}

fn run(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Scan { folder } => run_scan(config, &folder),
        Commands::New {
            name,
            folder,
            select,
        } => run_new(config, &name, &folder, &select),
        Commands::List => run_list(config),
        Commands::Rank { id } => interactive::run_rank(&open_service(config)?, &id),
        Commands::Show { id, page } => run_show(config, &id, page),
        Commands::Export { id, format } => run_export(config, &id, format),
        Commands::Undo { id } => run_undo(config, &id),
        Commands::Rename { id, name } => {
            let found = open_service(config)?.rename(&id, &name)?;
            report(&id, found, "renamed")
        }
        Commands::Reset { id } => {
            let found = open_service(config)?.reset(&id)?.is_some();
            report(&id, found, "reset")
        }
        Commands::Delete { id, yes } => run_delete(config, &id, yes),
        Commands::Status { id, status } => {
            let status = RankingStatus::from(status);
            let found = open_service(config)?.update_status(&id, status)?;
            report(&id, found, &format!("marked {}", status))
        }
        Commands::Preview { path } => {
            match ScanEngine::new(config.clone()).preview(&path) {
                Some(text) => println!("{}", text),
                None => println!("{}", "Not a text file.".yellow()),
            }
            Ok(())
        }
        Commands::PrintConfig => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
    }
}

fn report(id: &str, found: bool, action: &str) -> Result<()> {
    if found {
        println!("Ranking {} {}.", id.cyan(), action);
    } else {
        warn!("Ranking {} not found", id);
    }
    Ok(())
}

fn print_histogram(result: &ScanResult) {
    println!(
        "{} files found",
        format!("{}", result.total_files).green().bold()
    );
    for (category, items) in &result.categories {
        if items.is_empty() {
            continue;
        }
        println!("{}", category.to_string().to_uppercase().bold());
        for item in items {
            println!("  {:<16} {:>8}", item.extension, item.count);
        }
    }
}

fn run_scan(config: &AppConfig, folder: &Path) -> Result<()> {
    let engine = ScanEngine::new(config.clone());
    let scans = ScanSession::new();
    let reporter = CliReporter::new();
    if let Some(result) = engine.scan(folder, &scans.begin(), &reporter) {
        print_histogram(&result);
    }
    Ok(())
}

fn run_new(config: &AppConfig, name: &str, folder: &Path, select: &[String]) -> Result<()> {
    let service = open_service(config)?;
    let scans = ScanSession::new();
    let reporter = CliReporter::new();

    let selections: Vec<ExtensionSelection> = if select.is_empty() {
        let Some(result) = service.engine().scan(folder, &scans.begin(), &reporter) else {
            return Ok(());
        };
        print_histogram(&result);
        result.all_selections()
    } else {
        select
            .iter()
            .map(|s| s.parse().map_err(|e: String| anyhow!(e)))
            .collect::<Result<_>>()?
    };

    let Some(record) = service.create(name, folder, selections, &scans.begin(), &reporter)? else {
        return Ok(());
    };
    info!(
        "Created ranking {} with {} files",
        record.id.cyan(),
        format!("{}", record.files.len()).green()
    );
    println!("{}", record.id);
    Ok(())
}

fn status_label(status: RankingStatus) -> ColoredString {
    match status {
        RankingStatus::InProgress => "in progress".yellow(),
        RankingStatus::Complete => "complete".green(),
    }
}

fn run_list(config: &AppConfig) -> Result<()> {
    let records = open_service(config)?.list()?;
    if records.is_empty() {
        println!("No rankings yet.");
        return Ok(());
    }
    for record in &records {
        let summary = record.summary();
        println!(
            "{}  {}  [{}]  {} files, {} matches  {}",
            summary.id.dimmed(),
            summary.name.bold(),
            status_label(summary.status),
            summary.file_count,
            summary.match_count,
            summary.updated_at.dimmed()
        );
        println!("    {}", summary.source_folder);
    }
    Ok(())
}

fn run_show(config: &AppConfig, id: &str, page: usize) -> Result<()> {
    let Some(record) = open_service(config)?.get(id)? else {
        return report(id, false, "");
    };
    let ranked = RankedPage::build(&record, page, config.page_size);
    println!(
        "{} [{}]  page {}/{}  ({} files)",
        record.name.bold(),
        status_label(record.status),
        ranked.page,
        ranked.total_pages,
        ranked.total_files
    );
    for entry in &ranked.entries {
        println!(
            "{:>5}. {} {}",
            entry.rank,
            format!("[{}]", entry.category).dimmed(),
            entry.file.path
        );
    }
    Ok(())
}

fn run_export(config: &AppConfig, id: &str, format: ExportFormat) -> Result<()> {
    let Some(record) = open_service(config)?.get(id)? else {
        return report(id, false, "");
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        ExportFormat::Json => export::write_json(&record, &mut out)?,
        ExportFormat::Csv => export::write_csv(&record, &mut out)?,
    }
    writeln!(out)?;
    Ok(())
}

fn run_undo(config: &AppConfig, id: &str) -> Result<()> {
    match open_service(config)?.undo_last_match(id)? {
        Some(record) => {
            println!(
                "{} decisions left, {}",
                record.matches.len(),
                status_label(record.status)
            );
            Ok(())
        }
        None => report(id, false, ""),
    }
}

fn run_delete(config: &AppConfig, id: &str, yes: bool) -> Result<()> {
    let service = open_service(config)?;
    let Some(record) = service.get(id)? else {
        return report(id, false, "");
    };
    if !yes {
        let prompt = format!(
            "Delete ranking '{}' and its {} decisions?",
            record.name,
            record.matches.len()
        );
        if !prompt_confirm(&prompt, Some(false))? {
            return Ok(());
        }
    }
    let deleted = service.delete(id)?;
    report(id, deleted, "deleted")
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
