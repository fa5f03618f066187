use clap::{Parser, Subcommand, ValueEnum};
use filerank_core::RankingStatus;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "filerank")]
#[command(
    about = "Rank files by choosing the better of two, one pair at a time",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    InProgress,
    Complete,
}

impl From<StatusArg> for RankingStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::InProgress => RankingStatus::InProgress,
            StatusArg::Complete => RankingStatus::Complete,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the extension histogram of a folder
    Scan {
        folder: PathBuf,
    },
    /// Create a ranking from a folder
    New {
        name: String,
        folder: PathBuf,
        /// Buckets to include as category:.ext (default: everything found)
        #[arg(long = "select", value_name = "CATEGORY:EXT")]
        select: Vec<String>,
    },
    /// List rankings, most recently updated first
    List,
    /// Answer comparisons for a ranking (←/→ choose, u undo, q quit)
    Rank {
        id: String,
    },
    /// Show the current order of a ranking
    Show {
        id: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Write the current order to stdout
    Export {
        id: String,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
    /// Remove the newest decision of a ranking
    Undo {
        id: String,
    },
    /// Rename a ranking
    Rename {
        id: String,
        name: String,
    },
    /// Clear every decision of a ranking
    Reset {
        id: String,
    },
    /// Delete a ranking and its decisions
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Overwrite the stored status of a ranking
    Status {
        id: String,
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// Print the text preview of a file
    Preview {
        path: PathBuf,
    },
    /// Print configuration values
    PrintConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accepts_only_known_values() {
        let cli = Cli::try_parse_from(["filerank", "status", "abc", "in-progress"]).unwrap();
        match cli.command {
            Some(Commands::Status { id, status }) => {
                assert_eq!(id, "abc");
                assert_eq!(RankingStatus::from(status), RankingStatus::InProgress);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let err = Cli::try_parse_from(["filerank", "status", "abc", "done"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
