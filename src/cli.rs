use crate::journal_entry::JournalEntry;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "journal_client")]
#[command(about = "Write journal entries and read them back from the journal server", long_about = None)]
pub struct Cli {
    /// File that receives the client's log output
    #[arg(long, default_value = "journal_client.log")]
    pub log_file: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Open the interactive journal page (default)
    Tui,

    /// Print every saved entry and exit
    List,

    /// Save an entry, print the reply, then print the updated list
    Write {
        /// Entry text; several words are joined with spaces
        #[arg(required = true)]
        text: Vec<String>,
    },
}

pub fn format_entries(entries: &[JournalEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}\n  {}\n", entry.text, entry.local_date()))
        .collect::<Vec<_>>()
        .join("\n")
}
