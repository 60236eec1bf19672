mod api;
mod app;
mod cli;
mod controller;
mod journal_entry;
mod journal_state;
mod ui;

use api::HttpJournalApi;
use clap::Parser;
use cli::{Cli, Commands};
use color_eyre::eyre::{eyre, Result};
use controller::JournalClient;
use std::{fs::OpenOptions, sync::Arc, sync::Mutex};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ui::UI;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(&cli)?;

    let api = Arc::new(HttpJournalApi::default());
    tracing::info!(server = api.base_url(), "journal client starting");
    let mut client = JournalClient::new(api);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let mut ui = UI::new()?;
            app::run(&mut client, &mut ui).await?;
        }
        Commands::List => {
            let entries = client.refresh_list().await.map_err(|err| {
                tracing::error!(error = %err, "failed to fetch entries");
                eyre!("failed to fetch entries: {}", err)
            })?;
            print!("{}", cli::format_entries(entries));
        }
        Commands::Write { text } => {
            text.join(" ")
                .chars()
                .for_each(|c| client.state_mut().insert_char(c));
            let reply = client.submit_entry().await.map_err(|err| {
                tracing::error!(error = %err, "failed to submit journal entry");
                eyre!("failed to submit journal entry: {}", err)
            })?;
            let Some(reply) = reply else {
                return Ok(());
            };
            println!("{}\n", reply.llm_response);

            let entries = client.refresh_list().await.map_err(|err| {
                tracing::error!(error = %err, "failed to fetch entries");
                eyre!("failed to fetch entries: {}", err)
            })?;
            print!("{}", cli::format_entries(entries));
        }
    }

    Ok(())
}

/// The terminal belongs to the UI, so log lines go to a file.
fn init_logging(cli: &Cli) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();
    Ok(())
}
