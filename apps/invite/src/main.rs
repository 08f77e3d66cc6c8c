use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{
    settings::DEFAULT_SETTINGS_FILE, HttpTransport, JsonFileDraftStore, SubmissionController,
    Transition, Wizard,
};
use shared::domain::WEDDING;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{parse_command, Command, Field, HELP};

#[derive(Parser, Debug)]
#[command(about = "Open the wedding invitation and RSVP from a terminal")]
struct Args {
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: String,
    #[arg(long)]
    draft: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = client_core::load_settings(&args.config)?;
    if let Some(path) = args.draft {
        settings.draft_path = path;
    }
    info!(
        network = settings.network_enabled(),
        url = %settings.rsvp_url(),
        "invite: settings loaded"
    );
    let settings = Arc::new(settings);

    let store = Arc::new(JsonFileDraftStore::new(settings.draft_path.clone()));
    let controller =
        SubmissionController::new(settings.clone(), WEDDING, Arc::new(HttpTransport::new()));
    let wizard = Wizard::new(controller, store);

    redraw(&wizard).await;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => run(&wizard, command).await,
            Err(message) => println!("{message}"),
        }
    }
    Ok(())
}

async fn run(wizard: &Wizard, command: Command) {
    let transition = match command {
        Command::Open => {
            wizard.open().await;
            None
        }
        Command::Next => Some(wizard.next().await),
        Command::Back => Some(wizard.prev().await),
        Command::Go(index) => Some(wizard.go(index).await),
        Command::Submit => Some(wizard.submit_and_continue().await),
        Command::Set(field, value) => {
            if let Err(message) = apply_edit(wizard, field, value).await {
                println!("{message}");
                return;
            }
            None
        }
        Command::Status => {
            match render::status_line(&wizard.status().await) {
                Some(line) => println!("{line}"),
                None => println!("nothing sent yet"),
            }
            return;
        }
        Command::Help => {
            println!("{HELP}");
            return;
        }
        Command::Show | Command::Quit => None,
    };

    if transition == Some(Transition::NotOpened) {
        println!("open the invitation first");
        return;
    }
    redraw(wizard).await;
}

async fn apply_edit(wizard: &Wizard, field: Field, value: String) -> Result<(), String> {
    if field == Field::Guests {
        let guests: i64 = value
            .parse()
            .map_err(|_| format!("'{value}' is not a whole number"))?;
        wizard.edit_draft(|d| d.guests = guests).await;
        return Ok(());
    }
    wizard
        .edit_draft(|d| match field {
            Field::Name => d.name = value,
            Field::Attending => d.attending = value,
            Field::Diet => d.diet = value,
            Field::Note => d.note = value,
            Field::Guests => {}
        })
        .await;
    Ok(())
}

async fn redraw(wizard: &Wizard) {
    let state = wizard.state().await;
    let draft = wizard.draft().await;
    println!("\n{}", render::step_screen(&state, &draft));
    if let Some(line) = render::status_line(&wizard.status().await) {
        println!("{line}");
    }
}
