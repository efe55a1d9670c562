//! # parkhubctl: parking lot admin command line
//!
//! Composition root that wires the adapters into one [`Session`] and runs a
//! single command against the backend.
//!
//! ## Responsibilities
//! - Parse the command line and load configuration (file, env vars)
//! - Initialise `tracing` from the configured filter
//! - Construct the reqwest API client around the shared token
//! - Sign in with configured credentials when no token is configured
//! - Start the Socket.IO status feed for `watch`
//! - Handle Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod cli;
mod config;

use std::error::Error;

use parkhub_adapter_http_reqwest::ReqwestApiClient;
use parkhub_adapter_socketio::SocketIoListener;
use parkhub_app::session::Session;
use parkhub_domain::error::{NotFoundError, ParkHubError};
use parkhub_domain::history::{HistoryLog, ParkingLotHistory};
use parkhub_domain::id::ParkingLotId;
use parkhub_domain::parking_lot::ParkingLot;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, USAGE};
use crate::config::Config;

type AppSession = Session<ReqwestApiClient>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(Command::Help) => {
            println!("{USAGE}");
            return Ok(());
        }
        Ok(command) => command,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    let config = Config::load()?;
    init_tracing(&config.logging.filter);
    tracing::debug!(?config, "configuration loaded");

    // REST client and session
    let token = config.token_cell();
    let api = ReqwestApiClient::new(&config.api, token.clone())?;
    let session = Session::new(api, token, config.uploads.folder.clone());

    sign_in(&session, &config).await?;

    match command {
        Command::Lots => {
            for lot in session.parking_lots().list().await? {
                print_summary(&lot);
            }
        }
        Command::Show(id) => {
            let lot = find(&session, &id).await?;
            println!("{}", serde_json::to_string_pretty(&lot)?);
        }
        Command::History(id) => {
            session.parking_lots().get_history(&id).await?;
            print_new(&session.parking_lots().history(&id), 0);
        }
        Command::Watch(id) => watch(&session, &config, id).await?,
        Command::Delete(id) => {
            session.parking_lots().list().await?;
            session
                .parking_lots()
                .remove_with_images(&id, session.storage())
                .await?;
            println!("deleted {id}");
        }
        Command::Owners => {
            for owner in session.users().owners().await? {
                println!("{}\t{}", owner.id, owner.email);
            }
        }
        Command::Nodes => {
            for node in session.nodes().list().await? {
                println!(
                    "{}\t{}\t{}",
                    node.id,
                    node.code.as_deref().unwrap_or("-"),
                    node.version.map_or_else(|| "-".to_string(), |v| format!("{v:?}"))
                );
            }
        }
        Command::Help => println!("{USAGE}"),
    }

    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn sign_in(session: &AppSession, config: &Config) -> Result<(), ParkHubError> {
    if session.token().is_present() {
        return Ok(());
    }
    match config.auth.credentials() {
        Some((email, password)) => {
            let user = session.auth().login(email, password).await?;
            tracing::info!(email = %user.email, "signed in");
        }
        None => tracing::warn!("no token or credentials configured, sending anonymous requests"),
    }
    Ok(())
}

async fn find(session: &AppSession, id: &ParkingLotId) -> Result<ParkingLot, ParkHubError> {
    session.parking_lots().list().await?;
    session.parking_lots().get(id).ok_or_else(|| {
        NotFoundError {
            entity: "ParkingLot",
            id: id.to_string(),
        }
        .into()
    })
}

/// Print the fetched history, then every record the live feed appends.
async fn watch(
    session: &AppSession,
    config: &Config,
    id: ParkingLotId,
) -> Result<(), Box<dyn Error>> {
    if !config.realtime.enabled {
        return Err("the real-time feed is disabled in configuration".into());
    }

    let store = session.parking_lots();
    store.get_history(&id).await?;
    let mut printed = print_new(&store.history(&id), 0);

    let mut changes = store.subscribe();
    session.watch_history(id.clone());

    let cancel = CancellationToken::new();
    let mut feed = SocketIoListener::new(
        config.realtime.clone(),
        session.token().clone(),
        session.status_bus(),
    )
    .spawn(cancel.clone());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let outcome: Result<(), Box<dyn Error>> = loop {
        tokio::select! {
            signal = &mut shutdown => {
                tracing::info!("interrupted, stopping");
                break signal.map_err(Into::into);
            }
            joined = &mut feed => {
                break match joined {
                    Ok(result) => result.map_err(Into::into),
                    Err(err) => Err(err.into()),
                };
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                printed = print_new(&store.history(&id), printed);
            }
        }
    };

    cancel.cancel();
    session.stop_history();
    outcome
}

fn print_summary(lot: &ParkingLot) {
    let id = lot.id.as_ref().map_or("-", |id| id.as_str());
    println!(
        "{id}\t{}\t{}\t{:?}\t{:?}",
        lot.code, lot.name, lot.status, lot.availability
    );
}

fn print_record(record: &ParkingLotHistory) {
    println!(
        "{}\t{:?}\t{:?}\t{}",
        record.updated_at.to_rfc3339(),
        record.status,
        record.availability,
        record.id
    );
}

/// Print the records past `already`; returns the new printed count.
fn print_new(log: &HistoryLog, already: usize) -> usize {
    for record in log.records().iter().skip(already) {
        print_record(record);
    }
    log.len().max(already)
}
