use std::time::Duration;

use chrono::Local;
use clap::Subcommand;
use serde::Serialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::{error, info, warn};

use portal::api_client::Endpoint;
use portal::errors::AppError;
use portal::models::profile::{ProfileSnapshot, Section, UserId};
use portal::profile::SUBJECT_PARAM;
use portal::state::AppState;
use portal::store::device::USER_ID_KEY;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Remember a user id on this device
    Login { user_id: UserId },
    /// Forget the user id stored on this device
    Logout,
    /// Fetch every profile section of the stored user and print the result
    Profile {
        /// Print only this section (wire name, e.g. `education`)
        #[arg(short, long)]
        section: Option<String>,
        /// Include the shared personal-details and employment store in the output
        #[arg(long)]
        shared: bool,
    },
    /// Delete one entry of a list section, then refresh that section
    Remove { section: String, entry_id: String },
    /// Show the onboarding registration steps of the stored user
    Steps,
    /// List job postings, optionally filtered
    Jobs {
        /// Case-insensitive match on company, title, department or skill
        #[arg(short, long)]
        search: Option<String>,
        /// Postings recommended for the stored user's skills
        #[arg(long, conflicts_with = "search")]
        recommended: bool,
        /// Only postings from the last two days
        #[arg(long, conflicts_with_all = ["search", "recommended"])]
        recent: bool,
    },
    /// Keep the profile in sync with the user id stored on this device
    Watch {
        /// Seconds between device-store polls
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
    },
}

pub async fn handle(state: &AppState, command: &Command) -> Result<(), AppError> {
    match command {
        Command::Login { user_id } => {
            state.device.set_subject_id(*user_id)?;
            info!(
                "Stored {USER_ID_KEY}={user_id} in {}",
                state.device.path().display()
            );
            Ok(())
        }
        Command::Logout => {
            if state.device.remove(USER_ID_KEY)? {
                info!("Removed stored {USER_ID_KEY}");
            } else {
                info!("No user id was stored");
            }
            Ok(())
        }
        Command::Profile { section, shared } => profile(state, section.as_deref(), *shared).await,
        Command::Remove { section, entry_id } => remove(state, section, entry_id).await,
        Command::Steps => steps(state).await,
        Command::Jobs {
            search,
            recommended,
            recent,
        } => jobs(state, search.as_deref(), *recommended, *recent).await,
        Command::Watch { interval_secs } => watch_profile(state, *interval_secs).await,
    }
}

fn require_subject(state: &AppState) -> Result<UserId, AppError> {
    state.device.subject_id()?.ok_or(AppError::NoSubject)
}

fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => error!("Could not render output: {e}"),
    }
}

fn section_report(snapshot: &ProfileSnapshot, section: Section) -> serde_json::Value {
    json!({
        "section": section,
        "data": snapshot.profile_detail.get(section),
        "loading": snapshot.loading_states.is_loading(section),
        "error": snapshot.errors.get(section),
    })
}

async fn profile(state: &AppState, section: Option<&str>, shared: bool) -> Result<(), AppError> {
    // Validate before spending twelve requests on it
    let section = section.map(str::parse::<Section>).transpose()?;
    let subject = require_subject(state)?;

    let aggregator = state.aggregator();
    aggregator.set_subject(Some(subject)).await;
    let snapshot = aggregator.snapshot();

    for (failed, message) in snapshot.errors.iter() {
        warn!("{failed}: {message}");
    }

    let mut output = match section {
        Some(section) => section_report(&snapshot, section),
        None => serde_json::to_value(&snapshot).map_err(anyhow::Error::from)?,
    };
    if shared {
        output["shared"] =
            serde_json::to_value(state.shared.snapshot()).map_err(anyhow::Error::from)?;
    }
    print_json(&output);
    Ok(())
}

async fn remove(state: &AppState, section: &str, entry_id: &str) -> Result<(), AppError> {
    let section: Section = section.parse()?;
    let subject = require_subject(state)?;

    let aggregator = state.aggregator();
    aggregator.set_subject(Some(subject)).await;
    aggregator.remove_entry(section, entry_id).await?;

    print_json(&section_report(&aggregator.snapshot(), section));
    Ok(())
}

async fn steps(state: &AppState) -> Result<(), AppError> {
    let subject = require_subject(state)?;
    let envelope = state
        .api
        .get(
            Endpoint::RegisterSteps,
            &[(SUBJECT_PARAM.to_string(), subject.to_string())],
        )
        .await?;
    let steps = envelope.into_result(|| "Failed to fetch registration steps".to_string())?;
    print_json(&steps);
    Ok(())
}

async fn jobs(
    state: &AppState,
    search: Option<&str>,
    recommended: bool,
    recent: bool,
) -> Result<(), AppError> {
    let board = state.job_board();
    let today = Local::now().date_naive();

    let listings = if recommended {
        board.recommended(require_subject(state)?, today).await?
    } else if recent {
        board.recent(today).await?
    } else if let Some(query) = search {
        board.search(query, today).await?
    } else {
        board.list(today).await?
    };

    info!("{} job postings", listings.len());
    print_json(&listings);
    Ok(())
}

async fn watch_profile(state: &AppState, interval_secs: u64) -> Result<(), AppError> {
    let aggregator = state.aggregator();
    let (tx, rx) = watch::channel(None);
    let device = state.device.clone();

    let poll_device = async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            ticker.tick().await;
            let store = device.clone();
            let read = tokio::task::spawn_blocking(move || store.subject_id()).await;
            match read {
                Ok(Ok(subject)) => {
                    tx.send_if_modified(|current| {
                        if *current == subject {
                            return false;
                        }
                        *current = subject;
                        true
                    });
                }
                Ok(Err(e)) => warn!("Could not read device store: {e}"),
                Err(e) => error!("Device store poll task failed: {e}"),
            }
        }
    };

    info!(
        "Watching {} for user changes (Ctrl-C to stop)",
        state.device.path().display()
    );
    tokio::select! {
        _ = aggregator.follow_subject(rx, |agg| print_json(&agg.snapshot())) => {}
        _ = poll_device => {}
        _ = tokio::signal::ctrl_c() => info!("Stopping watch"),
    }
    Ok(())
}
