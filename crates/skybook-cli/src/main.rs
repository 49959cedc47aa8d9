//! `skybook`: search, inspect and edit flights from the terminal.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use skybook_models::{FormGroup, ValidationError};
use skybook_sdk::editor::{FIELD_DATE, FIELD_FROM, FIELD_TO};
use skybook_sdk::{
    ClientConfig, FlightClient, FlightEditor, FlightSearch, FlightTransport, SearchOptions,
    StatusMessage,
};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "skybook")]
#[command(about = "Flight booking client")]
#[command(author, version, long_about = None)]
struct Cli {
    /// Booking service endpoint (overrides FLIGHT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Verbose orchestrator traces (overrides FLIGHT_DEBUG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search flights between two cities
    Search {
        #[arg(long, default_value = skybook_sdk::search::DEFAULT_FROM)]
        from: String,

        #[arg(long, default_value = skybook_sdk::search::DEFAULT_TO)]
        to: String,

        /// Select the N-th result (starting at 1)
        #[arg(long)]
        select: Option<usize>,

        /// Flip the delay flag of the selected flight
        #[arg(long, requires = "select")]
        toggle_delayed: bool,

        /// Save the selected flight
        #[arg(long, requires = "select")]
        save: bool,
    },

    /// Show one flight
    Show {
        id: i64,
    },

    /// Load a flight, change it and save it
    Edit {
        id: i64,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        /// Departure time, e.g. 2024-01-01T10:00:00.0000000+00:00
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        delayed: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config.base_url = url;
    }
    if cli.debug {
        config.log.debug = true;
    }
    debug!(base_url = %config.base_url, "using booking service");

    let client = FlightClient::from_config(&config)?;

    match cli.command {
        Command::Search {
            from,
            to,
            select,
            toggle_delayed,
            save,
        } => {
            let search = FlightSearch::new(
                client,
                SearchOptions {
                    validate: true,
                    log: config.log,
                },
            );
            search.set_from(&from);
            search.set_to(&to);

            let Some(task) = search.search() else {
                print_form_errors(&search.criteria());
                bail!("invalid search criteria");
            };
            task.await?;
            report(search.message())?;

            let results = search.results();
            for (n, flight) in results.iter().enumerate() {
                println!("{:>3}. {flight}", n + 1);
            }

            let Some(n) = select else {
                return Ok(());
            };
            let flight = n
                .checked_sub(1)
                .and_then(|i| results.get(i))
                .ok_or_else(|| anyhow!("no result number {n} ({} found)", results.len()))?;
            search.select(flight.clone());

            if toggle_delayed {
                if let Some(toggled) = search.toggle_delayed() {
                    println!("selected: {toggled}");
                }
            }
            if save {
                if let Some(task) = search.save() {
                    task.await?;
                }
                report(search.message())?;
                if let Some(saved) = search.selected() {
                    println!("saved: {saved}");
                }
            }
        }

        Command::Show { id } => {
            let flight = client
                .find_by_id(id)
                .await
                .with_context(|| format!("loading flight {id}"))?;
            println!("{flight}");
        }

        Command::Edit {
            id,
            from,
            to,
            date,
            delayed,
        } => {
            let editor = FlightEditor::new(client, config.log);
            if let Some(task) = editor.load(id) {
                task.await?;
            }
            report(editor.message())?;

            if let (Some(delayed), Some(flight)) = (delayed, editor.flight()) {
                editor.set_flight(flight.with_delayed(delayed));
            }
            let edits = [(FIELD_FROM, from), (FIELD_TO, to), (FIELD_DATE, date)];
            for (field, value) in edits {
                if let Some(value) = value {
                    editor.set_field(field, &value)?;
                }
            }

            match editor.submit().await {
                Ok(Some(task)) => task.await?,
                Ok(None) => {}
                Err(err) => {
                    print_validation_errors(&err);
                    bail!("flight {id} not saved");
                }
            }
            report(editor.message())?;
            if let Some(saved) = editor.flight() {
                println!("{saved}");
            }
        }
    }

    Ok(())
}

/// Print the status line; error statuses fail the command.
fn report(message: Option<StatusMessage>) -> Result<()> {
    match message {
        Some(message) if message.is_error() => bail!("{message}"),
        Some(message) => {
            println!("{message}");
            Ok(())
        }
        None => Ok(()),
    }
}

fn print_form_errors(form: &FormGroup) {
    print_validation_errors(&form.errors());
}

fn print_validation_errors(err: &ValidationError) {
    for (field, errors) in &err.fields {
        for error in errors {
            eprintln!("  {field}: {error}");
        }
    }
}
