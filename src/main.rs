// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing
    )
)]

mod logging;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use folio_sync::item::{CollectionKind, Project, Sequenced, Skill, SocialLink};
use folio_sync::ordering::sort_for_display;
use folio_sync::store::{Fields, JsonFileStore, SequencedStore};
use folio_sync::sync::{MoveEvent, ReorderEngine};
use folio_sync::user_config::{load_user_config, resolve_data_dir, UserConfig};
use logging::{init_logging, parse_rotation, LogConfig, LOG_FILENAME};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Folio - manage and reorder portfolio collections
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the collection files (default: ~/.folio/data)
    #[arg(long, env = "FOLIO_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Enable JSON log format
    #[arg(long, env = "FOLIO_LOG_JSON", default_value = "false", global = true)]
    log_json: bool,

    /// Log rotation period: daily, hourly, or never
    #[arg(long, env = "FOLIO_LOG_ROTATION", default_value = "daily", global = true)]
    log_rotation: String,

    /// Custom log directory (default: ~/.folio/logs)
    #[arg(long, env = "FOLIO_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Print every item of a collection as JSON lines, in display order
    List { collection: CollectionKind },

    /// Create an item from a JSON object of fields
    Create {
        collection: CollectionKind,
        #[arg(long)]
        fields: String,
    },

    /// Merge a JSON object of fields into an existing item
    Update {
        collection: CollectionKind,
        id: String,
        #[arg(long)]
        fields: String,
    },

    /// Delete an item
    Delete { collection: CollectionKind, id: String },

    /// Move the item at FROM to TO and persist the new order
    Move {
        collection: CollectionKind,
        from: usize,
        to: usize,
        /// Refuse the move unless this item is currently at FROM
        #[arg(long)]
        expect_id: Option<String>,
    },
}

impl Command {
    fn collection(&self) -> CollectionKind {
        match self {
            Command::List { collection }
            | Command::Create { collection, .. }
            | Command::Update { collection, .. }
            | Command::Delete { collection, .. }
            | Command::Move { collection, .. } => *collection,
        }
    }
}

/// Parse a `--fields` argument, which must be a JSON object
fn parse_fields(raw: &str) -> Result<Fields> {
    match serde_json::from_str::<serde_json::Value>(raw).wrap_err("--fields is not valid JSON")? {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(eyre!("--fields must be a JSON object, got {other}")),
    }
}

fn print_items<T: Serialize>(items: &[T]) -> Result<()> {
    for item in items {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}

async fn run<T>(data_dir: &Path, command: Command) -> Result<()>
where
    T: Sequenced + Serialize + DeserializeOwned,
{
    let store = Arc::new(JsonFileStore::<T>::new(data_dir));

    match command {
        Command::List { .. } => {
            let mut items = store.list_items().await?;
            sort_for_display(&mut items);
            print_items(&items)?;
        }
        Command::Create { fields, .. } => {
            let item = store.create_item(parse_fields(&fields)?).await?;
            print_items(&[item])?;
        }
        Command::Update { id, fields, .. } => {
            store.update_item(&id, parse_fields(&fields)?).await?;
        }
        Command::Delete { id, .. } => {
            store.delete_item(&id).await?;
        }
        Command::Move {
            from,
            to,
            expect_id,
            ..
        } => {
            let engine = ReorderEngine::start(store);
            engine.refresh().await?;
            let handle = match expect_id {
                Some(item_id) => engine.apply_move(&MoveEvent::new(item_id, from, to))?,
                None => engine.reorder(from, to)?,
            };
            handle.wait().await?;
            print_items(&engine.items())?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre error hooks for colored error output
    color_eyre::install()?;

    // Parse CLI arguments first (before logging, so we can use log config)
    let args = Args::parse();

    let mut log_config = LogConfig {
        json_format: args.log_json,
        rotation: parse_rotation(&args.log_rotation),
        ..Default::default()
    };
    if let Some(log_dir) = args.log_dir {
        log_config.log_dir = log_dir;
    }
    let log_file = log_config.log_dir.join(LOG_FILENAME);

    if let Err(e) = init_logging(log_config) {
        eprintln!("Error: Failed to initialize logging: {e}");
        eprintln!("Logs: {}", log_file.display());
        return Err(e);
    }

    // Load user-level config (~/.folio/config.toml); file is optional.
    let user_cfg = load_user_config().unwrap_or_else(|e| {
        warn!("Failed to load user config, using defaults: {e}");
        UserConfig::default()
    });
    let data_dir = resolve_data_dir(args.data_dir, &user_cfg);

    let collection = args.command.collection();
    info!(%collection, data_dir = %data_dir.display(), "Running {:?}", args.command);

    match collection {
        CollectionKind::Projects => run::<Project>(&data_dir, args.command).await,
        CollectionKind::Skills => run::<Skill>(&data_dir, args.command).await,
        CollectionKind::SocialLinks => run::<SocialLink>(&data_dir, args.command).await,
    }
}
