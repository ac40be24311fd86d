//! # sundayschool-app
//!
//! Host process for the Sunday School Time data layer.
//!
//! Opens the store (creating and migrating it as needed), reports where
//! everything lives and what it holds, and optionally takes a backup.
//! The report is printed to stdout as a JSON envelope, the same shape the
//! desktop shell receives from every store operation.
//!
//! ```text
//! sundayschool-app            # status report
//! sundayschool-app backup     # status report, then a backup
//! sundayschool-app backups    # list backups on disk
//! ```

use serde::Serialize;
use sundayschool_shared::constants::APP_NAME;
use sundayschool_store::{Database, Envelope, Inventory, StoreConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    data_dir: String,
    database: String,
    photos_dir: String,
    backups_dir: String,
    schema_version: u32,
    inventory: Inventory,
    #[serde(skip_serializing_if = "Option::is_none")]
    backup: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON report only.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("warn,sundayschool_app=debug,sundayschool_store=info")
            }),
        )
        .init();

    info!("Starting {} data layer v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let config = StoreConfig::from_env();
    info!(?config, "Loaded configuration");

    let command = std::env::args().nth(1);
    let mut db = Database::open(&config)?;

    let output = match command.as_deref() {
        Some("backups") => json(&Envelope::from(db.list_backups()))?,
        None | Some("backup") => {
            let wants_backup = config.backup_on_start || command.is_some();
            json(&Envelope::from(status(&db, wants_backup)))?
        }
        Some(other) => anyhow::bail!("unknown command `{other}` (expected `backup` or `backups`)"),
    };
    println!("{output}");

    db.close();
    Ok(())
}

fn status(db: &Database, take_backup: bool) -> sundayschool_store::Result<Status> {
    let backup = if take_backup {
        Some(db.backup()?.display().to_string())
    } else {
        None
    };

    Ok(Status {
        data_dir: db.data_dir().display().to_string(),
        database: db.storage_path().display().to_string(),
        photos_dir: db.photos_dir().display().to_string(),
        backups_dir: db.backups_dir().display().to_string(),
        schema_version: db.schema_version(),
        inventory: db.inventory()?,
        backup,
    })
}

fn json<T: Serialize>(envelope: &Envelope<T>) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(envelope)?)
}

