//! CLI Gallery and History Subcommands
//!
//! Read-only views over what the webhook has preserved, newest first.

use anyhow::Result;
use clap::Subcommand;
use keeper_core::{DocumentStore, GalleryItem, HistoryEntry, collections};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::terminal_output::{Column, note_warn, render_table};

#[derive(Subcommand)]
pub enum GalleryCommands {
    /// List gallery items
    List,
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List recent history entries
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

pub async fn run_gallery(cmd: GalleryCommands, store: &dyn DocumentStore) -> Result<()> {
    match cmd {
        GalleryCommands::List => {
            let items = gallery_items(store).await?;
            if items.is_empty() {
                note_warn("The gallery is empty");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = items
                .into_iter()
                .map(|item| {
                    vec![
                        item.created_at.format("%Y-%m-%d %H:%M").to_string(),
                        item.kind.to_string(),
                        item.contributor,
                        item.caption,
                        item.url,
                    ]
                })
                .collect();
            let columns = [
                Column::new("Added"),
                Column::new("Type"),
                Column::max("Contributor", 24),
                Column::max("Caption", 40),
                Column::new("URL"),
            ];
            print!("{}", render_table(&columns, &rows));
        }
    }
    Ok(())
}

pub async fn run_history(cmd: HistoryCommands, store: &dyn DocumentStore) -> Result<()> {
    match cmd {
        HistoryCommands::List { limit } => {
            let entries = history_entries(store, limit).await?;
            if entries.is_empty() {
                note_warn("No history yet");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = entries
                .into_iter()
                .map(|entry| {
                    vec![
                        entry.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                        entry.contributor,
                        format!("{:?}", entry.action).to_lowercase(),
                        format!("{:?}", entry.item_type).to_lowercase(),
                        entry.item_name,
                    ]
                })
                .collect();
            let columns = [
                Column::new("When"),
                Column::max("Contributor", 24),
                Column::new("Action"),
                Column::new("Type"),
                Column::max("Item", 40),
            ];
            print!("{}", render_table(&columns, &rows));
        }
    }
    Ok(())
}

async fn load_all<T: DeserializeOwned>(store: &dyn DocumentStore, collection: &str) -> Result<Vec<T>> {
    Ok(store
        .list(collection)
        .await?
        .into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(collection, error = %e, "Skipping malformed document");
                None
            }
        })
        .collect())
}

/// Gallery items, newest first.
pub async fn gallery_items(store: &dyn DocumentStore) -> Result<Vec<GalleryItem>> {
    let mut items: Vec<GalleryItem> = load_all(store, collections::GALLERY).await?;
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(items)
}

/// At most `limit` history entries, newest first.
pub async fn history_entries(store: &dyn DocumentStore, limit: usize) -> Result<Vec<HistoryEntry>> {
    let mut entries: Vec<HistoryEntry> = load_all(store, collections::HISTORY).await?;
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(limit);
    Ok(entries)
}
