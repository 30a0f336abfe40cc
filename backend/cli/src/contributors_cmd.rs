//! CLI Contributors Subcommands
//!
//! Registers family members so texts from their phone are credited by name.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use keeper_core::{ContributorProfile, ContributorRole, DocumentStore, PhoneNumber, collections};
use tracing::warn;
use uuid::Uuid;

use crate::terminal_output::{Column, note_success, note_warn, render_table};

#[derive(Subcommand)]
pub enum ContributorCommands {
    /// Register a contributor
    Add {
        #[arg(long)]
        name: String,
        /// Phone number exactly as the provider reports it, e.g. +15551234567
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "user")]
        role: ContributorRole,
    },
    /// List registered contributors
    List,
}

pub async fn run(cmd: ContributorCommands, store: &dyn DocumentStore) -> Result<()> {
    match cmd {
        ContributorCommands::Add {
            name,
            phone,
            email,
            role,
        } => {
            let profile = add_contributor(store, &name, &phone, email, role).await?;
            note_success(&format!("Added {} ({})", profile.name, profile.id));
        }
        ContributorCommands::List => {
            let contributors = list_contributors(store).await?;
            if contributors.is_empty() {
                note_warn("No contributors registered");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = contributors
                .into_iter()
                .map(|c| {
                    vec![
                        c.name,
                        c.phone.unwrap_or_default(),
                        c.role.to_string(),
                        c.email.unwrap_or_default(),
                        c.id,
                    ]
                })
                .collect();
            let columns = [
                Column::max("Name", 32),
                Column::new("Phone"),
                Column::new("Role"),
                Column::max("Email", 32),
                Column::new("ID"),
            ];
            print!("{}", render_table(&columns, &rows));
        }
    }
    Ok(())
}

/// Store a new contributor. A phone number can belong to one contributor only.
pub async fn add_contributor(
    store: &dyn DocumentStore,
    name: &str,
    phone: &str,
    email: Option<String>,
    role: ContributorRole,
) -> Result<ContributorProfile> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Contributor name cannot be empty");
    }
    let Some(phone) = PhoneNumber::parse(phone) else {
        bail!("Contributor phone cannot be empty");
    };

    let existing = store
        .query_by_field(collections::CONTRIBUTORS, "phone", phone.as_str())
        .await?;
    if !existing.is_empty() {
        bail!("A contributor with phone {} already exists", phone.masked());
    }

    let profile = ContributorProfile {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        avatar: String::new(),
        role,
        email: email.filter(|e| !e.trim().is_empty()),
        phone: Some(phone.as_str().to_string()),
    };
    store
        .set(
            collections::CONTRIBUTORS,
            &profile.id,
            serde_json::to_value(&profile)?,
        )
        .await
        .context("Failed to save contributor")?;
    Ok(profile)
}

/// All contributors, sorted by name. Documents that do not parse are skipped.
pub async fn list_contributors(store: &dyn DocumentStore) -> Result<Vec<ContributorProfile>> {
    let mut contributors: Vec<ContributorProfile> = store
        .list(collections::CONTRIBUTORS)
        .await?
        .into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Skipping malformed contributor document");
                None
            }
        })
        .collect();
    contributors.sort_by_key(|c| c.name.to_lowercase());
    Ok(contributors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_store::InMemoryDocumentStore;
    use serde_json::json;

    #[tokio::test]
    async fn added_contributor_is_found_by_phone() {
        let store = InMemoryDocumentStore::new();
        let profile = add_contributor(&store, " Jane Doe ", "+15551234567", None, ContributorRole::Admin)
            .await
            .unwrap();
        assert_eq!(profile.name, "Jane Doe");

        let found = store
            .query_by_field(collections::CONTRIBUTORS, "phone", "+15551234567")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["name"], "Jane Doe");
        assert_eq!(found[0]["role"], "admin");
    }

    #[tokio::test]
    async fn duplicate_phone_is_rejected() {
        let store = InMemoryDocumentStore::new();
        add_contributor(&store, "Jane", "+15551234567", None, ContributorRole::User)
            .await
            .unwrap();
        let err = add_contributor(&store, "John", "+15551234567", None, ContributorRole::User)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("+*******4567"));
    }

    #[tokio::test]
    async fn blank_inputs_are_rejected() {
        let store = InMemoryDocumentStore::new();
        assert!(add_contributor(&store, "  ", "+15551234567", None, ContributorRole::User).await.is_err());
        assert!(add_contributor(&store, "Jane", " ", None, ContributorRole::User).await.is_err());
    }

    #[tokio::test]
    async fn list_is_sorted_and_skips_malformed() {
        let store = InMemoryDocumentStore::new();
        add_contributor(&store, "zoe", "+15550000001", None, ContributorRole::User).await.unwrap();
        add_contributor(&store, "Adam", "+15550000002", None, ContributorRole::User).await.unwrap();
        store
            .set(collections::CONTRIBUTORS, "bad", json!({ "nickname": "??" }))
            .await
            .unwrap();

        let names: Vec<_> = list_contributors(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Adam", "zoe"]);
    }
}
