//! CLI Status Command
//!
//! Queries the health endpoint of a running server.

use anyhow::Result;

use crate::terminal_output::{note_error, note_success};

pub async fn run(port: u16) -> Result<()> {
    let url = format!("http://localhost:{port}/api/health");
    let client = reqwest::Client::new();
    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let body: serde_json::Value = resp.json().await?;
            note_success(&format!("Archive Keeper is running on port {port}"));
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Ok(resp) => {
            note_error(&format!("Health check returned {}", resp.status()));
        }
        Err(_) => {
            note_error(&format!("Archive Keeper is not running on port {port}"));
        }
    }
    Ok(())
}
