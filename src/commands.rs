//! # Commands Module
//!
//! Command handlers for compare, list, and volumes operations
//!
//! ## Key Components
//! - [`handle_compare_command`] - Fetch, select, and compare models
//! - [`handle_list_command`] - List or search the model catalog
//! - [`handle_volumes_command`] - Print the query-volume presets

use anyhow::{Context, Result};
use log::debug;

use crate::catalog::CatalogClient;
use crate::display::{format_catalog_entry, format_comparison_table, generate_insight};
use crate::pricing::{self, QUERY_VOLUMES};
use crate::store::SelectionStore;

/// Handle the compare command: drive the selection store through a catalog
/// fetch and slot assignment, then run the pricing engine over the active
/// models.
pub async fn handle_compare_command(
    model_ids: &[String],
    volume: u64,
    columns: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut store = SelectionStore::new(CatalogClient::new());

    store.fetch_catalog().await;
    if let Some(error) = &store.state().last_error {
        anyhow::bail!("{error}");
    }

    store.set_active_columns(columns.unwrap_or(model_ids.len()));

    for (slot, model_id) in model_ids.iter().enumerate() {
        let model = store
            .state()
            .catalog
            .iter()
            .find(|m| &m.id == model_id)
            .cloned()
            .with_context(|| {
                format!(
                    "Model '{model_id}' not found in the catalog. \
                     Try `llmcompare list --search {model_id}` to find the exact id."
                )
            })?;
        store.select_model(slot, model);
    }

    let active_models = store.active_models();
    debug!(
        "Comparing {} models at volume {volume}",
        active_models.len()
    );

    let report = pricing::compare_models(&active_models, volume as f64)
        .context("Failed to calculate the price comparison")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_comparison_table(&report));
        println!("{}", generate_insight(&report));
    }

    Ok(())
}

/// Handle the list command: print catalog entries, optionally filtered.
pub async fn handle_list_command(
    search: Option<&str>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let client = CatalogClient::new();

    let mut models = match search {
        Some(query) if !query.trim().is_empty() => client
            .search_models(query)
            .await
            .context("Failed to search the model catalog")?,
        _ => client
            .list_models()
            .await
            .context("Failed to fetch the model catalog")?,
    };

    if let Some(limit) = limit {
        models.truncate(limit);
    }

    if models.is_empty() {
        println!("No models matched.");
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
    } else {
        println!(
            "{:<48} {:>12} {:>12} {:>8}  {}",
            "ID", "Prompt", "Completion", "Context", "Name"
        );
        for model in &models {
            println!("{}", format_catalog_entry(model));
        }
        println!("\n{} models. Prices are per million tokens.", models.len());
    }

    Ok(())
}

/// Handle the volumes command: print the preset table.
pub fn handle_volumes_command() {
    println!("{:<20} {:<24} Context", "Volume", "Scenario");
    for preset in QUERY_VOLUMES {
        println!(
            "{:<20} {:<24} {}",
            preset.label, preset.description, preset.context
        );
    }
    println!(
        "\nDefault volume: {} queries/month.",
        pricing::DEFAULT_QUERY_VOLUME as u64
    );
}
