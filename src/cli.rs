//! # CLI Module
//!
//! Command-line interface definitions and argument parsing for llmcompare
//!
//! ## Key Components
//! - [`Args`] - Main CLI arguments structure
//! - [`Commands`] - Subcommand definitions

use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare the costs of 2-4 models at an assumed query volume
    Compare {
        /// Model ids from the catalog (e.g. anthropic/claude-3.5-sonnet)
        #[arg(required = true, num_args = 2..=4)]
        models: Vec<String>,

        /// Assumed queries per month
        #[arg(long, default_value = "1000000")]
        volume: u64,

        /// Number of comparison columns (2-4); defaults to the model count
        #[arg(long)]
        columns: Option<usize>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List catalog models with per-million-token prices
    List {
        /// Filter by case-insensitive substring of name, id, or description
        #[arg(long)]
        search: Option<String>,

        /// Show at most N entries
        #[arg(long)]
        limit: Option<usize>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the query-volume presets
    Volumes,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "LLM Cost Compare - per-query, monthly and yearly cost comparison across OpenRouter models"
)]
pub struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}
