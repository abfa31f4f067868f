//! # LLM Cost Compare
//!
//! Compare per-query, monthly and yearly LLM API costs across models from
//! the OpenRouter catalog
//!
//! ## Key Components
//! - [`pricing`] - Pure cost calculation and ranking engine
//! - [`store`] - Selection state container with observer subscriptions
//! - [`catalog`] - Async client for the remote model catalog
//! - [`display`] - Tiered cost formatting and report rendering

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod display;
pub mod pricing;
pub mod store;
