//! # Display Module
//!
//! Cost formatting and text rendering for comparison reports
//!
//! ## Key Components
//! - [`format_cost_display`] - Tiered-precision dollar formatting
//! - [`format_comparison_table`] - Ranked results table for terminal output
//! - [`generate_insight`] - One-line narrative summary of a report

use crate::catalog::ModelDescriptor;
use crate::pricing::{ComparisonReport, RATIO_CAP, volume_description};

/// Costs below this are treated as free in narrative text. Display formatting
/// still shows the real figure.
const EFFECTIVELY_FREE: f64 = 0.000001;

fn is_effectively_free(cost: f64) -> bool {
    cost < EFFECTIVELY_FREE
}

/// Group the integer part of a non-negative value with commas, two decimals.
fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    format!("{grouped}.{frac_part}")
}

/// Dollar formatting with tiered precision. Per-query LLM costs span eight
/// orders of magnitude, so a single fixed precision would make one end or the
/// other unreadable. Never panics on NaN or infinite input.
pub fn format_cost_display(cost: f64) -> String {
    if cost.is_nan() {
        return "$0.00".to_string();
    }
    if cost.is_infinite() {
        return if cost > 0.0 {
            "$999,999+".to_string()
        } else {
            "$0.00".to_string()
        };
    }
    if cost < 0.0 {
        return format!("-{}", format_cost_display(-cost));
    }
    if cost == 0.0 {
        return "$0.00".to_string();
    }

    if cost < 0.0001 {
        format!("${:.6}", cost)
    } else if cost < 0.01 {
        format!("${:.4}", cost)
    } else if cost < 1.0 {
        format!("${:.3}", cost)
    } else if cost < 100.0 {
        format!("${:.2}", cost)
    } else if cost < 1000.0 {
        format!("${:.0}", cost)
    } else if cost >= RATIO_CAP {
        "$999,999+".to_string()
    } else {
        format!("${}", group_thousands(cost))
    }
}

pub fn format_cost_per_query(cost: f64) -> String {
    format!("{} per query", format_cost_display(cost))
}

pub fn format_monthly_cost(cost: f64) -> String {
    format!("{}/month", format_cost_display(cost))
}

pub fn format_yearly_cost(cost: f64) -> String {
    format!("{}/year", format_cost_display(cost))
}

/// Catalog price strings are per single token; shown as per-million for
/// readability in listings.
pub fn format_price_per_million(price: &str) -> String {
    let Ok(price_num) = price.trim().parse::<f64>() else {
        return "n/a".to_string();
    };
    if price_num == 0.0 {
        return "Free".to_string();
    }
    let per_million = price_num * 1_000_000.0;
    if per_million < 1.0 {
        format!("${:.3}/M", per_million)
    } else {
        format!("${:.2}/M", per_million)
    }
}

pub fn format_context_length(context_length: u64) -> String {
    if context_length >= 1_000_000 {
        format!("{:.1}M", context_length as f64 / 1_000_000.0)
    } else if context_length >= 1000 {
        format!("{:.0}K", context_length as f64 / 1000.0)
    } else {
        context_length.to_string()
    }
}

fn format_volume(volume: f64) -> String {
    if volume.fract() == 0.0 && volume >= 0.0 && volume < u64::MAX as f64 {
        let mut result = String::new();
        let s = (volume as u64).to_string();
        let chars: Vec<char> = s.chars().collect();
        for (i, c) in chars.iter().enumerate() {
            if i > 0 && (chars.len() - i) % 3 == 0 {
                result.push(',');
            }
            result.push(*c);
        }
        result
    } else {
        format!("{volume}")
    }
}

/// One-line narrative summary, tiered by how dramatic the cost gap is.
pub fn generate_insight(report: &ComparisonReport) -> String {
    let volume = format_volume(report.query_volume);

    if report.results.len() < 2 {
        return format!("Cost analysis for {volume} queries per month");
    }

    let description = volume_description(report.query_volume)
        .unwrap_or("queries")
        .to_lowercase();
    let cheapest = &report.cheapest_model;
    let most_expensive = &report.most_expensive_model;
    let spread = report.cost_spread;

    if is_effectively_free(cheapest.total_cost) && is_effectively_free(most_expensive.total_cost) {
        return format!(
            "Great news! All selected models are essentially free for {description} ({volume} queries/month)."
        );
    }

    if is_effectively_free(cheapest.total_cost) {
        return format!(
            "For {description} ({volume} queries/month), {} is essentially free while {} costs {}. Annual savings potential: {}.",
            cheapest.model_name,
            most_expensive.model_name,
            format_monthly_cost(most_expensive.total_cost),
            format_cost_display(most_expensive.total_cost * 12.0)
        );
    }

    if report.max_cost_ratio >= RATIO_CAP {
        return format!(
            "For {description} ({volume} queries/month), there's an extreme cost difference between models. {} costs {} more than {}. Choose wisely to save {} annually.",
            most_expensive.model_name,
            format_cost_display(spread),
            cheapest.model_name,
            format_cost_display(spread * 12.0)
        );
    }

    if report.max_cost_ratio >= 10.0 {
        format!(
            "For {description} ({volume} queries/month), {} costs {} more than {} — that's {:.1}x more expensive! Choosing wisely could save {} annually.",
            most_expensive.model_name,
            format_cost_display(spread),
            cheapest.model_name,
            report.max_cost_ratio,
            format_cost_display(spread * 12.0)
        )
    } else if report.max_cost_ratio >= 2.0 {
        format!(
            "For {description} ({volume} queries/month), {} is {:.1}x more expensive than {}. Annual savings potential: {}.",
            most_expensive.model_name,
            report.max_cost_ratio,
            cheapest.model_name,
            format_cost_display(spread * 12.0)
        )
    } else {
        format!(
            "For {description} ({volume} queries/month), model costs are relatively similar with {} monthly difference.",
            format_cost_display(spread)
        )
    }
}

/// Plain-text comparison table: ranked results, summary statistics, and the
/// pairwise differences.
pub fn format_comparison_table(report: &ComparisonReport) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(" ╭──────────────────────────────────────────────────╮\n");
    output.push_str(" │          LLM Cost Comparison Report              │\n");
    output.push_str(" ╰──────────────────────────────────────────────────╯\n");
    output.push('\n');
    output.push_str(&format!(
        "Assumed volume: {} queries/month\n\n",
        format_volume(report.query_volume)
    ));

    let name_width = report
        .results
        .iter()
        .map(|r| r.model_name.len())
        .max()
        .unwrap_or(5)
        .max(5);

    output.push_str(&format!(
        "{:<4} {:<name_width$} {:>14} {:>14} {:>14} {:>14}\n",
        "Rank", "Model", "Per query", "Monthly", "Yearly", "vs cheapest"
    ));
    output.push_str(&format!(
        "{}\n",
        "─".repeat(4 + 1 + name_width + 4 * 15)
    ));

    for result in &report.results {
        let relative = if result.ranking == 1 {
            "cheapest".to_string()
        } else if result.cost_ratio_from_cheapest >= RATIO_CAP {
            ">999,999x".to_string()
        } else {
            format!("{:.1}x", result.cost_ratio_from_cheapest)
        };
        output.push_str(&format!(
            "{:<4} {:<name_width$} {:>14} {:>14} {:>14} {:>14}\n",
            result.ranking,
            result.model_name,
            format_cost_display(result.cost_per_query),
            format_cost_display(result.total_cost),
            format_cost_display(result.yearly_projection),
            relative
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "Average monthly cost: {}   Spread: {}\n",
        format_cost_display(report.average_cost),
        format_cost_display(report.cost_spread)
    ));
    output.push_str(&format!(
        "Yearly projections:   {} – {} (avg {})\n",
        format_cost_display(report.yearly_projections.min),
        format_cost_display(report.yearly_projections.max),
        format_cost_display(report.yearly_projections.average)
    ));

    if !report.model_comparisons.is_empty() {
        output.push_str("\nLargest pairwise differences:\n");
        for comparison in &report.model_comparisons {
            let ratio = if comparison.cost_ratio >= RATIO_CAP {
                ">999,999x".to_string()
            } else {
                format!("{:.1}x", comparison.cost_ratio)
            };
            output.push_str(&format!(
                "  {} vs {}: {} ({} cheaper, {})\n",
                comparison.model_a,
                comparison.model_b,
                format_cost_display(comparison.cost_difference),
                comparison.cheaper_model,
                ratio
            ));
        }
    }

    output
}

/// One catalog entry as a listing row.
pub fn format_catalog_entry(model: &ModelDescriptor) -> String {
    format!(
        "{:<48} {:>12} {:>12} {:>8}  {}",
        model.id,
        format_price_per_million(&model.pricing.prompt),
        format_price_per_million(&model.pricing.completion),
        format_context_length(model.context_length),
        model.name
    )
}
