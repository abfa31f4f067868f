//! # Pricing Engine Module
//!
//! Pure cost calculations and model ranking over catalog pricing data
//!
//! ## Key Components
//! - [`estimate_query_cost`] - Per-query cost for a single model
//! - [`compare_models`] - Full ranked comparison report for a model batch
//! - [`ComparisonReport`] - Top-level output of one calculation
//! - [`safe_division`] - Division that never yields NaN or infinity

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::ModelDescriptor;

/// Synthetic average query: a short prompt and a longer completion.
pub const PROMPT_TOKENS: u64 = 150;
pub const COMPLETION_TOKENS: u64 = 300;

pub const DEFAULT_QUERY_VOLUME: f64 = 1_000_000.0;

/// Cap applied to every percentage and ratio whose denominator is zero or
/// whose true value is not finite. Keeps every report field renderable.
pub const RATIO_CAP: f64 = 999_999.0;

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("model {model_id} has malformed pricing data")]
    MalformedPricing { model_id: String },
    #[error("at least one model is required for a comparison")]
    EmptyModelSet,
}

#[derive(Debug, Clone, Copy)]
pub struct VolumePreset {
    pub value: u64,
    pub label: &'static str,
    pub description: &'static str,
    pub context: &'static str,
}

pub const QUERY_VOLUMES: &[VolumePreset] = &[
    VolumePreset {
        value: 1,
        label: "Single Query",
        description: "Testing a model",
        context: "Perfect for trying out different models before committing",
    },
    VolumePreset {
        value: 10,
        label: "10 Queries",
        description: "Personal project",
        context: "Ideal for hobby projects or small experiments",
    },
    VolumePreset {
        value: 100,
        label: "100 Queries",
        description: "Small business",
        context: "Great for small businesses with moderate AI usage",
    },
    VolumePreset {
        value: 10_000,
        label: "10,000 Queries",
        description: "Production application",
        context: "Suitable for live apps serving customers daily",
    },
    VolumePreset {
        value: 1_000_000,
        label: "1,000,000 Queries",
        description: "Enterprise scale",
        context: "High-volume applications with millions of users",
    },
];

lazy_static::lazy_static! {
    static ref VOLUME_MAP: HashMap<u64, &'static VolumePreset> = {
        let mut map = HashMap::new();
        for preset in QUERY_VOLUMES {
            map.insert(preset.value, preset);
        }
        map
    };
}

/// Preset description for a volume, when the volume matches a preset exactly.
pub fn volume_description(volume: f64) -> Option<&'static str> {
    if volume < 0.0 || volume.fract() != 0.0 {
        return None;
    }
    VOLUME_MAP.get(&(volume as u64)).map(|p| p.description)
}

/// Division that substitutes `fallback` for division by zero and any
/// non-finite operand or result.
pub fn safe_division(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 || !numerator.is_finite() || !denominator.is_finite() {
        return fallback;
    }
    let result = numerator / denominator;
    if result.is_finite() { result } else { fallback }
}

/// Percentage by which `expensive` exceeds `cheap`. Zero denominator yields
/// 0 when both are zero, otherwise the cap.
fn safe_percentage_difference(expensive: f64, cheap: f64) -> f64 {
    if cheap == 0.0 {
        return if expensive == 0.0 { 0.0 } else { RATIO_CAP };
    }
    let percentage = ((expensive - cheap) / cheap) * 100.0;
    if percentage.is_finite() { percentage } else { RATIO_CAP }
}

/// Ratio of `expensive` to `cheap`. Zero denominator yields 1 when both are
/// zero (equal costs), otherwise the cap.
fn safe_cost_ratio(expensive: f64, cheap: f64) -> f64 {
    if cheap == 0.0 {
        return if expensive == 0.0 { 1.0 } else { RATIO_CAP };
    }
    let ratio = expensive / cheap;
    if ratio.is_finite() { ratio } else { RATIO_CAP }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub model_id: String,
    pub model_name: String,
    pub prompt_cost: f64,
    pub completion_cost: f64,
    pub cost_per_query: f64,
    pub total_cost: f64,
    pub yearly_projection: f64,
    pub ranking: usize,
    pub percentage_from_cheapest: f64,
    pub cost_ratio_from_cheapest: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelComparison {
    pub model_a: String,
    pub model_b: String,
    pub cost_difference: f64,
    pub percentage_difference: f64,
    pub cost_ratio: f64,
    pub cheaper_model: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearlyProjectionSummary {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub query_volume: f64,
    pub results: Vec<CostEstimate>,
    pub cheapest_model: CostEstimate,
    pub most_expensive_model: CostEstimate,
    pub max_cost_ratio: f64,
    pub model_comparisons: Vec<ModelComparison>,
    pub average_cost: f64,
    pub cost_spread: f64,
    pub yearly_projections: YearlyProjectionSummary,
}

/// Pairwise comparison capping rules. Batches of `cap_threshold` or more
/// models keep only the `max_comparisons` largest differences, with the
/// cheapest-vs-most-expensive pair always retained.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonLimits {
    pub max_comparisons: usize,
    pub cap_threshold: usize,
}

impl Default for ComparisonLimits {
    fn default() -> Self {
        Self {
            max_comparisons: 10,
            cap_threshold: 4,
        }
    }
}

fn parse_price(raw: &str, model_id: &str) -> Result<f64, PricingError> {
    let malformed = || PricingError::MalformedPricing {
        model_id: model_id.to_string(),
    };
    let price: f64 = raw.trim().parse().map_err(|_| malformed())?;
    if !price.is_finite() || price < 0.0 {
        return Err(malformed());
    }
    Ok(price)
}

/// Cost of one synthetic query for a single model. Prices are per single
/// token as shipped by the catalog; malformed or negative price strings fail
/// rather than being treated as free.
///
/// Batch-relative fields (`total_cost`, `ranking`, ...) are filled in by
/// [`compare_models`]; here `total_cost` starts as the per-query cost.
pub fn estimate_query_cost(model: &ModelDescriptor) -> Result<CostEstimate, PricingError> {
    let prompt_price = parse_price(&model.pricing.prompt, &model.id)?;
    let completion_price = parse_price(&model.pricing.completion, &model.id)?;

    let prompt_cost = prompt_price * PROMPT_TOKENS as f64;
    let completion_cost = completion_price * COMPLETION_TOKENS as f64;
    let cost_per_query = prompt_cost + completion_cost;

    Ok(CostEstimate {
        model_id: model.id.clone(),
        model_name: model.name.clone(),
        prompt_cost,
        completion_cost,
        cost_per_query,
        total_cost: cost_per_query,
        yearly_projection: 0.0,
        ranking: 0,
        percentage_from_cheapest: 0.0,
        cost_ratio_from_cheapest: 1.0,
    })
}

fn generate_model_comparisons(
    results: &[CostEstimate],
    limits: ComparisonLimits,
) -> Vec<ModelComparison> {
    let mut comparisons = Vec::new();

    for i in 0..results.len() {
        for j in (i + 1)..results.len() {
            let a = &results[i];
            let b = &results[j];

            let cheap = a.total_cost.min(b.total_cost);
            let expensive = a.total_cost.max(b.total_cost);
            let cheaper_model = if a.total_cost < b.total_cost {
                &a.model_name
            } else {
                &b.model_name
            };

            comparisons.push(ModelComparison {
                model_a: a.model_name.clone(),
                model_b: b.model_name.clone(),
                cost_difference: expensive - cheap,
                percentage_difference: safe_percentage_difference(expensive, cheap),
                cost_ratio: safe_cost_ratio(expensive, cheap),
                cheaper_model: cheaper_model.clone(),
            });
        }
    }

    // Largest differences first
    comparisons.sort_by(|a, b| {
        b.cost_difference
            .partial_cmp(&a.cost_difference)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if results.len() >= limits.cap_threshold && comparisons.len() > limits.max_comparisons {
        comparisons.truncate(limits.max_comparisons);

        // The min-max pair must survive truncation; it replaces the lowest
        // priority kept entry when necessary.
        let cheapest = &results[0];
        let most_expensive = &results[results.len() - 1];
        let has_min_max = comparisons.iter().any(|c| {
            (c.model_a == cheapest.model_name && c.model_b == most_expensive.model_name)
                || (c.model_a == most_expensive.model_name && c.model_b == cheapest.model_name)
        });

        if !has_min_max && !comparisons.is_empty() {
            let cheap = cheapest.total_cost;
            let expensive = most_expensive.total_cost;
            let last = comparisons.len() - 1;
            comparisons[last] = ModelComparison {
                model_a: cheapest.model_name.clone(),
                model_b: most_expensive.model_name.clone(),
                cost_difference: expensive - cheap,
                percentage_difference: safe_percentage_difference(expensive, cheap),
                cost_ratio: safe_cost_ratio(expensive, cheap),
                cheaper_model: cheapest.model_name.clone(),
            };
        }
    }

    comparisons
}

/// Ranked cost comparison across a batch of models at a monthly query volume.
///
/// A non-finite or negative volume falls back to [`DEFAULT_QUERY_VOLUME`] so
/// the report stays renderable; malformed pricing propagates so callers can
/// decide between dropping the model and aborting.
pub fn compare_models(
    models: &[ModelDescriptor],
    query_volume: f64,
) -> Result<ComparisonReport, PricingError> {
    compare_models_with_limits(models, query_volume, ComparisonLimits::default())
}

pub fn compare_models_with_limits(
    models: &[ModelDescriptor],
    query_volume: f64,
    limits: ComparisonLimits,
) -> Result<ComparisonReport, PricingError> {
    if models.is_empty() {
        return Err(PricingError::EmptyModelSet);
    }

    let volume = if !query_volume.is_finite() || query_volume < 0.0 {
        log::warn!("Invalid query volume {query_volume}, falling back to {DEFAULT_QUERY_VOLUME}");
        DEFAULT_QUERY_VOLUME
    } else {
        query_volume
    };

    let mut results = Vec::with_capacity(models.len());
    for model in models {
        let mut estimate = estimate_query_cost(model)?;
        let total_cost = estimate.cost_per_query * volume;
        let yearly_projection = estimate.cost_per_query * volume * 12.0;
        estimate.total_cost = if total_cost.is_finite() { total_cost } else { 0.0 };
        estimate.yearly_projection = if yearly_projection.is_finite() {
            yearly_projection
        } else {
            0.0
        };
        results.push(estimate);
    }

    // Stable sort: ties keep input order
    results.sort_by(|a, b| {
        a.total_cost
            .partial_cmp(&b.total_cost)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let cheapest_cost = results[0].total_cost;
    for (index, result) in results.iter_mut().enumerate() {
        result.ranking = index + 1;
        result.percentage_from_cheapest =
            safe_percentage_difference(result.total_cost, cheapest_cost);
        result.cost_ratio_from_cheapest = safe_cost_ratio(result.total_cost, cheapest_cost);
    }

    let cheapest_model = results[0].clone();
    let most_expensive_model = results[results.len() - 1].clone();
    let max_cost_ratio = safe_cost_ratio(most_expensive_model.total_cost, cheapest_model.total_cost);

    let average_cost = results.iter().map(|r| r.total_cost).sum::<f64>() / results.len() as f64;
    let cost_spread = most_expensive_model.total_cost - cheapest_model.total_cost;

    let model_comparisons = generate_model_comparisons(&results, limits);

    let yearly_projections = YearlyProjectionSummary {
        min: results
            .iter()
            .map(|r| r.yearly_projection)
            .fold(f64::INFINITY, f64::min),
        max: results
            .iter()
            .map(|r| r.yearly_projection)
            .fold(f64::NEG_INFINITY, f64::max),
        average: results.iter().map(|r| r.yearly_projection).sum::<f64>() / results.len() as f64,
    };

    Ok(ComparisonReport {
        query_volume: volume,
        results,
        cheapest_model,
        most_expensive_model,
        max_cost_ratio,
        model_comparisons,
        average_cost,
        cost_spread,
        yearly_projections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ModelDescriptor, ModelPricing};

    fn model(id: &str, name: &str, prompt: &str, completion: &str) -> ModelDescriptor {
        ModelDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            pricing: ModelPricing {
                prompt: prompt.to_string(),
                completion: completion.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_per_token_unit_contract() {
        // Claude 3.5 Sonnet ships prompt = "0.000003", i.e. $3 per million
        // tokens. The value is per single token and must be used as-is.
        let m = model(
            "anthropic/claude-3.5-sonnet",
            "Claude 3.5 Sonnet",
            "0.000003",
            "0.000015",
        );
        let estimate = estimate_query_cost(&m).unwrap();

        // 150 * 0.000003 + 300 * 0.000015 = 0.00045 + 0.0045 = 0.00495
        assert!((estimate.prompt_cost - 0.00045).abs() < 1e-12);
        assert!((estimate.completion_cost - 0.0045).abs() < 1e-12);
        assert!((estimate.cost_per_query - 0.00495).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_pricing_rejected() {
        for bad in ["", "abc", "-0.001", "NaN", "inf"] {
            let m = model("bad/model", "Bad Model", bad, "0.000001");
            let err = estimate_query_cost(&m).unwrap_err();
            match err {
                PricingError::MalformedPricing { model_id } => assert_eq!(model_id, "bad/model"),
                other => panic!("unexpected error for {bad:?}: {other}"),
            }
        }
    }

    #[test]
    fn test_malformed_pricing_propagates_from_compare() {
        let models = vec![
            model("a", "A", "0.000001", "0.000002"),
            model("b", "B", "oops", "0.000002"),
        ];
        assert!(matches!(
            compare_models(&models, 100.0),
            Err(PricingError::MalformedPricing { .. })
        ));
    }

    #[test]
    fn test_empty_model_set_rejected() {
        assert!(matches!(
            compare_models(&[], 100.0),
            Err(PricingError::EmptyModelSet)
        ));
    }

    #[test]
    fn test_invalid_volume_falls_back_to_default() {
        let models = vec![model("a", "A", "0.000001", "0.000002")];
        for bad_volume in [f64::NAN, f64::INFINITY, -5.0] {
            let report = compare_models(&models, bad_volume).unwrap();
            assert_eq!(report.query_volume, DEFAULT_QUERY_VOLUME);
        }
    }

    #[test]
    fn test_determinism() {
        let models = vec![
            model("a", "A", "0.0000015", "0.000002"),
            model("b", "B", "0.00003", "0.00015"),
            model("c", "C", "0.000003", "0.000015"),
        ];
        let first = compare_models(&models, 10_000.0).unwrap();
        let second = compare_models(&models, 10_000.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ranking_invariant() {
        let models = vec![
            model("expensive", "Expensive", "0.00006", "0.0003"),
            model("cheap", "Cheap", "0.0000001", "0.0000002"),
            model("mid", "Mid", "0.000003", "0.000015"),
            model("free", "Free", "0", "0"),
        ];
        let report = compare_models(&models, 1000.0).unwrap();

        let rankings: Vec<usize> = report.results.iter().map(|r| r.ranking).collect();
        assert_eq!(rankings, vec![1, 2, 3, 4]);

        for pair in report.results.windows(2) {
            assert!(pair[0].total_cost <= pair[1].total_cost);
        }
        assert_eq!(report.cheapest_model, report.results[0]);
        assert_eq!(report.most_expensive_model, report.results[3]);
        assert_eq!(report.cheapest_model.model_id, "free");
        assert_eq!(report.most_expensive_model.model_id, "expensive");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let models = vec![
            model("first", "First", "0.000002", "0.000002"),
            model("second", "Second", "0.000002", "0.000002"),
        ];
        let report = compare_models(&models, 1.0).unwrap();
        assert_eq!(report.results[0].model_id, "first");
        assert_eq!(report.results[1].model_id, "second");
    }

    #[test]
    fn test_ratios_non_negative_and_finite() {
        let models = vec![
            model("free", "Free", "0", "0"),
            model("cheap", "Cheap", "0.0000001", "0.0000001"),
            model("pricey", "Pricey", "0.0001", "0.0002"),
        ];
        let report = compare_models(&models, 500.0).unwrap();
        for result in &report.results {
            assert!(result.percentage_from_cheapest >= 0.0);
            assert!(result.percentage_from_cheapest.is_finite());
            assert!(result.cost_ratio_from_cheapest >= 0.0);
            assert!(result.cost_ratio_from_cheapest.is_finite());
        }
        assert!(report.max_cost_ratio.is_finite());
    }

    #[test]
    fn test_zero_cost_cheapest_hits_sentinel_cap() {
        let models = vec![
            model("free", "Free", "0", "0"),
            model("paid", "Paid", "0.000003", "0.000015"),
        ];
        let report = compare_models(&models, 100.0).unwrap();
        assert_eq!(report.max_cost_ratio, RATIO_CAP);
        assert_eq!(report.results[1].percentage_from_cheapest, RATIO_CAP);

        // Two free models compare as equal, not capped
        let free_pair = vec![model("f1", "F1", "0", "0"), model("f2", "F2", "0", "0")];
        let free_report = compare_models(&free_pair, 100.0).unwrap();
        assert_eq!(free_report.max_cost_ratio, 1.0);
        assert_eq!(free_report.results[1].percentage_from_cheapest, 0.0);
    }

    #[test]
    fn test_scale_invariance() {
        let models = vec![
            model("a", "A", "0.0000015", "0.000002"),
            model("b", "B", "0.00003", "0.00015"),
        ];
        let unit = compare_models(&models, 1.0).unwrap();
        for volume in [10.0, 100.0, 12_345.0] {
            let scaled = compare_models(&models, volume).unwrap();
            for (base, result) in unit.results.iter().zip(&scaled.results) {
                assert!((result.total_cost - base.cost_per_query * volume).abs() < 1e-9);
                assert!(
                    (result.yearly_projection - base.cost_per_query * volume * 12.0).abs() < 1e-6
                );
            }
        }
    }

    #[test]
    fn test_two_model_end_to_end() {
        // A: 150 * 0.0000015 + 300 * 0.000002 = 0.000825 per query
        // B: 150 * 0.00003 + 300 * 0.00015 = 0.0495 per query
        let models = vec![
            model("b", "Model B", "0.00003", "0.00015"),
            model("a", "Model A", "0.0000015", "0.000002"),
        ];
        let report = compare_models(&models, 100.0).unwrap();

        assert_eq!(report.results[0].model_id, "a");
        assert!((report.results[0].total_cost - 0.0825).abs() < 1e-9);
        assert!((report.results[1].total_cost - 4.95).abs() < 1e-9);
        assert!((report.max_cost_ratio - 60.0).abs() < 1e-6);

        assert_eq!(report.model_comparisons.len(), 1);
        assert_eq!(report.model_comparisons[0].cheaper_model, "Model A");
        assert!((report.model_comparisons[0].cost_difference - 4.8675).abs() < 1e-9);
    }

    #[test]
    fn test_report_statistics() {
        let models = vec![
            model("a", "A", "0.000001", "0.000001"),
            model("b", "B", "0.000002", "0.000002"),
        ];
        // Per query: A = 0.00045, B = 0.0009; at volume 1000: 0.45 and 0.9
        let report = compare_models(&models, 1000.0).unwrap();
        assert!((report.average_cost - 0.675).abs() < 1e-9);
        assert!((report.cost_spread - 0.45).abs() < 1e-9);
        assert!((report.yearly_projections.min - 5.4).abs() < 1e-9);
        assert!((report.yearly_projections.max - 10.8).abs() < 1e-9);
        assert!((report.yearly_projections.average - 8.1).abs() < 1e-9);
    }

    #[test]
    fn test_comparison_cap_keeps_min_max_pair() {
        // Six models -> 15 pairs; cap of 3 forces truncation
        let models: Vec<ModelDescriptor> = (1..=6)
            .map(|i| {
                let price = format!("{}", i as f64 * 0.000001);
                model(&format!("m{i}"), &format!("Model {i}"), &price, &price)
            })
            .collect();
        let limits = ComparisonLimits {
            max_comparisons: 3,
            cap_threshold: 4,
        };
        let report = compare_models_with_limits(&models, 100.0, limits).unwrap();
        assert_eq!(report.model_comparisons.len(), 3);

        let cheapest = &report.cheapest_model.model_name;
        let most_expensive = &report.most_expensive_model.model_name;
        assert!(report.model_comparisons.iter().any(|c| {
            (&c.model_a == cheapest && &c.model_b == most_expensive)
                || (&c.model_a == most_expensive && &c.model_b == cheapest)
        }));
    }

    #[test]
    fn test_small_batch_keeps_all_comparisons() {
        let models = vec![
            model("a", "A", "0.000001", "0.000001"),
            model("b", "B", "0.000002", "0.000002"),
            model("c", "C", "0.000003", "0.000003"),
        ];
        let report = compare_models(&models, 100.0).unwrap();
        // 3 models below the cap threshold -> all 3 pairs, largest gap first
        assert_eq!(report.model_comparisons.len(), 3);
        for pair in report.model_comparisons.windows(2) {
            assert!(pair[0].cost_difference >= pair[1].cost_difference);
        }
    }

    #[test]
    fn test_safe_division() {
        assert_eq!(safe_division(10.0, 2.0, 0.0), 5.0);
        assert_eq!(safe_division(10.0, 0.0, 0.0), 0.0);
        assert_eq!(safe_division(f64::NAN, 2.0, 7.0), 7.0);
        assert_eq!(safe_division(10.0, f64::INFINITY, 7.0), 7.0);
    }

    #[test]
    fn test_volume_description_lookup() {
        assert_eq!(volume_description(100.0), Some("Small business"));
        assert_eq!(volume_description(1_000_000.0), Some("Enterprise scale"));
        assert_eq!(volume_description(42.0), None);
        assert_eq!(volume_description(-1.0), None);
        assert_eq!(volume_description(0.5), None);
    }
}
