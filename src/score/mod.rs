//! Score engine
//!
//! Pure functions turning extracted signals into 0..=100 scores. Every
//! component is a weighted partial score; components whose input is absent
//! drop out of the weighted average instead of counting as zero.

use crate::model::{NetworkResult, PerformanceResult, ScoreResult, SeoResult};

const TITLE_RANGE: (usize, usize) = (35, 65);
const DESCRIPTION_RANGE: (usize, usize) = (80, 155);
const LENGTH_PENALTY_PER_CHAR: f64 = 2.0;
const MAX_LENGTH_PENALTY: f64 = 70.0;

const SERVER_RESPONSE_MS: (f64, f64) = (800.0, 4000.0);
const LCP_MS: (f64, f64) = (2500.0, 6000.0);
const FCP_MS: (f64, f64) = (1800.0, 4000.0);
const TBT_MS: (f64, f64) = (200.0, 900.0);
const CLS: (f64, f64) = (0.1, 0.25);

/// Computes all three scores
pub fn calculate_scores(
    network: &NetworkResult,
    seo: &SeoResult,
    performance: Option<&PerformanceResult>,
) -> ScoreResult {
    let seo_score = calculate_seo_score(seo);
    let speed = calculate_speed_score(network, performance);
    let overall = clamp_score(0.6 * f64::from(speed) + 0.4 * f64::from(seo_score));

    ScoreResult {
        overall,
        seo: seo_score,
        speed,
    }
}

/// Weighted blend of indexability, metadata, technical basics, content
/// structure, accessibility and social tags
pub fn calculate_seo_score(seo: &SeoResult) -> u32 {
    let components = [
        (25.0, Some(if seo.is_indexable { 100.0 } else { 0.0 })),
        (20.0, Some(metadata_score(seo))),
        (15.0, Some(technical_score(seo))),
        (20.0, content_score(seo)),
        (15.0, Some(accessibility_score(seo))),
        (5.0, Some(social_score(seo))),
    ];

    weighted_average(&components).map_or(0, clamp_score)
}

/// Lab metrics when available, server response time otherwise
///
/// Always 0 when the page was unreachable or answered with an error status.
pub fn calculate_speed_score(network: &NetworkResult, performance: Option<&PerformanceResult>) -> u32 {
    if network.is_error() {
        return 0;
    }

    let server = range_score(network.response_time_ms as f64, SERVER_RESPONSE_MS);

    let Some(channel) = performance
        .and_then(PerformanceResult::primary_channel)
        .filter(|c| c.has_metrics())
    else {
        return clamp_score(server);
    };

    let components = [
        (35.0, channel.largest_contentful_paint_ms.map(|v| range_score(v, LCP_MS))),
        (15.0, channel.first_contentful_paint_ms.map(|v| range_score(v, FCP_MS))),
        (20.0, channel.total_blocking_time_ms.map(|v| range_score(v, TBT_MS))),
        (15.0, channel.cumulative_layout_shift.map(|v| range_score(v, CLS))),
        (15.0, Some(server)),
    ];

    weighted_average(&components).map_or(0, clamp_score)
}

/// Absent tags have length 0 and so take the capped penalty
fn metadata_score(seo: &SeoResult) -> f64 {
    let title = length_fit(seo.title_length, TITLE_RANGE);
    let description = length_fit(seo.meta_description_length, DESCRIPTION_RANGE);
    (title + description) / 2.0
}

fn technical_score(seo: &SeoResult) -> f64 {
    let mut score: f64 = 0.0;
    if seo.is_https {
        score += 45.0;
    }
    if seo.has_viewport {
        score += 35.0;
    }
    score += if seo.has_canonical() { 20.0 } else { 10.0 };
    score.clamp(0.0, 100.0)
}

fn content_score(seo: &SeoResult) -> Option<f64> {
    let headings = match seo.h1_count {
        0 => 20.0,
        1 => 100.0,
        _ => 70.0,
    };
    let alt_coverage = (seo.image_count > 0).then(|| {
        let with_alt = seo.image_count.saturating_sub(seo.images_without_alt);
        100.0 * with_alt as f64 / seo.image_count as f64
    });
    let structured = if seo.structured_data_count > 0 { 100.0 } else { 60.0 };

    weighted_average(&[
        (0.40, Some(headings)),
        (0.35, alt_coverage),
        (0.25, Some(structured)),
    ])
}

fn accessibility_score(seo: &SeoResult) -> f64 {
    let mut score = 100.0;
    if !seo.has_language_attribute {
        score -= 20.0;
    }
    if !seo.has_skip_link {
        score -= 10.0;
    }
    if seo.landmark_count == 0 {
        score -= 10.0;
    }
    score -= (4.0 * seo.unlabeled_form_controls as f64).min(40.0);
    score.max(0.0)
}

fn social_score(seo: &SeoResult) -> f64 {
    let mut score = 0.0;
    if seo.has_open_graph {
        score += 60.0;
    }
    if seo.has_twitter_card {
        score += 40.0;
    }
    score
}

/// 100 inside `[min, max]`, minus 2 points per character outside, floored
/// after a 70 point cap on the penalty
fn length_fit(length: usize, (min, max): (usize, usize)) -> f64 {
    let distance = if length < min {
        min - length
    } else if length > max {
        length - max
    } else {
        0
    };
    let penalty = (distance as f64 * LENGTH_PENALTY_PER_CHAR).min(MAX_LENGTH_PENALTY);
    (100.0 - penalty).max(0.0)
}

/// 100 at or below `good`, 0 at or above `poor`, linear in between
fn range_score(value: f64, (good, poor): (f64, f64)) -> f64 {
    if value <= good {
        100.0
    } else if value >= poor {
        0.0
    } else {
        100.0 * (poor - value) / (poor - good)
    }
}

/// Weighted mean over the present components, `None` when none are present
fn weighted_average(components: &[(f64, Option<f64>)]) -> Option<f64> {
    let (sum, weights) = components
        .iter()
        .filter_map(|(weight, value)| value.map(|v| (weight * v, *weight)))
        .fold((0.0, 0.0), |(sum, weights), (v, w)| (sum + v, weights + w));

    (weights > 0.0).then(|| sum / weights)
}

fn clamp_score(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u32
}
