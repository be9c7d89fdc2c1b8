//! Terminal output for the CLI

use crate::history::ScanRecord;
use crate::model::AnalysisResult;
use crate::recommend::Recommendation;

/// Prints a compact summary of one analysis
pub fn print_report(result: &AnalysisResult, recommendations: &[Recommendation]) {
    let network = &result.network;
    let seo = &result.seo;

    println!("=== Site Audit: {} ===\n", result.url);

    println!("Scores:");
    println!("  Overall: {}", result.score.overall);
    println!("  SEO:     {}", result.score.seo);
    println!("  Speed:   {}", result.score.speed);
    println!();

    println!("Network:");
    match &network.error_message {
        Some(error) => println!("  Unreachable: {}", error),
        None => println!("  HTTP {} in {} ms", network.status_code, network.response_time_ms),
    }
    println!();

    println!("SEO:");
    println!("  Title: {}", seo.title.as_deref().unwrap_or("(missing)"));
    println!("  H1: {}, H2: {}", seo.h1_count, seo.h2_count);
    println!(
        "  Images: {} ({} without alt)",
        seo.image_count, seo.images_without_alt
    );
    println!(
        "  Links: {} internal, {} external, {} broken",
        seo.internal_link_count, seo.external_link_count, seo.broken_link_count
    );
    println!(
        "  Structured data: {}",
        if seo.structured_data_types.is_empty() {
            "none".to_string()
        } else {
            seo.structured_data_types.join(", ")
        }
    );
    println!();

    if let Some(channel) = result
        .performance
        .as_ref()
        .and_then(|p| p.primary_channel())
    {
        println!("Performance ({}):", channel.strategy);
        if let Some(score) = channel.score {
            println!("  Provider score: {}", score);
        }
        if let Some(lcp) = channel.largest_contentful_paint_ms {
            println!("  LCP: {:.0} ms", lcp);
        }
        if let Some(cls) = channel.cumulative_layout_shift {
            println!("  CLS: {:.3}", cls);
        }
        println!();
    }

    if let Some(off_page) = &result.off_page_seo {
        println!("Off-page:");
        if let Some(authority) = off_page.domain_authority {
            println!("  Domain authority: {:.0}", authority);
        }
        if let Some(backlinks) = off_page.backlinks {
            println!("  Backlinks: {}", backlinks);
        }
        println!();
    }

    if recommendations.is_empty() {
        println!("No recommendations.");
    } else {
        println!("Recommendations ({}):", recommendations.len());
        for item in recommendations {
            println!("  [{}] {}", item.category, item.title);
            println!("      {}", item.description);
        }
    }

    if let Some(insights) = &result.ai_insights {
        println!();
        for section in insights.checklist() {
            println!("{}:", section.title);
            for item in &section.items {
                println!("  [ ] {}", item);
            }
        }
    }
}

/// Prints stored history records, most recent first
pub fn print_history(url: &str, records: &[ScanRecord]) {
    println!("=== Scan History: {} ===\n", url);

    if records.is_empty() {
        println!("No scans recorded.");
        return;
    }

    println!(
        "{:<25} {:>7} {:>5} {:>5} {:>6} {:>8} {:>6}",
        "Checked at", "Overall", "SEO", "Speed", "Status", "Time ms", "Broken"
    );
    for record in records {
        println!(
            "{:<25} {:>7} {:>5} {:>5} {:>6} {:>8} {:>6}",
            record.checked_at.format("%Y-%m-%d %H:%M:%S UTC"),
            record.overall_score,
            record.seo_score,
            record.speed_score,
            record.status_code,
            record.response_time_ms,
            record.broken_link_count
        );
    }

    if let [latest, previous, ..] = records {
        let delta = i64::from(latest.overall_score) - i64::from(previous.overall_score);
        println!("\nChange since previous scan: {:+}", delta);
    }
}
