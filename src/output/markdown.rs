//! Markdown report generation
//!
//! Renders one analysis (scores, network, SEO, enrichment, recommendations
//! and the AI checklist) as a standalone Markdown document.

use crate::model::{AnalysisResult, PerformanceChannel};
use crate::recommend::Recommendation;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the Markdown report for `result` to `output_path`
pub fn write_markdown_report(
    result: &AnalysisResult,
    recommendations: &[Recommendation],
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_report(result, recommendations);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats an analysis as Markdown
pub fn format_markdown_report(result: &AnalysisResult, recommendations: &[Recommendation]) -> String {
    let mut md = String::new();
    let seo = &result.seo;
    let network = &result.network;

    md.push_str(&format!("# Site Audit: {}\n\n", result.url));
    md.push_str(&format!("_Checked at {}_\n\n", result.checked_at.to_rfc3339()));

    md.push_str("## Scores\n\n");
    md.push_str("| Overall | SEO | Speed |\n|---:|---:|---:|\n");
    md.push_str(&format!(
        "| {} | {} | {} |\n\n",
        result.score.overall, result.score.seo, result.score.speed
    ));

    md.push_str("## Network\n\n");
    match &network.error_message {
        Some(error) => md.push_str(&format!("- **Status**: unreachable ({})\n", error)),
        None => md.push_str(&format!("- **Status**: HTTP {}\n", network.status_code)),
    }
    md.push_str(&format!("- **Response Time**: {} ms\n", network.response_time_ms));
    md.push_str(&format!("- **Redirected**: {}\n\n", yes_no(network.redirect_count > 0)));

    md.push_str("## SEO\n\n");
    md.push_str(&format!(
        "- **Title**: {} ({} chars)\n",
        seo.title.as_deref().unwrap_or("_missing_"),
        seo.title_length
    ));
    md.push_str(&format!(
        "- **Meta Description**: {} chars\n",
        seo.meta_description_length
    ));
    md.push_str(&format!(
        "- **Canonical**: {}\n",
        seo.canonical_url.as_deref().unwrap_or("_missing_")
    ));
    md.push_str(&format!("- **Headings**: {} H1, {} H2\n", seo.h1_count, seo.h2_count));
    md.push_str(&format!(
        "- **Images**: {} ({} without alt)\n",
        seo.image_count, seo.images_without_alt
    ));
    md.push_str(&format!(
        "- **Links**: {} ({} internal, {} external, {} broken in sample)\n",
        seo.link_count, seo.internal_link_count, seo.external_link_count, seo.broken_link_count
    ));
    md.push_str(&format!(
        "- **Indexable**: {}, **HTTPS**: {}, **Viewport**: {}\n",
        yes_no(seo.is_indexable),
        yes_no(seo.is_https),
        yes_no(seo.has_viewport)
    ));
    if seo.structured_data_count > 0 {
        md.push_str(&format!(
            "- **Structured Data**: {} block(s): {}\n",
            seo.structured_data_count,
            seo.structured_data_types.join(", ")
        ));
    }
    md.push_str(&format!(
        "- **Social Tags**: Open Graph {}, Twitter Card {}\n",
        yes_no(seo.has_open_graph),
        yes_no(seo.has_twitter_card)
    ));
    if seo.dom_from_headless_browser {
        md.push_str("- Counts taken from the rendered DOM\n");
    }
    md.push('\n');

    md.push_str("## Accessibility\n\n");
    md.push_str(&format!("- **Language Attribute**: {}\n", yes_no(seo.has_language_attribute)));
    md.push_str(&format!("- **Skip Link**: {}\n", yes_no(seo.has_skip_link)));
    md.push_str(&format!("- **Landmarks**: {}\n", seo.landmark_count));
    md.push_str(&format!(
        "- **Unlabeled Form Controls**: {}\n\n",
        seo.unlabeled_form_controls
    ));

    if !seo.broken_links.is_empty() {
        md.push_str("### Broken Links\n\n");
        md.push_str("| URL | Type | Status | Reason |\n|---|---|---:|---|\n");
        for link in &seo.broken_links {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                link.url,
                if link.is_internal { "internal" } else { "external" },
                link.status_code,
                link.reason.as_deref().unwrap_or("")
            ));
        }
        md.push('\n');
    }

    if let Some(performance) = &result.performance {
        md.push_str("## Performance\n\n");
        md.push_str("| Strategy | Score | LCP (ms) | FCP (ms) | TBT (ms) | CLS |\n");
        md.push_str("|---|---:|---:|---:|---:|---:|\n");
        for channel in [&performance.mobile, &performance.desktop].into_iter().flatten() {
            md.push_str(&format_channel_row(channel));
        }
        md.push('\n');

        if !performance.suggestions.is_empty() {
            md.push_str("### Opportunities\n\n");
            for suggestion in &performance.suggestions {
                match suggestion.estimated_savings_ms {
                    Some(ms) => md.push_str(&format!("- {} (~{:.0} ms)\n", suggestion.title, ms)),
                    None => md.push_str(&format!("- {}\n", suggestion.title)),
                }
            }
            md.push('\n');
        }
    }

    if let Some(off_page) = &result.off_page_seo {
        md.push_str("## Off-Page\n\n");
        md.push_str(&format!("- **Domain Authority**: {}\n", optional(off_page.domain_authority)));
        md.push_str(&format!("- **Backlinks**: {}\n", optional(off_page.backlinks)));
        md.push_str(&format!(
            "- **Referring Domains**: {}\n",
            optional(off_page.referring_domains)
        ));
        md.push_str(&format!("- **Spam Score**: {}\n\n", optional(off_page.spam_score)));
    }

    md.push_str("## Recommendations\n\n");
    if recommendations.is_empty() {
        md.push_str("No issues found.\n\n");
    }
    for (i, item) in recommendations.iter().enumerate() {
        md.push_str(&format!(
            "{}. **[{}] {}**: {}\n",
            i + 1,
            item.category,
            item.title,
            item.description
        ));
    }
    if !recommendations.is_empty() {
        md.push('\n');
    }

    if let Some(insights) = &result.ai_insights {
        md.push_str("## AI Checklist\n\n");
        for section in insights.checklist() {
            md.push_str(&format!("### {}\n\n", section.title));
            for item in &section.items {
                md.push_str(&format!("- [ ] {}\n", item));
            }
            md.push('\n');
        }
    }

    md
}

fn format_channel_row(channel: &PerformanceChannel) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        channel.strategy,
        optional(channel.score),
        optional(channel.largest_contentful_paint_ms.map(|v| v.round())),
        optional(channel.first_contentful_paint_ms.map(|v| v.round())),
        optional(channel.total_blocking_time_ms.map(|v| v.round())),
        optional(channel.cumulative_layout_shift.map(|v| (v * 1000.0).round() / 1000.0)),
    )
}

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
