//! Output formatters for screening reports

use crate::config::OutputFormat;
use crate::error::{Result, ScreenerError};
use crate::output::report::*;
use crate::processing::ranker::MatchTier;
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting screening reports
pub trait OutputFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors and an aligned ranking table
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for integration with other tools
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for sharing results
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Standalone HTML page
pub struct HtmlFormatter {
    include_styles: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

/// Askama template for HTML output
#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Resume Screening Report</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 960px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        .header {
            text-align: center;
            margin-bottom: 30px;
            border-bottom: 3px solid #007acc;
            padding-bottom: 20px;
        }
        .tier {
            display: inline-block;
            padding: 2px 10px;
            border-radius: 12px;
            font-weight: bold;
            color: white;
        }
        .tier-excellent { background: #28a745; }
        .tier-good { background: #ffc107; color: #000; }
        .tier-fair { background: #17a2b8; }
        .tier-poor { background: #e83e8c; }
        .section h2 {
            color: #007acc;
            border-bottom: 2px solid #e9ecef;
            padding-bottom: 10px;
        }
        table { width: 100%; border-collapse: collapse; }
        th, td { text-align: left; padding: 8px; border-bottom: 1px solid #e9ecef; }
        .summary-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
            gap: 15px;
        }
        .summary-item {
            background: #f8f9fa;
            padding: 15px;
            border-radius: 6px;
            border-left: 4px solid #007acc;
        }
        .failures { color: #dc3545; }
        .metadata { font-size: 0.9em; color: #6c757d; margin-top: 30px; }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Resume Screening Report</h1>
            <p>Job description: {{ job_source }}</p>
            <p>Generated {{ generated_at }} in {{ processing_time }} ms</p>
        </div>

        <div class="section">
            <h2>Summary</h2>
            <div class="summary-grid">
                <div class="summary-item"><strong>Candidates</strong><br>{{ total_candidates }}</div>
                <div class="summary-item"><strong>Excellent</strong><br>{{ excellent }}</div>
                <div class="summary-item"><strong>Good</strong><br>{{ good }}</div>
                <div class="summary-item"><strong>Average score</strong><br>{{ average_score }}</div>
            </div>
            {% if has_top_match %}
            <p><strong>Top match:</strong> {{ top_match_id }} ({{ top_match_score }}, {{ top_match_tier }})</p>
            <p><strong>Matched keywords:</strong> {{ top_match_keywords }}</p>
            {% endif %}
        </div>

        <div class="section">
            <h2>Rankings</h2>
            <table>
                <tr><th>Rank</th><th>Resume</th><th>Score</th><th>Match</th><th>Matched keywords</th></tr>
                {% for row in rows %}
                <tr>
                    <td>{{ row.rank }}</td>
                    <td>{{ row.document_id }}</td>
                    <td>{{ row.score_percent }}</td>
                    <td><span class="tier {{ row.tier_class }}">{{ row.tier }}</span></td>
                    <td>{{ row.keywords }}</td>
                </tr>
                {% endfor %}
            </table>
        </div>

        {% if has_failures %}
        <div class="section failures">
            <h2>Skipped documents</h2>
            <ul>
                {% for failure in failures %}
                <li>{{ failure }}</li>
                {% endfor %}
            </ul>
        </div>
        {% endif %}

        <div class="metadata">
            <p>Generated by Resume Screener v{{ version }} | Vocabulary: {{ vocabulary_size }} terms | Normalization: {{ normalization_mode }}</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    job_source: String,
    generated_at: String,
    processing_time: u64,
    total_candidates: usize,
    excellent: usize,
    good: usize,
    average_score: String,
    has_top_match: bool,
    top_match_id: String,
    top_match_score: String,
    top_match_tier: String,
    top_match_keywords: String,
    rows: Vec<HtmlRankingRow>,
    has_failures: bool,
    failures: Vec<String>,
    version: String,
    vocabulary_size: usize,
    normalization_mode: String,
}

#[derive(Debug, Clone)]
struct HtmlRankingRow {
    rank: usize,
    document_id: String,
    score_percent: String,
    tier: String,
    tier_class: String,
    keywords: String,
}

fn format_timestamp(report: &ScreeningReport) -> String {
    chrono::DateTime::<chrono::Utc>::from(report.metadata.generated_at)
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

fn keywords_or_dash(keywords: &[String]) -> String {
    if keywords.is_empty() {
        "-".to_string()
    } else {
        keywords.join(", ")
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn tier_color(tier: MatchTier) -> Color {
        match tier {
            MatchTier::Excellent => Color::Green,
            MatchTier::Good => Color::Yellow,
            MatchTier::Fair => Color::Blue,
            MatchTier::Poor => Color::Magenta,
        }
    }

    fn format_tier_badge(&self, tier: MatchTier) -> String {
        let badge = format!("[{}]", tier.label().to_uppercase());
        if self.use_colors {
            badge.color(Self::tier_color(tier)).bold().to_string()
        } else {
            badge
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME SCREENING RESULTS", 1));
        output.push_str(&format!(
            "Job description: {} | Generated: {} | Processing time: {}ms\n",
            report.job.source,
            format_timestamp(report),
            report.metadata.processing_time_ms
        ));

        // Ranking table
        output.push_str(&self.format_header("Rankings", 2));
        let id_width = report
            .rankings
            .iter()
            .map(|entry| entry.document_id.chars().count())
            .max()
            .unwrap_or(0)
            .max("Resume".len());

        output.push_str(&format!(
            "{:>4}  {:<width$}  {:>8}  {}\n",
            "Rank",
            "Resume",
            "Score",
            "Match",
            width = id_width
        ));
        for entry in &report.rankings {
            output.push_str(&format!(
                "{:>4}  {:<width$}  {:>8}  {}\n",
                entry.rank,
                entry.document_id,
                entry.score_percent,
                self.format_tier_badge(entry.match_tier),
                width = id_width
            ));
        }

        // Summary
        output.push_str(&self.format_header("Summary", 2));
        output.push_str(&format!(
            "Candidates: {} | Excellent: {} | Good: {} | Fair: {} | Poor: {}\n",
            report.summary.total_candidates,
            report.summary.excellent,
            report.summary.good,
            report.summary.fair,
            report.summary.poor
        ));
        output.push_str(&format!("Average score: {}\n", report.summary.average_score_percent));

        if let Some(top) = &report.top_match {
            output.push_str(&self.format_header("Top Match", 3));
            output.push_str(&format!(
                "{} {} {}\n",
                self.colorize(&top.document_id, Color::Cyan),
                top.score_percent,
                self.format_tier_badge(top.match_tier)
            ));
            output.push_str(&format!("Matched keywords: {}\n", keywords_or_dash(&top.matched_keywords)));
        }

        if !report.failures.is_empty() {
            output.push_str(&self.format_header("Skipped Documents", 3));
            for failure in &report.failures {
                output.push_str(&format!("  • {}\n", self.colorize(&failure.to_string(), Color::Red)));
            }
        }

        if self.detailed {
            output.push_str(&self.format_header("Candidate Details", 2));
            for entry in &report.rankings {
                let Some(detail) = report.detail_for(entry.rank) else {
                    continue;
                };
                output.push_str(&format!(
                    "{}. {} ({} words)\n",
                    entry.rank,
                    self.colorize(&detail.document_id, Color::White),
                    detail.word_count
                ));
                output.push_str(&format!("   Keywords: {}\n", keywords_or_dash(&detail.matched_keywords)));
                match detail.skills_similarity {
                    Some(similarity) => output.push_str(&format!(
                        "   Skills section: {} (similarity {:.2}%)\n",
                        detail.skills_section,
                        similarity * 100.0
                    )),
                    None => output.push_str(&format!(
                        "   {}\n",
                        self.colorize("No skills section found", Color::BrightBlack)
                    )),
                }
            }

            if !report.job.top_terms.is_empty() {
                output.push_str(&self.format_header("Job Description Terms", 3));
                let terms: Vec<String> = report
                    .job
                    .top_terms
                    .iter()
                    .map(|t| format!("{} ({:.3})", t.term, t.weight))
                    .collect();
                output.push_str(&format!("{}\n", terms.join(", ")));
            }
        }

        output.push_str(&format!(
            "\n{} Resume Screener v{} | Vocabulary: {} terms | Normalization: {}\n",
            self.colorize("ℹ", Color::Blue),
            report.metadata.screener_version,
            report.metadata.vocabulary_size,
            report.metadata.normalization_mode
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_tier_badge(tier: MatchTier) -> &'static str {
        match tier {
            MatchTier::Excellent => "🟢 Excellent",
            MatchTier::Good => "🟡 Good",
            MatchTier::Fair => "🔵 Fair",
            MatchTier::Poor => "🔴 Poor",
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Screening Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n",
                format_timestamp(report),
                report.metadata.processing_time_ms
            ));
            output.push_str(&format!("**Job description:** `{}`\n\n", report.job.source));
        }

        output.push_str("## Rankings\n\n");
        output.push_str("| Rank | Resume | Score | Match | Matched keywords |\n");
        output.push_str("|------|--------|-------|-------|------------------|\n");
        for entry in &report.rankings {
            let keywords = report
                .detail_for(entry.rank)
                .map(|detail| keywords_or_dash(&detail.matched_keywords))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "| {} | `{}` | {} | {} | {} |\n",
                entry.rank,
                entry.document_id,
                entry.score_percent,
                Self::markdown_tier_badge(entry.match_tier),
                keywords
            ));
        }
        output.push('\n');

        output.push_str("## Summary\n\n");
        output.push_str(&format!("- **Candidates:** {}\n", report.summary.total_candidates));
        for tier in MatchTier::all() {
            output.push_str(&format!(
                "- **{}:** {}\n",
                tier.label(),
                report.summary.count_for(tier)
            ));
        }
        output.push_str(&format!("- **Average score:** {}\n\n", report.summary.average_score_percent));

        if let Some(top) = &report.top_match {
            output.push_str("### Top Match\n\n");
            output.push_str(&format!(
                "`{}` scored **{}** ({})\n\n",
                top.document_id,
                top.score_percent,
                top.match_tier
            ));
            output.push_str(&format!("Matched keywords: {}\n\n", keywords_or_dash(&top.matched_keywords)));
        }

        if !report.failures.is_empty() {
            output.push_str("## Skipped Documents\n\n");
            for failure in &report.failures {
                output.push_str(&format!("- `{}` ({}): {}\n", failure.document_id, failure.kind, failure.message));
            }
            output.push('\n');
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!(
                "*Generated by Resume Screener v{} | Vocabulary: {} terms | n-grams {}-{} | Normalization: {}*\n",
                report.metadata.screener_version,
                report.metadata.vocabulary_size,
                report.metadata.ngram_range.0,
                report.metadata.ngram_range.1,
                report.metadata.normalization_mode
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn tier_class(tier: MatchTier) -> &'static str {
        match tier {
            MatchTier::Excellent => "tier-excellent",
            MatchTier::Good => "tier-good",
            MatchTier::Fair => "tier-fair",
            MatchTier::Poor => "tier-poor",
        }
    }

    fn create_template_data(&self, report: &ScreeningReport) -> HtmlTemplate {
        let rows = report
            .rankings
            .iter()
            .map(|entry| HtmlRankingRow {
                rank: entry.rank,
                document_id: entry.document_id.clone(),
                score_percent: entry.score_percent.clone(),
                tier: entry.match_tier.label().to_string(),
                tier_class: Self::tier_class(entry.match_tier).to_string(),
                keywords: report
                    .detail_for(entry.rank)
                    .map(|detail| keywords_or_dash(&detail.matched_keywords))
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();

        let top = report.top_match.as_ref();

        HtmlTemplate {
            include_styles: self.include_styles,
            job_source: report.job.source.clone(),
            generated_at: format_timestamp(report),
            processing_time: report.metadata.processing_time_ms,
            total_candidates: report.summary.total_candidates,
            excellent: report.summary.excellent,
            good: report.summary.good,
            average_score: report.summary.average_score_percent.clone(),
            has_top_match: top.is_some(),
            top_match_id: top.map(|t| t.document_id.clone()).unwrap_or_default(),
            top_match_score: top.map(|t| t.score_percent.clone()).unwrap_or_default(),
            top_match_tier: top.map(|t| t.match_tier.label().to_string()).unwrap_or_default(),
            top_match_keywords: top
                .map(|t| keywords_or_dash(&t.matched_keywords))
                .unwrap_or_default(),
            rows,
            has_failures: !report.failures.is_empty(),
            failures: report.failures.iter().map(|f| f.to_string()).collect(),
            version: report.metadata.screener_version.clone(),
            vocabulary_size: report.metadata.vocabulary_size,
            normalization_mode: report.metadata.normalization_mode.to_string(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| ScreenerError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn with_options(
        use_colors: bool,
        detailed: bool,
        pretty_json: bool,
        include_metadata: bool,
        include_html_styles: bool,
    ) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            html_formatter: HtmlFormatter::new(include_html_styles),
        }
    }

    pub fn generate_report(&self, report: &ScreeningReport, format: &OutputFormat) -> Result<String> {
        let formatter: &dyn OutputFormatter = match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
            OutputFormat::Html => &self.html_formatter,
        };
        debug_assert_eq!(formatter.supports_format(), *format);
        formatter.format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, job_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(job_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    let base_name = if base_name.is_empty() { "job".into() } else { base_name };

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_screening{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_screening{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_screening{}.md", base_name, timestamp_suffix),
        OutputFormat::Html => format!("{}_screening{}.html", base_name, timestamp_suffix),
    }
}
