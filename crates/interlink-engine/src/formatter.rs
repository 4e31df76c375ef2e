//! Output formatting for links, previews and generation reports: JSON, Table, and Markdown.

use std::str::FromStr;

use interlink_core::link::{InternalLink, LinkOpportunity};

use crate::engine::GenerationReport;

/// Output format for links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

const COLUMNS: [&str; 6] = ["target", "anchor", "score", "type", "position", "context"];

/// Format a list of links.
#[must_use]
pub fn format_links(links: &[InternalLink], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(links).unwrap_or_else(|_| "[]".to_string()),
        OutputFormat::Table => format_table(&links.iter().map(link_row).collect::<Vec<_>>()),
        OutputFormat::Markdown => format_markdown(&links.iter().map(link_row).collect::<Vec<_>>()),
    }
}

/// Format ranked opportunities that have not been stored.
#[must_use]
pub fn format_opportunities(opportunities: &[LinkOpportunity], format: OutputFormat) -> String {
    let rows = || opportunities.iter().map(opportunity_row).collect::<Vec<_>>();
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(opportunities).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Table => format_table(&rows()),
        OutputFormat::Markdown => format_markdown(&rows()),
    }
}

/// Format a generation report. Table and Markdown show a summary line,
/// the stored links, and any errors.
#[must_use]
pub fn format_report(report: &GenerationReport, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
    }

    let mut output = format!(
        "success: {}, links created: {}, opportunities: {}\n",
        report.success,
        report.links_created,
        report.opportunities.len()
    );
    output.push_str(&format_links(&report.links, format));
    if !report.errors.is_empty() {
        if !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str("errors:\n");
        for error in &report.errors {
            output.push_str("  - ");
            output.push_str(error);
            output.push('\n');
        }
    }
    output
}

type Row = [String; 6];

fn link_row(link: &InternalLink) -> Row {
    [
        link.target_id.clone(),
        link.anchor_text.clone(),
        format!("{:.3}", link.relevance_score),
        link.link_type.to_string(),
        link.position.to_string(),
        link.context.clone(),
    ]
}

fn opportunity_row(opportunity: &LinkOpportunity) -> Row {
    [
        opportunity.target_page.id.clone(),
        opportunity.anchor_text.clone(),
        format!("{:.3}", opportunity.relevance_score),
        opportunity.link_type.to_string(),
        opportunity.position.to_string(),
        opportunity.context.clone(),
    ]
}

fn format_table(rows: &[Row]) -> String {
    if rows.is_empty() {
        return "(no links)".to_string();
    }

    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.len()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.chars().count());
        }
    }

    let mut output = String::new();

    let header: Vec<String> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:width$}", c, width = widths[i]))
        .collect();
    output.push_str(header.join(" | ").trim_end());
    output.push('\n');

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&sep.join("-+-"));
    output.push('\n');

    for row in rows {
        let values: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:width$}", v, width = widths[i]))
            .collect();
        output.push_str(values.join(" | ").trim_end());
        output.push('\n');
    }

    output
}

fn format_markdown(rows: &[Row]) -> String {
    if rows.is_empty() {
        return "*No links*\n".to_string();
    }

    let mut output = String::new();

    output.push_str("| ");
    output.push_str(&COLUMNS.join(" | "));
    output.push_str(" |\n");

    output.push_str("| ");
    let seps: Vec<&str> = COLUMNS.iter().map(|_| "---").collect();
    output.push_str(&seps.join(" | "));
    output.push_str(" |\n");

    for row in rows {
        let values: Vec<String> = row.iter().map(|v| v.replace('|', "\\|")).collect();
        output.push_str("| ");
        output.push_str(&values.join(" | "));
        output.push_str(" |\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use interlink_core::link::{LinkPosition, LinkStatus, LinkType};
    use interlink_core::page::{CandidatePage, SourcePage};

    fn sample_links() -> Vec<InternalLink> {
        let at = Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap();
        let link = |id: &str, target: &str, score: f64| InternalLink {
            id: id.to_string(),
            source_id: "guide".to_string(),
            target_id: target.to_string(),
            anchor_text: format!("About {target}"),
            context: format!("Visit {target} | today"),
            relevance_score: score,
            link_type: LinkType::Related,
            position: LinkPosition::Sidebar,
            created_at: at,
            updated_at: at,
            status: LinkStatus::Active,
        };
        vec![link("link_1_a", "ritz", 0.75), link("link_2_b", "savoy", 0.7)]
    }

    #[test]
    fn parse_output_format() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("Table".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn links_as_json() {
        let output = format_links(&sample_links(), OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["target_id"], "ritz");
        assert_eq!(parsed[0]["link_type"], "related");
    }

    #[test]
    fn links_as_table() {
        let output = format_links(&sample_links(), OutputFormat::Table);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("target"));
        assert!(lines[1].contains("-+-"));
        assert!(lines[2].contains("ritz"));
        assert!(lines[2].contains("0.750"));
        assert!(lines[3].contains("sidebar"));
    }

    #[test]
    fn links_as_markdown_escape_pipes() {
        let output = format_links(&sample_links(), OutputFormat::Markdown);
        assert!(output.starts_with("| target | anchor"));
        assert!(output.contains("| --- |"));
        assert!(output.contains("Visit ritz \\| today"));
    }

    #[test]
    fn empty_links() {
        assert_eq!(format_links(&[], OutputFormat::Table), "(no links)");
        assert_eq!(format_links(&[], OutputFormat::Markdown), "*No links*\n");
        assert_eq!(format_links(&[], OutputFormat::Json), "[]");
    }

    #[test]
    fn opportunities_share_link_layouts() {
        let opportunity = LinkOpportunity {
            source_page: SourcePage::new("guide", "London Hotels", "luxury_hotels"),
            target_page: CandidatePage {
                id: "ritz".to_string(),
                title: "The Ritz London".to_string(),
                url: "/luxury_hotels/ritz".to_string(),
                category: "luxury_hotels".to_string(),
                quality_score: 85.0,
            },
            anchor_text: "The Ritz London".to_string(),
            context: "Stay at The Ritz London".to_string(),
            relevance_score: 0.82,
            link_type: LinkType::Contextual,
            position: LinkPosition::Inline,
        };
        let opportunities = vec![opportunity];

        let table = format_opportunities(&opportunities, OutputFormat::Table);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("target"));
        assert!(lines[2].starts_with("ritz"));
        assert!(lines[2].contains("0.820"));
        assert!(lines[2].contains("inline"));

        let markdown = format_opportunities(&opportunities, OutputFormat::Markdown);
        assert!(markdown.starts_with("| target | anchor"));
        assert!(markdown.contains("| ritz | The Ritz London | 0.820 |"));

        let json: serde_json::Value =
            serde_json::from_str(&format_opportunities(&opportunities, OutputFormat::Json)).unwrap();
        assert_eq!(json[0]["target_page"]["id"], "ritz");
        assert_eq!(format_opportunities(&[], OutputFormat::Table), "(no links)");
    }

    #[test]
    fn report_lists_errors() {
        let report = GenerationReport {
            success: false,
            links_created: 2,
            links: sample_links(),
            opportunities: vec![],
            errors: vec!["Failed to create link to eye: disk full".to_string()],
        };
        let output = format_report(&report, OutputFormat::Table);
        assert!(output.starts_with("success: false, links created: 2"));
        assert!(output.contains("ritz"));
        assert!(output.ends_with("  - Failed to create link to eye: disk full\n"));

        let json: serde_json::Value =
            serde_json::from_str(&format_report(&report, OutputFormat::Json)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["links_created"], 2);
    }
}
