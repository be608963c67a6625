//! Output formatting for CLI

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use cohort_stats_core::{Label, Report, ReportKind, ReportRow};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// CSV format (one header line per report)
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Output writer that handles different formats
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write one report
    pub fn write_report(&self, report: &Report) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                println!("{}", render_table(report));
                print_summary(report);
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(report)?),
            OutputFormat::Csv => print!("{}", render_csv(report)?),
        }
        Ok(())
    }

    /// Write several reports, keeping their order
    pub fn write_reports(&self, reports: &[Report]) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(reports)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(reports)?),
            OutputFormat::Table | OutputFormat::Csv => {
                for (i, report) in reports.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    self.write_report(report)?;
                }
            }
        }
        Ok(())
    }

    /// Write an info message
    pub fn info(&self, message: &str) {
        if self.format == OutputFormat::Table {
            eprintln!("{} {}", "ℹ".blue(), message);
        }
    }

    /// Create a progress bar
    pub fn progress_bar(&self, total: u64, message: &str) -> Option<indicatif::ProgressBar> {
        if self.format != OutputFormat::Table {
            return None;
        }
        let pb = indicatif::ProgressBar::new(total);
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏ "));
        }
        pb.set_message(message.to_string());
        Some(pb)
    }
}

/// Text of a row label: the time value, or the tested null hypothesis
pub fn label_text(kind: ReportKind, label: &Label) -> String {
    match label {
        Label::Simple(value) => value.to_string(),
        Label::Pairwise { first, second } => {
            let location = match kind {
                ReportKind::MannWhitney => "med",
                _ => "μ",
            };
            format!("{location}({first}) ≤ {location}({second})")
        }
    }
}

pub fn decision_text(reject: bool) -> &'static str {
    if reject {
        "Yes"
    } else {
        "No"
    }
}

fn row_cells(kind: ReportKind, row: &ReportRow) -> [String; 4] {
    [
        label_text(kind, &row.label),
        format!("{:.3}", row.statistic),
        format!("{:.3}", row.p_value),
        decision_text(row.reject).to_string(),
    ]
}

/// Render a report as a table
pub fn render_table(report: &Report) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);

    let header_cells: Vec<Cell> = report
        .headers()
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in &report.rows {
        let [label, statistic, p_value, decision] = row_cells(report.kind, row);
        let decision = if row.reject {
            Cell::new(decision).fg(Color::Green)
        } else {
            Cell::new(decision)
        };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(statistic),
            Cell::new(p_value),
            decision,
        ]);
    }

    table
}

fn print_summary(report: &Report) {
    let threshold = report.alpha / report.n_hypotheses.max(1) as f64;
    println!(
        "{} {} | {} {} hypotheses, alpha = {}, per-test level = {:.5}",
        "Feature:".bold(),
        report.feature,
        "Bonferroni:".bold(),
        report.n_hypotheses.to_string().green(),
        report.alpha,
        threshold
    );
}

/// Render a report as CSV with the report headers
pub fn render_csv(report: &Report) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(report.headers())?;
    for row in &report.rows {
        writer.write_record(row_cells(report.kind, row))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}
