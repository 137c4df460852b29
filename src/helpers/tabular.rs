//! Tabular helper: keyword-driven analysis of the active table.
//!
//! Intent checks run in fixed priority order and are non-exclusive: one
//! message can ask for summary statistics, a group-by, and a plot at once,
//! and each check appends to the same analysis text.

use std::path::PathBuf;

use regex::Regex;
use tracing::debug;

use crate::blackboard::Blackboard;
use crate::config::TabularConfig;
use crate::error::AppError;
use crate::frame::Frame;
use crate::llm::LlmClient;
use crate::plot;

/// Soft reply when no table has been loaded yet.
pub const NO_TABLE_HINT: &str = "No table is currently loaded. Load one with :load <path>.";

const STATS_KEYWORDS: [&str; 3] = ["stats", "describe", "summary"];

pub struct TabularHelper {
    llm: LlmClient,
    commentary: bool,
    plots_dir: PathBuf,
    active_table: Option<String>,
    group_re: Regex,
    plot_re: Regex,
}

impl TabularHelper {
    pub fn new(config: &TabularConfig, plots_dir: PathBuf, llm: LlmClient) -> Result<Self, AppError> {
        let group_re = Regex::new(r"group\s+by\s+(\S+)")
            .map_err(|e| AppError::Config(format!("tabular helper: group regex: {e}")))?;
        let plot_re = Regex::new(r"(plot|chart)\s+(\S+)")
            .map_err(|e| AppError::Config(format!("tabular helper: plot regex: {e}")))?;
        Ok(Self {
            llm,
            commentary: config.commentary,
            plots_dir,
            active_table: None,
            group_re,
            plot_re,
        })
    }

    pub fn set_active(&mut self, table_id: &str) {
        self.active_table = Some(table_id.to_string());
    }

    pub fn active_table(&self) -> Option<&str> {
        self.active_table.as_deref()
    }

    pub fn reset(&mut self) {
        self.active_table = None;
    }

    pub async fn handle(&self, message: &str, board: &mut Blackboard) -> Result<String, AppError> {
        debug!(active = ?self.active_table, "tabular helper handling message");

        let Some(table_id) = self.active_table.clone() else {
            return Ok(NO_TABLE_HINT.to_string());
        };
        let Some(frame) = board.tables.get(&table_id) else {
            return Ok(format!("Table '{table_id}' is no longer on the blackboard."));
        };

        let (analysis, plots) = self.analyze(message, frame)?;

        if !plots.is_empty() {
            let entry = board
                .scratch
                .entry("plots".to_string())
                .or_insert_with(|| serde_json::Value::Array(Vec::new()));
            if let Some(list) = entry.as_array_mut() {
                list.extend(plots.iter().map(|p| serde_json::Value::String(p.clone())));
            }
        }

        if !self.commentary {
            return Ok(analysis);
        }

        let prompt = format!(
            "User query: {message}\n\nPartial data analysis:\n{analysis}\nPlease provide an expert-level commentary."
        );
        let commentary = self.llm.complete_soft(&prompt, None).await;
        Ok(format!("{analysis}\nExpert commentary:\n{commentary}"))
    }

    /// Run every intent check against the message, in priority order.
    /// Returns the analysis text and any plot artifact paths produced.
    fn analyze(&self, message: &str, frame: &Frame) -> Result<(String, Vec<String>), AppError> {
        let lower = message.to_lowercase();
        let mut analysis = String::new();
        let mut plots = Vec::new();

        // 1) Summary statistics.
        if STATS_KEYWORDS.iter().any(|k| lower.contains(k)) {
            analysis.push_str(&format!("Summary statistics:\n{}\n", frame.describe()));
        }

        // 2) Group by.
        if let Some(cap) = self.group_re.captures(&lower) {
            let column = &cap[1];
            match frame.group_by(column) {
                Some(grouped) => {
                    analysis.push_str(&format!("Grouped by '{column}':\n{grouped}\n"));
                }
                None => {
                    analysis.push_str(&format!("(No column '{column}' found for group by.)\n\n"));
                }
            }
        }

        // 3) Plot / chart.
        if let Some(cap) = self.plot_re.captures(&lower) {
            let column = &cap[2];
            match frame.column(column) {
                Some(col) if col.is_numeric() && !col.numeric_values().is_empty() => {
                    let path = self.plots_dir.join(format!("plot_{}.svg", sanitize(&col.name)));
                    plot::render_column(frame, &col.name, &path)?;
                    let shown = path.display();
                    analysis.push_str(&format!(
                        "Created a plot for column '{}': [PLOT]{shown}[/PLOT]\n",
                        col.name
                    ));
                    plots.push(shown.to_string());
                }
                Some(col) => {
                    analysis.push_str(&format!("(Column '{}' is not numeric; nothing to plot.)\n", col.name));
                }
                None => {
                    analysis.push_str(&format!("(No column '{column}' found for plotting.)\n"));
                }
            }
        } else if lower.contains("plot") || lower.contains("chart") {
            // Plot requested with no column named: all numeric columns, stacked.
            if frame.numeric_columns().iter().any(|c| !c.numeric_values().is_empty()) {
                let path = self.plots_dir.join("plot_all_numeric.svg");
                plot::render_all_numeric(frame, &path)?;
                let shown = path.display();
                analysis.push_str(&format!("Created a multi-column plot: [PLOT]{shown}[/PLOT]\n"));
                plots.push(shown.to_string());
            } else {
                analysis.push_str("(No numeric columns to plot.)\n");
            }
        }

        // 4) Nothing recognized: hint with the available columns.
        if analysis.trim().is_empty() {
            analysis = format!(
                "No 'stats', 'describe', 'summary', 'group by', or 'plot' request recognized.\nAvailable columns: {}\n",
                frame.column_names().join(", ")
            );
        }

        Ok((analysis, plots))
    }
}

/// File-name-safe rendering of a column name.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}
