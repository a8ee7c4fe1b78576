//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use tribunal_domain::Grade;
use tribunal_pipeline::{PipelineOutcome, StateSnapshot};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of a run.
    pub fn format_outcome(&self, outcome: &PipelineOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_outcome_json(outcome),
            OutputFormat::Table => Ok(self.format_outcome_table(outcome)),
            OutputFormat::Quiet => Ok(outcome.digest.clone()),
        }
    }

    fn format_outcome_json(&self, outcome: &PipelineOutcome) -> Result<String> {
        let value = serde_json::json!({
            "answer": outcome.answer,
            "digest": outcome.digest,
            "witness": outcome.witness,
            "final_state": outcome.final_state,
            "snapshot": outcome.snapshot,
            "telemetry": outcome.telemetry,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_outcome_table(&self, outcome: &PipelineOutcome) -> String {
        let consensus = &outcome.snapshot.consensus_score;
        let plan = &outcome.snapshot.execution_plan;
        let path: Vec<&str> = plan.tier_path.iter().map(|s| s.as_str()).collect();

        let rows = [
            ("Grade", consensus.grade.to_string()),
            ("Score", format!("{:.2}", consensus.score)),
            ("Bucket", outcome.telemetry.bucket.to_string()),
            (
                "Agreement",
                format!(
                    "{}/{} ({})",
                    consensus.agreement_count,
                    consensus.total_responses,
                    consensus.contributing_models.join(", ")
                ),
            ),
            (
                "Witness",
                format!("{} ({:.2})", outcome.witness.name, outcome.witness.reliability),
            ),
            ("Tier path", path.join(" → ")),
            ("Escalation", outcome.final_state.to_string()),
            ("Timestamp", outcome.snapshot.timestamp.to_string()),
            ("Digest", outcome.digest.clone()),
        ];

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (field, value) in rows {
            builder.push_record([field.to_string(), value]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!(
            "{}\n\n{}",
            self.colorize(&outcome.answer, grade_color(consensus.grade)),
            table
        )
    }

    /// Format the snapshots stored in a replay log.
    pub fn format_snapshots(&self, snapshots: &[StateSnapshot]) -> Result<String> {
        let digests = snapshots
            .iter()
            .map(StateSnapshot::digest)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        match self.format {
            OutputFormat::Json => {
                let entries: Vec<serde_json::Value> = snapshots
                    .iter()
                    .zip(&digests)
                    .map(|(snapshot, digest)| {
                        serde_json::json!({
                            "timestamp": snapshot.timestamp,
                            "digest": digest,
                            "grade": snapshot.consensus_score.grade,
                            "score": snapshot.consensus_score.score,
                            "claims": snapshot.psl.len(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&entries)?)
            }
            OutputFormat::Quiet => Ok(digests.join("\n")),
            OutputFormat::Table => {
                if snapshots.is_empty() {
                    return Ok(self.colorize("No snapshots logged.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Timestamp", "Claims", "Grade", "Score", "Digest"]);
                for (index, (snapshot, digest)) in snapshots.iter().zip(&digests).enumerate() {
                    builder.push_record([
                        (index + 1).to_string(),
                        snapshot.timestamp.to_string(),
                        snapshot.psl.len().to_string(),
                        snapshot.consensus_score.grade.to_string(),
                        format!("{:.2}", snapshot.consensus_score.score),
                        digest[..16].to_string(), // Truncate digest for readability
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format a successful verification.
    pub fn verified(&self, digest: &str) -> String {
        match self.format {
            OutputFormat::Quiet => digest.to_string(),
            _ => self.success(&format!("Replay verified: {}", digest)),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::APlus | Grade::A | Grade::BPlus => "green",
        Grade::B | Grade::C => "yellow",
        Grade::D | Grade::F => "red",
    }
}
