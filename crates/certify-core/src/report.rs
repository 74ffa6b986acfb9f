//! Quiz report with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuizError;
use crate::generator::{Notice, QuestionSource};
use crate::scoring::Results;
use crate::session::TestSession;

/// Percentage at or above which a result earns congratulations.
pub const GREAT_JOB_THRESHOLD: f64 = 80.0;

/// A complete report for one submitted test session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    /// Session the report was built from.
    pub session_id: Uuid,
    /// When the test was generated.
    pub generated_at: DateTime<Utc>,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Where the questions came from.
    pub source: QuestionSource,
    /// Notices raised during generation.
    #[serde(default)]
    pub notices: Vec<Notice>,
    /// Scored results.
    pub results: Results,
}

impl QuizReport {
    /// Build a report from a submitted session.
    pub fn from_session(session: &TestSession) -> Result<Self, QuizError> {
        let results = session.results().ok_or(QuizError::NotSubmitted)?;
        Ok(Self {
            session_id: session.id,
            generated_at: session.created_at,
            created_at: Utc::now(),
            source: session.source.clone(),
            notices: session.notices.clone(),
            results: results.clone(),
        })
    }

    /// Human-facing takeaways from the results.
    pub fn insights(&self) -> Vec<String> {
        let mut insights = Vec::new();
        if self.results.total > 0 && self.results.percentage >= GREAT_JOB_THRESHOLD {
            insights.push("Great job!".to_string());
        }
        if let Some(topic) = &self.results.weakest_topic {
            insights.push(format!("Your lowest score is in {topic}. Focus there!"));
        }
        insights
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let r = &self.results;
        let mut md = String::new();

        md.push_str("## Your Results\n\n");
        md.push_str(&format!(
            "**Overall Score:** {:.1}% ({}/{} correct)\n\n",
            r.percentage, r.score, r.total
        ));
        md.push_str(&format!("_Questions from {}_\n\n", self.source));

        for notice in &self.notices {
            md.push_str(&format!("> {notice}\n\n"));
        }

        if r.topics.present().next().is_some() {
            md.push_str("### Performance by Topic\n\n");
            md.push_str("| Topic | Correct | Percentage |\n");
            md.push_str("|-------|---------|------------|\n");
            for t in r.topics.present() {
                md.push_str(&format!(
                    "| {} | {}/{} | {:.1}% |\n",
                    t.topic,
                    t.correct,
                    t.total,
                    t.percentage().unwrap_or(0.0)
                ));
            }
            md.push('\n');
        }

        let absent: Vec<&str> = r.topics.absent().map(|t| t.topic.as_str()).collect();
        if !absent.is_empty() {
            md.push_str(&format!("No questions from: {}\n\n", absent.join(", ")));
        }

        for insight in self.insights() {
            md.push_str(&format!("- {insight}\n"));
        }

        md
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
