//! Run report persistence
//!
//! One JSON file per run, named `sentiment_results_%Y%m%d_%H%M%S.json`, holding
//! the per-entity scores without the evidence.


use crate::aggregate::EntitySummary;
use crate::error::Result;
use crate::pipeline::RunOutcome;
use crate::registry::Category;
use crate::sentiment::SentimentLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

const FILE_PREFIX: &str = "sentiment_results_";

/// Persisted form of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub analysis_date: DateTime<Utc>,
    pub run_id: Uuid,
    pub summary: ReportSummary,
    pub entities: Vec<EntityRecord>,
}

/// Run-level totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_stocks_analysed: usize,
    pub total_saas_analysed: usize,
    pub total_articles: usize,
}

/// Persisted form of an [`EntitySummary`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub category: Category,
    pub avg_sentiment: f64,
    pub label: SentimentLabel,
    pub article_count: usize,
    /// Sorted
    pub sources: Vec<String>,
}

impl From<&EntitySummary> for EntityRecord {
    fn from(summary: &EntitySummary) -> Self {
        Self {
            id: summary.entity_id.clone(),
            category: summary.category,
            avg_sentiment: summary.avg_sentiment,
            label: summary.label,
            article_count: summary.article_count,
            // BTreeSet iterates in order
            sources: summary.sources.iter().cloned().collect(),
        }
    }
}

impl RunReport {
    pub fn new(run_id: Uuid, analysis_date: DateTime<Utc>, summaries: &[EntitySummary]) -> Self {
        let count = |category: Category| summaries.iter().filter(|s| s.category == category).count();

        Self {
            analysis_date,
            run_id,
            summary: ReportSummary {
                total_stocks_analysed: count(Category::Stock),
                total_saas_analysed: count(Category::Saas),
                total_articles: summaries.iter().map(|s| s.article_count).sum(),
            },
            entities: summaries.iter().map(EntityRecord::from).collect(),
        }
    }

    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        Self::new(outcome.run_id, outcome.finished_at, &outcome.summaries)
    }

    pub fn entity(&self, id: &str) -> Option<&EntityRecord> {
        self.entities.iter().find(|e| e.id.eq_ignore_ascii_case(id))
    }

    /// Records of one category, in run order
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &EntityRecord> {
        self.entities.iter().filter(move |e| e.category == category)
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}{}.json",
            FILE_PREFIX,
            self.analysis_date.format("%Y%m%d_%H%M%S")
        )
    }
}

/// Directory of saved run reports
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// `~` in the directory is expanded
    pub fn new(dir: &str) -> Self {
        Self {
            dir: PathBuf::from(shellexpand::tilde(dir).as_ref()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a report, returning its path. A report from the same second
    /// gets the run id appended instead of overwriting.
    pub async fn save(&self, report: &RunReport) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut path = self.dir.join(report.file_name());
        if tokio::fs::try_exists(&path).await? {
            let run = report.run_id.simple().to_string();
            path = self.dir.join(format!(
                "{}{}_{}.json",
                FILE_PREFIX,
                report.analysis_date.format("%Y%m%d_%H%M%S"),
                &run[..8]
            ));
        }

        let json = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&path, json).await?;

        info!("Results saved to {}", path.display());
        Ok(path)
    }

    pub async fn load<P: AsRef<Path>>(&self, path: P) -> Result<RunReport> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Saved report files, oldest first
    pub async fn list(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(paths),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(FILE_PREFIX) && name.ends_with(".json") {
                paths.push(entry.path());
            }
        }
        // Timestamped names sort chronologically
        paths.sort();
        Ok(paths)
    }

    /// Most recently saved report, if any
    pub async fn latest(&self) -> Result<Option<RunReport>> {
        match self.list().await?.last() {
            Some(path) => Ok(Some(self.load(path).await?)),
            None => Ok(None),
        }
    }
}
