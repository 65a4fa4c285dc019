//! Pipeline orchestration
//!
//! Drives fetch → match → score → aggregate for every tracked entity:
//! - Entities run in registry order; each one is a join barrier over its sources
//! - Sources of the entity's category are fetched as concurrent tasks, bounded
//!   by a semaphore and throttled per source
//! - A failing or slow source contributes zero items; the run continues
//! - Successful fetches are memoised in a [`RunContext`] for the duration of one run


use crate::aggregate::{aggregate, EntitySummary, ScoredItem};
use crate::config::PipelineConfig;
use crate::error::{Result, SentimentError};
use crate::feed::{FeedSourceSet, NewsItem, RegisteredSource};
use crate::matcher::match_items;
use crate::registry::{EntityRegistry, TrackedEntity};
use crate::sentiment::{Outcome, Scorer};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, OnceCell, Semaphore};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of one source fetch; failures keep only the reason
type FetchResult = std::result::Result<Arc<Vec<NewsItem>>, String>;

/// State scoped to a single pipeline run
pub struct RunContext {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    fetched: Mutex<HashMap<String, Arc<OnceCell<Arc<Vec<NewsItem>>>>>>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            fetched: Mutex::new(HashMap::new()),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of sources fetched (or attempted) so far in this run
    pub fn fetched_sources(&self) -> usize {
        self.fetched.lock().len()
    }

    /// Fetch a source at most once per run. Concurrent callers for the same
    /// source wait on the first call instead of issuing their own. Only
    /// successful fetches are kept; after a failure the next caller retries.
    pub async fn fetch(
        &self,
        source: &RegisteredSource,
        limit: usize,
        timeout: Duration,
    ) -> FetchResult {
        let cell = {
            let mut fetched = self.fetched.lock();
            Arc::clone(fetched.entry(source.name().to_string()).or_default())
        };

        let result = cell
            .get_or_try_init(|| async {
                let items = source.fetch(limit, timeout).await?;
                debug!("Fetched {} items from {}", items.len(), source.name());
                Ok::<_, SentimentError>(Arc::new(items))
            })
            .await;

        match result {
            Ok(items) => Ok(Arc::clone(items)),
            Err(e) => {
                warn!("Source {} unavailable: {}", source.name(), e);
                Err(e.to_string())
            }
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// External request to stop a run between entities
#[derive(Clone)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
    tx: broadcast::Sender<()>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            raised: Arc::new(AtomicBool::new(false)),
            tx,
        }
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
        let _ = self.tx.send(());
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Resolves once the signal has been raised
    pub async fn raised(&self) {
        let mut rx = self.tx.subscribe();
        if self.is_raised() {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a full pass over the registry
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One summary per processed entity, in registry order
    pub summaries: Vec<EntitySummary>,
    /// True when a stop signal cut the run short
    pub cancelled: bool,
}

impl RunOutcome {
    pub fn total_articles(&self) -> usize {
        self.summaries.iter().map(|s| s.article_count).sum()
    }

    pub fn summary(&self, entity_id: &str) -> Option<&EntitySummary> {
        self.summaries
            .iter()
            .find(|s| s.entity_id.eq_ignore_ascii_case(entity_id))
    }
}

/// Per-entity fetch/match/score/aggregate driver
pub struct Pipeline {
    scorer: Arc<Scorer>,
    max_items: usize,
    fetch_timeout: Duration,
    fetch_permits: Arc<Semaphore>,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_scorer(Scorer::new(), config)
    }

    pub fn with_scorer(scorer: Scorer, config: &PipelineConfig) -> Self {
        Self {
            scorer: Arc::new(scorer),
            max_items: config.max_items_per_source,
            fetch_timeout: config.fetch_timeout(),
            fetch_permits: Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
        }
    }

    /// Override the per-fetch timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Analyse every entity in the registry
    pub async fn run(
        &self,
        registry: &EntityRegistry,
        sources: &FeedSourceSet,
        ctx: &Arc<RunContext>,
    ) -> Result<RunOutcome> {
        self.drive(registry, sources, ctx, None, &StopSignal::new())
            .await
    }

    /// Like [`Pipeline::run`], emitting each summary as soon as its entity
    /// completes and honouring `stop` between entities.
    pub async fn run_streaming(
        &self,
        registry: &EntityRegistry,
        sources: &FeedSourceSet,
        ctx: &Arc<RunContext>,
        tx: mpsc::Sender<EntitySummary>,
        stop: &StopSignal,
    ) -> Result<RunOutcome> {
        self.drive(registry, sources, ctx, Some(&tx), stop).await
    }

    async fn drive(
        &self,
        registry: &EntityRegistry,
        sources: &FeedSourceSet,
        ctx: &Arc<RunContext>,
        tx: Option<&mpsc::Sender<EntitySummary>>,
        stop: &StopSignal,
    ) -> Result<RunOutcome> {
        if registry.is_empty() {
            return Err(SentimentError::EmptyRegistry);
        }

        info!(
            "Run {} started: {} entities, {} sources",
            ctx.run_id(),
            registry.len(),
            sources.len()
        );

        let mut summaries = Vec::with_capacity(registry.len());
        let mut cancelled = false;

        for entity in registry {
            if stop.is_raised() {
                info!(
                    "Stop requested; {} of {} entities analysed",
                    summaries.len(),
                    registry.len()
                );
                cancelled = true;
                break;
            }

            let summary = self.process_entity(entity, sources, ctx).await;

            if let Some(tx) = tx {
                if tx.send(summary.clone()).await.is_err() {
                    debug!("Summary receiver dropped; continuing run");
                }
            }
            summaries.push(summary);
        }

        let outcome = RunOutcome {
            run_id: ctx.run_id(),
            started_at: ctx.started_at(),
            finished_at: Utc::now(),
            summaries,
            cancelled,
        };

        info!(
            "Run {} finished: {} summaries, {} articles{}",
            outcome.run_id,
            outcome.summaries.len(),
            outcome.total_articles(),
            if cancelled { " (cancelled)" } else { "" }
        );

        Ok(outcome)
    }

    /// Fetch, match, score and aggregate one entity. Always yields a summary.
    pub async fn process_entity(
        &self,
        entity: &TrackedEntity,
        sources: &FeedSourceSet,
        ctx: &Arc<RunContext>,
    ) -> EntitySummary {
        info!("Analysing {} ({})", entity.id(), entity.category());

        let entity = Arc::new(entity.clone());
        let mut handles = Vec::new();

        for source in sources.for_category(entity.category()) {
            let ctx = Arc::clone(ctx);
            let entity = Arc::clone(&entity);
            let scorer = Arc::clone(&self.scorer);
            let permits = Arc::clone(&self.fetch_permits);
            let (limit, timeout) = (self.max_items, self.fetch_timeout);
            let name = source.name().to_string();

            let handle = tokio::spawn(async move {
                let items = {
                    let _permit = match permits.acquire_owned().await {
                        Ok(p) => p,
                        Err(e) => {
                            warn!("Fetch pool closed, skipping {}: {}", source.name(), e);
                            return Vec::new();
                        }
                    };
                    ctx.fetch(&source, limit, timeout).await
                };

                match items {
                    Ok(items) => score_matches(&scorer, &entity, &items),
                    Err(_) => Vec::new(),
                }
            });

            handles.push((name, handle));
        }

        // Join barrier: every source task settles before aggregation
        let results = join_all(
            handles
                .into_iter()
                .map(|(name, handle)| async move { (name, handle.await) }),
        )
        .await;

        let mut scored = Vec::new();
        for (name, result) in results {
            match result {
                Ok(items) => scored.extend(items),
                Err(e) => warn!("Task for {} / {} failed: {}", entity.id(), name, e),
            }
        }

        let summary = aggregate(&entity, scored);
        info!(
            "{}: {} articles, avg {:.3} ({})",
            summary.entity_id, summary.article_count, summary.avg_sentiment, summary.label
        );
        summary
    }
}

/// Match an entity against fetched items and score each hit. Items the
/// compound model cannot score are dropped.
fn score_matches(scorer: &Scorer, entity: &TrackedEntity, items: &[NewsItem]) -> Vec<ScoredItem> {
    match_items(items, entity)
        .into_iter()
        .filter_map(|matched| {
            let text = matched.item.text();
            match scorer.evaluate(&text) {
                Ok(outcome) => {
                    let degraded_reason = match &outcome {
                        Outcome::Complete(_) => None,
                        Outcome::Degraded { reason, .. } => {
                            warn!(
                                "Scoring degraded for {} item from {}: {}",
                                entity.id(),
                                matched.item.source_id,
                                reason
                            );
                            Some(reason.clone())
                        }
                    };
                    let score = outcome.into_value();
                    debug!(
                        "{} [{}] {:.3}: {}",
                        entity.id(),
                        matched.item.source_id,
                        score.overall,
                        matched.item.title
                    );
                    Some(ScoredItem {
                        matched,
                        score,
                        computed_at: Utc::now(),
                        degraded_reason,
                    })
                }
                Err(e) => {
                    warn!(
                        "Dropping {} item from {}: {}",
                        entity.id(),
                        matched.item.source_id,
                        e
                    );
                    None
                }
            }
        })
        .collect()
}
