//! News Sentiment Aggregator
//!
//! Command line front end: full runs, single-entity drill-down and ad-hoc
//! text scoring.

use chrono::Utc;
use clap::{Parser, Subcommand};
use news_sentiment::{
    aggregate::EntitySummary,
    config::Config,
    feed::{mock, FeedSourceSet},
    pipeline::{Pipeline, RunContext, StopSignal},
    price::YahooChartClient,
    registry::{Category, EntityRegistry},
    report::{self, Insights},
    sentiment::Scorer,
    storage::{ReportStore, RunReport},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "news-sentiment")]
#[command(about = "Sentiment of financial and SaaS news per tracked entity")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path; default locations are searched when omitted
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse every tracked entity
    Run {
        /// Do not write the JSON report
        #[arg(long)]
        no_save: bool,
        /// Restrict the run to these entity ids
        #[arg(long, num_args = 1..)]
        only: Vec<String>,
        /// Use canned headlines instead of live feeds
        #[arg(long)]
        demo: bool,
    },
    /// Analyse one entity and show its strongest articles
    Entity {
        id: String,
        /// Articles to show
        #[arg(short, long, default_value = "3")]
        top: usize,
        #[arg(long)]
        demo: bool,
    },
    /// Score a piece of text
    Score { text: String },
    /// List the tracked entities
    Entities,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    match cli.command {
        Commands::Run {
            no_save,
            only,
            demo,
        } => run_all(config, no_save, &only, demo).await,
        Commands::Entity { id, top, demo } => analyse_entity(config, &id, top, demo).await,
        Commands::Score { text } => score_text(&text),
        Commands::Entities => list_entities(&config),
    }
}

/// Live RSS sources, or in-memory ones for `--demo`
fn build_sources(config: &mut Config, demo: bool) -> anyhow::Result<FeedSourceSet> {
    if !demo {
        return Ok(FeedSourceSet::from_config(config)?);
    }

    tracing::info!("Demo mode: canned headlines, SaaS aliases enabled");
    config.pipeline.enrich_saas_aliases = true;

    let mut sources = FeedSourceSet::new(config.pipeline.min_source_interval());
    for (i, (name, headlines)) in mock::demo_headlines().into_iter().enumerate() {
        let category = if i == 0 { Category::Stock } else { Category::Saas };
        sources.add(
            name,
            category,
            Arc::new(mock::StaticFeedSource::from_headlines(name, &headlines)),
        );
    }
    Ok(sources)
}

async fn run_all(
    mut config: Config,
    no_save: bool,
    only: &[String],
    demo: bool,
) -> anyhow::Result<()> {
    let sources = build_sources(&mut config, demo)?;
    let mut registry = config.registry()?;
    if !only.is_empty() {
        registry = registry.retain_ids(only)?;
    }

    println!("{}", "=".repeat(60));
    println!("Financial & SaaS News Sentiment");
    println!("Analysis date: {}", Utc::now().format("%d %B %Y"));
    println!("{}", "=".repeat(60));

    let pipeline = Pipeline::new(&config.pipeline);
    let ctx = Arc::new(RunContext::new());
    let stop = StopSignal::new();

    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after the current entity");
                stop.raise();
            }
        });
    }

    let (tx, mut rx) = mpsc::channel::<EntitySummary>(registry.len().max(1));
    let printer = tokio::spawn(async move {
        while let Some(summary) = rx.recv().await {
            println!(
                "  {:<8} {:<5} {:>7.3}  {:<14} {:>3} articles",
                summary.entity_id,
                summary.category,
                summary.avg_sentiment,
                summary.label,
                summary.article_count
            );
        }
    });

    let outcome = pipeline
        .run_streaming(&registry, &sources, &ctx, tx, &stop)
        .await?;
    let _ = printer.await;

    if outcome.cancelled {
        println!(
            "\nRun cancelled: {} of {} entities analysed",
            outcome.summaries.len(),
            registry.len()
        );
    }

    println!("\n{}", report::render_text(&Insights::from_summaries(&outcome.summaries)));

    if !no_save && !outcome.summaries.is_empty() {
        let store = ReportStore::new(&config.output.dir);
        let path = store.save(&RunReport::from_outcome(&outcome)).await?;
        println!("Results saved to {}", path.display());
    }

    Ok(())
}

async fn analyse_entity(mut config: Config, id: &str, top: usize, demo: bool) -> anyhow::Result<()> {
    let sources = build_sources(&mut config, demo)?;
    let registry: EntityRegistry = config.registry()?;
    let entity = registry
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Unknown entity: {}", id))?;

    let pipeline = Pipeline::new(&config.pipeline);
    let ctx = Arc::new(RunContext::new());
    let summary = pipeline.process_entity(entity, &sources, &ctx).await;

    println!("\n{} ({})", summary.entity_id, summary.category);
    println!("{}", "-".repeat(40));
    println!("Average sentiment: {:.3} ({})", summary.avg_sentiment, summary.label);
    println!("Articles analysed: {}", summary.article_count);
    if !summary.sources.is_empty() {
        let sources: Vec<&str> = summary.sources.iter().map(String::as_str).collect();
        println!("Sources: {}", sources.join(", "));
    }

    if summary.has_evidence() {
        println!("\nTop articles:");
        for (i, item) in report::top_evidence(&summary, top).iter().enumerate() {
            println!("{}. {}", i + 1, item.title());
            println!(
                "   {} | {:.3} ({})",
                item.source_id(),
                item.score.overall,
                item.score.label()
            );
        }
    } else {
        println!("\nNo matching articles");
    }

    if summary.category == Category::Stock && !demo {
        let prices = YahooChartClient::from_config(&config.prices)?;
        let today = Utc::now().date_naive();
        match report::price_context(&summary, &prices, today, config.prices.lookback_days).await {
            Ok(Some(ctx)) => println!(
                "\nLatest close: {:.2}  {}-day return: {:+.2}%",
                ctx.latest_close, config.prices.lookback_days, ctx.cumulative_return
            ),
            Ok(None) => println!("\nNo price data available"),
            Err(e) => tracing::warn!("Price history unavailable for {}: {}", summary.entity_id, e),
        }
    }

    Ok(())
}

fn score_text(text: &str) -> anyhow::Result<()> {
    let scorer = Scorer::new();
    let outcome = scorer.evaluate(text)?;
    let score = outcome.value();

    println!("Overall:      {:.3} ({})", score.overall, score.label());
    println!("Compound:     {:.3}", score.compound);
    println!(
        "Pos/Neg/Neu:  {:.3} / {:.3} / {:.3}",
        score.positive, score.negative, score.neutral
    );
    println!("Polarity:     {:.3}", score.polarity);
    println!("Subjectivity: {:.3}", score.subjectivity);
    if let Some(reason) = outcome.reason() {
        println!("Degraded:     {}", reason);
    }
    Ok(())
}

fn list_entities(config: &Config) -> anyhow::Result<()> {
    let registry = config.registry()?;
    for category in Category::ALL {
        println!("\n{}", category);
        println!("{}", "-".repeat(40));
        for entity in registry.by_category(category) {
            let aliases: Vec<&str> = entity.aliases().iter().map(String::as_str).collect();
            println!("  {:<8} {}", entity.id(), aliases.join(", "));
        }
    }
    Ok(())
}
