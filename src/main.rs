use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use atsfit::config::Config;
use atsfit::db::models::NewRun;
use atsfit::db::Database;
use atsfit::jd::JobDescription;
use atsfit::keywords::cache::cache_key;
use atsfit::keywords::{ClassificationRuleset, Classifier, InMemoryLearnedStore, KeywordCache, LearnedKeywordStore};
use atsfit::resume::ResumeDocument;
use atsfit::tailor::Tailor;

/// atsfit: keyword-driven résumé tailoring.
///
/// Extracts the vocabulary an applicant tracking system will score a job
/// description against, then works it into your résumé's summary, bullets,
/// and skills without touching employers, titles, or dates.
#[derive(Parser)]
#[command(name = "atsfit", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Extract and classify keywords from a job description
    Extract {
        /// Job description file (plain text or HTML)
        #[arg(long)]
        jd: PathBuf,

        /// Source URL of the posting (used as the cache key)
        #[arg(long)]
        url: Option<String>,
    },

    /// Tailor a résumé to one job description
    Tailor {
        /// Résumé JSON file
        #[arg(long)]
        resume: PathBuf,

        /// Job description file (plain text or HTML)
        #[arg(long)]
        jd: PathBuf,

        /// Source URL of the posting (used as the cache key)
        #[arg(long)]
        url: Option<String>,

        /// Where to write the tailored résumé JSON
        #[arg(long, default_value = "output/tailored-resume.json")]
        out: PathBuf,

        /// Also write a Markdown report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Seed for connector-phrase selection (default: fixed rotation)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Tailor a résumé against every job description in a directory
    Batch {
        /// Résumé JSON file
        #[arg(long)]
        resume: PathBuf,

        /// Directory of job description files
        #[arg(long)]
        jd_dir: PathBuf,

        /// Number of job descriptions to tailor in parallel (default: 4)
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Directory for tailored résumés and reports
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
    },

    /// Show the most frequent learned keywords
    Learned {
        /// Number of terms to show (default: 25)
        #[arg(long, default_value = "25")]
        limit: u32,
    },

    /// Show system status (DB stats, learned store, recent runs)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("atsfit=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing atsfit database...");
            let config = Config::load()?;
            let db = atsfit::db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\natsfit is ready. Next step:");
            println!("  atsfit tailor --resume resume.json --jd job.txt");
        }

        Commands::Extract { jd, url } => {
            let config = Config::load()?;
            let db = atsfit::db::initialize_sqlite(&config.db_path)?;
            let learned = load_learned(&db, &config).await?;
            let tailor = build_tailor(&config, learned.clone(), None)?;

            let jd = read_jd(&jd, url, config.tailor.max_jd_chars)?;
            let extraction = tailor.extract(&jd);
            atsfit::output::terminal::display_keywords(&extraction);

            persist_learned(&db, learned.as_ref()).await;
        }

        Commands::Tailor {
            resume,
            jd,
            url,
            out,
            report,
            seed,
        } => {
            let config = Config::load()?;
            let db = atsfit::db::initialize_sqlite(&config.db_path)?;
            let learned = load_learned(&db, &config).await?;
            let tailor = build_tailor(&config, learned.clone(), seed)?;

            let resume = ResumeDocument::load(&resume)?;
            let jd = read_jd(&jd, url, config.tailor.max_jd_chars)?;
            let source = cache_key(&jd);

            let result = tailor.tailor(&jd, &resume);
            atsfit::output::terminal::display_result(&result);

            write_json(&out, &result.tailored_resume)?;
            println!("{}", format!("Tailored résumé saved to: {}", out.display()).bold());

            if let Some(report) = report {
                let path = atsfit::output::markdown::generate_report(
                    &result,
                    &source,
                    &report.to_string_lossy(),
                )?;
                println!("{}", format!("Markdown report saved to: {path}").bold());
            }

            if let Err(e) = db.record_run(&NewRun::from_result(source, &result)).await {
                warn!(error = %e, "Failed to record tailoring run");
            }
            persist_learned(&db, learned.as_ref()).await;
        }

        Commands::Batch {
            resume,
            jd_dir,
            concurrency,
            out_dir,
        } => {
            let config = Config::load()?;
            let db = atsfit::db::initialize_sqlite(&config.db_path)?;
            let learned = load_learned(&db, &config).await?;
            let tailor = Arc::new(build_tailor(&config, learned.clone(), None)?);
            let resume = Arc::new(ResumeDocument::load(&resume)?);

            let files = list_jd_files(&jd_dir)?;
            if files.is_empty() {
                anyhow::bail!("No job description files found in {}", jd_dir.display());
            }
            println!(
                "Tailoring against {} job descriptions ({} at a time)...",
                files.len(),
                concurrency.max(1)
            );

            let mut jobs = Vec::with_capacity(files.len());
            for path in &files {
                let jd = read_jd(path, None, config.tailor.max_jd_chars)?;
                jobs.push((file_stem(path), jd));
            }

            let pb = ProgressBar::new(jobs.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Tailoring [{bar:30}] {pos}/{len} ({eta})")
                    .context("Invalid progress bar template")?,
            );

            // Each request runs on a blocking worker; the cache and learned
            // store are shared through the Tailor.
            let results: Vec<_> = stream::iter(jobs)
                .map(|(name, jd)| {
                    let tailor = Arc::clone(&tailor);
                    let resume = Arc::clone(&resume);
                    let pb = pb.clone();
                    async move {
                        let source = cache_key(&jd);
                        let outcome =
                            tokio::task::spawn_blocking(move || tailor.tailor(&jd, &resume)).await;
                        pb.inc(1);
                        (name, source, outcome)
                    }
                })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;
            pb.finish_and_clear();

            // Write outputs and history sequentially
            let mut tailored = 0usize;
            let mut scores = Vec::new();
            for (name, source, outcome) in results {
                let result = match outcome {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(jd = %name, error = %e, "Tailoring task failed");
                        continue;
                    }
                };

                write_json(&out_dir.join(format!("{name}.json")), &result.tailored_resume)?;
                let report_path = out_dir.join(format!("{name}.md"));
                atsfit::output::markdown::generate_report(
                    &result,
                    &source,
                    &report_path.to_string_lossy(),
                )?;
                if let Err(e) = db.record_run(&NewRun::from_result(source, &result)).await {
                    warn!(jd = %name, error = %e, "Failed to record tailoring run");
                }

                println!(
                    "  {:<40} {:>6.1}%  {} insertions",
                    name,
                    result.match_score,
                    result.log.len()
                );
                scores.push(result.match_score);
                tailored += 1;
            }
            persist_learned(&db, learned.as_ref()).await;

            let mean = if scores.is_empty() {
                0.0
            } else {
                scores.iter().sum::<f64>() / scores.len() as f64
            };
            println!("\n{}", "Batch complete.".bold());
            println!("  Résumés tailored: {tailored}");
            println!("  Mean match score: {mean:.1}%");
            println!("  Output: {}", out_dir.display());
        }

        Commands::Learned { limit } => {
            let config = Config::load()?;
            let db = atsfit::db::open_sqlite(&config.db_path)?;
            let entries = db.top_learned_keywords(limit).await?;
            atsfit::output::terminal::display_learned(&entries);
        }

        Commands::Status => {
            let config = Config::load()?;
            if !Path::new(&config.db_path).exists() {
                println!("Database: not initialized");
                println!("\nRun `atsfit init` to set up the database.");
                return Ok(());
            }
            let db = atsfit::db::open_sqlite(&config.db_path)?;
            atsfit::status::show(&db, &config).await?;
        }
    }

    Ok(())
}

/// The classifier from ATSFIT_RULESET_PATH, or the built-in one.
fn load_classifier(config: &Config) -> Result<Arc<Classifier>> {
    match &config.ruleset_path {
        Some(path) => {
            let ruleset = ClassificationRuleset::load(path)?;
            info!(version = ruleset.version, path = %path.display(), "Loaded classification ruleset");
            Ok(Arc::new(ruleset.compile()))
        }
        None => Ok(Arc::new(Classifier::default())),
    }
}

fn build_tailor(
    config: &Config,
    learned: Arc<InMemoryLearnedStore>,
    seed: Option<u64>,
) -> Result<Tailor> {
    let classifier = load_classifier(config)?;
    let cache = Arc::new(KeywordCache::new(
        config.tailor.cache_ttl,
        config.tailor.cache_capacity,
    ));
    Ok(Tailor::new(config.tailor.clone(), classifier, learned, cache).with_seed(seed))
}

/// Hydrate the learned store from the database.
async fn load_learned(db: &Arc<dyn Database>, config: &Config) -> Result<Arc<InMemoryLearnedStore>> {
    let store = Arc::new(InMemoryLearnedStore::new(config.tailor.learned_capacity));
    let entries = db.load_learned_keywords().await?;
    info!(entries = entries.len(), "Loaded learned keywords");
    store.load(entries);
    Ok(store)
}

/// Write the learned store back. Failure only costs future boosts, so it is
/// logged rather than returned.
async fn persist_learned(db: &Arc<dyn Database>, store: &dyn LearnedKeywordStore) {
    let snapshot = store.snapshot();
    match db.save_learned_keywords(&snapshot).await {
        Ok(()) => info!(entries = snapshot.len(), "Saved learned keywords"),
        Err(e) => warn!(error = %e, "Failed to save learned keywords"),
    }
}

fn read_jd(path: &Path, url: Option<String>, max_chars: usize) -> Result<JobDescription> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job description at {}", path.display()))?;
    Ok(JobDescription::new(raw, url, max_chars))
}

fn list_jd_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| matches!(e, "txt" | "md" | "html" | "htm"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "jd".to_string())
}

fn write_json(path: &Path, resume: &ResumeDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    std::fs::write(path, resume.to_json()?)
        .with_context(|| format!("Failed to write {}", path.display()))
}
