//! interlink CLI: manage the page catalog and generate internal links.
//!
//! Commands: page add|list|rm, generate, update, links, backlinks, stats

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{debug, Level};

use interlink_core::config::EngineConfig;
use interlink_core::page::{CandidatePage, SourcePage};
use interlink_engine::{format_links, format_opportunities, format_report, LinkingEngine, OutputFormat};
use interlink_index::LinkIndex;

/// Exit code when a generation report carries errors.
const EXIT_REPORT_FAILED: u8 = 2;

#[derive(Parser)]
#[command(name = "interlink")]
#[command(version)]
#[command(about = "Internal linking engine for content sites")]
struct Cli {
    /// SQLite database holding the catalog and the stored links
    #[arg(long, global = true, default_value = "interlink.db")]
    db: PathBuf,

    /// TOML file with engine settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the page catalog
    Page {
        #[command(subcommand)]
        action: PageCommand,
    },
    /// Generate links for a page, replacing its stored set
    #[command(alias = "gen")]
    Generate(GenerateArgs),
    /// Clear the stored links of a page, then generate afresh
    Update(GenerateArgs),
    /// Show the stored links of a page
    Links(ShowArgs),
    /// Show links on other pages pointing at a page
    Backlinks(ShowArgs),
    /// Totals over all stored links
    Stats,
}

#[derive(Subcommand)]
enum PageCommand {
    /// Insert or replace a catalog page
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        /// Defaults to /<category>/<id>
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        category: String,
        /// SEO quality, 0 to 100
        #[arg(long, default_value_t = 50.0)]
        quality: f64,
    },
    /// List catalog pages
    #[command(alias = "ls")]
    List,
    /// Remove a catalog page and the links it owns
    Rm {
        #[arg(long)]
        id: String,
    },
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    category: String,
    /// Page content as text
    #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
    content: Option<String>,
    /// Read page content from a file
    #[arg(long)]
    content_file: Option<PathBuf>,
    /// Print the ranked opportunities without storing links
    #[arg(long)]
    dry_run: bool,
    #[arg(long, default_value = "json", value_parser = parse_format)]
    format: OutputFormat,
}

#[derive(Args)]
struct ShowArgs {
    #[arg(long)]
    id: String,
    #[arg(long, default_value = "json", value_parser = parse_format)]
    format: OutputFormat,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let index = Arc::new(
        LinkIndex::open(&cli.db)
            .with_context(|| format!("failed to open database {}", cli.db.display()))?,
    );

    match cli.command {
        Commands::Page { action } => {
            run_page(&index, action)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Generate(args) => {
            let engine = build_engine(&index, cli.config.as_deref())?;
            run_generate(&engine, args, false).await
        }
        Commands::Update(args) => {
            let engine = build_engine(&index, cli.config.as_deref())?;
            run_generate(&engine, args, true).await
        }
        Commands::Links(args) => {
            let engine = build_engine(&index, cli.config.as_deref())?;
            let links = engine.get_internal_links(&args.id).await;
            println!("{}", format_links(&links, args.format));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Backlinks(args) => {
            let engine = build_engine(&index, cli.config.as_deref())?;
            let links = engine.get_backlinks(&args.id).await;
            println!("{}", format_links(&links, args.format));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Stats => {
            let engine = build_engine(&index, cli.config.as_deref())?;
            let stats = engine.get_link_statistics().await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_engine(index: &Arc<LinkIndex>, config_path: Option<&Path>) -> anyhow::Result<LinkingEngine> {
    let config = match config_path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    debug!(?config, "engine config");

    let engine = LinkingEngine::new(index.clone(), index.clone(), config)?;
    Ok(engine)
}

fn run_page(index: &LinkIndex, action: PageCommand) -> anyhow::Result<()> {
    match action {
        PageCommand::Add {
            id,
            title,
            url,
            category,
            quality,
        } => {
            if !(0.0..=100.0).contains(&quality) {
                bail!("--quality must be between 0 and 100, got {quality}");
            }
            let page = CandidatePage {
                url: url.unwrap_or_else(|| format!("/{category}/{id}")),
                id,
                title,
                category,
                quality_score: quality,
            };
            index.upsert_page(&page)?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        PageCommand::List => {
            let pages = index.list_pages()?;
            println!("{}", serde_json::to_string_pretty(&pages)?);
        }
        PageCommand::Rm { id } => {
            if index.get_page(&id)?.is_none() {
                bail!("page not found: {id}");
            }
            index.remove_page(&id)?;
            println!("{}", serde_json::json!({ "removed": id }));
        }
    }
    Ok(())
}

async fn run_generate(engine: &LinkingEngine, args: GenerateArgs, update: bool) -> anyhow::Result<ExitCode> {
    let content = match (&args.content, &args.content_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("either --content or --content-file is required"),
    };
    let source = SourcePage::new(args.id, args.title, args.category);

    if args.dry_run {
        let opportunities = engine.preview_opportunities(&source, &content).await;
        println!("{}", format_opportunities(&opportunities, args.format));
        return Ok(ExitCode::SUCCESS);
    }

    let report = if update {
        engine.update_internal_links(&source, &content).await
    } else {
        engine.generate_internal_links(&source, &content).await
    };
    println!("{}", format_report(&report, args.format));

    if report.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_REPORT_FAILED))
    }
}
