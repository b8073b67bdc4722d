use sectionrank::cli::{Cli, Commands, ConfigAction};
use sectionrank::collection::CollectionProcessor;
use sectionrank::config::{Config, ConfigValidator};
use sectionrank::document::JsonOutlineExtractor;
use sectionrank::embedding::FastEmbedProvider;
use sectionrank::error::{Result, SectionRankError};
use sectionrank::ranking::SectionRanker;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Run {
            input,
            output,
            top_k,
            window,
        } => {
            cmd_run(cli.config, cli.profile, input, output, top_k, window)?;
        }
        Commands::Rank {
            collection,
            output,
            json,
        } => {
            cmd_rank(cli.config, cli.profile, &collection, output, json)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, cli.profile, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose {
        "sectionrank=debug"
    } else {
        "sectionrank=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn cmd_run(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    top_k: Option<usize>,
    window: Option<usize>,
) -> Result<()> {
    let mut config = load_config(config_path, profile)?;

    if let Some(input) = input {
        config.paths.input_dir = input;
    }
    if let Some(output) = output {
        config.paths.output_dir = output;
    }
    if let Some(top_k) = top_k {
        config.ranking.top_k = top_k;
    }
    if let Some(window) = window {
        config.ranking.lexical_window = window;
    }
    ConfigValidator::validate(&config)?;

    let processor = build_processor(&config)?;
    let summary = processor.run(&config.paths.input_dir, &config.paths.output_dir)?;

    println!(
        "✓ Processed {} collections: {} written, {} skipped, {} failed",
        summary.collections, summary.written, summary.skipped, summary.failed
    );
    println!("  Output: {}", config.paths.output_dir.display());

    Ok(())
}

fn cmd_rank(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    collection: &Path,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config_path, profile)?;
    if let Some(output) = output {
        config.paths.output_dir = output;
    }

    let processor = build_processor(&config)?;
    let report = processor.process(collection);
    sectionrank::collection::cleanup_snapshots(&[collection.to_path_buf()]);

    let Some(report) = report? else {
        println!("No headings to rank in {}", collection.display());
        return Ok(());
    };

    if json {
        println!("{}", report.to_json()?);
    } else {
        let path = report.write(&config.paths.output_dir)?;
        println!("✓ Wrote {}", path.display());
    }

    Ok(())
}

fn cmd_config(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path, profile)?;
            let content = toml::to_string_pretty(&config)?;
            println!("{}", content);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            // Create parent directory
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| SectionRankError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn build_processor(config: &Config) -> Result<CollectionProcessor> {
    let provider = FastEmbedProvider::new(
        &config.embedding.model,
        config.embedding.cache_dir.as_deref(),
        config.embedding.show_download_progress,
    )?;

    let ranker = SectionRanker::new(config.ranking.clone(), Arc::new(provider));
    let extractor = JsonOutlineExtractor::new(config.paths.outline_dir.clone());

    Ok(CollectionProcessor::new(ranker, Box::new(extractor))
        .with_heading_snapshot(config.run.write_heading_snapshot))
}

fn load_config(config_path: Option<PathBuf>, profile: Option<String>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'sectionrank config init' to create one."
        );
        let mut config = Config::default();
        if let Some(profile) = profile {
            config.apply_profile(&profile)?;
        }
        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;
        return Ok(config);
    }

    match profile {
        Some(profile) => Config::load_with_profile(&path, &profile),
        None => Config::load(&path),
    }
}
