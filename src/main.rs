//! Procsight - Main Entry Point
//!
//! One-shot pipeline: snapshot capture -> convergence classification ->
//! network risk scoring -> misconfiguration findings -> report.

mod cli;
mod constants;
mod logic;

use std::time::Duration;

use logic::cache::ResultCache;
use logic::classify::CategoryTaxonomy;
use logic::config::AnalyzerConfig;
use logic::convergence::{self, ConvergenceConfig};
use logic::ollama::{OllamaClient, OllamaConfig};
use logic::{detector, netrisk, report, snapshot, summary};

#[tokio::main]
async fn main() {
    let options = match cli::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, cli::usage());
            std::process::exit(2);
        }
    };

    if options.help {
        println!("{}", cli::usage());
        return;
    }
    if options.version {
        println!("{} {}", constants::APP_NAME, constants::APP_VERSION);
        return;
    }

    let default_filter = if options.verbose {
        "debug"
    } else if options.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(options).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(options: cli::Options) -> Result<(), String> {
    if options.init_config {
        let path = std::path::PathBuf::from(constants::CONFIG_FILE_NAME);
        AnalyzerConfig::write_default(&path).map_err(|e| e.to_string())?;
        println!("Configuration file created: {}", path.display());
        return Ok(());
    }

    let config = build_config(&options)?;

    let cache = ResultCache::new(
        config.cache_enabled,
        config.resolved_cache_dir(),
        config.cache_ttl_hours,
    );

    if options.cache_stats {
        let stats = cache.stats();
        println!("Cache directory: {}", cache.directory().display());
        println!("{}", serde_json::to_string_pretty(&stats).unwrap_or_default());
        return Ok(());
    }
    if options.clear_cache {
        println!("Removed {} cached results", cache.clear());
        return Ok(());
    }

    // Expired entries never serve a hit; sweep them up front.
    let swept = cache.sweep_expired();
    if swept > 0 {
        log::debug!("Swept {} expired cache entries", swept);
    }

    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    // Sensor fan-out; only an unreadable process table is fatal.
    let snapshot = snapshot::collect(config.max_processes, config.analyze_network)
        .await
        .map_err(|e| e.to_string())?;
    log::info!(
        "Snapshot captured: {} processes, {} connections",
        snapshot.processes.len(),
        snapshot.connections.len()
    );

    let taxonomy = CategoryTaxonomy::new(&config.enabled_categories, &config.custom_keywords);
    let client = OllamaClient::new(OllamaConfig {
        base_url: config.ollama_url.clone(),
        model: config.ollama_model.clone(),
        temperature: config.temperature,
        probe_timeout: Duration::from_secs(config.probe_timeout_secs),
        generate_timeout: Duration::from_secs(config.generate_timeout_secs),
    });
    let convergence_config = ConvergenceConfig {
        max_iterations: config.max_iterations,
        use_inference: config.use_llm,
        excluded_names: config.excluded_names(),
    };

    let outcome = convergence::run(
        &snapshot.processes,
        &taxonomy,
        &cache,
        &client,
        &convergence_config,
    )
    .await;

    let network = if config.analyze_network {
        Some(netrisk::analyze(
            &snapshot.connections,
            snapshot.connection_error.clone(),
        ))
    } else {
        None
    };

    let findings = detector::detect(&snapshot.facts);
    let process_summary = summary::build(&snapshot.processes, &outcome);
    let analysis = report::assemble(&snapshot, findings, process_summary, &outcome, network);

    report::emit(&analysis, options.format, options.output.as_deref(), options.top)
        .map_err(|e| format!("cannot write report: {}", e))
}

/// File config plus CLI overrides, fixed for the rest of the run.
fn build_config(options: &cli::Options) -> Result<AnalyzerConfig, String> {
    let mut config =
        AnalyzerConfig::load(options.config_path.as_deref()).map_err(|e| e.to_string())?;

    if options.no_llm {
        config.use_llm = false;
    }
    if options.no_network {
        config.analyze_network = false;
    }
    if options.no_cache {
        config.cache_enabled = false;
    }
    if let Some(max_iterations) = options.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(model) = &options.model {
        config.ollama_model = model.clone();
    }
    if let Some(url) = &options.ollama_url {
        config.ollama_url = url.clone();
    }

    Ok(config)
}
