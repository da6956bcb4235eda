//! Resume screener: rank resumes against a job description

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_screener::cli::{self, Cli, Commands, ConfigAction};
use resume_screener::config::Config;
use resume_screener::error::{DocumentFailure, ScreenerError};
use resume_screener::input::manager::InputManager;
use resume_screener::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_screener::output::report::ScreeningReport;
use resume_screener::processing::document::RawDocument;
use resume_screener::processing::screener::ScreeningEngine;
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("reading {}", path.display())),
        None => Config::load().context("reading default configuration"),
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Rank {
            job,
            job_text,
            resumes,
            output,
            save,
            top_keywords,
            detailed,
            no_color,
        } => {
            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(ScreenerError::InvalidInput)?,
                None => config.output.format,
            };
            if let Some(top_n) = top_keywords {
                config.processing.keyword_top_n = top_n;
            }

            let engine = ScreeningEngine::new(&config.processing)?;
            let mut input_manager = InputManager::new().with_cache(config.processing.enable_caching);

            let (job_source, job_description) = match (job, job_text) {
                (Some(path), _) => {
                    let raw = input_manager
                        .load(&path)
                        .await
                        .with_context(|| format!("loading job description {}", path.display()))?;
                    (path.display().to_string(), engine.extract(&raw)?)
                }
                (None, Some(text)) => ("inline".to_string(), text),
                (None, None) => {
                    return Err(ScreenerError::InvalidInput("a job description is required".to_string()).into())
                }
            };

            let (documents, read_failures) = load_resumes(&mut input_manager, &resumes).await;
            info!("Loaded {} of {} resumes", documents.len(), resumes.len());

            let mut outcome = match engine.screen(&job_description, &documents) {
                Ok(outcome) => outcome,
                Err(ScreenerError::EmptyCorpus { failures }) => {
                    let failures: Vec<DocumentFailure> = read_failures.into_iter().chain(failures).collect();
                    for failure in &failures {
                        warn!("{}", failure);
                    }
                    return Err(ScreenerError::EmptyCorpus { failures }.into());
                }
                Err(e) => return Err(e.into()),
            };
            let mut failures = read_failures;
            failures.append(&mut outcome.failures);
            outcome.failures = failures;

            let report = ScreeningReport::from_outcome(outcome, &job_source);
            let generator = ReportGenerator::with_options(
                config.output.color_output && !no_color && save.is_none(),
                detailed || config.output.detailed,
                config.output.pretty_json,
                true,
                true,
            );
            let rendered = generator.generate_report(&report, &output_format)?;

            match save {
                Some(target) => {
                    let file_path = if target.is_dir() {
                        target.join(suggest_filename(&output_format, &job_source, true))
                    } else {
                        target
                    };
                    save_report_to_file(&rendered, &file_path)?;
                    println!("Report saved to {}", file_path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Skills { file } => {
            let engine = ScreeningEngine::new(&config.processing)?;
            let mut input_manager = InputManager::new();
            let raw = input_manager.load(&file).await?;
            let text = engine.extract(&raw)?;

            match engine.preview_section(&text) {
                Some(section) => {
                    println!("Skills section of {}:\n", raw.id);
                    println!("{}\n", section);
                    println!("Normalized: {}", engine.skills_section(&text));
                }
                None => println!("No skills section found in {}", raw.id),
            }
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("Configuration ({})\n", path.display());
                    let rendered = toml::to_string_pretty(&config).context("rendering configuration")?;
                    println!("{}", rendered);
                }

                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    println!("Configuration reset to defaults at {}", path.display());
                }

                Some(ConfigAction::Path) => println!("{}", path.display()),
            }
        }
    }

    Ok(())
}

async fn load_resumes(
    input_manager: &mut InputManager,
    paths: &[PathBuf],
) -> (Vec<RawDocument>, Vec<DocumentFailure>) {
    let progress = ProgressBar::new(paths.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} loading resumes [{bar:30}] {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    let mut documents = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for path in paths {
        progress.set_message(path.display().to_string());
        let (mut loaded, mut failed) = input_manager.load_batch(std::slice::from_ref(path)).await;
        documents.append(&mut loaded);
        failures.append(&mut failed);
        progress.inc(1);
    }
    progress.finish_and_clear();

    (documents, failures)
}
