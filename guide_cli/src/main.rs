//! `guide`: replay traces, inspect kernels and show the persisted tuning of
//! the predictive guiding engine.

mod cli;
mod error_fmt;
mod kernel;
mod replay;

use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};
use guide_config::{Config, Logging, Profile};
use guide_core::{CovarianceFunction, GuideError, Kernel, LinearRegressionGuide};
use guide_traits::{Clock, MonotonicClock};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::LevelFilter, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn main() {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error report hooks: {e}");
    }
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = run(cli) {
        tracing::debug!(error = ?err, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    match cli.cmd {
        Commands::Replay { trace } => replay::run(&cfg, &trace, cli.json),
        Commands::Kernel {
            x,
            y,
            gradient,
            hessian,
        } => kernel::run(&cfg, &x, y.as_deref(), gradient, hessian, cli.json),
        Commands::Summary => summary(&cfg, cli.json),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = guide_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .map_err(|e| GuideError::Config(e.to_string()))?;
    Ok(cfg)
}

fn init_tracing(json: bool, level: &str, logging: &Logging) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| GuideError::Config(format!("invalid --log-level {level:?}: {e}")))?,
    };
    let console: BoxedLayer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter)
            .boxed()
    };
    let mut layers = vec![console];

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| GuideError::Config(format!("logging.file has no file name: {file}")))?;
        let appender = match logging.rotation.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let file_level = logging
            .level
            .as_deref()
            .and_then(|l| l.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::INFO);
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_level)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}

/// Persisted settings store selected by `[profile]`.
pub(crate) fn open_profile(cfg: &Config) -> Result<Profile> {
    match cfg.profile.path.as_deref() {
        Some(p) => Profile::load(Path::new(p)),
        None => Ok(Profile::in_memory()),
    }
}

pub(crate) fn build_guide<C: Clock>(
    cfg: &Config,
    clock: C,
) -> Result<LinearRegressionGuide<Profile, C>> {
    let profile = open_profile(cfg)?;
    let core_cfg = guide_core::PredictorCfg::from(&cfg.predictor);
    let (guide, report) = LinearRegressionGuide::from_cfg(profile, clock, &core_cfg)?;
    if !report.is_ok() {
        tracing::warn!(?report, "predictor overrides replaced by defaults");
    }
    tracing::info!(
        prefix = guide.config_path(),
        control_gain = guide.control_gain(),
        min_points = guide.min_points_for_inference(),
        "predictor ready"
    );
    Ok(guide)
}

pub(crate) fn save_profile(mut profile: Profile) -> Result<()> {
    if profile.is_dirty() {
        profile.save()?;
        if let Some(path) = profile.path() {
            tracing::info!(path = %path.display(), "settings profile saved");
        }
    }
    Ok(())
}

fn summary(cfg: &Config, json: bool) -> Result<()> {
    let guide = build_guide(cfg, MonotonicClock::new())?;
    let cov = Kernel::try_from(&cfg.kernel)?;
    let settings = guide.settings_summary();
    let prefix = guide.config_path().to_owned();
    let min_points = guide.min_points_for_inference();
    let gain = guide.control_gain();
    let profile = guide.into_store();

    if json {
        let line = serde_json::json!({
            "settings_prefix": prefix,
            "control_gain": gain,
            "min_points_for_inference": min_points,
            "kernel": format!("{:?}", cov.kind()),
            "hyperparameters": cov.parameters(),
            "profile": profile.path().map(|p| p.display().to_string()),
        });
        println!("{line}");
    } else {
        print!("{settings}");
        println!("Min Points For Inference = {min_points}");
        println!("Settings Prefix = {prefix}");
        println!("{}", kernel::describe(&cov));
    }
    save_profile(profile)
}
