//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use crate::adapters::TomlConfigAdapter;
use crate::error::{ReelcutError, ReelcutResult};
use crate::settings::Settings;

/// Values given on the command line; they win over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_json: bool,
    pub bind: Option<String>,
    pub public_dir: Option<PathBuf>,
    pub threads: Option<usize>,
}

/// Resolved settings and where they came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub settings: Settings,
    /// TOML file that was read, if any
    pub source: Option<PathBuf>,
    /// Environment variables that were applied
    pub env_overrides: Vec<&'static str>,
}

/// Environment variables consulted after the TOML file
pub const ENV_VARIABLES: &[&str] = &[
    "REELCUT_BIND",
    "REELCUT_PUBLIC_DIR",
    "REELCUT_FFMPEG_PATH",
    "REELCUT_FFPROBE_PATH",
    "REELCUT_MAX_UPLOAD_BYTES",
    "REELCUT_DEFAULT_LOCALE",
    "REELCUT_THREADS",
    "REELCUT_LOG_LEVEL",
];

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(overrides: &ConfigOverrides) -> ReelcutResult<LoadedConfig> {
    let cwd = std::env::current_dir()?;
    resolve_configuration(overrides, &cwd, |key| std::env::var(key).ok())
}

/// Hierarchy resolution with an injectable working directory and environment
pub fn resolve_configuration<F>(
    overrides: &ConfigOverrides,
    base_dir: &Path,
    env: F,
) -> ReelcutResult<LoadedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    // Step 1 + 2: defaults, then the config file if one is found
    let source = match &overrides.config_path {
        Some(path) => Some(path.clone()),
        None => TomlConfigAdapter::discover(base_dir),
    };
    let mut settings = match &source {
        Some(path) => TomlConfigAdapter::load(path)?,
        None => Settings::default(),
    };

    // Step 3: environment
    let env_overrides = apply_environment(&mut settings, env)?;

    // Step 4: command line
    apply_cli_overrides(&mut settings, overrides);

    settings.validate()?;

    Ok(LoadedConfig {
        settings,
        source,
        env_overrides,
    })
}

fn apply_environment<F>(settings: &mut Settings, env: F) -> ReelcutResult<Vec<&'static str>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();

    for &key in ENV_VARIABLES {
        let Some(value) = env(key).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let value = value.trim().to_string();

        match key {
            "REELCUT_BIND" => settings.server.bind = value,
            "REELCUT_PUBLIC_DIR" => settings.server.public_dir = PathBuf::from(value),
            "REELCUT_FFMPEG_PATH" => settings.encoder.ffmpeg_path = value,
            "REELCUT_FFPROBE_PATH" => settings.encoder.ffprobe_path = value,
            "REELCUT_MAX_UPLOAD_BYTES" => {
                settings.upload.max_size_bytes = parse_env(key, &value)?;
            }
            "REELCUT_DEFAULT_LOCALE" => settings.locale.default = value,
            "REELCUT_THREADS" => settings.encoder.threads = Some(parse_env(key, &value)?),
            "REELCUT_LOG_LEVEL" => settings.logging.level = value,
            _ => continue,
        }
        applied.push(key);
    }

    Ok(applied)
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> ReelcutResult<T> {
    value
        .parse()
        .map_err(|_| ReelcutError::invalid_config(format!("{} has invalid value {:?}", key, value)))
}

fn apply_cli_overrides(settings: &mut Settings, overrides: &ConfigOverrides) {
    if let Some(level) = &overrides.log_level {
        settings.logging.level = level.clone();
    }
    if overrides.log_json {
        settings.logging.json = true;
    }
    if let Some(bind) = &overrides.bind {
        settings.server.bind = bind.clone();
    }
    if let Some(public_dir) = &overrides.public_dir {
        settings.server.public_dir = public_dir.clone();
    }
    if let Some(threads) = overrides.threads {
        settings.encoder.threads = Some(threads);
    }
}
