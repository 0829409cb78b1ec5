use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resolved runtime configuration.
///
/// Precedence, lowest to highest: built-in defaults, the TOML file, process
/// environment (`CONCIERGE_*`), then explicit CLI overrides.
#[derive(Clone, Debug, Serialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub typing: TypingConfig,
    pub briefing: BriefingDefaults,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Delivery delays for the assistant's simulated typing, in milliseconds.
/// Zero disables the pause for that message kind.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct TypingConfig {
    pub greeting_delay_ms: u64,
    pub reply_delay_ms: u64,
    pub submit_delay_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct BriefingDefaults {
    pub greeting_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub reply_delay_ms: Option<u64>,
    pub greeting_name: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            typing: TypingConfig {
                greeting_delay_ms: 300,
                reply_delay_ms: 700,
                submit_delay_ms: 800,
            },
            briefing: BriefingDefaults { greeting_name: "김관리자".to_string() },
        }
    }
}

impl TypingConfig {
    /// All delays disabled. Used by tests and non-interactive runs.
    pub fn instant() -> Self {
        Self { greeting_delay_ms: 0, reply_delay_ms: 0, submit_delay_ms: 0 }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("concierge.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(typing) = patch.typing {
            if let Some(greeting_delay_ms) = typing.greeting_delay_ms {
                self.typing.greeting_delay_ms = greeting_delay_ms;
            }
            if let Some(reply_delay_ms) = typing.reply_delay_ms {
                self.typing.reply_delay_ms = reply_delay_ms;
            }
            if let Some(submit_delay_ms) = typing.submit_delay_ms {
                self.typing.submit_delay_ms = submit_delay_ms;
            }
        }

        if let Some(briefing) = patch.briefing {
            if let Some(greeting_name) = briefing.greeting_name {
                self.briefing.greeting_name = greeting_name;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let log_level =
            read_env("CONCIERGE_LOGGING_LEVEL").or_else(|| read_env("CONCIERGE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CONCIERGE_LOGGING_FORMAT").or_else(|| read_env("CONCIERGE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        if let Some(value) = read_env("CONCIERGE_TYPING_GREETING_DELAY_MS") {
            self.typing.greeting_delay_ms =
                parse_u64("CONCIERGE_TYPING_GREETING_DELAY_MS", &value)?;
        }
        if let Some(value) = read_env("CONCIERGE_TYPING_REPLY_DELAY_MS") {
            self.typing.reply_delay_ms = parse_u64("CONCIERGE_TYPING_REPLY_DELAY_MS", &value)?;
        }
        if let Some(value) = read_env("CONCIERGE_TYPING_SUBMIT_DELAY_MS") {
            self.typing.submit_delay_ms = parse_u64("CONCIERGE_TYPING_SUBMIT_DELAY_MS", &value)?;
        }

        if let Some(value) = read_env("CONCIERGE_BRIEFING_GREETING_NAME") {
            self.briefing.greeting_name = value;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(reply_delay_ms) = overrides.reply_delay_ms {
            self.typing.reply_delay_ms = reply_delay_ms;
        }
        if let Some(greeting_name) = overrides.greeting_name {
            self.briefing.greeting_name = greeting_name;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_logging(&self.logging)?;
        validate_typing(&self.typing)?;
        validate_briefing(&self.briefing)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("concierge.toml"), PathBuf::from("config/concierge.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_typing(typing: &TypingConfig) -> Result<(), ConfigError> {
    let delays =
        [typing.greeting_delay_ms, typing.reply_delay_ms, typing.submit_delay_ms];
    if delays.iter().any(|delay| *delay > 10_000) {
        return Err(ConfigError::Validation(
            "typing delays must be at most 10000 milliseconds".to_string(),
        ));
    }
    Ok(())
}

fn validate_briefing(briefing: &BriefingDefaults) -> Result<(), ConfigError> {
    if briefing.greeting_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "briefing.greeting_name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    logging: Option<LoggingPatch>,
    typing: Option<TypingPatch>,
    briefing: Option<BriefingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct TypingPatch {
    greeting_delay_ms: Option<u64>,
    reply_delay_ms: Option<u64>,
    submit_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct BriefingPatch {
    greeting_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;
        ensure(config.logging.level == "info", "default log level should be info")?;
        ensure(config.typing.reply_delay_ms == 700, "default reply delay should be 700ms")?;
        ensure(
            config.briefing.greeting_name == "김관리자",
            "default greeting name should be the seeded manager",
        )
    }

    #[test]
    fn file_values_override_defaults() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("concierge.toml");
        fs::write(
            &path,
            r#"
[logging]
level = "debug"
format = "json"

[typing]
reply_delay_ms = 50

[briefing]
greeting_name = "박과장"
"#,
        )
        .map_err(|err| err.to_string())?;

        let config =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.logging.level == "debug", "file log level should win over defaults")?;
        ensure(
            matches!(config.logging.format, LogFormat::Json),
            "file log format should win over defaults",
        )?;
        ensure(config.typing.reply_delay_ms == 50, "file reply delay should win over defaults")?;
        ensure(config.briefing.greeting_name == "박과장", "file greeting name should win")
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CONCIERGE_LOG_LEVEL", "warn");
        env::set_var("CONCIERGE_TYPING_REPLY_DELAY_MS", "120");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("concierge.toml");
            fs::write(
                &path,
                r#"
[logging]
level = "error"

[typing]
reply_delay_ms = 40
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "debug", "explicit override log level should win")?;
            ensure(
                config.typing.reply_delay_ms == 120,
                "env reply delay should win over the file",
            )
        })();

        clear_vars(&["CONCIERGE_LOG_LEVEL", "CONCIERGE_TYPING_REPLY_DELAY_MS"]);
        result
    }

    #[test]
    fn missing_required_file_is_an_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            require_file: true,
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected missing-file failure".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::MissingConfigFile(_)),
            "missing required file should be reported as MissingConfigFile",
        )
    }

    #[test]
    fn invalid_env_override_fails_with_key_and_value() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CONCIERGE_TYPING_REPLY_DELAY_MS", "soon");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            let matches_key = matches!(
                error,
                ConfigError::InvalidEnvOverride { ref key, .. }
                    if key == "CONCIERGE_TYPING_REPLY_DELAY_MS"
            );
            ensure(matches_key, "env failure should name the offending variable")
        })();

        clear_vars(&["CONCIERGE_TYPING_REPLY_DELAY_MS"]);
        result
    }

    #[test]
    fn validation_rejects_unreasonable_delays() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let mut config = AppConfig::default();
        config.typing.reply_delay_ms = 60_000;
        let error = match config.validate() {
            Ok(()) => return Err("expected validation failure".to_string()),
            Err(error) => error,
        };
        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("typing delays")
        );
        ensure(has_message, "validation failure should mention typing delays")
    }
}
