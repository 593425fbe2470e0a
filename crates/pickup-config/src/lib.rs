use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use pickup_core::rules::policy::{MAX_NOTICE_HOURS, MAX_SLOT_CAPACITY};
use pickup_core::rules::{FeeSchedule, SchedulingPolicy, MAX_HORIZON_DAYS};
use pickup_core::time::offset_from_minutes;
use pickup_core::WasteCategory;
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "pickup";
const CONFIG_FILENAME: &str = "config.toml";
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scheduling: SchedulingPolicy,
    pub fees: FeeSchedule,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone)]
pub struct NotificationsConfig {
    pub enabled: bool,
    pub backend: NotificationBackend,
    pub email: Option<NotificationsEmailConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationBackend {
    Stdout,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationsEmailConfig {
    pub from: String,
    pub subject_prefix: String,
    pub smtp_host: String,
    pub smtp_port: Option<u16>,
    pub username: Option<String>,
    pub password_env: Option<String>,
    pub tls: EmailTls,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailTls {
    None,
    StartTls,
    Tls,
}

const DEFAULT_SUBJECT_PREFIX: &str = "special waste pickup";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scheduling: SchedulingPolicy::default(),
            fees: FeeSchedule::default(),
            notifications: NotificationsConfig {
                enabled: false,
                backend: NotificationBackend::Stdout,
                email: None,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid scheduling.max_per_slot value: {0}")]
    InvalidCapacity(u32),
    #[error("invalid scheduling.horizon_days value: {0}")]
    InvalidHorizonDays(u32),
    #[error("invalid scheduling.{field} value: {value}")]
    InvalidNoticeHours { field: &'static str, value: u32 },
    #[error("invalid scheduling.utc_offset_minutes value: {0}")]
    InvalidUtcOffset(i32),
    #[error("invalid fee category: {0}")]
    InvalidFeeCategory(String),
    #[error("invalid fee rate for {category}: {rate}")]
    InvalidFeeRate { category: String, rate: i64 },
    #[error("invalid notifications.email.{field}: {message}")]
    InvalidNotificationsEmailField {
        field: &'static str,
        message: String,
    },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    scheduling: Option<SchedulingFile>,
    fees: Option<FeesFile>,
    notifications: Option<NotificationsFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchedulingFile {
    max_per_slot: Option<u32>,
    horizon_days: Option<u32>,
    reschedule_notice_hours: Option<u32>,
    cancel_notice_hours: Option<u32>,
    allow_fee_recalc_on_reschedule: Option<bool>,
    utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeesFile {
    default_rate: Option<i64>,
    rates: Option<BTreeMap<String, i64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NotificationsFile {
    enabled: Option<bool>,
    backend: Option<NotificationBackend>,
    email: Option<NotificationsEmailFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NotificationsEmailFile {
    from: String,
    subject_prefix: Option<String>,
    smtp_host: String,
    smtp_port: Option<u16>,
    username: Option<String>,
    password_env: Option<String>,
    tls: Option<EmailTls>,
    timeout_seconds: Option<u64>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(scheduling) = parsed.scheduling {
        merge_scheduling(&mut config.scheduling, scheduling)?;
    }
    if let Some(fees) = parsed.fees {
        config.fees = merge_fees(fees)?;
    }
    if let Some(notifications) = parsed.notifications {
        if let Some(enabled) = notifications.enabled {
            config.notifications.enabled = enabled;
        }
        if let Some(backend) = notifications.backend {
            config.notifications.backend = backend;
        }
        if let Some(email) = notifications.email {
            config.notifications.email = Some(merge_email(email)?);
        }
    }

    if config.notifications.enabled
        && config.notifications.backend == NotificationBackend::Email
        && config.notifications.email.is_none()
    {
        return Err(ConfigError::InvalidNotificationsEmailField {
            field: "smtp_host",
            message: "email backend requires a [notifications.email] table".to_string(),
        });
    }

    Ok(config)
}

fn merge_scheduling(policy: &mut SchedulingPolicy, parsed: SchedulingFile) -> Result<()> {
    if let Some(capacity) = parsed.max_per_slot {
        if capacity == 0 || capacity > MAX_SLOT_CAPACITY {
            return Err(ConfigError::InvalidCapacity(capacity));
        }
        policy.capacity_per_slot = capacity;
    }
    if let Some(days) = parsed.horizon_days {
        if days == 0 || days > MAX_HORIZON_DAYS {
            return Err(ConfigError::InvalidHorizonDays(days));
        }
        policy.horizon_days = days;
    }
    if let Some(hours) = parsed.reschedule_notice_hours {
        policy.reschedule_notice_hours = validate_notice("reschedule_notice_hours", hours)?;
    }
    if let Some(hours) = parsed.cancel_notice_hours {
        policy.cancel_notice_hours = validate_notice("cancel_notice_hours", hours)?;
    }
    if let Some(allow) = parsed.allow_fee_recalc_on_reschedule {
        policy.allow_fee_recalc_on_reschedule = allow;
    }
    if let Some(minutes) = parsed.utc_offset_minutes {
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::InvalidUtcOffset(minutes));
        }
        policy.utc_offset =
            offset_from_minutes(minutes).map_err(|_| ConfigError::InvalidUtcOffset(minutes))?;
    }
    Ok(())
}

fn validate_notice(field: &'static str, value: u32) -> Result<u32> {
    if value > MAX_NOTICE_HOURS {
        return Err(ConfigError::InvalidNoticeHours { field, value });
    }
    Ok(value)
}

fn merge_fees(parsed: FeesFile) -> Result<FeeSchedule> {
    let mut fees = FeeSchedule::default();
    if let Some(rate) = parsed.default_rate {
        fees = fees
            .with_default_rate(rate)
            .map_err(|_| ConfigError::InvalidFeeRate {
                category: "default".to_string(),
                rate,
            })?;
    }
    for (label, rate) in parsed.rates.unwrap_or_default() {
        let category: WasteCategory = label
            .parse()
            .map_err(|_| ConfigError::InvalidFeeCategory(label.clone()))?;
        fees = fees
            .with_rate(category, rate)
            .map_err(|_| ConfigError::InvalidFeeRate {
                category: label.clone(),
                rate,
            })?;
    }
    Ok(fees)
}

fn merge_email(parsed: NotificationsEmailFile) -> Result<NotificationsEmailConfig> {
    let from = required_field("from", parsed.from)?;
    let smtp_host = required_field("smtp_host", parsed.smtp_host)?;
    if parsed.username.is_some() != parsed.password_env.is_some() {
        return Err(ConfigError::InvalidNotificationsEmailField {
            field: "username",
            message: "username and password_env must be set together".to_string(),
        });
    }
    if parsed.timeout_seconds == Some(0) {
        return Err(ConfigError::InvalidNotificationsEmailField {
            field: "timeout_seconds",
            message: "must be greater than zero".to_string(),
        });
    }
    let subject_prefix = parsed
        .subject_prefix
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_SUBJECT_PREFIX.to_string());

    Ok(NotificationsEmailConfig {
        from,
        subject_prefix,
        smtp_host,
        smtp_port: parsed.smtp_port,
        username: parsed.username,
        password_env: parsed.password_env,
        tls: parsed.tls.unwrap_or(EmailTls::StartTls),
        timeout_seconds: parsed.timeout_seconds,
    })
}

fn required_field(field: &'static str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidNotificationsEmailField {
            field,
            message: "cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
