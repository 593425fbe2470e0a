use anyhow::Error;
use pickup_config::ConfigError;
use pickup_core::time::TimeParseError;
use pickup_core::CoreError;
use pickup_service::{ServiceError, ServiceErrorKind};
use pickup_store::error::{StoreError, StoreErrorKind};
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;
pub const EXIT_UNAUTHORIZED: u8 = 4;
pub const EXIT_CONFLICT: u8 = 5;
pub const EXIT_POLICY: u8 = 6;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
            });
        }
        if let Some(service_err) = cause.downcast_ref::<ServiceError>() {
            return ExitCode::from(service_exit_code(service_err));
        }
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return ExitCode::from(store_exit_code(store_err));
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(_core_err) = cause.downcast_ref::<CoreError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
        if let Some(_parse_err) = cause.downcast_ref::<TimeParseError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn service_exit_code(err: &ServiceError) -> u8 {
    match err.kind() {
        ServiceErrorKind::NotFound => EXIT_NOT_FOUND,
        ServiceErrorKind::InvalidArgument => EXIT_INVALID_INPUT,
        ServiceErrorKind::Unauthorized => EXIT_UNAUTHORIZED,
        ServiceErrorKind::Conflict => EXIT_CONFLICT,
        ServiceErrorKind::PolicyViolation => EXIT_POLICY,
        ServiceErrorKind::Internal => EXIT_FAILURE,
    }
}

fn store_exit_code(err: &StoreError) -> u8 {
    match err.kind() {
        StoreErrorKind::NotFound => EXIT_NOT_FOUND,
        StoreErrorKind::SlotFull | StoreErrorKind::DuplicateUnpaid => EXIT_CONFLICT,
        StoreErrorKind::InvalidId
        | StoreErrorKind::InvalidDataPath
        | StoreErrorKind::DuplicateEmail
        | StoreErrorKind::Core => EXIT_INVALID_INPUT,
        StoreErrorKind::MissingHomeDir
        | StoreErrorKind::InvalidDate
        | StoreErrorKind::Migration
        | StoreErrorKind::Sql
        | StoreErrorKind::Io => EXIT_FAILURE,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidCapacity(_)
        | ConfigError::InvalidHorizonDays(_)
        | ConfigError::InvalidNoticeHours { .. }
        | ConfigError::InvalidUtcOffset(_)
        | ConfigError::InvalidFeeCategory(_)
        | ConfigError::InvalidFeeRate { .. }
        | ConfigError::InvalidNotificationsEmailField { .. }
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}
