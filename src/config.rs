use std::env;
use std::path::PathBuf;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatBackend {
    Memory,
    File,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub chat_backend: ChatBackend,
    pub chat_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let chat_backend = match env::var("CHAT_BACKEND") {
            Ok(raw) => match raw.as_str() {
                "memory" => ChatBackend::Memory,
                "file" => ChatBackend::File,
                other => {
                    return Err(AppError::Internal(format!(
                        "invalid CHAT_BACKEND '{other}': expected 'memory' or 'file'"
                    )))
                }
            },
            Err(_) => ChatBackend::Memory,
        };

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            chat_backend,
            chat_file: env::var("CHAT_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("chat_log.json")),
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
