//! Runtime configuration read from the environment
//!
//! # Environment Variables
//!
//! - `PORT` - Server port number (default: 8080)
//! - `DATABASE_URL` - Path to database file (default: "data.db")
//! - `TINYURL_USERS` - Accounts as `name:password:ROLES` entries separated by
//!   commas, `ROLES` being `|`-separated `USER`/`ADMIN`
//!   (default: "user:user:USER,admin:admin:ADMIN")

use std::collections::HashSet;
use std::env;

use thiserror::Error;

use crate::auth::{Role, UserAccount};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "data.db";
pub const DEFAULT_USERS: &str = "user:user:USER,admin:admin:ADMIN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT '{0}'")]
    InvalidPort(String),
    #[error("invalid user entry '{entry}': {reason}")]
    InvalidUser { entry: String, reason: String },
    #[error("user '{0}' is defined twice")]
    DuplicateUser(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub users: Vec<UserAccount>,
}

impl Config {
    /// Reads the configuration from the process environment
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value.clone()))?,
            Err(_) => DEFAULT_PORT,
        };
        let database_path =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
        let users = env::var("TINYURL_USERS").unwrap_or_else(|_| DEFAULT_USERS.to_string());

        Ok(Self {
            port,
            database_path,
            users: parse_users(&users)?,
        })
    }
}

/// Parses `name:password:ROLES[,name:password:ROLES...]`
pub fn parse_users(entries: &str) -> Result<Vec<UserAccount>, ConfigError> {
    let mut seen = HashSet::new();
    let mut accounts = Vec::new();

    for entry in entries.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let invalid = |reason: &str| ConfigError::InvalidUser {
            entry: entry.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = entry.splitn(3, ':');
        let (Some(name), Some(password), Some(roles)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected name:password:ROLES"));
        };
        if name.is_empty() {
            return Err(invalid("empty name"));
        }

        let roles = roles
            .split('|')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| r.parse::<Role>().map_err(|reason| invalid(&reason)))
            .collect::<Result<Vec<_>, _>>()?;

        if !seen.insert(name.to_string()) {
            return Err(ConfigError::DuplicateUser(name.to_string()));
        }
        accounts.push(UserAccount {
            name: name.to_string(),
            password: password.to_string(),
            roles,
        });
    }

    Ok(accounts)
}
