//! Accounts, roles and HTTP Basic credentials
//!
//! `ADMIN` carries every `USER` permission on top of the cross-user
//! statistics endpoints.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("USER"),
            Role::Admin => f.write_str("ADMIN"),
        }
    }
}

/// A configured login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub name: String,
    pub password: String,
    pub roles: Vec<Role>,
}

/// The authenticated identity behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub name: String,
    pub roles: Vec<Role>,
}

impl Caller {
    /// Whether this caller may act with `required`
    pub fn permits(&self, required: Role) -> bool {
        self.roles.iter().any(|role| match required {
            Role::User => matches!(role, Role::User | Role::Admin),
            Role::Admin => matches!(role, Role::Admin),
        })
    }
}

/// In-memory table of accounts, keyed by name
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    accounts: HashMap<String, UserAccount>,
}

impl UserDirectory {
    pub fn new(accounts: impl IntoIterator<Item = UserAccount>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.name.clone(), account))
                .collect(),
        }
    }

    /// Checks a name/password pair
    pub fn authenticate(&self, name: &str, password: &str) -> Option<Caller> {
        let account = self.accounts.get(name)?;
        if account.password != password {
            return None;
        }
        Some(Caller {
            name: account.name.clone(),
            roles: account.roles.clone(),
        })
    }

    /// Checks the value of an `Authorization: Basic ...` header
    pub fn authenticate_header(&self, header: &str) -> Option<Caller> {
        let (name, password) = parse_basic(header)?;
        self.authenticate(&name, &password)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Decodes `Basic base64(name:password)` into its two parts
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (name, password) = decoded.split_once(':')?;
    Some((name.to_string(), password.to_string()))
}

/// Encodes a name/password pair as an `Authorization` header value
pub fn basic_header(name: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", name, password)))
}
