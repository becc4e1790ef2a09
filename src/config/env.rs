//! Typed environment lookups.

use crate::{Error, ErrorContext, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads typed values from a key/value source (the process environment by default).
#[derive(Clone)]
pub struct EnvReader {
    lookup: Lookup,
}

impl EnvReader {
    /// Reader over `std::env`.
    pub fn from_process() -> Self {
        Self {
            lookup: Arc::new(|key| std::env::var(key).ok()),
        }
    }

    /// Reader over a fixed map; used by tests and embedders.
    pub fn from_map(vars: HashMap<String, String>) -> Self {
        Self {
            lookup: Arc::new(move |key| vars.get(key).cloned()),
        }
    }

    /// Reader where every key is missing.
    pub fn empty() -> Self {
        Self::from_map(HashMap::new())
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::from_map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    pub fn get_str_or(&self, key: &str, default: &str) -> String {
        self.get_str(key).unwrap_or_else(|| default.to_string())
    }

    /// Missing or blank values are a configuration error.
    pub fn get_required(&self, key: &str) -> Result<String> {
        match self.get_str(key) {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(Error::configuration_with_context(
                "missing required environment variable",
                ErrorContext::new()
                    .with_field_path(key)
                    .with_source("env"),
            )),
        }
    }

    pub fn get_int(&self, key: &str, default: Option<i64>) -> Result<i64> {
        self.parse_with(key, default, "integer")
    }

    pub fn get_float(&self, key: &str, default: Option<f64>) -> Result<f64> {
        self.parse_with(key, default, "float")
    }

    pub fn get_u64_opt(&self, key: &str) -> Result<Option<u64>> {
        match self.get_str(key) {
            None => Ok(None),
            Some(_) => self.parse_with::<u64>(key, None, "unsigned integer").map(Some),
        }
    }

    /// `1`, `true`, `yes` and `on` (any case) are true; any other present value is false.
    pub fn get_bool(&self, key: &str, default: Option<bool>) -> Result<bool> {
        match self.get_str(key) {
            Some(v) => Ok(is_truthy(&v)),
            None => default.ok_or_else(|| missing(key, "boolean")),
        }
    }

    fn parse_with<T: std::str::FromStr>(
        &self,
        key: &str,
        default: Option<T>,
        kind: &str,
    ) -> Result<T> {
        match self.get_str(key) {
            Some(raw) => raw.trim().parse::<T>().map_err(|_| {
                Error::configuration_with_context(
                    format!("environment variable must be a {}", kind),
                    ErrorContext::new()
                        .with_field_path(key)
                        .with_details(format!("got {:?}", raw))
                        .with_source("env"),
                )
            }),
            None => default.ok_or_else(|| missing(key, kind)),
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn missing(key: &str, kind: &str) -> Error {
    Error::configuration_with_context(
        format!("missing {} environment variable", kind),
        ErrorContext::new().with_field_path(key).with_source("env"),
    )
}

impl Default for EnvReader {
    fn default() -> Self {
        Self::from_process()
    }
}

impl fmt::Debug for EnvReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvReader").finish_non_exhaustive()
    }
}
