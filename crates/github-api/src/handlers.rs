//! Caller-supplied routing of non-2xx responses.
//!
//! Resolution is ordered: the exact status code first, then the wildcard. A handler that returns
//! `Ok(())` marks the failure as handled; an `Err` propagates to the caller unchanged.

use crate::error::GithubApiError;
use crate::response::ApiResult;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type ErrorHandler = Box<dyn Fn(&ApiResult) -> anyhow::Result<()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandlerKey {
    Status(u16),
    /// `*`: any status without its own handler.
    Wildcard,
}

impl FromStr for HandlerKey {
    type Err = GithubApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "*" {
            return Ok(Self::Wildcard);
        }
        s.parse::<u16>()
            .ok()
            .filter(|code| (100..=599).contains(code))
            .map(Self::Status)
            .ok_or_else(|| {
                GithubApiError::Config(format!(
                    "Invalid error handler key '{s}': expected an HTTP status code or '*'"
                ))
            })
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{code}"),
            Self::Wildcard => f.write_str("*"),
        }
    }
}

#[derive(Default)]
pub struct ErrorHandlers {
    by_status: BTreeMap<u16, ErrorHandler>,
    wildcard: Option<ErrorHandler>,
}

impl ErrorHandlers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_status<F>(mut self, status: u16, handler: F) -> Self
    where
        F: Fn(&ApiResult) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.insert(HandlerKey::Status(status), Box::new(handler));
        self
    }

    #[must_use]
    pub fn on_any<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ApiResult) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.insert(HandlerKey::Wildcard, Box::new(handler));
        self
    }

    /// Register `handler` under `key`, replacing any previous one.
    pub fn insert(&mut self, key: HandlerKey, handler: ErrorHandler) {
        match key {
            HandlerKey::Status(code) => {
                self.by_status.insert(code, handler);
            }
            HandlerKey::Wildcard => self.wildcard = Some(handler),
        }
    }

    /// Exact status first, wildcard second.
    #[must_use]
    pub fn resolve(&self, status: u16) -> Option<(HandlerKey, &ErrorHandler)> {
        if let Some(handler) = self.by_status.get(&status) {
            return Some((HandlerKey::Status(status), handler));
        }
        self.wildcard.as_ref().map(|h| (HandlerKey::Wildcard, h))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_status.is_empty() && self.wildcard.is_none()
    }

    pub fn keys(&self) -> impl Iterator<Item = HandlerKey> + '_ {
        self.by_status
            .keys()
            .map(|code| HandlerKey::Status(*code))
            .chain(self.wildcard.as_ref().map(|_| HandlerKey::Wildcard))
    }
}

impl fmt::Debug for ErrorHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &ApiResult) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn exact_status_wins_over_wildcard() {
        let handlers = ErrorHandlers::new().on_any(noop).on_status(404, noop);
        assert_eq!(handlers.resolve(404).map(|(k, _)| k), Some(HandlerKey::Status(404)));
        assert_eq!(handlers.resolve(401).map(|(k, _)| k), Some(HandlerKey::Wildcard));
    }

    #[test]
    fn no_match_without_wildcard() {
        let handlers = ErrorHandlers::new().on_status(404, noop);
        assert!(handlers.resolve(500).is_none());
        assert!(ErrorHandlers::new().is_empty());
    }

    #[test]
    fn keys_parse_from_strings() {
        assert_eq!("*".parse::<HandlerKey>().expect("wildcard"), HandlerKey::Wildcard);
        assert_eq!("404".parse::<HandlerKey>().expect("404"), HandlerKey::Status(404));
        assert!("4044".parse::<HandlerKey>().is_err());
        assert!("abc".parse::<HandlerKey>().is_err());
    }

    #[test]
    fn debug_lists_registered_keys() {
        let handlers = ErrorHandlers::new().on_status(500, noop).on_status(404, noop).on_any(noop);
        assert_eq!(format!("{handlers:?}"), "[Status(404), Status(500), Wildcard]");
    }
}
