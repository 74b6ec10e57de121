//! Error-tracking facade.
//!
//! # Design
//! - Callers report through [`ErrorTracker`]; a vendor SDK can sit behind the same trait.
//! - Reporting is fire-and-forget: nothing here returns an error or panics.
//! - The bundled [`TracingErrorTracker`] is gated on a configured DSN and emits events
//!   through `tracing`, keeping the current user and a bounded breadcrumb trail.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::init::Environment;

/// Maximum breadcrumbs retained before the oldest are dropped.
pub const MAX_BREADCRUMBS: usize = 100;

/// Message patterns that are never worth reporting (extensions, flaky networks, aborts).
const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    r"(?i)extensions/",
    r"(?i)^chrome://",
    r"Network request failed",
    r"Failed to fetch",
    r"Load failed",
    r"AbortError",
    r"ResizeObserver loop",
];

/// Severity attached to captured messages and breadcrumbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Diagnostic detail.
    Debug,
    /// Informational message.
    Info,
    /// Recoverable problem.
    Warning,
    /// Failure surfaced to the user.
    Error,
    /// Unrecoverable failure.
    Fatal,
}

impl Level {
    /// Wire name of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

/// Identifier assigned to a delivered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EventId(Uuid);

impl EventId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for EventId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.simple())
    }
}

/// User context attached to subsequent events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedUser {
    /// Stable user identifier.
    pub id: String,
    /// Optional e-mail address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Trail entry recorded ahead of an event to aid debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    /// Logical area, e.g. `navigation` or `http`.
    pub category: String,
    /// Human readable description.
    pub message: String,
    /// Severity of the breadcrumb.
    pub level: Level,
    /// Time the breadcrumb was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Breadcrumb {
    /// Informational breadcrumb stamped with the current time.
    #[must_use]
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
            level: Level::Info,
            timestamp: Utc::now(),
        }
    }

    /// Override the breadcrumb level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

/// Client surface of the error-tracking collaborator.
pub trait ErrorTracker {
    /// Report an error with optional structured context.
    fn capture_exception(&self, error: &dyn Error, context: Option<&Value>) -> Option<EventId>;

    /// Report a free-form message.
    fn capture_message(&self, message: &str, level: Level) -> Option<EventId>;

    /// Replace (or clear) the user attached to later events.
    fn set_user(&self, user: Option<TrackedUser>);

    /// Append a breadcrumb to the trail.
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb);
}

/// Tracker that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopErrorTracker;

impl ErrorTracker for NoopErrorTracker {
    fn capture_exception(&self, _error: &dyn Error, _context: Option<&Value>) -> Option<EventId> {
        None
    }

    fn capture_message(&self, _message: &str, _level: Level) -> Option<EventId> {
        None
    }

    fn set_user(&self, _user: Option<TrackedUser>) {}

    fn add_breadcrumb(&self, _breadcrumb: Breadcrumb) {}
}

/// Error-tracking settings resolved from application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorTrackingConfig {
    /// Project DSN; tracking is disabled when absent.
    pub dsn: Option<String>,
    /// Environment tag recorded on events.
    pub environment: Environment,
    /// Deliver events from development builds instead of only logging them.
    pub send_in_development: bool,
}

impl ErrorTrackingConfig {
    /// Build a configuration, treating a blank DSN as unset.
    #[must_use]
    pub fn new(dsn: Option<String>, environment: Environment) -> Self {
        Self {
            dsn: dsn.filter(|value| !value.trim().is_empty()),
            environment,
            send_in_development: false,
        }
    }

    /// Deliver events from development builds too.
    #[must_use]
    pub const fn with_send_in_development(mut self, send: bool) -> Self {
        self.send_in_development = send;
        self
    }

    /// Whether a DSN is configured.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.dsn.is_some()
    }
}

#[derive(Debug, Default)]
struct TrackerScope {
    user: Option<TrackedUser>,
    breadcrumbs: VecDeque<Breadcrumb>,
}

/// Tracker that emits events through `tracing`.
#[derive(Debug)]
pub struct TracingErrorTracker {
    config: ErrorTrackingConfig,
    ignore: Vec<Regex>,
    scope: RefCell<TrackerScope>,
}

impl TracingErrorTracker {
    /// Build a tracker with the default ignore rules.
    #[must_use]
    pub fn new(config: ErrorTrackingConfig) -> Self {
        if !config.enabled() {
            tracing::info!("error tracking DSN not configured; tracking disabled");
        }
        let ignore = DEFAULT_IGNORE_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();
        Self {
            config,
            ignore,
            scope: RefCell::new(TrackerScope::default()),
        }
    }

    /// Add an extra message pattern to ignore.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error for an invalid pattern.
    pub fn with_ignore_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.ignore.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Whether a message matches one of the ignore rules.
    #[must_use]
    pub fn is_ignored(&self, message: &str) -> bool {
        self.ignore.iter().any(|rule| rule.is_match(message))
    }

    /// Current user context.
    #[must_use]
    pub fn user(&self) -> Option<TrackedUser> {
        self.scope
            .try_borrow()
            .ok()
            .and_then(|scope| scope.user.clone())
    }

    /// Snapshot of the breadcrumb trail, oldest first.
    #[must_use]
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.scope
            .try_borrow()
            .map(|scope| scope.breadcrumbs.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn deliver(&self, level: Level, message: &str, context: Option<&Value>) -> Option<EventId> {
        if !self.config.enabled() || self.is_ignored(message) {
            return None;
        }
        let user = self.user().map(|user| user.id);
        let trail = self.breadcrumbs().len();
        if self.config.environment == Environment::Development && !self.config.send_in_development
        {
            tracing::warn!(
                severity = level.as_str(),
                event_message = message,
                "error tracking would send event (development build)"
            );
            return None;
        }
        let event_id = EventId::generate();
        let context = context.map(ToString::to_string);
        tracing::error!(
            target: "error_tracking",
            event_id = %event_id,
            severity = level.as_str(),
            environment = self.config.environment.as_str(),
            user = user.as_deref(),
            breadcrumbs = trail,
            context = context.as_deref(),
            "{message}"
        );
        Some(event_id)
    }
}

impl ErrorTracker for TracingErrorTracker {
    fn capture_exception(&self, error: &dyn Error, context: Option<&Value>) -> Option<EventId> {
        self.deliver(Level::Error, &error_chain(error), context)
    }

    fn capture_message(&self, message: &str, level: Level) -> Option<EventId> {
        self.deliver(level, message, None)
    }

    fn set_user(&self, user: Option<TrackedUser>) {
        if let Ok(mut scope) = self.scope.try_borrow_mut() {
            scope.user = user;
        }
    }

    fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
        if let Ok(mut scope) = self.scope.try_borrow_mut() {
            if scope.breadcrumbs.len() == MAX_BREADCRUMBS {
                scope.breadcrumbs.pop_front();
            }
            scope.breadcrumbs.push_back(breadcrumb);
        }
    }
}

fn error_chain(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
