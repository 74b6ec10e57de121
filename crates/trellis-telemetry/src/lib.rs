#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! Telemetry primitives shared across the Trellis workspace.
//!
//! This crate centralises logging initialisation and the error-tracking facade so the
//! web shell and host-side tooling adopt a consistent observability story.

pub mod init;
pub mod tracker;

pub use init::{
    DEFAULT_LOG_LEVEL, Environment, LogFormat, LoggingConfig, build_sha, init_logging,
    init_logging_with_layer,
};
pub use tracker::{
    Breadcrumb, ErrorTracker, ErrorTrackingConfig, EventId, Level, NoopErrorTracker, TrackedUser,
    TracingErrorTracker,
};
