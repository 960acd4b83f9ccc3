//! kubesunset Core - Deprecation judging engine for Kubernetes APIs
//!
//! This crate provides the pieces that decide whether a resource uses a
//! deprecated or removed API:
//! - `Version` / `ApiVersion`: Kubernetes release and API version ordering
//! - `RuleSet`: Lifecycle rules per `Kind.version.group`, curated plus user-supplied
//! - `evaluate` / `Judge`: Verdicts against a target version
//! - `Aggregator`: Deduplicated, deterministically ordered findings
//! - `manifest`: Decoding YAML/JSON manifests into discovered resources

pub mod aggregator;
pub mod error;
pub mod identity;
pub mod judge;
pub mod manifest;
pub mod rules;
pub mod version;

pub use aggregator::{Aggregator, FindingKey, summarize};
pub use error::{CoreError, Result};
pub use identity::{DiscoveredResource, ResourceIdentity, Source};
pub use judge::{Finding, Judge, Verdict, evaluate};
pub use manifest::parse_documents;
pub use rules::{LifecycleRule, RuleSet, parse_additional_kind};
pub use version::{ApiVersion, Version};
