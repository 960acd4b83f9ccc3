//! User-supplied additional kinds
//!
//! Additional kinds are given in full `Kind.version.group` form, where the
//! group itself is dotted (`ManagedCertificate.v1beta1.networking.gke.io`).
//! Built-in groups without a dot (`apps`) are covered by curated rules, so at
//! least four segments are required.

use crate::error::{CoreError, Result};
use crate::identity::ResourceIdentity;

/// Minimum number of dot-separated segments in an additional kind
pub const MIN_SEGMENTS: usize = 4;

/// Parse `Kind.version.group` into an identity
pub fn parse_additional_kind(input: &str) -> Result<ResourceIdentity> {
    let invalid = |reason: String| CoreError::InvalidAdditionalKind {
        input: input.to_string(),
        reason,
    };

    let parts: Vec<&str> = input.split('.').collect();
    if parts.len() < MIN_SEGMENTS {
        return Err(invalid(
            "full form Kind.version.group.com is expected".to_string(),
        ));
    }

    if parts.iter().any(|part| part.is_empty()) {
        return Err(invalid("empty segment".to_string()));
    }

    let kind = parts[0];
    if !kind.chars().next().is_some_and(char::is_uppercase) {
        return Err(invalid(format!(
            "Kind is expected to be capitalized by convention, instead got: {}",
            kind
        )));
    }

    Ok(ResourceIdentity::new(kind, parts[1], parts[2..].join(".")))
}
