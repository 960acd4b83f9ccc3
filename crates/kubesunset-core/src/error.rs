//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid version format: '{input}' (expected vMAJOR.MINOR[.PATCH][-PRERELEASE])")]
    InvalidVersionFormat { input: String },

    #[error("Invalid additional kind '{input}': {reason}")]
    InvalidAdditionalKind { input: String, reason: String },

    #[error("Duplicate rule for {identity}")]
    DuplicateRule { identity: String },

    #[error("Invalid lifecycle for {identity}: deprecated in {deprecated} but removed in {removed}")]
    InvalidLifecycle {
        identity: String,
        deprecated: String,
        removed: String,
    },

    #[error("Failed to load curated rules: {message}")]
    CuratedRules { message: String },

    #[error("Failed to parse manifest from {source_id}: {message}")]
    Manifest { source_id: String, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
