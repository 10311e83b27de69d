//! A declarative rule engine for policies expressed as YAML, not code.
//!
//! A manifest declares one or more policies, each a list of `when`/`then`
//! rules evaluated in order against an event flattened to JSON. The first
//! rule whose `when` clause matches produces the verdict; if none match,
//! the policy allows.

#![warn(missing_docs, clippy::pedantic)]

mod condition;
mod engine;
mod error;
mod loader;
mod schema;
mod template;
mod traversal;
mod validator;

use std::path::Path;

pub use error::{Error, Result};
pub use loader::YamlPolicyLoader;
pub use schema::{YamlManifest, YamlPolicyDefinition, YamlRule};
pub use validator::YamlPolicyValidator;

/// Loads a YAML policy manifest and builds a running server from it.
///
/// # Errors
///
/// See [`YamlPolicyLoader::load_from_file`].
pub fn load_yaml_policy(path: impl AsRef<Path>) -> Result<apl_policy::PolicyServer> {
    YamlPolicyLoader::new().load_from_file(path)
}

/// Validates a YAML policy manifest's structure without registering it.
#[must_use]
pub fn validate_yaml_policy(path: impl AsRef<Path>) -> Vec<String> {
    YamlPolicyValidator::new().validate_file(path)
}
