//! Build configuration from the environment
//!
//! The pipeline passes operator overrides as environment variables. They are
//! read once into a [`BuildConfig`] so the rest of the crate never touches the
//! process environment.
//!
//! # Environment Variables
//!
//! - `BP_BUILD_ARGUMENTS`: whitespace separated arguments replacing the build
//!   system's default arguments
//! - `BP_BUILT_MODULE`: module directory holding the Maven artifact
//! - `JAVA_HOME`: runtime used for the version probe (falls back to `java`
//!   on `PATH`)
//! - `HOME`: home directory whose build tool cache is linked into a layer
//!
//! # Example
//!
//! ```
//! use build_system_cnb::config::BuildConfig;
//!
//! let config = BuildConfig::from_lookup(|key| match key {
//!     "BP_BUILD_ARGUMENTS" => Some("clean install".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert_eq!(config.build_arguments, Some(vec!["clean".to_string(), "install".to_string()]));
//! ```

use crate::error::ConfigError;
use std::env;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

pub const BUILD_ARGUMENTS_ENV: &str = "BP_BUILD_ARGUMENTS";
pub const BUILT_MODULE_ENV: &str = "BP_BUILT_MODULE";
pub const JAVA_HOME_ENV: &str = "JAVA_HOME";
pub const HOME_ENV: &str = "HOME";

/// Operator overrides for a single run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// Replaces the build system's default arguments when set
    pub build_arguments: Option<Vec<String>>,

    /// Scopes Maven artifact discovery to `<root>/<module>/target`
    pub built_module: Option<String>,

    pub java_home: Option<PathBuf>,

    /// Home directory holding the build tool's dependency cache
    pub home: Option<PathBuf>,
}

impl BuildConfig {
    /// Loads the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let build_arguments = lookup(BUILD_ARGUMENTS_ENV).and_then(|value| {
            let args = tokenize(&value);
            if args.is_empty() {
                warn!("{} is set but empty, using default arguments", BUILD_ARGUMENTS_ENV);
                None
            } else {
                Some(args)
            }
        });

        let built_module = lookup(BUILT_MODULE_ENV)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let config = Self {
            build_arguments,
            built_module,
            java_home: non_empty_path(lookup(JAVA_HOME_ENV)),
            home: non_empty_path(lookup(HOME_ENV)),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the module override stays inside the application root
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(module) = &self.built_module {
            let path = Path::new(module);
            let escapes = path
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(ConfigError::InvalidModule(module.clone()));
            }
        }
        Ok(())
    }
}

/// Splits an argument string on whitespace, dropping empty tokens
pub fn tokenize(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

fn non_empty_path(value: Option<String>) -> Option<PathBuf> {
    value.filter(|v| !v.trim().is_empty()).map(PathBuf::from)
}
