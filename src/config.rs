//! Layered settings: built-in defaults, then an optional TOML file, then
//! `TESSERA_*` environment variables (`__` separates nested keys, as in
//! `TESSERA_RESOLVER__PRUNE_UNKNOWN_TERMS=true`).

use std::path::Path;

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use config::builder::DefaultState;
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Re-resolve inline handles against the lexicon on every pass, since an
    /// inline encoding made for another store context may not hold for this one.
    pub reresolve_inline: bool,
    /// Remove provably empty optional groups and union members after resolution.
    pub prune_unknown_terms: bool,
}
impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            reresolve_inline: true,
            prune_unknown_terms: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LexiconSettings {
    pub inline_literals: bool,
}
impl Default for LexiconSettings {
    fn default() -> Self {
        Self { inline_literals: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Keep a context position and the six quad key orders.
    pub quads: bool,
}
impl Default for StoreSettings {
    fn default() -> Self {
        Self { quads: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resolver: ResolverSettings,
    pub lexicon: LexiconSettings,
    pub store: StoreSettings,
}

impl Settings {
    /// Reads the file at `path` if given (it must exist then), and the environment.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        Self::finish(builder)
    }
    pub fn from_toml_str(toml: &str) -> Result<Settings> {
        Self::finish(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }
    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
        let settings = builder
            .add_source(
                Environment::with_prefix("TESSERA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
