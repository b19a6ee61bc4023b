//! Command line configuration, read from `jackc.yaml`.
use std::{
    fs,
    path::{Path, PathBuf},
};

use jack::prelude::JackConf;
use log::debug;
use serde::Deserialize;

use crate::error::AppError;

pub const CONF_FILE: &str = "jackc.yaml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConf {
    #[serde(flatten)]
    pub jack: JackConf,
    /// Write output files here instead of next to their sources.
    pub out_dir: Option<PathBuf>,
}

impl CliConf {
    /// Load the configuration file, falling back to defaults when it doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        let conf = Self::parse(&text)?;
        debug!("loaded {}: {conf:?}", path.display());

        Ok(conf)
    }

    fn parse(text: &str) -> Result<Self, AppError> {
        // An empty file is a valid, if pointless, configuration.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}
