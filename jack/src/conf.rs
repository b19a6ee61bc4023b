//! Compiler configuration.
#[cfg(feature = "serde")]
use serde::Deserialize;

#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JackConf {
    /// Record a parse trace next to the generated code.
    pub trace: bool,
}
