//! Reader configuration
//!
//! Options can be set programmatically through the `with_*` builders or
//! loaded from a TOML document using the option names below:
//!
//! ```toml
//! path = "/data/scan/*.tif"
//! start = 0
//! end = 1000
//! step = 2
//! y = 100
//! height = 512
//! y-step = 1
//! enable-conversion = true
//! read-policy = "best-effort"
//! data-kind = "f32"
//! ```

use std::fs;
use std::path::Path;

use crate::errors::{StreamError, StreamResult};
use crate::source::DataKind;
use crate::stream::roi::RoiSpec;

/// How short reads are handled while generating frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// Short reads fail the `generate` call
    #[default]
    Strict,
    /// Short reads are logged and the missing bytes zero-filled
    BestEffort,
}

impl ReadPolicy {
    /// Parses `strict` or `best-effort`
    pub fn from_name(name: &str) -> StreamResult<Self> {
        match name.trim().to_lowercase().replace('_', "-").as_str() {
            "strict" => Ok(ReadPolicy::Strict),
            "best-effort" => Ok(ReadPolicy::BestEffort),
            other => Err(StreamError::InvalidConfig(format!("Unknown read policy: {}", other))),
        }
    }
}

/// Options of a frame reader, fixed once the reader is built
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    /// File, directory or glob pattern
    pub path: String,
    /// First index into the sorted match list
    pub start: usize,
    /// One past the last index, `None` for all matches
    pub end: Option<usize>,
    /// Take every `step`-th match
    pub step: usize,
    /// Vertical region of interest
    pub roi: RoiSpec,
    /// Convert non-float frames to 32-bit float
    pub enable_conversion: bool,
    /// Reserved, stored but not acted on
    pub normalize: bool,
    /// Reserved, stored but not acted on
    pub blocking: bool,
    /// Handling of short reads
    pub read_policy: ReadPolicy,
    /// Kind assumed for TIFF depths other than 16 bit
    pub data_kind: DataKind,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            path: "*.tif".to_string(),
            start: 0,
            end: None,
            step: 1,
            roi: RoiSpec::default(),
            enable_conversion: true,
            normalize: false,
            blocking: false,
            read_policy: ReadPolicy::Strict,
            data_kind: DataKind::F32,
        }
    }
}

impl ReaderConfig {
    pub fn new(path: impl Into<String>) -> Self {
        ReaderConfig {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_range(mut self, start: usize, end: Option<usize>, step: usize) -> Self {
        self.start = start;
        self.end = end;
        self.step = step;
        self
    }

    pub fn with_roi(mut self, y: usize, height: usize, y_step: usize) -> Self {
        self.roi = RoiSpec::new(y, height, y_step);
        self
    }

    pub fn with_conversion(mut self, enable: bool) -> Self {
        self.enable_conversion = enable;
        self
    }

    pub fn with_read_policy(mut self, policy: ReadPolicy) -> Self {
        self.read_policy = policy;
        self
    }

    pub fn with_data_kind(mut self, kind: DataKind) -> Self {
        self.data_kind = kind;
        self
    }

    /// Checks the options that can be judged without touching the file system
    pub fn validate(&self) -> StreamResult<()> {
        if self.step == 0 {
            return Err(StreamError::InvalidConfig("step must be at least 1".to_string()));
        }
        if self.roi.y_step == 0 {
            return Err(StreamError::InvalidConfig("y-step must be at least 1".to_string()));
        }
        if self.path.trim().is_empty() {
            return Err(StreamError::InvalidConfig("path must not be empty".to_string()));
        }
        Ok(())
    }

    /// Loads a configuration file, see `from_toml_str`
    pub fn from_file<P: AsRef<Path>>(path: P) -> StreamResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parses a TOML document; missing options keep their defaults
    pub fn from_toml_str(content: &str) -> StreamResult<Self> {
        let toml_value: toml::Value = match content.parse() {
            Ok(value) => value,
            Err(e) => return Err(StreamError::InvalidConfig(format!("Failed to parse TOML: {}", e))),
        };

        let mut config = ReaderConfig::default();

        if let Some(path) = get_str(&toml_value, "path")? {
            config.path = path.to_string();
        }
        if let Some(start) = get_usize(&toml_value, "start")? {
            config.start = start;
        }
        if let Some(end) = get_usize(&toml_value, "end")? {
            config.end = Some(end);
        }
        if let Some(step) = get_usize(&toml_value, "step")? {
            config.step = step;
        }
        if let Some(y) = get_usize(&toml_value, "y")? {
            config.roi.y = y;
        }
        if let Some(height) = get_usize(&toml_value, "height")? {
            config.roi.height = height;
        }
        if let Some(y_step) = get_usize(&toml_value, "y-step")? {
            config.roi.y_step = y_step;
        }
        if let Some(enable) = get_bool(&toml_value, "enable-conversion")? {
            config.enable_conversion = enable;
        }
        if let Some(normalize) = get_bool(&toml_value, "normalize")? {
            config.normalize = normalize;
        }
        if let Some(blocking) = get_bool(&toml_value, "blocking")? {
            config.blocking = blocking;
        }
        if let Some(policy) = get_str(&toml_value, "read-policy")? {
            config.read_policy = ReadPolicy::from_name(policy)?;
        }
        if let Some(kind) = get_str(&toml_value, "data-kind")? {
            config.data_kind = DataKind::from_name(kind)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn get_str<'a>(value: &'a toml::Value, key: &str) -> StreamResult<Option<&'a str>> {
    match value.get(key) {
        None => Ok(None),
        Some(v) => v.as_str()
            .map(Some)
            .ok_or_else(|| StreamError::InvalidConfig(format!("`{}' must be a string", key))),
    }
}

fn get_usize(value: &toml::Value, key: &str) -> StreamResult<Option<usize>> {
    match value.get(key) {
        None => Ok(None),
        Some(v) => match v.as_integer() {
            Some(n) if n >= 0 => Ok(Some(n as usize)),
            _ => Err(StreamError::InvalidConfig(format!("`{}' must be a non-negative integer", key))),
        },
    }
}

fn get_bool(value: &toml::Value, key: &str) -> StreamResult<Option<bool>> {
    match value.get(key) {
        None => Ok(None),
        Some(v) => v.as_bool()
            .map(Some)
            .ok_or_else(|| StreamError::InvalidConfig(format!("`{}' must be true or false", key))),
    }
}
