//! Engine configuration.
//!
//! Configuration is read from TOML text; every field has a default, so an
//! empty document yields the plain `#key=value` behaviour.
//!
//! ```toml
//! marker = "#"
//!
//! [encoding]
//! escape = "max"
//! base64 = true
//! deflate = true
//! deflate_level = 9
//! ```

use serde::Deserialize;
use urlhash_codec::{
    AsciiSep, Base64, DecodeFirst, Decoder, Deflate, Deflated, EncodeShortest, Encoder,
    EscapeLevel, Escaped, DEFAULT_BASE64_PREFIX, DEFAULT_DEFLATE_PREFIX,
};

use crate::error::HashError;

/// Root configuration for [`HashSync`](crate::HashSync).
#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    /// Leading marker stripped before decoding and prepended after encoding
    /// (default: `#`). Empty means no marker.
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Which encodings to negotiate.
    #[serde(default)]
    pub encoding: EncodingConfig,
}

/// Codec negotiation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EncodingConfig {
    /// Escaping strictness of the plain codec (default: max).
    #[serde(default)]
    pub escape: EscapeMode,
    /// Offer the base64 wrapper (default: false).
    #[serde(default)]
    pub base64: bool,
    /// Prefix gating base64 payloads (default: `b64:`).
    #[serde(default = "default_base64_prefix")]
    pub base64_prefix: String,
    /// Offer the compressed wrapper (default: false).
    #[serde(default)]
    pub deflate: bool,
    /// Prefix gating compressed payloads (default: `pak:`).
    #[serde(default = "default_deflate_prefix")]
    pub deflate_prefix: String,
    /// DEFLATE level 0-9 (default: 6).
    #[serde(default = "default_deflate_level")]
    pub deflate_level: u32,
}

/// Escaping strictness as spelled in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    /// Escape only `%`, `#`, `=` and `&`.
    Min,
    /// Legacy full escaping.
    #[default]
    Max,
}

impl From<EscapeMode> for EscapeLevel {
    fn from(mode: EscapeMode) -> Self {
        match mode {
            EscapeMode::Min => EscapeLevel::Min,
            EscapeMode::Max => EscapeLevel::Max,
        }
    }
}

// Default value functions
fn default_marker() -> String {
    "#".to_string()
}

fn default_base64_prefix() -> String {
    DEFAULT_BASE64_PREFIX.to_string()
}

fn default_deflate_prefix() -> String {
    DEFAULT_DEFLATE_PREFIX.to_string()
}

fn default_deflate_level() -> u32 {
    6
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            encoding: EncodingConfig::default(),
        }
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            escape: EscapeMode::default(),
            base64: false,
            base64_prefix: default_base64_prefix(),
            deflate: false,
            deflate_prefix: default_deflate_prefix(),
            deflate_level: default_deflate_level(),
        }
    }
}

impl HashConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, HashError> {
        let config: Self = toml::from_str(text).map_err(|e| HashError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for contradictions.
    pub fn validate(&self) -> Result<(), HashError> {
        self.marker_char()?;

        let enc = &self.encoding;
        if enc.deflate_level > 9 {
            return Err(HashError::Config(format!(
                "deflate_level must be 0-9, got {}",
                enc.deflate_level
            )));
        }
        if enc.base64 && enc.base64_prefix.is_empty() {
            return Err(HashError::Config("base64_prefix must not be empty".into()));
        }
        if enc.deflate && enc.deflate_prefix.is_empty() {
            return Err(HashError::Config("deflate_prefix must not be empty".into()));
        }
        let enabled = [
            (enc.base64, &enc.base64_prefix),
            (enc.deflate, &enc.deflate_prefix),
        ];
        for (_, prefix) in enabled.iter().filter(|(on, _)| *on) {
            if prefix.starts_with('%') {
                return Err(HashError::Config(format!(
                    "prefix {:?} must not start with '%'",
                    prefix
                )));
            }
        }
        if enc.base64
            && enc.deflate
            && (enc.base64_prefix.starts_with(&enc.deflate_prefix)
                || enc.deflate_prefix.starts_with(&enc.base64_prefix))
        {
            return Err(HashError::Config(format!(
                "prefixes {:?} and {:?} overlap",
                enc.base64_prefix, enc.deflate_prefix
            )));
        }
        Ok(())
    }

    /// The marker as a single character, or `None` for no marker.
    pub fn marker_char(&self) -> Result<Option<char>, HashError> {
        let mut chars = self.marker.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(None),
            (Some(c), None) => Ok(Some(c)),
            _ => Err(HashError::Config(format!(
                "marker must be a single character, got {:?}",
                self.marker
            ))),
        }
    }

    /// Decoder chain: prefix-gated wrappers first, plain codec last.
    pub fn decoder(&self) -> DecodeFirst {
        let enc = &self.encoding;
        let mut chain: Vec<Box<dyn Decoder>> = Vec::new();
        if enc.deflate {
            chain.push(Box::new(self.deflated()));
        }
        if enc.base64 {
            chain.push(Box::new(Base64::with_prefix(
                AsciiSep,
                enc.base64_prefix.clone(),
            )));
        }
        chain.push(Box::new(self.escaped()));
        DecodeFirst::new(chain)
    }

    /// Encoder race: plain codec first, so it wins ties.
    pub fn encoder(&self) -> EncodeShortest {
        let enc = &self.encoding;
        let mut race: Vec<Box<dyn Encoder>> = vec![Box::new(self.escaped())];
        if enc.base64 {
            race.push(Box::new(Base64::with_prefix(
                AsciiSep,
                enc.base64_prefix.clone(),
            )));
        }
        if enc.deflate {
            race.push(Box::new(self.deflated()));
        }
        EncodeShortest::new(race)
    }

    // Plain output must not look like one of the enabled wrappers.
    fn escaped(&self) -> Escaped {
        let enc = &self.encoding;
        let mut codec = Escaped::new(enc.escape.into());
        if enc.base64 {
            codec = codec.reserve_prefix(enc.base64_prefix.clone());
        }
        if enc.deflate {
            codec = codec.reserve_prefix(enc.deflate_prefix.clone());
        }
        codec
    }

    fn deflated(&self) -> Deflated<AsciiSep, Deflate> {
        Deflated::with_compressor(
            AsciiSep,
            Deflate::new(self.encoding.deflate_level),
            self.encoding.deflate_prefix.clone(),
        )
    }
}
