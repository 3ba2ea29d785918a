use crate::error::{Error, Result};
use crate::formatter::{CaseStyle, DateFormat, DatePosition};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "llm-rename.toml";

const DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";
const DEFAULT_TEXT_MODEL: &str = "qwen2.5-7b-instruct";
const DEFAULT_VISION_MODEL: &str = "mlx-community/SmolVLM-500M-Instruct-4bit";
const DEFAULT_MAX_FILENAME_LENGTH: usize = 100;
const DEFAULT_BATCH_SIZE: usize = 20;
const DEFAULT_BATCH_PAUSE_SECS: u64 = 2;
const DEFAULT_MAX_TEXT_LENGTH: usize = 2000;
const DEFAULT_MAX_PDF_PAGES: usize = 5;

const DEFAULT_TEXT_INSTRUCTION: &str = "You are a file naming assistant. Analyze the \
    document content and respond with only a JSON object containing the keys \
    \"company\", \"brand\", \"project\", \"subject\", \"type\" and \"description\". \
    Each value must be a short lowercase phrase, or the string \"null\" when the \
    component cannot be identified. Do not add any text outside the JSON object.";

const DEFAULT_VISION_INSTRUCTION: &str = "You are a file naming assistant. Describe \
    what this image shows and respond with only a JSON object containing the keys \
    \"company\", \"brand\", \"project\", \"subject\", \"type\" and \"description\". \
    Each value must be a short lowercase phrase, or the string \"null\" when the \
    component cannot be identified. Do not add any text outside the JSON object.";

/// Model server connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the OpenAI-compatible local server
    pub base_url: String,

    /// Model used for text analysis
    pub text_model: String,

    /// Model used for image analysis
    pub vision_model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens the model may generate per reply
    pub max_tokens: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 150,
        }
    }
}

/// Filename construction settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Case style for generated stems
    pub case_style: CaseStyle,

    /// Format for generated and extracted dates
    pub date_format: DateFormat,

    /// Where the date lands in the filename
    pub date_position: DatePosition,

    /// Hard upper bound on stem length in characters
    pub max_length: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            case_style: CaseStyle::default(),
            date_format: DateFormat::default(),
            date_position: DatePosition::default(),
            max_length: DEFAULT_MAX_FILENAME_LENGTH,
        }
    }
}

/// Batch and skip behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Files analyzed per batch before pausing
    pub batch_size: usize,

    /// Pause between batches, in seconds
    pub batch_pause_secs: u64,

    /// Skip files whose names already follow the convention
    pub skip_already_formatted: bool,

    /// Skip dotfiles during discovery
    pub skip_hidden: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pause_secs: DEFAULT_BATCH_PAUSE_SECS,
            skip_already_formatted: true,
            skip_hidden: true,
        }
    }
}

/// Content extraction bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum characters of text extracted per file
    pub max_text_length: usize,

    /// Maximum PDF pages read before cutting off
    pub max_pdf_pages: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            max_pdf_pages: DEFAULT_MAX_PDF_PAGES,
        }
    }
}

/// File extensions handled during discovery, without leading dots.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileTypesConfig {
    /// Document extensions routed through text extraction
    pub documents: Vec<String>,

    /// Image extensions routed to the vision model
    pub images: Vec<String>,
}

impl FileTypesConfig {
    /// All supported extensions, documents and images combined.
    #[must_use]
    pub fn all(&self) -> Vec<String> {
        let mut extensions = self.documents.clone();
        extensions.extend(self.images.iter().cloned());
        extensions
    }
}

impl Default for FileTypesConfig {
    fn default() -> Self {
        Self {
            documents: [
                "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "txt", "md", "csv", "srt",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            images: [
                "jpg", "jpeg", "png", "gif", "webp", "heic", "bmp", "tiff",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}

/// Instructions sent to the model alongside the content.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// System prompt for text analysis
    pub text_instruction: String,

    /// Prompt for image analysis
    pub vision_instruction: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            text_instruction: DEFAULT_TEXT_INSTRUCTION.to_string(),
            vision_instruction: DEFAULT_VISION_INSTRUCTION.to_string(),
        }
    }
}

/// Configuration for the rename pipeline.
///
/// Constructed once (from a TOML file or via [`Config::builder()`]) and
/// passed by reference to each component's constructor; nothing reads
/// configuration ambiently.
///
/// # Examples
///
/// ```
/// use llm_rename::{CaseStyle, Config};
///
/// let config = Config::builder()
///     .case_style(CaseStyle::Snake)
///     .batch_size(10)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.processing.batch_size, 10);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Config {
    /// Model server connection settings
    pub server: ServerConfig,

    /// Filename construction settings
    pub naming: NamingConfig,

    /// Batch and skip behavior
    pub processing: ProcessingConfig,

    /// Content extraction bounds
    pub extraction: ExtractionConfig,

    /// Supported file extensions
    pub file_types: FileTypesConfig,

    /// Model instructions
    pub prompts: PromptsConfig,

    /// Override for the rename log directory (default: `~/.llm-rename`)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves and loads the configuration file for a run.
    ///
    /// An explicitly given path must exist. Without one, the default
    /// `llm-rename.toml` is looked up in the working directory; a missing
    /// config file is fatal and aborts before any processing.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no file is found or the file is
    /// invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Err(Error::config(format!(
                        "config file not found: {DEFAULT_CONFIG_FILE}. Copy \
                         llm-rename.example.toml to {DEFAULT_CONFIG_FILE} and adjust it, \
                         or pass --config"
                    )))
                }
            }
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any bound is zero or the temperature is out of
    /// range.
    pub fn validate(&self) -> Result<()> {
        if self.processing.batch_size == 0 {
            return Err(Error::config("processing.batch_size must be greater than 0"));
        }

        if self.naming.max_length == 0 {
            return Err(Error::config("naming.max_length must be greater than 0"));
        }

        if self.extraction.max_text_length == 0 {
            return Err(Error::config(
                "extraction.max_text_length must be greater than 0",
            ));
        }

        if !(0.0..=2.0).contains(&self.server.temperature) {
            return Err(Error::config(format!(
                "server.temperature must be within 0.0..=2.0, got {}",
                self.server.temperature
            )));
        }

        Ok(())
    }

    /// The directory where rename session logs are persisted.
    #[must_use]
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(crate::ledger::default_log_dir)
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    case_style: Option<CaseStyle>,
    date_format: Option<DateFormat>,
    date_position: Option<DatePosition>,
    max_filename_length: Option<usize>,
    batch_size: Option<usize>,
    batch_pause_secs: Option<u64>,
    skip_already_formatted: Option<bool>,
    skip_hidden: Option<bool>,
    max_text_length: Option<usize>,
    base_url: Option<String>,
    text_model: Option<String>,
    vision_model: Option<String>,
    temperature: Option<f32>,
    log_dir: Option<PathBuf>,
}

impl ConfigBuilder {
    /// Sets the case style for generated stems.
    #[must_use]
    pub fn case_style(mut self, style: CaseStyle) -> Self {
        self.case_style = Some(style);
        self
    }

    /// Sets the date format.
    #[must_use]
    pub fn date_format(mut self, format: DateFormat) -> Self {
        self.date_format = Some(format);
        self
    }

    /// Sets the date position.
    #[must_use]
    pub fn date_position(mut self, position: DatePosition) -> Self {
        self.date_position = Some(position);
        self
    }

    /// Sets the maximum stem length.
    #[must_use]
    pub fn max_filename_length(mut self, length: usize) -> Self {
        self.max_filename_length = Some(length);
        self
    }

    /// Sets the batch size.
    #[must_use]
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Sets the pause between batches in seconds.
    #[must_use]
    pub fn batch_pause_secs(mut self, secs: u64) -> Self {
        self.batch_pause_secs = Some(secs);
        self
    }

    /// Enables or disables skipping already-formatted files.
    #[must_use]
    pub fn skip_already_formatted(mut self, enabled: bool) -> Self {
        self.skip_already_formatted = Some(enabled);
        self
    }

    /// Enables or disables skipping hidden files.
    #[must_use]
    pub fn skip_hidden(mut self, enabled: bool) -> Self {
        self.skip_hidden = Some(enabled);
        self
    }

    /// Sets the maximum extracted text length.
    #[must_use]
    pub fn max_text_length(mut self, length: usize) -> Self {
        self.max_text_length = Some(length);
        self
    }

    /// Sets the model server base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the text analysis model.
    #[must_use]
    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = Some(model.into());
        self
    }

    /// Sets the vision analysis model.
    #[must_use]
    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the rename log directory.
    #[must_use]
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();

        if let Some(style) = self.case_style {
            config.naming.case_style = style;
        }
        if let Some(format) = self.date_format {
            config.naming.date_format = format;
        }
        if let Some(position) = self.date_position {
            config.naming.date_position = position;
        }
        if let Some(length) = self.max_filename_length {
            config.naming.max_length = length;
        }
        if let Some(size) = self.batch_size {
            config.processing.batch_size = size;
        }
        if let Some(secs) = self.batch_pause_secs {
            config.processing.batch_pause_secs = secs;
        }
        if let Some(enabled) = self.skip_already_formatted {
            config.processing.skip_already_formatted = enabled;
        }
        if let Some(enabled) = self.skip_hidden {
            config.processing.skip_hidden = enabled;
        }
        if let Some(length) = self.max_text_length {
            config.extraction.max_text_length = length;
        }
        if let Some(url) = self.base_url {
            config.server.base_url = url;
        }
        if let Some(model) = self.text_model {
            config.server.text_model = model;
        }
        if let Some(model) = self.vision_model {
            config.server.vision_model = model;
        }
        if let Some(temperature) = self.temperature {
            config.server.temperature = temperature;
        }
        config.log_dir = self.log_dir;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.processing.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.naming.max_length, DEFAULT_MAX_FILENAME_LENGTH);
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::builder()
            .case_style(CaseStyle::Snake)
            .batch_size(5)
            .batch_pause_secs(0)
            .skip_already_formatted(false)
            .build()
            .unwrap();

        assert_eq!(config.naming.case_style, CaseStyle::Snake);
        assert_eq!(config.processing.batch_size, 5);
        assert!(!config.processing.skip_already_formatted);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = Config::builder().batch_size(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        let result = Config::builder().temperature(3.5).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("llm-rename.toml");
        file.write_str(
            r#"
[naming]
case_style = "snake"
max_length = 60

[processing]
batch_size = 7
"#,
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.naming.case_style, CaseStyle::Snake);
        assert_eq!(config.naming.max_length, 60);
        assert_eq!(config.processing.batch_size, 7);
        // Untouched sections keep their defaults.
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_unknown_case_style_in_file_falls_back() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("llm-rename.toml");
        file.write_str("[naming]\ncase_style = \"shouting\"\n").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.naming.case_style, CaseStyle::Kebab);
    }

    #[test]
    fn test_missing_explicit_file_is_fatal() {
        let result = Config::load(Some(Path::new("/nonexistent/llm-rename.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_all_extensions() {
        let types = FileTypesConfig::default();
        let all = types.all();
        assert!(all.iter().any(|e| e == "pdf"));
        assert!(all.iter().any(|e| e == "jpg"));
        assert_eq!(all.len(), types.documents.len() + types.images.len());
    }
}
