//! Configuration management for the PubMed assistant.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Config files (.pubmed/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources win. Engine tuning (QA gating, synthesis breadth and
//! thresholds) lives here too so the CLI and the engine share one view of it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default NCBI E-utilities endpoint.
pub const DEFAULT_EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .pubmed/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("openai" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Endpoint override for the LLM provider
    pub base_url: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations from config.yaml
    pub llm: Option<LlmConfig>,

    /// Literature service settings
    pub eutils: EutilsSettings,

    /// Question-answering tuning
    pub qa: QaConfig,

    /// Synthesis tuning
    pub synth: SynthConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

/// NCBI E-utilities settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EutilsSettings {
    pub base_url: String,
    /// Environment variable holding the NCBI API key
    pub api_key_env: String,
    /// Tool name reported to NCBI
    pub tool: String,
    /// Contact email reported to NCBI
    pub email: Option<String>,
}

impl Default for EutilsSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EUTILS_BASE_URL.to_string(),
            api_key_env: "NCBI_API_KEY".to_string(),
            tool: "pubmed-cli".to_string(),
            email: None,
        }
    }
}

impl EutilsSettings {
    /// Read the API key from the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Tuning for the confidence-gated question answering flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct QaConfig {
    /// Minimum self-reported confidence (1-10) to answer without retrieval
    pub confidence_threshold: u8,
    /// Maximum documents fetched as evidence
    pub max_results: usize,
    /// Character budget shared by all evidence abstracts
    pub evidence_chars: usize,
    /// Always answer from the model's own knowledge
    pub force_parametric: bool,
    /// Always retrieve evidence
    pub force_retrieval: bool,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 7,
            max_results: 3,
            evidence_chars: 1500,
            force_parametric: false,
            force_retrieval: false,
        }
    }
}

/// Tuning for the multi-paper synthesis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthConfig {
    /// Papers included in the final synthesis
    pub papers_to_use: usize,
    /// Papers requested from search
    pub papers_to_search: usize,
    /// Minimum relevance score (1-10) to keep a paper
    pub relevance_threshold: u8,
    /// Approximate length of the synthesis in words
    pub target_words: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            papers_to_use: 5,
            papers_to_search: 30,
            relevance_threshold: 7,
            target_words: 250,
        }
    }
}

impl SynthConfig {
    /// Search breadth, raised to `papers_to_use` when configured lower.
    pub fn effective_search_breadth(&self) -> usize {
        self.papers_to_search.max(self.papers_to_use)
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    eutils: Option<EutilsSettings>,
    qa: Option<QaConfig>,
    synth: Option<SynthConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            base_url: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            eutils: EutilsSettings::default(),
            qa: QaConfig::default(),
            synth: SynthConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `PUBMED_WORKSPACE`: Override workspace path
    /// - `PUBMED_CONFIG`: Path to config file
    /// - `PUBMED_PROVIDER`: LLM provider
    /// - `LLM_MODEL`: Model identifier
    /// - `LLM_BASE_URL`: Provider endpoint
    /// - `LLM_API_KEY` / `OPENAI_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use pubmed_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("PUBMED_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("PUBMED_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.workspace.join(".pubmed/config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("PUBMED_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.model = model;
        }

        if let Ok(base_url) = std::env::var("LLM_BASE_URL") {
            config.base_url = Some(base_url);
        }

        config.api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                match provider_config {
                    ProviderConfig::OpenAI {
                        model, endpoint, ..
                    } => {
                        result.model = model.clone();
                        if endpoint.is_some() {
                            result.base_url = endpoint.clone();
                        }
                    }
                    ProviderConfig::Ollama {
                        model, endpoint, ..
                    } => {
                        result.model = model.clone();
                        result.base_url = Some(endpoint.clone());
                    }
                }
            }

            result.llm = Some(llm);
        }

        if let Some(eutils) = config_file.eutils {
            result.eutils = eutils;
        }
        if let Some(qa) = config_file.qa {
            result.qa = qa;
        }
        if let Some(synth) = config_file.synth {
            result.synth = synth;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .pubmed directory.
    pub fn pubmed_dir(&self) -> PathBuf {
        self.workspace.join(".pubmed")
    }

    /// Get the active provider configuration.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider))
    }

    /// Resolve the LLM API key.
    ///
    /// An explicit key from the environment wins; otherwise the provider's
    /// `apiKeyEnv` from config.yaml is consulted.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(&self.provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => std::env::var(api_key_env).ok(),
            _ => None,
        }
    }

    /// Resolve the provider endpoint, falling back to the provider's default.
    pub fn resolve_base_url(&self) -> Option<String> {
        if self.base_url.is_some() {
            return self.base_url.clone();
        }
        match self.provider.as_str() {
            "openai" => Some(DEFAULT_OPENAI_BASE_URL.to_string()),
            _ => None,
        }
    }

    /// Validate provider selection and engine tuning.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.provider == "openai" && self.resolve_api_key().is_none() {
            return Err(AppError::Config(
                "LLM API key not set. Set LLM_API_KEY or OPENAI_API_KEY".to_string(),
            ));
        }

        check_score_range("qa.confidenceThreshold", self.qa.confidence_threshold)?;
        check_score_range("synth.relevanceThreshold", self.synth.relevance_threshold)?;

        if self.qa.force_parametric && self.qa.force_retrieval {
            return Err(AppError::Config(
                "qa.forceParametric and qa.forceRetrieval are mutually exclusive".to_string(),
            ));
        }

        for (name, value) in [
            ("qa.maxResults", self.qa.max_results),
            ("qa.evidenceChars", self.qa.evidence_chars),
            ("synth.papersToUse", self.synth.papers_to_use),
            ("synth.papersToSearch", self.synth.papers_to_search),
            ("synth.targetWords", self.synth.target_words),
        ] {
            if value == 0 {
                return Err(AppError::Config(format!("{} must be at least 1", name)));
            }
        }

        Ok(())
    }
}

fn check_score_range(name: &str, value: u8) -> AppResult<()> {
    if (1..=10).contains(&value) {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "{} must be between 1 and 10, got {}",
            name, value
        )))
    }
}
