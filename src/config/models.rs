use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
///
/// The search keys (`keywords`, `excluded_cities`, `excluded_words`, `area`,
/// `per_page`) sit at the top level of the document so existing `cfg.json`
/// files load unchanged.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub excluded_cities: Vec<String>,
    #[serde(default)]
    pub excluded_words: Vec<String>,
    /// Platform region code (113 = Russia)
    #[serde(default = "default_area")]
    pub area: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Pause after every application request
    #[serde(default = "default_apply_delay")]
    pub apply_delay: HumanDuration,
    /// Inline cover letter sent with every application
    pub cover_letter: Option<String>,
    /// Cover letter read from a file at startup (exclusive with `cover_letter`)
    pub cover_letter_file: Option<PathBuf>,
    /// Directory holding the ledger files
    #[serde(default = "default_ledger_dir")]
    pub ledger_dir: PathBuf,
    /// Mapping of failed application responses to outcomes, first match wins
    #[serde(default = "default_response_rules")]
    pub response_rules: Vec<ResponseRule>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// Loaded from environment variables, never from the config file
    #[serde(skip)]
    pub secrets: Secrets,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            excluded_cities: Vec::new(),
            excluded_words: Vec::new(),
            area: default_area(),
            per_page: default_per_page(),
            apply_delay: default_apply_delay(),
            cover_letter: None,
            cover_letter_file: None,
            ledger_dir: default_ledger_dir(),
            response_rules: default_response_rules(),
            api: ApiConfig::default(),
            oauth: OAuthConfig::default(),
            secrets: Secrets::default(),
        }
    }
}

fn default_area() -> u32 {
    113
}

fn default_per_page() -> u32 {
    100
}

fn default_apply_delay() -> HumanDuration {
    HumanDuration::from_secs(1)
}

fn default_ledger_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Outcome a matching response rule maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    AlreadyApplied,
    ActionRequired,
}

/// Body-substring rule for classifying a rejected application
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResponseRule {
    /// Case-insensitive substring searched for in the response body
    pub pattern: String,
    pub outcome: RuleOutcome,
    /// Reason written to the needs-action ledger (defaults to the pattern)
    #[serde(default)]
    pub reason: Option<String>,
    /// Status the rule applies to; `null` matches any non-201 status
    #[serde(default = "default_rule_status")]
    pub status: Option<u16>,
}

impl ResponseRule {
    pub fn new(pattern: &str, outcome: RuleOutcome, reason: Option<&str>) -> Self {
        Self {
            pattern: pattern.to_string(),
            outcome,
            reason: reason.map(str::to_string),
            status: default_rule_status(),
        }
    }

    /// Reason recorded for an action-required match
    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(&self.pattern)
    }
}

fn default_rule_status() -> Option<u16> {
    Some(403)
}

pub fn default_response_rules() -> Vec<ResponseRule> {
    vec![
        ResponseRule::new("already_applied", RuleOutcome::AlreadyApplied, None),
        ResponseRule::new("letter required", RuleOutcome::ActionRequired, Some("letter_required")),
        ResponseRule::new("test_required", RuleOutcome::ActionRequired, Some("test_required")),
    ]
}

/// Platform endpoints and HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_oauth_base_url")]
    pub oauth_base_url: String,
    /// Host that employer profile URLs must belong to
    #[serde(default = "default_site_host")]
    pub site_host: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            oauth_base_url: default_oauth_base_url(),
            site_host: default_site_host(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.hh.ru".to_string()
}

fn default_oauth_base_url() -> String {
    "https://hh.ru".to_string()
}

fn default_site_host() -> String {
    "hh.ru".to_string()
}

fn default_user_agent() -> String {
    format!("autoapply/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// OAuth callback listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OAuthConfig {
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            callback_port: default_callback_port(),
        }
    }
}

fn default_callback_port() -> u16 {
    5000
}

/// Credentials taken from the environment
#[derive(Clone, Default)]
pub struct Secrets {
    pub access_token: Option<String>,
    pub resume_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("Secrets")
            .field("access_token", &mask(&self.access_token))
            .field("resume_id", &self.resume_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &mask(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}
