//! Wire models for the hh.ru REST API and the domain types built from them.
//!
//! Only the fields the tool reads are modelled; everything else in the
//! platform's responses is ignored.
//!
//! # Search page (`GET /vacancies`)
//!
//! ```json
//! {
//!   "items": [
//!     {
//!       "id": "93354451",
//!       "name": "Rust developer",
//!       "employer": {"id": "3529", "name": "Acme"},
//!       "area": {"id": "1", "name": "Москва"}
//!     }
//!   ],
//!   "found": 1,
//!   "pages": 1,
//!   "page": 0,
//!   "per_page": 100
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::Config;

/// One page of vacancy search results
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VacancyPage {
    #[serde(default)]
    pub items: Vec<VacancyItem>,
    #[serde(default)]
    pub found: u64,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VacancyItem {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default)]
    pub employer: Option<EmployerRef>,
    #[serde(default)]
    pub area: Option<AreaRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployerRef {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// Snapshot of one search result, as seen by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// `None` when the platform returned no usable id
    pub id: Option<String>,
    pub title: String,
    pub employer_id: Option<String>,
    pub city: String,
}

impl Posting {
    pub fn new(id: &str, title: &str, employer_id: Option<&str>, city: &str) -> Self {
        Self {
            id: Some(id.to_string()).filter(|id| !id.is_empty()),
            title: title.to_string(),
            employer_id: employer_id.map(str::to_string),
            city: city.to_string(),
        }
    }
}

impl From<VacancyItem> for Posting {
    fn from(item: VacancyItem) -> Self {
        Self {
            id: item.id,
            title: item.name,
            employer_id: item.employer.and_then(|e| e.id),
            city: item.area.and_then(|a| a.name).unwrap_or_default(),
        }
    }
}

/// Search parameters shared by every page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    /// Keywords joined with ` OR `
    pub text: String,
    pub per_page: u32,
    pub area: u32,
}

impl SearchQuery {
    pub fn from_config(config: &Config) -> Self {
        Self {
            text: config.keywords.join(" OR "),
            per_page: config.per_page,
            area: config.area,
        }
    }
}

/// Application request for one vacancy
#[derive(Debug, Clone, Copy)]
pub struct Application<'a> {
    pub vacancy_id: &'a str,
    pub resume_id: &'a str,
    /// Cover letter
    pub message: Option<&'a str>,
}

/// Raw answer to an application request; classification happens elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResponse {
    pub status: u16,
    pub body: String,
}

/// Employer profile (`GET /employers/{id}`)
#[derive(Debug, Clone, Deserialize)]
pub struct Employer {
    #[serde(deserialize_with = "required_id")]
    pub id: String,
    pub name: String,
}

/// Resume summary (`GET /resumes/mine`)
#[derive(Debug, Clone, Deserialize)]
pub struct Resume {
    #[serde(deserialize_with = "required_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeList {
    #[serde(default)]
    pub items: Vec<Resume>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(text) => text.trim().to_string(),
            RawId::Number(number) => number.to_string(),
        }
    }
}

/// Ids arrive as strings, but accept numbers too; blank ids count as missing
fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(RawId::into_string).filter(|id| !id.is_empty()))
}

/// `null` reads as an empty string
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn required_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(RawId::into_string)
}
