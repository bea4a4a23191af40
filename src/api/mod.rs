//! Client side of the recruitment platform's REST API.
//!
//! [`ApiClient`] talks to the real platform; the application run only needs
//! the [`JobBoard`] trait so it can be driven by fakes in tests.

mod board;
mod client;
mod error;
pub mod models;

pub use board::JobBoard;
pub use client::{ApiClient, HttpConfig};
pub use error::{ApiError, Result};
pub use models::{Application, ApplyResponse, Employer, Posting, Resume, SearchQuery, VacancyPage};
