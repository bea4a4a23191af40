use autoapply::employers::DEFAULT_URLS_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "autoapply")]
#[command(about = "Automatic job applications on hh.ru", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $AUTOAPPLY_CONFIG, then cfg.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search vacancies and apply to every eligible one
    Apply(ApplyArgs),
    /// Obtain an access token through the OAuth authorization-code flow
    Auth,
    /// Add employers to the exclusion ledger from a file of profile URLs
    ExcludeEmployers(ExcludeEmployersArgs),
    /// List the resumes of the authorized user
    Resumes,
}

#[derive(clap::Args, Debug)]
pub struct ApplyArgs {
    /// Classify and count without submitting or recording anything
    #[arg(long)]
    pub dry_run: bool,

    /// Stop after this many result pages
    #[arg(long)]
    pub max_pages: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct ExcludeEmployersArgs {
    /// File with one employer profile URL per line
    #[arg(long, default_value = DEFAULT_URLS_FILE)]
    pub file: PathBuf,
}
