mod cli;

use autoapply::api::ApiClient;
use autoapply::config::Config;
use autoapply::employers;
use autoapply::ledger::Ledgers;
use autoapply::oauth::{self, OAuthClient};
use autoapply::observability;
use autoapply::pipeline::{RunOptions, Runner};
use autoapply::server::{self, AuthFlow};
use clap::Parser;
use cli::{ApplyArgs, Cli, Commands, ExcludeEmployersArgs};
use std::net::SocketAddr;
use tracing::info;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AnyError> {
    observability::init_tracing();

    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    match cli.command {
        Commands::Apply(args) => apply(&config, args).await?,
        Commands::Auth => auth(&config).await?,
        Commands::ExcludeEmployers(args) => exclude_employers(&config, args).await?,
        Commands::Resumes => resumes(&config).await?,
    }

    Ok(())
}

async fn apply(config: &Config, args: ApplyArgs) -> Result<(), AnyError> {
    config.validate_for_search()?;

    // A dry run only searches, which the platform allows anonymously
    let (access_token, resume_id) = if args.dry_run {
        (
            config.secrets.access_token.as_deref(),
            config.secrets.resume_id.as_deref().unwrap_or_default(),
        )
    } else {
        (Some(config.access_token()?), config.resume_id()?)
    };

    let client = ApiClient::new(&config.api, access_token)?;
    let mut ledgers = Ledgers::open(&config.ledger_dir)?;
    let options = RunOptions {
        dry_run: args.dry_run,
        max_pages: args.max_pages,
    };

    let report = Runner::new(&client, config, resume_id, options)
        .run(&mut ledgers)
        .await;

    println!("{}", report.metrics);
    match report.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

async fn auth(config: &Config) -> Result<(), AnyError> {
    let (client_id, client_secret, redirect_uri) = config.oauth_client()?;
    let oauth = OAuthClient::new(&config.api, client_id, client_secret, redirect_uri)?;

    let state = oauth::new_state();
    let authorize_url = oauth.authorize_url(&state)?;
    let path = oauth.callback_path()?;

    println!("Open this URL to authorize:");
    println!("{}", authorize_url);

    let address = SocketAddr::from(([127, 0, 0, 1], config.oauth.callback_port));
    let flow = AuthFlow::new(oauth, state);

    match server::run(address, flow, &path).await? {
        Some(token) => {
            println!("Access token: {}", token.access_token);
            if let Some(refresh_token) = &token.refresh_token {
                println!("Refresh token: {}", refresh_token);
            }
            if let Some(lifetime) = token.expires_after() {
                println!("Expires in: {}s", lifetime.as_secs());
            }
        }
        None => info!("Authorization cancelled"),
    }

    Ok(())
}

async fn exclude_employers(config: &Config, args: ExcludeEmployersArgs) -> Result<(), AnyError> {
    let urls = employers::read_urls(&args.file)?;
    let client = ApiClient::new(&config.api, Some(config.access_token()?))?;
    let mut ledgers = Ledgers::open(&config.ledger_dir)?;

    let report = employers::exclude_employers(&client, &urls, &config.api.site_host, &mut ledgers).await?;
    println!("{}", report);
    Ok(())
}

async fn resumes(config: &Config) -> Result<(), AnyError> {
    let client = ApiClient::new(&config.api, Some(config.access_token()?))?;

    println!("Your resumes:");
    for resume in client.my_resumes().await? {
        println!(
            "ID: {}, Title: {}, Updated: {}",
            resume.id,
            resume.title.as_deref().unwrap_or("-"),
            resume.updated_at.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
