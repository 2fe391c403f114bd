use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use clap::Parser;

use stablecoin_digest::cli::{Cli, Commands};
use stablecoin_digest::config::{Config, MailConfig, OAuthClientConfig};
use stablecoin_digest::domain::Digest;
use stablecoin_digest::errors::{DigestError, DigestResult};
use stablecoin_digest::logging;
use stablecoin_digest::services::{dispatch_all, DigestService, GmailMailer, TokenFile};
use stablecoin_digest::sources::HttpFetcher;

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> DigestResult<()> {
    let cli = Cli::parse();

    match cli.command() {
        Commands::Run { dry_run } => cmd_run(dry_run),
        Commands::Authorize { output } => cmd_authorize(&output),
    }
}

fn cmd_run(dry_run: bool) -> DigestResult<()> {
    let config = Config::from_env()?;

    // Credentials are checked before any fetch
    let mail_config = if dry_run {
        None
    } else {
        Some(MailConfig::from_env()?)
    };

    let now = Utc::now();
    let service = DigestService::new(HttpFetcher::new(config.fetch_timeout), config);

    println!("Fetching feeds...\n");
    let digests = service.prepare(now)?;

    let Some(mail_config) = mail_config else {
        for digest in &digests {
            print_digest(digest);
        }
        println!("Dry run complete. Would send {} digests.", digests.len());
        return Ok(());
    };

    let mailer = GmailMailer::connect(&mail_config)?;
    let report = dispatch_all(&mailer, &mail_config.to_email, &digests);

    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!(
                "Sent '{}' digest with {} items to {}",
                outcome.keyword, outcome.item_count, mail_config.to_email
            ),
            Some(e) => println!("FAILED '{}' digest: {}", outcome.keyword, e),
        }
    }
    println!("\nSent {} of {} digests.", report.sent(), report.outcomes.len());

    report.into_result()?;
    Ok(())
}

fn print_digest(digest: &Digest) {
    println!("[DRY RUN] {}", digest.subject);
    println!("{}", digest.text);
    println!();
}

fn cmd_authorize(output: &str) -> DigestResult<()> {
    let client = OAuthClientConfig::from_env()?;
    let consent_url = gmail::authorization_url(&client.client_id, gmail::DEFAULT_REDIRECT_URI)?;

    println!("Open this URL in a browser and approve access:\n");
    println!("  {}\n", consent_url);
    println!("The browser is then redirected to {}.", gmail::DEFAULT_REDIRECT_URI);
    print!("Paste the redirected URL (or just the code): ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let code = gmail::code_from_redirect(&input)
        .ok_or_else(|| DigestError::InvalidInput("No authorization code given".to_string()))?;

    let grant = gmail::exchange_code(
        &client.client_id,
        &client.client_secret,
        &code,
        gmail::DEFAULT_REDIRECT_URI,
    )?;

    let token_file = TokenFile::from_grant(grant, &client)?;
    token_file.save(Path::new(output))?;

    println!("Saved {}", output);
    println!("Use the refresh_token value in GOOGLE_REFRESH_TOKEN");

    Ok(())
}
