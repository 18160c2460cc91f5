//! Hermes - a read-only Gmail inbox viewer for the terminal
//!
//! This is the main entry point for the Hermes mail application.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use mail::{
    FailurePolicy, FetchOptions, GMAIL_READONLY_SCOPE, GmailAuth, GmailClient, GmailCredentials,
    MailProvider, MessageId, NormalizedMail, Session,
};

mod views;

#[derive(Parser)]
#[command(name = "hermes", version, about = "Read your Gmail inbox from the terminal")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the built-in sample mailbox
    Sample(ListArgs),
    /// Fetch recent mail from Gmail
    Fetch(FetchArgs),
    /// Show a single mail
    Show {
        /// Message id
        id: String,
        /// Look the id up in the sample mailbox instead of Gmail
        #[arg(long)]
        sample: bool,
    },
    /// List labels with unread counts
    Labels {
        /// Use the sample mailbox instead of Gmail
        #[arg(long)]
        sample: bool,
    },
    /// Sign in to Gmail
    Login,
    /// Forget stored Gmail tokens
    Logout,
}

#[derive(Args)]
struct ListArgs {
    /// Only show mail with this label ("all" shows everything)
    #[arg(long, default_value = "inbox")]
    label: String,
    /// Only show mail matching this text
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args)]
struct FetchArgs {
    /// Restrict the Gmail listing to this label id (e.g. INBOX)
    #[arg(long)]
    label: Option<String>,
    /// Number of messages to list
    #[arg(long, env = "HERMES_PAGE_SIZE")]
    page_size: Option<usize>,
    /// Maximum concurrent message fetches
    #[arg(long, env = "HERMES_CONCURRENCY")]
    concurrency: Option<usize>,
    /// Skip messages that fail to fetch instead of failing the batch
    #[arg(long)]
    isolate_failures: bool,
    /// Only show mail matching this text
    #[arg(long)]
    search: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sample(args) => {
            let shown = sample_list(&args, Utc::now());
            let accounts = mail::sample_accounts();
            views::print_mail_list(&shown, accounts.first(), cli.json)
        }
        Command::Fetch(args) => fetch(args, cli.json),
        Command::Show { id, sample } => {
            let id = MessageId::new(id);
            let mail = if sample {
                mail::find_mail(&mail::sample_mails(Utc::now()), &id)
                    .cloned()
                    .with_context(|| format!("No sample mail with id {}", id))?
            } else {
                fetch_one(&id)?
            };
            views::print_mail(&mail, cli.json)
        }
        Command::Labels { sample } => {
            let labels = if sample {
                mail::label_unread_counts(&mail::sample_labels(), &mail::sample_mails(Utc::now()))
            } else {
                let session = connect()?;
                let token = session.authorize(&[GMAIL_READONLY_SCOPE])?;
                let options = FetchOptions::load()?;
                GmailClient::new(options.request_timeout()).list_labels(token)?
            };
            views::print_labels(labels, cli.json)
        }
        Command::Login => {
            let session = connect()?;
            session.authorize(&[GMAIL_READONLY_SCOPE])?;
            println!("Signed in to Gmail.");
            Ok(())
        }
        Command::Logout => {
            gmail_auth()?.logout()?;
            println!("Signed out.");
            Ok(())
        }
    }
}

/// Fetch recent mail and print it
fn fetch(args: FetchArgs, json: bool) -> Result<()> {
    let mut options = FetchOptions::load()?;
    if let Some(page_size) = args.page_size {
        options.page_size = page_size;
    }
    if let Some(concurrency) = args.concurrency {
        options.max_concurrency = concurrency;
    }
    if args.isolate_failures {
        options.failure_policy = FailurePolicy::Isolate;
    }
    if args.label.is_some() {
        options.label_filter = args.label;
    }

    let session = connect()?;
    let client = GmailClient::new(options.request_timeout());

    let report = mail::fetch_mail(&client, &session, &options)
        .context("Could not fetch mail from Gmail")?;

    for failure in &report.failures {
        warn!("Could not fetch message {}: {}", failure.id, failure.error);
    }

    let shown = select(&report.mails, "all", args.search.as_deref());
    views::print_mail_list(&shown, None, json)
}

/// Fetch and normalize a single Gmail message
fn fetch_one(id: &MessageId) -> Result<NormalizedMail> {
    let session = connect()?;
    let token = session.authorize(&[GMAIL_READONLY_SCOPE])?;
    let options = FetchOptions::load()?;

    let message = GmailClient::new(options.request_timeout())
        .get_message(token, id)
        .context("Could not fetch mail from Gmail")?;
    Ok(mail::normalize_message(message, Utc::now()))
}

/// The sample mailbox, newest first, filtered like a live listing
fn sample_list(args: &ListArgs, now: DateTime<Utc>) -> Vec<NormalizedMail> {
    let mut mails = mail::sample_mails(now);
    mail::sort_newest_first(&mut mails);
    select(&mails, &args.label, args.search.as_deref())
}

/// Apply the label filter and search query
fn select(mails: &[NormalizedMail], label: &str, search: Option<&str>) -> Vec<NormalizedMail> {
    let labelled: Vec<NormalizedMail> = mail::filter_by_label(mails, label)
        .into_iter()
        .cloned()
        .collect();
    mail::search(&labelled, search.unwrap_or_default())
        .into_iter()
        .cloned()
        .collect()
}

fn gmail_auth() -> Result<GmailAuth> {
    let creds = GmailCredentials::load().map_err(|e| {
        if let Some(path) = GmailCredentials::default_credentials_path() {
            warn!(
                "To configure Gmail access, either:\n\
                 1. Place your Google OAuth credentials at: {}\n\
                 2. Or set environment variables: GMAIL_CLIENT_ID and GMAIL_CLIENT_SECRET",
                path.display()
            );
        }
        e
    })?;
    GmailAuth::new(creds.client_id, creds.client_secret)
}

/// Sign in (interactively if needed) and return the session
fn connect() -> Result<Session> {
    let session = gmail_auth()?
        .session()
        .context("Gmail sign-in failed")?;
    info!("Gmail session ready ({} scopes granted)", session.granted_scopes().len());
    Ok(session)
}
