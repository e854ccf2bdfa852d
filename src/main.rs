use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

use bichon_admin::api::ApiClient;
use bichon_admin::cache::QueryCache;
use bichon_admin::config;
use bichon_admin::console::mailbox::{MailboxDeleteDialog, SearchDeleteDialog};
use bichon_admin::console::oauth2::{
    AuthorizeDialog, CallbackOutcome, EnableToggle, OAuth2DeleteDialog, OAuth2Dialog,
};
use bichon_admin::console::root::{RootAccess, SignIn};
use bichon_admin::console::tokens::{TokenDeleteDialog, TokenDialog, TokenSaved};
use bichon_admin::console::Console;
use bichon_admin::errors::ConsoleError;
use bichon_admin::forms::access_control::AccessControlInput;
use bichon_admin::forms::oauth2::{OAuth2FormInput, OAuth2Preset, ParamInput};
use bichon_admin::forms::token::TokenFormInput;
use bichon_admin::i18n::Strings;
use bichon_admin::notification::TerminalNotifier;
use bichon_admin::session::{Session, SessionFile};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "bichon_admin=info".into()),
    );
    let fmt = tracing_subscriber::fmt::layer().with_writer(io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    if cfg.log_json {
        registry.with(fmt.json()).init();
    } else {
        registry.with(fmt).init();
    }
    let args = cli::Cli::parse();

    let notifier = TerminalNotifier::new();
    let result = run(cfg, args, notifier.clone()).await;
    if let Err(ref e) = result {
        for line in error_lines(e, notifier.failures_shown() > 0) {
            eprintln!("{}", line);
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cfg: config::Config, args: cli::Cli, notifier: TerminalNotifier) -> anyhow::Result<()> {
    let strings = match &cfg.strings_file {
        Some(path) => Strings::load(path)?,
        None => Strings::default(),
    };
    let session_file = SessionFile::new(cfg.session_file.clone());
    let session = match &cfg.token {
        Some(token) => Session::with_token(token.as_str()),
        None => match session_file.load()? {
            Some(token) => Session::with_token(token.as_str()),
            None => Session::new(),
        },
    };

    let url = args.url.clone().unwrap_or_else(|| cfg.server_url.clone());
    let api = ApiClient::new(&url, cfg.timeout, session)?;
    tracing::debug!(server = %api.base_url(), "using server");
    let console = Console::new(
        api,
        QueryCache::new(cfg.cache_ttl),
        strings,
        Arc::new(notifier),
    );

    match args.command {
        cli::Commands::Login { password } => {
            let password = Zeroizing::new(match password {
                Some(p) => p,
                None => prompt("Password: ")?,
            });
            SignIn::new(&console).sign_in(&password).await?;
            session_file.sync(console.session())?;
            println!("Signed in to {}", console.api.base_url());
            Ok(())
        }
        cli::Commands::Logout => {
            console.session().clear();
            session_file.remove()?;
            println!("Signed out.");
            Ok(())
        }
        cli::Commands::Token { command } => handle_token_command(&console, command).await,
        cli::Commands::Oauth2 { command } => handle_oauth2_command(&console, command).await,
        cli::Commands::Messages { command } => handle_message_command(&console, command).await,
        cli::Commands::Accounts => {
            let accounts = console.minimal_accounts().await?;
            if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                println!("{:<10} EMAIL", "ID");
                for a in accounts {
                    println!("{:<10} {}", a.id, a.email);
                }
            }
            Ok(())
        }
        cli::Commands::Proxies => {
            let proxies = console.proxies().await?;
            if proxies.is_empty() {
                println!("No proxies found.");
            } else {
                println!("{:<10} URL", "ID");
                for p in proxies {
                    println!("{:<10} {}", p.id, p.url);
                }
            }
            Ok(())
        }
        cli::Commands::Root { command } => {
            handle_root_command(&console, &session_file, command).await
        }
    }
}

async fn handle_token_command(console: &Console, cmd: cli::TokenCommands) -> anyhow::Result<()> {
    match cmd {
        cli::TokenCommands::List => {
            let tokens = console.access_tokens().await?;
            if tokens.is_empty() {
                println!("No access tokens found.");
                return Ok(());
            }
            println!(
                "{:<36} {:<20} {:<12} {:<20} DESCRIPTION",
                "TOKEN", "ACCOUNTS", "RATE LIMIT", "LAST ACCESS"
            );
            for t in tokens {
                let accounts = t
                    .account_ids()
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                let rate = t
                    .acl
                    .as_ref()
                    .and_then(|acl| acl.rate_limit.as_ref())
                    .map(|rl| {
                        format!(
                            "{}/{}s",
                            rl.quota.map(|q| q.to_string()).unwrap_or_else(|| "-".into()),
                            rl.interval.map(|i| i.to_string()).unwrap_or_else(|| "-".into())
                        )
                    })
                    .unwrap_or_else(|| "-".into());
                let last_access = t
                    .last_access()
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".into());
                println!(
                    "{:<36} {:<20} {:<12} {:<20} {}",
                    t.token,
                    accounts,
                    rate,
                    last_access,
                    t.description.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        cli::TokenCommands::Create {
            accounts,
            description,
            acl,
        } => {
            let input = TokenFormInput {
                accounts,
                description,
                acl: merge_acl(None, &acl),
            };
            match TokenDialog::create(console).submit(&input).await? {
                TokenSaved::Created(token) => println!("Token: {}", token),
                TokenSaved::Updated => {}
            }
            Ok(())
        }
        cli::TokenCommands::Update {
            token,
            accounts,
            description,
            acl,
            clear_acl,
        } => {
            let current = console
                .find_access_token(&token)
                .await?
                .ok_or_else(|| anyhow::anyhow!("access token '{}' not found", token))?;
            let dialog = TokenDialog::edit(console, current);
            let mut input = dialog.initial_input();
            if let Some(accounts) = accounts {
                input.accounts = accounts;
            }
            if description.is_some() {
                input.description = description;
            }
            input.acl = if clear_acl {
                None
            } else {
                merge_acl(input.acl.take(), &acl)
            };
            dialog.submit(&input).await?;
            Ok(())
        }
        cli::TokenCommands::Delete { token, confirm } => {
            TokenDeleteDialog::new(console, token).confirm(&confirm).await?;
            Ok(())
        }
    }
}

/// Overlay command-line ACL options on the current (or empty) settings.
fn merge_acl(current: Option<AccessControlInput>, args: &cli::AclArgs) -> Option<AccessControlInput> {
    let mut acl = current.unwrap_or_default();
    if let Some(ips) = &args.ip_whitelist {
        acl.ip_whitelist = Some(ips.replace(',', "\n"));
    }
    if args.quota.is_some() || args.interval.is_some() {
        let mut rl = acl.rate_limit.unwrap_or_default();
        if args.quota.is_some() {
            rl.quota = args.quota;
        }
        if args.interval.is_some() {
            rl.interval = args.interval;
        }
        acl.rate_limit = Some(rl);
    }
    Some(acl)
}

async fn handle_oauth2_command(console: &Console, cmd: cli::OAuth2Commands) -> anyhow::Result<()> {
    match cmd {
        cli::OAuth2Commands::List => {
            let entities = console.oauth2_list().await?;
            if entities.is_empty() {
                println!("No OAuth2 applications found.");
                return Ok(());
            }
            println!("{:<8} {:<40} {:<8} DESCRIPTION", "ID", "CLIENT ID", "ENABLED");
            for e in entities {
                println!(
                    "{:<8} {:<40} {:<8} {}",
                    e.id,
                    e.client_id,
                    e.enabled,
                    e.description.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        cli::OAuth2Commands::Create { args } => {
            let dialog = OAuth2Dialog::create(console);
            let mut input = dialog.initial_input();
            apply_oauth2_args(&mut input, args)?;
            dialog.submit(&input).await?;
            Ok(())
        }
        cli::OAuth2Commands::Update { id, args } => {
            let entity = find_oauth2(console, id).await?;
            let dialog = OAuth2Dialog::edit(console, entity);
            let mut input = dialog.initial_input();
            apply_oauth2_args(&mut input, args)?;
            dialog.submit(&input).await?;
            Ok(())
        }
        cli::OAuth2Commands::Enable { id } => set_enabled(console, id, true).await,
        cli::OAuth2Commands::Disable { id } => set_enabled(console, id, false).await,
        cli::OAuth2Commands::Delete { id, confirm } => {
            OAuth2DeleteDialog::new(console, id).confirm(&confirm).await?;
            Ok(())
        }
        cli::OAuth2Commands::Authorize { id, account } => {
            let url = AuthorizeDialog::new(console, id).authorize(account).await?;
            println!("{}", url);
            Ok(())
        }
        cli::OAuth2Commands::Result { query } => {
            // Accept either the full redirect URL or just its query string.
            let query = url::Url::parse(&query)
                .ok()
                .and_then(|u| u.query().map(String::from))
                .unwrap_or(query);
            let outcome = CallbackOutcome::from_query(&query, &console.strings);
            console.notify(outcome.notice(&console.strings));
            match outcome {
                CallbackOutcome::Succeeded => Ok(()),
                _ => anyhow::bail!("authorization did not succeed"),
            }
        }
    }
}

async fn find_oauth2(console: &Console, id: u64) -> anyhow::Result<bichon_admin::models::oauth2::OAuth2Entity> {
    console
        .find_oauth2(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("OAuth2 application {} not found", id))
}

async fn set_enabled(console: &Console, id: u64, enabled: bool) -> anyhow::Result<()> {
    let entity = find_oauth2(console, id).await?;
    if entity.enabled == enabled {
        println!(
            "OAuth2 application {} is already {}.",
            id,
            if enabled { "enabled" } else { "disabled" }
        );
        return Ok(());
    }
    EnableToggle::new(console).toggle(&entity).await?;
    Ok(())
}

fn apply_oauth2_args(input: &mut OAuth2FormInput, args: cli::OAuth2Args) -> anyhow::Result<()> {
    if let Some(preset) = args.preset {
        let preset: OAuth2Preset = preset.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        input.apply_preset(preset);
    }
    if args.description.is_some() {
        input.description = args.description;
    }
    if let Some(v) = args.client_id {
        input.client_id = v;
    }
    if args.client_secret.is_some() {
        input.client_secret = args.client_secret;
    }
    if let Some(v) = args.auth_url {
        input.auth_url = v;
    }
    if let Some(v) = args.token_url {
        input.token_url = v;
    }
    if let Some(v) = args.redirect_uri {
        input.redirect_uri = v;
    }
    if args.scopes.is_some() {
        input.scopes = args.scopes;
    }
    if !args.params.is_empty() {
        let params = args
            .params
            .iter()
            .map(|raw| {
                let (key, value) = raw.split_once('=').unwrap_or((raw.as_str(), ""));
                ParamInput {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            })
            .collect();
        input.extra_params = Some(params);
    }
    if args.use_proxy.is_some() {
        input.use_proxy = args.use_proxy;
    }
    if args.disabled {
        input.enabled = false;
    }
    Ok(())
}

async fn handle_message_command(console: &Console, cmd: cli::MessageCommands) -> anyhow::Result<()> {
    match cmd {
        cli::MessageCommands::Delete { account, ids } => {
            let mut dialog = MailboxDeleteDialog::new(console, account);
            dialog.select(ids);
            dialog.confirm().await?;
            Ok(())
        }
        cli::MessageCommands::SearchDelete { selections } => {
            let mut dialog = SearchDeleteDialog::new(console);
            for (account, ids) in selections {
                dialog.select(account, ids);
            }
            dialog.confirm().await?;
            Ok(())
        }
    }
}

async fn handle_root_command(
    console: &Console,
    session_file: &SessionFile,
    cmd: cli::RootCommands,
) -> anyhow::Result<()> {
    let access = RootAccess::new(console);
    match cmd {
        cli::RootCommands::ResetToken { export } => {
            let token = access.reset_token(export.as_deref()).await?;
            session_file.sync(console.session())?;
            println!("Root token: {}", token);
            Ok(())
        }
        cli::RootCommands::ResetPassword { password } => {
            let password = Zeroizing::new(match password {
                Some(p) => p,
                None => prompt("New root password: ")?,
            });
            access.reset_password(&password).await?;
            session_file.sync(console.session())?;
            Ok(())
        }
    }
}

fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// What to print for an error that ended the command. A request failure
/// the console already printed as a notice is not repeated.
fn error_lines(e: &anyhow::Error, notified: bool) -> Vec<String> {
    const LOGIN_HINT: &str = "Sign in with `bichon-admin login` or set BICHON_TOKEN.";
    match e.downcast_ref::<ConsoleError>() {
        Some(ConsoleError::Validation(errors)) => std::iter::once("Error: invalid input".to_string())
            .chain(errors.iter().map(|f| format!("  {}: {}", f.path, f.message)))
            .collect(),
        Some(ConsoleError::ConfirmationMismatch) => {
            vec!["Error: the confirmation does not match; nothing was deleted".to_string()]
        }
        Some(err) if err.is_unauthorized() => {
            let mut lines = Vec::new();
            if !notified {
                lines.push(format!("Error: {}", err.user_message("unauthorized")));
            }
            lines.push(LOGIN_HINT.to_string());
            lines
        }
        Some(_) if notified => Vec::new(),
        Some(err) => vec![format!("Error: {}", err.user_message("request failed"))],
        None => vec![format!("Error: {:?}", e)],
    }
}
