use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// bichon-admin: administration console for a Bichon mail archive server
#[derive(Parser)]
#[command(name = "bichon-admin", version, about)]
pub struct Cli {
    /// Server base URL (overrides BICHON_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in as root and remember the session token
    Login {
        /// Password (prompted for on stdin when omitted)
        #[arg(long, env = "BICHON_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Manage access tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Manage OAuth2 applications
    Oauth2 {
        #[command(subcommand)]
        command: OAuth2Commands,
    },

    /// Delete archived messages
    Messages {
        #[command(subcommand)]
        command: MessageCommands,
    },

    /// List mail accounts
    Accounts,

    /// List configured proxies
    Proxies,

    /// Root credentials
    Root {
        #[command(subcommand)]
        command: RootCommands,
    },
}

#[derive(Args, Clone, Default)]
pub struct AclArgs {
    /// Allowed client addresses, comma or newline separated
    #[arg(long)]
    pub ip_whitelist: Option<String>,
    /// Requests allowed per interval
    #[arg(long, allow_negative_numbers = true)]
    pub quota: Option<i64>,
    /// Rate-limit interval in seconds
    #[arg(long, allow_negative_numbers = true)]
    pub interval: Option<i64>,
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// List access tokens
    List,
    /// Create an access token
    Create {
        /// Account ids the token may read
        #[arg(long, value_delimiter = ',')]
        accounts: Vec<u64>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        acl: AclArgs,
    },
    /// Update an access token; omitted options keep their current value
    Update {
        token: String,
        #[arg(long, value_delimiter = ',')]
        accounts: Option<Vec<u64>>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        acl: AclArgs,
        /// Drop the token's access-control settings entirely
        #[arg(long, conflicts_with_all = ["ip_whitelist", "quota", "interval"])]
        clear_acl: bool,
    },
    /// Delete an access token
    Delete {
        token: String,
        /// Must repeat the token
        #[arg(long)]
        confirm: String,
    },
}

#[derive(Args, Clone, Default)]
pub struct OAuth2Args {
    /// Fill provider endpoints and scopes: google or microsoft
    #[arg(long)]
    pub preset: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub client_id: Option<String>,
    #[arg(long, env = "BICHON_OAUTH2_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
    #[arg(long)]
    pub auth_url: Option<String>,
    #[arg(long)]
    pub token_url: Option<String>,
    #[arg(long)]
    pub redirect_uri: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub scopes: Option<Vec<String>>,
    /// Extra authorization parameter as key=value; repeatable
    #[arg(long = "param")]
    pub params: Vec<String>,
    #[arg(long)]
    pub use_proxy: Option<u64>,
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Subcommand)]
pub enum OAuth2Commands {
    /// List OAuth2 applications
    List,
    /// Register an OAuth2 application
    Create {
        #[command(flatten)]
        args: OAuth2Args,
    },
    /// Update an OAuth2 application
    Update {
        id: u64,
        #[command(flatten)]
        args: OAuth2Args,
    },
    /// Enable an OAuth2 application
    Enable { id: u64 },
    /// Disable an OAuth2 application
    Disable { id: u64 },
    /// Delete an OAuth2 application
    Delete {
        id: u64,
        /// Must repeat the id
        #[arg(long)]
        confirm: String,
    },
    /// Print the provider URL that authorizes an account
    Authorize {
        id: u64,
        #[arg(long)]
        account: Option<u64>,
    },
    /// Interpret the query string of the OAuth2 redirect page
    Result { query: String },
}

#[derive(Subcommand)]
pub enum MessageCommands {
    /// Delete messages of one account
    Delete {
        #[arg(long)]
        account: Option<u64>,
        #[arg(long, value_delimiter = ',')]
        ids: Vec<u64>,
    },
    /// Delete search results across accounts (ACCOUNT:ID,ID,...; repeatable)
    SearchDelete {
        #[arg(long = "select", value_parser = parse_selection)]
        selections: Vec<(u64, Vec<u64>)>,
    },
}

#[derive(Subcommand)]
pub enum RootCommands {
    /// Issue a new root token and switch the session to it
    ResetToken {
        /// Also write the new token to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Set a new root password (signs out)
    ResetPassword {
        #[arg(long, env = "BICHON_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

fn parse_selection(raw: &str) -> Result<(u64, Vec<u64>), String> {
    let (account, ids) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected ACCOUNT:ID,ID,... but got '{}'", raw))?;
    let account = account
        .trim()
        .parse()
        .map_err(|_| format!("invalid account id '{}'", account))?;
    let ids = ids
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|_| format!("invalid message id '{}'", s)))
        .collect::<Result<Vec<u64>, String>>()?;
    Ok((account, ids))
}
