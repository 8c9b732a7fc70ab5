//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::providers::ProviderKind;

/// Manage member connections to social providers
#[derive(Parser, Debug)]
#[command(name = "account-connect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Provider the command applies to
    #[arg(short, long, global = true, default_value = "twitter", value_parser = parse_provider)]
    pub provider: ProviderKind,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or upgrade the database schema
    Migrate,

    /// Connect an account to the provider
    Connect {
        account_id: i64,
        provider_account_id: String,
        /// Access token issued by the provider
        #[arg(long, env = "PROVIDER_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,
        /// OAuth 1.0a token secret
        #[arg(long, env = "PROVIDER_TOKEN_SECRET", hide_env_values = true)]
        secret: Option<String>,
        #[arg(long)]
        profile_url: Option<String>,
    },

    /// Show whether an account is connected and as whom
    Status { account_id: i64 },

    /// Find the account behind a provider account id
    Lookup { provider_account_id: String },

    /// Find the accounts behind a list of provider account ids
    Friends {
        #[arg(required = true)]
        provider_account_ids: Vec<String>,
    },

    /// List an account's connections across all providers
    Connections { account_id: i64 },

    /// Remove an account's connection
    Disconnect { account_id: i64 },
}

fn parse_provider(s: &str) -> Result<ProviderKind, String> {
    s.parse().map_err(|e: crate::ConnectError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_with_default_provider() {
        let cli = Cli::try_parse_from(["account-connect", "status", "1"]).unwrap();
        assert_eq!(cli.provider, ProviderKind::Twitter);
        assert!(matches!(cli.command, Commands::Status { account_id: 1 }));
    }

    #[test]
    fn parses_friends_with_explicit_provider() {
        let cli = Cli::try_parse_from([
            "account-connect",
            "--provider",
            "facebook",
            "friends",
            "habuma",
            "rclarkson",
        ])
        .unwrap();
        assert_eq!(cli.provider, ProviderKind::Facebook);
        match cli.command {
            Commands::Friends {
                provider_account_ids,
            } => assert_eq!(provider_account_ids, vec!["habuma", "rclarkson"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_provider() {
        assert!(Cli::try_parse_from(["account-connect", "-p", "myspace", "status", "1"]).is_err());
    }
}
