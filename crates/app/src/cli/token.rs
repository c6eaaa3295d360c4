use std::fmt::Display;

use clap::Subcommand;
use uuid::Uuid;

use townhall_app::auth::{AdminUuid, ApiTokenMetadata, PgAuthService};

use super::CliError;

#[derive(Debug, Subcommand)]
pub(crate) enum TokenCommand {
    /// Issue a token. The raw token is printed once and never stored.
    Create {
        #[arg(long)]
        admin_uuid: Uuid,
    },

    /// List an admin's tokens, revoked ones included
    List {
        #[arg(long)]
        admin_uuid: Uuid,
    },

    /// Revoke a token so it no longer authenticates
    Revoke {
        #[arg(long)]
        token_uuid: Uuid,
    },
}

fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

fn describe(token: &ApiTokenMetadata) -> String {
    format!(
        "{}  created {}  last used {}  revoked {}",
        token.uuid,
        token.created_at,
        or_dash(token.last_used_at),
        or_dash(token.revoked_at),
    )
}

impl TokenCommand {
    pub(crate) async fn run(self, auth: &PgAuthService) -> Result<(), CliError> {
        match self {
            Self::Create { admin_uuid } => {
                let issued = auth
                    .issue_api_token(AdminUuid::from_uuid(admin_uuid))
                    .await
                    .map_err(CliError::auth("failed to create token"))?;

                println!("{}", describe(&issued.metadata));
                println!("{}", issued.token);
                eprintln!("store this token now; it is only shown once");
            }
            Self::List { admin_uuid } => {
                let tokens = auth
                    .list_api_tokens(AdminUuid::from_uuid(admin_uuid))
                    .await
                    .map_err(CliError::auth("failed to list tokens"))?;

                if tokens.is_empty() {
                    eprintln!("no tokens for admin {admin_uuid}");
                }

                for token in &tokens {
                    println!("{}", describe(token));
                }
            }
            Self::Revoke { token_uuid } => {
                let revoked = auth
                    .revoke_api_token(token_uuid)
                    .await
                    .map_err(CliError::auth("failed to revoke token"))?;

                if revoked {
                    println!("revoked {token_uuid}");
                } else {
                    eprintln!("token {token_uuid} was not active");
                }
            }
        }

        Ok(())
    }
}
