//! `townhall-app` command line: migrations, admin accounts and API tokens.

use clap::{Parser, Subcommand};
use thiserror::Error;

use townhall_app::{
    auth::{AuthServiceError, PgAuthService},
    database::{self, DatabaseError},
};

mod admin;
mod db;
mod token;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] DatabaseError),

    #[error("failed to apply migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("{action}: {source}")]
    Auth {
        action: &'static str,
        #[source]
        source: AuthServiceError,
    },

    #[error("{0}")]
    Invalid(&'static str),
}

impl CliError {
    fn auth(action: &'static str) -> impl FnOnce(AuthServiceError) -> Self {
        move |source| Self::Auth { action, source }
    }
}

#[derive(Debug, Parser)]
#[command(name = "townhall-app", about = "Townhall admin CLI", long_about = None)]
pub(crate) struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage admin console users
    #[command(subcommand)]
    Admin(admin::AdminCommand),

    /// Issue, list and revoke admin API tokens
    #[command(subcommand)]
    Token(token::TokenCommand),

    /// Database maintenance
    #[command(subcommand)]
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), CliError> {
        let pool = database::connect(&self.database_url)
            .await
            .map_err(CliError::Connect)?;

        match self.command {
            Commands::Db(command) => command.run(&pool).await,
            Commands::Admin(command) => command.run(&PgAuthService::new(pool)).await,
            Commands::Token(command) => command.run(&PgAuthService::new(pool)).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    const DB: [&str; 3] = ["townhall-app", "--database-url", "postgres://localhost/townhall"];

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(DB.iter().chain(args))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn admin_create_parses_role() {
        let cli = parse(&[
            "admin",
            "create",
            "--email",
            "ops@townhall.test",
            "--role",
            "super-admin",
        ]);

        assert!(cli.is_ok(), "expected admin create to parse: {cli:?}");
    }

    #[test]
    fn admin_create_rejects_unknown_role() {
        let cli = parse(&["admin", "create", "--email", "ops@townhall.test", "--role", "janitor"]);

        assert!(cli.is_err(), "unknown role should be rejected");
    }

    #[test]
    fn token_commands_require_uuids() {
        let nil = uuid::Uuid::nil().to_string();

        assert!(parse(&["token", "create", "--admin-uuid", "nope"]).is_err());
        assert!(parse(&["token", "revoke", "--token-uuid", &nil]).is_ok());
    }
}
