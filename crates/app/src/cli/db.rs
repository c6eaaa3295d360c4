use clap::Subcommand;
use sqlx::PgPool;

use townhall_app::database;

use super::CliError;

#[derive(Debug, Subcommand)]
pub(crate) enum DbCommand {
    /// Apply pending migrations
    Migrate,
}

impl DbCommand {
    pub(crate) async fn run(self, pool: &PgPool) -> Result<(), CliError> {
        match self {
            Self::Migrate => {
                database::migrate(pool).await?;

                println!("migrations applied");
            }
        }

        Ok(())
    }
}
