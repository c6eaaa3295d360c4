use clap::Subcommand;

use townhall_app::auth::{NewAdmin, PgAuthService, Role};

use super::CliError;

#[derive(Debug, Subcommand)]
pub(crate) enum AdminCommand {
    /// Register an admin console user
    Create {
        #[arg(long)]
        email: String,

        /// One of `super-admin`, `admin`, `support`
        #[arg(long)]
        role: Role,
    },
}

impl AdminCommand {
    pub(crate) async fn run(self, auth: &PgAuthService) -> Result<(), CliError> {
        match self {
            Self::Create { email, role } => {
                let email = email.trim().to_string();

                if email.is_empty() {
                    return Err(CliError::Invalid("email cannot be empty"));
                }

                let admin = auth
                    .create_admin(NewAdmin { email, role })
                    .await
                    .map_err(CliError::auth("failed to create admin"))?;

                println!("{} {} {}", admin.uuid, admin.email, admin.role);
            }
        }

        Ok(())
    }
}
