//! Zero Trust Access command

use anyhow::Result;
use clap::{Args, Subcommand};

use cfapi::resources::access_groups::ListAccessGroupsParams;
use cfapi::resources::access_users::ListAccessUsersParams;
use cfapi::ResourceContainer;

use crate::cli::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct AccessArgs {
    /// Zone ID; groups are read from the zone instead of the account
    #[arg(short, long)]
    pub zone: Option<String>,

    #[command(subcommand)]
    pub command: AccessCommand,
}

#[derive(Subcommand, Debug)]
pub enum AccessCommand {
    /// List Access groups
    Groups {
        /// Filter by name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List users of the organization
    Users {
        /// Filter by email
        #[arg(short, long)]
        email: Option<String>,
    },
}

pub async fn execute(ctx: &Context, args: AccessArgs) -> Result<()> {
    let rc = match args.zone {
        Some(zone) => ResourceContainer::zone(zone),
        None => ctx.account()?,
    };

    match args.command {
        AccessCommand::Groups { name } => {
            let params = ListAccessGroupsParams {
                name,
                ..Default::default()
            };
            let (groups, info) = ctx
                .client
                .list_access_groups(&ctx.cancel, &rc, params)
                .await?;
            output::print_output(&groups, &ctx.config.output_format)?;
            output::info(&format!("Total: {} groups ({} reported)", groups.len(), info.total));
        }

        AccessCommand::Users { email } => {
            let params = ListAccessUsersParams {
                email,
                ..Default::default()
            };
            let (users, _) = ctx
                .client
                .list_access_users(&ctx.cancel, &rc, params)
                .await?;
            output::print_output(&users, &ctx.config.output_format)?;
            output::info(&format!("Total: {} users", users.len()));
        }
    }

    Ok(())
}
