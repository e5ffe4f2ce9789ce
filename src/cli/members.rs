//! Account members command

use anyhow::Result;
use clap::{Args, Subcommand};

use cfapi::resources::account_members::ListAccountMembersParams;
use cfapi::PaginationOptions;

use crate::cli::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct MembersArgs {
    #[command(subcommand)]
    pub command: MembersCommand,
}

#[derive(Subcommand, Debug)]
pub enum MembersCommand {
    /// List members of the account
    List {
        /// Filter by status (accepted, pending, rejected)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// List roles that can be granted
    Roles,
}

pub async fn execute(ctx: &Context, args: MembersArgs) -> Result<()> {
    let rc = ctx.account()?;

    match args.command {
        MembersCommand::List { status } => {
            let params = ListAccountMembersParams {
                status,
                ..Default::default()
            };
            let (members, _) = ctx
                .client
                .list_account_members(&ctx.cancel, &rc, params)
                .await?;
            output::print_output(&members, &ctx.config.output_format)?;
            output::info(&format!("Total: {} members", members.len()));
        }

        MembersCommand::Roles => {
            let (roles, _) = ctx
                .client
                .list_account_roles(&ctx.cancel, &rc, PaginationOptions::default())
                .await?;
            output::print_output(&roles, &ctx.config.output_format)?;
        }
    }

    Ok(())
}
