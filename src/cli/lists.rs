//! Lists command

use anyhow::Result;
use clap::{Args, Subcommand};

use cfapi::resources::lists::{ListItemValue, ListListItemsParams, ListListsParams, NewListItem};
use cfapi::OutputFormat;

use crate::cli::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct ListsArgs {
    #[command(subcommand)]
    pub command: ListsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ListsCommand {
    /// List all lists in the account
    List,

    /// Show the items of a list
    Items {
        /// List ID
        list_id: String,

        /// Only items matching this term
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Append IP addresses to a list and wait for the operation to finish
    AddIp {
        /// List ID
        list_id: String,

        /// IP addresses or CIDR ranges
        #[arg(required = true)]
        ips: Vec<String>,

        /// Comment stored with every item
        #[arg(short, long)]
        comment: Option<String>,
    },
}

pub async fn execute(ctx: &Context, args: ListsArgs) -> Result<()> {
    let rc = ctx.account()?;
    let table = ctx.config.output_format == OutputFormat::Table;

    match args.command {
        ListsCommand::List => {
            let (lists, _) = ctx
                .client
                .list_lists(&ctx.cancel, &rc, ListListsParams::default())
                .await?;

            if table {
                output::table_header(&["NAME", "KIND", "ITEMS", "ID"]);
                for list in &lists {
                    output::print_list(list);
                }
                output::info(&format!("Total: {} lists", lists.len()));
            } else {
                output::print_output(&lists, &ctx.config.output_format)?;
            }
        }

        ListsCommand::Items { list_id, search } => {
            let params = ListListItemsParams {
                search,
                ..ListListItemsParams::new(list_id)
            };
            let items = ctx.client.list_list_items(&ctx.cancel, &rc, params).await?;

            if table {
                output::table_header(&["KIND", "VALUE", "COMMENT", "ID"]);
                for item in &items {
                    output::print_list_item(item);
                }
                output::info(&format!("Total: {} items", items.len()));
            } else {
                output::print_output(&items, &ctx.config.output_format)?;
            }
        }

        ListsCommand::AddIp {
            list_id,
            ips,
            comment,
        } => {
            let count = ips.len();
            let items: Vec<NewListItem> = ips
                .into_iter()
                .map(|ip| {
                    let item = NewListItem::new(ListItemValue::Ip(ip));
                    match &comment {
                        Some(comment) => item.with_comment(comment.as_str()),
                        None => item,
                    }
                })
                .collect();

            let items = ctx
                .client
                .create_list_items(&ctx.cancel, &rc, &list_id, &items)
                .await?;
            output::success(&format!(
                "Added {} addresses, list now holds {} items",
                count,
                items.len()
            ));
        }
    }

    Ok(())
}
