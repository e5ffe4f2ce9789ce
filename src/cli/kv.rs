//! Workers KV command

use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};

use cfapi::resources::workers_kv::{ListWorkersKvKeysParams, ListWorkersKvNamespacesParams};

use crate::cli::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct KvArgs {
    #[command(subcommand)]
    pub command: KvCommand,
}

#[derive(Subcommand, Debug)]
pub enum KvCommand {
    /// List namespaces
    Namespaces,

    /// List keys in a namespace
    Keys {
        /// Namespace ID
        namespace_id: String,

        /// Only keys starting with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Print a value to stdout
    Get {
        /// Namespace ID
        namespace_id: String,

        /// Key name
        key: String,
    },

    /// Write a value
    Put {
        /// Namespace ID
        namespace_id: String,

        /// Key name
        key: String,

        /// Value to store
        value: String,
    },
}

pub async fn execute(ctx: &Context, args: KvArgs) -> Result<()> {
    let rc = ctx.account()?;

    match args.command {
        KvCommand::Namespaces => {
            let (namespaces, _) = ctx
                .client
                .list_workers_kv_namespaces(&ctx.cancel, &rc, ListWorkersKvNamespacesParams::default())
                .await?;
            output::print_output(&namespaces, &ctx.config.output_format)?;
        }

        KvCommand::Keys {
            namespace_id,
            prefix,
        } => {
            let params = ListWorkersKvKeysParams {
                namespace_id,
                prefix,
                ..Default::default()
            };
            let keys = ctx
                .client
                .list_workers_kv_keys(&ctx.cancel, &rc, params)
                .await?;
            output::print_output(&keys, &ctx.config.output_format)?;
            output::info(&format!("Total: {} keys", keys.len()));
        }

        KvCommand::Get { namespace_id, key } => {
            let value = ctx
                .client
                .read_workers_kv_value(&ctx.cancel, &rc, &namespace_id, &key)
                .await?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&value)?;
            stdout.flush()?;
        }

        KvCommand::Put {
            namespace_id,
            key,
            value,
        } => {
            ctx.client
                .write_workers_kv_value(&ctx.cancel, &rc, &namespace_id, &key, value.as_bytes())
                .await?;
            output::success(&format!("Wrote {}", key));
        }
    }

    Ok(())
}
