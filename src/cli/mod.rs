//! CLI commands module

pub mod access;
pub mod kv;
pub mod lists;
pub mod members;
pub mod raw;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use cfapi::{Client, Config, ResourceContainer};

/// cfapi - Cloudflare API client
#[derive(Parser, Debug)]
#[command(name = "cfapi")]
#[command(version)]
#[command(about = "Cloudflare REST API client", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: json, table, compact
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Account ID
    #[arg(short, long, global = true, env = "CF_ACCOUNT_ID")]
    pub account: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Custom lists and their items
    Lists(lists::ListsArgs),

    /// Zero Trust Access groups and users
    Access(access::AccessArgs),

    /// Account members and roles
    Members(members::MembersArgs),

    /// Workers KV namespaces and values
    Kv(kv::KvArgs),

    /// Raw API requests
    Raw(raw::RawArgs),
}

/// Everything a command needs to run
pub struct Context {
    pub config: Config,
    pub client: Client,
    pub cancel: CancellationToken,
    account: Option<String>,
}

impl Context {
    pub fn new(config: Config, account: Option<String>, cancel: CancellationToken) -> Result<Self> {
        let client = Client::from_config(&config).context("failed to create API client")?;
        let account = account.or_else(|| config.account_id.clone());
        Ok(Self {
            config,
            client,
            cancel,
            account,
        })
    }

    /// Account container, from `--account` or `CF_ACCOUNT_ID`.
    pub fn account(&self) -> Result<ResourceContainer> {
        let id = self
            .account
            .as_deref()
            .context("no account given; pass --account or set CF_ACCOUNT_ID")?;
        Ok(ResourceContainer::account(id))
    }
}
