//! Raw API command

use anyhow::{bail, Result};
use clap::Args;
use reqwest::Method;
use serde_json::Value;

use crate::cli::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct RawArgs {
    /// API path (e.g., /accounts/:account_id/rules/lists)
    pub path: String,

    /// HTTP method
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Request body (JSON)
    #[arg(short, long)]
    pub body: Option<String>,
}

pub async fn execute(ctx: &Context, args: RawArgs) -> Result<()> {
    // Replace :account_id / :zone_id placeholders from the configuration
    let mut path = args.path.clone();
    if path.contains(":account_id") || path.contains("{account_id}") {
        let account = ctx.account()?;
        path = path
            .replace(":account_id", &account.identifier)
            .replace("{account_id}", &account.identifier);
    }
    if path.contains(":zone_id") || path.contains("{zone_id}") {
        let Some(zone_id) = ctx.config.zone_id.as_deref() else {
            bail!("path needs a zone; set CF_ZONE_ID");
        };
        path = path.replace(":zone_id", zone_id).replace("{zone_id}", zone_id);
    }

    let method = match args.method.to_uppercase().as_str() {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "PATCH" => Method::PATCH,
        "DELETE" => Method::DELETE,
        other => bail!("Unsupported HTTP method: {}", other),
    };

    let body: Option<Value> = args
        .body
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;

    let response = ctx.client.raw(&ctx.cancel, method, &path, body).await?;
    output::print_output(&response, &ctx.config.output_format)?;

    Ok(())
}
