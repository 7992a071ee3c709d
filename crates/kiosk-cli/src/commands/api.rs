use anyhow::{Result, bail};
use colored::Colorize;

use crate::context::AppContext;

pub async fn check(ctx: &AppContext) -> Result<()> {
    let client = ctx.completion_client()?;
    let model = client.current_model();

    if client.check_connection().await {
        println!(
            "{}",
            format!("API connection OK ({}, model {})", ctx.config.api.base_url, model).green()
        );
        Ok(())
    } else {
        bail!("API connection failed ({}); check the API key and base URL", ctx.config.api.base_url)
    }
}
