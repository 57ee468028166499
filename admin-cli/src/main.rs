mod cli;
mod predict;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bytesize::ByteSize;
use clap::Parser;
use cli_table::{
    format::{Border, Justify, Separator},
    Cell, Table,
};
use futures_util::{stream::FuturesUnordered, StreamExt};
use url::Url;

use crate::cli::{Args, Command};

async fn predict_files(
    client: &reqwest::Client,
    endpoint: &Url,
    files: &[PathBuf],
) -> Result<()> {
    let mut outcomes = files
        .iter()
        .enumerate()
        .map(|(index, path)| async move {
            (index, predict::predict(client, endpoint, path).await)
        })
        .collect::<FuturesUnordered<_>>()
        .collect::<Vec<_>>()
        .await;
    outcomes.sort_by_key(|(index, _)| *index);

    let failures = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.result.is_err())
        .count();

    let table = outcomes
        .into_iter()
        .map(|(_, outcome)| {
            let result = match outcome.result {
                Ok(prediction) => prediction,
                Err(message) => format!("error: {message}"),
            };
            vec![
                outcome.path.display().to_string().cell(),
                ByteSize(outcome.size)
                    .to_string()
                    .cell()
                    .justify(Justify::Right),
                result.cell(),
            ]
        })
        .collect::<Vec<_>>()
        .table()
        .title(vec!["FILE".cell(), "SIZE".cell(), "PREDICTION".cell()])
        .separator(
            Separator::builder()
                .column(None)
                .row(None)
                .title(None)
                .build(),
        )
        .border(Border::builder().build());
    cli_table::print_stdout(table)?;

    if failures > 0 {
        bail!("{failures} of {} images could not be classified", files.len());
    }
    Ok(())
}

async fn health(client: &reqwest::Client, server: &Url) -> Result<()> {
    let url = server
        .join("api/health")
        .context("failed to build health check URL")?;
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("failed to reach {url}"))?;
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if !status.is_success() {
        bail!("{url} answered {status}: {body}");
    }
    println!("{url} {body}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let client = reqwest::Client::builder()
        .user_agent(format!(
            "{}/{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .context("failed to build HTTP client")?;

    match args.command {
        Command::Predict { files } => predict_files(&client, &args.endpoint, &files).await?,
        Command::Health => health(&client, &args.server).await?,
    }

    Ok(())
}
