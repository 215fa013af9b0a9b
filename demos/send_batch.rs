use std::io;
use std::sync::Arc;

use smsbatch::{
    Batch, BatchDispatcher, Credentials, DEFAULT_SUMMARY_GRACE, DispatchConfig, DispatchContext,
    HttpProvider, MessageBody, Summary, parse_phone_numbers,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let account_sid = std::env::var("SMSBATCH_ACCOUNT_SID").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSBATCH_ACCOUNT_SID environment variable is required",
        )
    })?;
    let auth_token = std::env::var("SMSBATCH_AUTH_TOKEN").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSBATCH_AUTH_TOKEN environment variable is required",
        )
    })?;
    let numbers_raw = std::env::var("SMSBATCH_NUMBERS").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSBATCH_NUMBERS environment variable is required (newline-separated numbers)",
        )
    })?;
    let message = std::env::var("SMSBATCH_MESSAGE")
        .unwrap_or_else(|_| "Hello from the smsbatch example.".to_owned());

    let config = DispatchConfig::default();
    let numbers = parse_phone_numbers(
        &numbers_raw,
        &config.country_prefix,
        config.max_numbers_per_batch,
    );
    let batch = Batch::new(numbers, config.max_numbers_per_batch)?;
    let body = MessageBody::new(message)?;

    let provider = Arc::new(HttpProvider::new(Credentials::new(account_sid, auth_token)?)?);
    let dispatcher = BatchDispatcher::new(
        provider.clone(),
        provider,
        config,
        DispatchContext::new("send_batch example"),
    );

    dispatcher
        .dispatch(&batch, &body, |segments| {
            eprintln!("message uses {segments} segments, continuing");
            true
        })
        .await?;

    let summary = Summary::settle(&dispatcher.ledger(), DEFAULT_SUMMARY_GRACE).await;
    println!(
        "delivered: {}, failed: {}, pending: {}",
        summary.delivered, summary.failed, summary.pending
    );

    for row in dispatcher.ledger().snapshot() {
        println!(
            "{} -> {} ({})",
            row.number,
            row.outcome.label(),
            row.final_status
                .as_ref()
                .map(|status| status.describe())
                .unwrap_or("no status observed yet"),
        );
    }

    Ok(())
}
