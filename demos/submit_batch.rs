use std::io;

use xms::{Address, ConnectionBuilder, DeliveryReportType, MtBatchCreate};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sender = std::env::var("XMS_SENDER").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "XMS_SENDER environment variable is required",
        )
    })?;
    let recipients_raw = std::env::var("XMS_RECIPIENTS").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "XMS_RECIPIENTS environment variable is required (comma-separated numbers)",
        )
    })?;
    let message =
        std::env::var("XMS_MESSAGE").unwrap_or_else(|_| "Hello from the xms demo.".to_owned());

    let recipients = recipients_raw
        .split(',')
        .map(Address::new)
        .collect::<Result<Vec<_>, _>>()?;
    let batch = MtBatchCreate::text(Address::new(sender)?, message)
        .recipients(recipients)
        .delivery_report(DeliveryReportType::Summary)
        .build()?;

    let connection = ConnectionBuilder::from_env()?.build()?;
    connection.start()?;

    let dry_run = connection
        .create_batch_dry_run(&batch, Some(3), None)?
        .await?;
    println!(
        "dry run: recipients: {}, messages: {}",
        dry_run.number_of_recipients, dry_run.number_of_messages
    );

    let created = connection.create_batch(&batch, None)?.await?;
    println!(
        "batch: {}, to: {:?}, created_at: {:?}",
        created.id, created.to, created.created_at
    );

    connection.close();
    Ok(())
}
