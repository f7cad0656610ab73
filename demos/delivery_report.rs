use std::io;

use xms::{
    BatchDeliveryReportParams, BatchId, ConnectionBuilder, DeliveryReportType, KnownDeliveryStatus,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let batch_id = std::env::var("XMS_BATCH_ID").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "XMS_BATCH_ID environment variable is required",
        )
    })?;

    let connection = ConnectionBuilder::from_env()?.build()?;
    connection.start()?;

    let params = BatchDeliveryReportParams::builder()
        .report_type(DeliveryReportType::Full)
        .build()?;
    let report = connection
        .fetch_delivery_report(&BatchId::new(batch_id)?, &params, None)?
        .await?;

    println!(
        "batch: {}, messages: {}, delivered: {}",
        report.batch_id,
        report.total_message_count,
        report.count_with_status(KnownDeliveryStatus::Delivered)
    );
    for entry in &report.statuses {
        println!("  {} ({}): {} {:?}", entry.status, entry.code, entry.count, entry.recipients);
    }

    connection.close();
    Ok(())
}
