use futures::TryStreamExt;
use xms::{BatchFilter, ConnectionBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut filter = BatchFilter::builder().page_size(20);
    if let Ok(tag) = std::env::var("XMS_TAG") {
        filter = filter.tag(tag);
    }

    let connection = ConnectionBuilder::from_env()?.build()?;
    connection.start()?;

    let mut pages = connection.fetch_batches(filter.build()?).pages();
    while let Some(page) = pages.try_next().await? {
        println!(
            "page {} of {} ({} batches in total)",
            page.page + 1,
            page.num_pages,
            page.total_size
        );
        for batch in page.iter() {
            println!("  {} to {} recipients, canceled: {}", batch.id, batch.to.len(), batch.canceled);
        }
    }

    connection.close();
    Ok(())
}
