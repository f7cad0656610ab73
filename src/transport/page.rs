use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::Page;

/// Listing envelope. The content key is named after the listed resource.
#[derive(Debug, Deserialize)]
struct PageEnvelope<T> {
    page: u32,
    page_size: u32,
    count: u32,
    #[serde(
        default = "Vec::new",
        alias = "batches",
        alias = "groups",
        alias = "inbounds",
        alias = "delivery_reports"
    )]
    content: Vec<T>,
}

pub fn decode_page<T: DeserializeOwned>(
    body: &[u8],
    requested_page_size: u32,
) -> Result<Page<T>, serde_json::Error> {
    let envelope = serde_json::from_slice::<PageEnvelope<T>>(body)?;
    Ok(Page::new(
        envelope.page,
        envelope.page_size,
        envelope.count,
        requested_page_size,
        envelope.content,
    ))
}
