use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;

use crate::client::Connection;
use crate::client::error::{XmsError, XmsResult};
use crate::client::future::{CallbackRef, XmsFuture};
use crate::domain::{
    BatchFilter, DeliveryReportFilter, GroupFilter, GroupResult, InboundFilter, MoSms,
    MtBatchResult, Page, RecipientDeliveryReport,
};
use crate::transport::{
    encode_batch_filter, encode_delivery_report_filter, encode_group_filter,
    encode_inbound_filter, render_query,
};

/// A listing filter: names the listed resource and renders itself as query
/// parameters for a given page.
pub trait PageFilter: Clone + Send + Sync + 'static {
    type Item: DeserializeOwned + Send + 'static;

    /// Path segment of the listed resource, e.g. `batches`.
    fn resource(&self) -> &'static str;

    fn page_size(&self) -> Option<u32>;

    /// Ordered query parameters for `page`.
    fn query_params(&self, page: u32) -> Vec<(String, String)>;

    /// [`query_params`](Self::query_params) rendered as an encoded query string.
    fn query_string(&self, page: u32) -> String {
        render_query(&self.query_params(page))
    }
}

impl PageFilter for BatchFilter {
    type Item = MtBatchResult;

    fn resource(&self) -> &'static str {
        "batches"
    }

    fn page_size(&self) -> Option<u32> {
        BatchFilter::page_size(self)
    }

    fn query_params(&self, page: u32) -> Vec<(String, String)> {
        encode_batch_filter(self, page)
    }
}

impl PageFilter for GroupFilter {
    type Item = GroupResult;

    fn resource(&self) -> &'static str {
        "groups"
    }

    fn page_size(&self) -> Option<u32> {
        GroupFilter::page_size(self)
    }

    fn query_params(&self, page: u32) -> Vec<(String, String)> {
        encode_group_filter(self, page)
    }
}

impl PageFilter for InboundFilter {
    type Item = MoSms;

    fn resource(&self) -> &'static str {
        "inbounds"
    }

    fn page_size(&self) -> Option<u32> {
        InboundFilter::page_size(self)
    }

    fn query_params(&self, page: u32) -> Vec<(String, String)> {
        encode_inbound_filter(self, page)
    }
}

impl PageFilter for DeliveryReportFilter {
    type Item = RecipientDeliveryReport;

    fn resource(&self) -> &'static str {
        "delivery_reports"
    }

    fn page_size(&self) -> Option<u32> {
        DeliveryReportFilter::page_size(self)
    }

    fn query_params(&self, page: u32) -> Vec<(String, String)> {
        encode_delivery_report_filter(self, page)
    }
}

#[derive(Debug, Clone)]
/// Fetches pages of one listing under a fixed filter.
///
/// Every fetch is an independent request; nothing is prefetched or cached,
/// and concurrent fetches are not serialized.
pub struct PagedFetcher<F> {
    connection: Connection,
    filter: F,
}

impl<F: PageFilter> PagedFetcher<F> {
    pub(crate) fn new(connection: Connection, filter: F) -> Self {
        Self { connection, filter }
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Fetch page `page` (zero-based) with exactly one request.
    ///
    /// Out-of-range pages are answered by the service, normally with empty
    /// content.
    pub fn fetch(
        &self,
        page: u32,
        callback: Option<CallbackRef<Page<F::Item>>>,
    ) -> XmsResult<XmsFuture<Page<F::Item>>> {
        self.connection.fetch_page(&self.filter, page, callback)
    }

    /// Pages in order, starting at page 0.
    ///
    /// A page is requested only when the stream is polled after the previous
    /// page was yielded and was not the last one. The stream ends after the
    /// first error. Each call starts a fresh iteration.
    pub fn pages(&self) -> BoxStream<'static, XmsResult<Page<F::Item>>> {
        let fetcher = self.clone();
        stream::try_unfold(Some(0_u32), move |next| next_page(fetcher.clone(), next)).boxed()
    }

    /// Entries of all pages, in page order.
    pub fn items(&self) -> BoxStream<'static, XmsResult<F::Item>> {
        self.pages()
            .map_ok(|page| stream::iter(page.content.into_iter().map(Ok::<_, XmsError>)))
            .try_flatten()
            .boxed()
    }
}

async fn next_page<F: PageFilter>(
    fetcher: PagedFetcher<F>,
    next: Option<u32>,
) -> XmsResult<Option<(Page<F::Item>, Option<u32>)>> {
    let Some(index) = next else {
        return Ok(None);
    };
    let page = fetcher.fetch(index, None)?.await?;
    let next = (!page.is_last()).then(|| index + 1);
    Ok(Some((page, next)))
}
