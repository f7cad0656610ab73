//! Filters rendered as ordered query parameters: `page`, `page_size`, then
//! the filter's own fields in a fixed order. Multi-value fields are joined
//! with `,`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use url::form_urlencoded;

use crate::domain::{
    Address, BatchDeliveryReportParams, BatchFilter, DeliveryReportFilter, DeliveryStatus,
    GroupFilter, InboundFilter,
};

pub type QueryParams = Vec<(String, String)>;

fn push(params: &mut QueryParams, key: &str, value: String) {
    params.push((key.to_owned(), value));
}

fn push_paging(params: &mut QueryParams, page: u32, page_size: Option<u32>) {
    push(params, "page", page.to_string());
    if let Some(page_size) = page_size {
        push(params, "page_size", page_size.to_string());
    }
}

fn push_joined<'a>(params: &mut QueryParams, key: &str, values: impl Iterator<Item = &'a str>) {
    let joined = values.collect::<Vec<_>>().join(",");
    if !joined.is_empty() {
        push(params, key, joined);
    }
}

fn push_codes(params: &mut QueryParams, codes: &[i32]) {
    if !codes.is_empty() {
        let joined = codes
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        push(params, "code", joined);
    }
}

fn push_date(params: &mut QueryParams, key: &str, date: Option<NaiveDate>) {
    if let Some(date) = date {
        push(params, key, date.format("%Y-%m-%d").to_string());
    }
}

fn push_date_time(params: &mut QueryParams, key: &str, at: Option<&DateTime<Utc>>) {
    if let Some(at) = at {
        push(params, key, at.to_rfc3339_opts(SecondsFormat::Millis, true));
    }
}

pub fn encode_batch_filter(filter: &BatchFilter, page: u32) -> QueryParams {
    let mut params = QueryParams::new();
    push_paging(&mut params, page, filter.page_size());
    push_joined(&mut params, "from", filter.senders().iter().map(Address::as_str));
    push_joined(&mut params, "tags", filter.tags().iter().map(String::as_str));
    push_date(&mut params, "start_date", filter.start_date());
    push_date(&mut params, "end_date", filter.end_date());
    params
}

pub fn encode_group_filter(filter: &GroupFilter, page: u32) -> QueryParams {
    let mut params = QueryParams::new();
    push_paging(&mut params, page, filter.page_size());
    push_joined(&mut params, "tags", filter.tags().iter().map(String::as_str));
    params
}

pub fn encode_inbound_filter(filter: &InboundFilter, page: u32) -> QueryParams {
    let mut params = QueryParams::new();
    push_paging(&mut params, page, filter.page_size());
    push_joined(&mut params, "to", filter.recipients().iter().map(Address::as_str));
    push_date(&mut params, "start_date", filter.start_date());
    push_date(&mut params, "end_date", filter.end_date());
    params
}

pub fn encode_delivery_report_filter(filter: &DeliveryReportFilter, page: u32) -> QueryParams {
    let mut params = QueryParams::new();
    push_paging(&mut params, page, filter.page_size());
    push_date_time(&mut params, "start_date", filter.start_date());
    push_date_time(&mut params, "end_date", filter.end_date());
    push_joined(
        &mut params,
        "status",
        filter.statuses().iter().map(DeliveryStatus::as_str),
    );
    push_codes(&mut params, filter.codes());
    if let Some(reference) = filter.client_reference() {
        push(&mut params, "client_reference", reference.to_owned());
    }
    params
}

pub fn encode_batch_delivery_report_params(report: &BatchDeliveryReportParams) -> QueryParams {
    let mut params = QueryParams::new();
    if let Some(report_type) = report.report_type() {
        push(&mut params, "type", report_type.as_str().to_owned());
    }
    push_joined(
        &mut params,
        "status",
        report.statuses().iter().map(DeliveryStatus::as_str),
    );
    push_codes(&mut params, report.codes());
    params
}

/// `application/x-www-form-urlencoded` rendering, as appended to request URLs.
pub fn render_query(params: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}
