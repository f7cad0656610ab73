//! Immutable listing filters, validated once at `build()`.
//!
//! The comma separates values of multi-value query parameters, so no single
//! value may contain one.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::report::{DeliveryReportType, DeliveryStatus};
use crate::domain::validation::ValidationError;
use crate::domain::value::Address;

pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;

const FIELD_PAGE_SIZE: &str = "page_size";
const FIELD_SENDERS: &str = "from";
const FIELD_RECIPIENTS: &str = "to";
const FIELD_TAGS: &str = "tags";
const FIELD_STATUS: &str = "status";
const FIELD_CLIENT_REFERENCE: &str = "client_reference";
const FIELD_DATE: &str = "start_date";
const FIELD_REPORT_TYPE: &str = "type";

fn check_page_size(page_size: Option<u32>) -> Result<(), ValidationError> {
    match page_size {
        Some(actual) if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&actual) => {
            Err(ValidationError::OutOfRange {
                field: FIELD_PAGE_SIZE,
                min: MIN_PAGE_SIZE.into(),
                max: MAX_PAGE_SIZE.into(),
                actual: actual.into(),
            })
        }
        _ => Ok(()),
    }
}

fn check_item(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.contains(',') {
        return Err(ValidationError::ReservedComma {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

fn check_items<'a>(
    field: &'static str,
    values: impl IntoIterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    values
        .into_iter()
        .try_for_each(|value| check_item(field, value))
}

fn check_range<T: PartialOrd>(start: Option<&T>, end: Option<&T>) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => {
            Err(ValidationError::InvalidDateRange { field: FIELD_DATE })
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Filter for listing batches.
pub struct BatchFilter {
    page_size: Option<u32>,
    senders: Vec<Address>,
    tags: Vec<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl BatchFilter {
    pub fn builder() -> BatchFilterBuilder {
        BatchFilterBuilder::default()
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn senders(&self) -> &[Address] {
        &self.senders
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchFilterBuilder {
    inner: BatchFilter,
}

impl BatchFilterBuilder {
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.inner.page_size = Some(page_size);
        self
    }

    pub fn sender(mut self, sender: Address) -> Self {
        self.inner.senders.push(sender);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.inner.tags.push(tag.into());
        self
    }

    /// Only batches created on or after this day.
    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.inner.start_date = Some(date);
        self
    }

    /// Only batches created before this day.
    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.inner.end_date = Some(date);
        self
    }

    pub fn build(self) -> Result<BatchFilter, ValidationError> {
        let filter = self.inner;
        check_page_size(filter.page_size)?;
        check_items(FIELD_SENDERS, filter.senders.iter().map(Address::as_str))?;
        check_items(FIELD_TAGS, filter.tags.iter().map(String::as_str))?;
        check_range(filter.start_date.as_ref(), filter.end_date.as_ref())?;
        Ok(filter)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Filter for listing groups.
pub struct GroupFilter {
    page_size: Option<u32>,
    tags: Vec<String>,
}

impl GroupFilter {
    pub fn builder() -> GroupFilterBuilder {
        GroupFilterBuilder::default()
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupFilterBuilder {
    inner: GroupFilter,
}

impl GroupFilterBuilder {
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.inner.page_size = Some(page_size);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.inner.tags.push(tag.into());
        self
    }

    pub fn build(self) -> Result<GroupFilter, ValidationError> {
        let filter = self.inner;
        check_page_size(filter.page_size)?;
        check_items(FIELD_TAGS, filter.tags.iter().map(String::as_str))?;
        Ok(filter)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Filter for listing inbound messages.
pub struct InboundFilter {
    page_size: Option<u32>,
    recipients: Vec<Address>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl InboundFilter {
    pub fn builder() -> InboundFilterBuilder {
        InboundFilterBuilder::default()
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
}

#[derive(Debug, Clone, Default)]
pub struct InboundFilterBuilder {
    inner: InboundFilter,
}

impl InboundFilterBuilder {
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.inner.page_size = Some(page_size);
        self
    }

    pub fn recipient(mut self, recipient: Address) -> Self {
        self.inner.recipients.push(recipient);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.inner.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.inner.end_date = Some(date);
        self
    }

    pub fn build(self) -> Result<InboundFilter, ValidationError> {
        let filter = self.inner;
        check_page_size(filter.page_size)?;
        check_items(FIELD_RECIPIENTS, filter.recipients.iter().map(Address::as_str))?;
        check_range(filter.start_date.as_ref(), filter.end_date.as_ref())?;
        Ok(filter)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Filter for listing recipient delivery reports across batches.
pub struct DeliveryReportFilter {
    page_size: Option<u32>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    statuses: Vec<DeliveryStatus>,
    codes: Vec<i32>,
    client_reference: Option<String>,
}

impl DeliveryReportFilter {
    pub fn builder() -> DeliveryReportFilterBuilder {
        DeliveryReportFilterBuilder::default()
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn start_date(&self) -> Option<&DateTime<Utc>> {
        self.start_date.as_ref()
    }

    pub fn end_date(&self) -> Option<&DateTime<Utc>> {
        self.end_date.as_ref()
    }

    pub fn statuses(&self) -> &[DeliveryStatus] {
        &self.statuses
    }

    pub fn codes(&self) -> &[i32] {
        &self.codes
    }

    pub fn client_reference(&self) -> Option<&str> {
        self.client_reference.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryReportFilterBuilder {
    inner: DeliveryReportFilter,
}

impl DeliveryReportFilterBuilder {
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.inner.page_size = Some(page_size);
        self
    }

    pub fn start_date(mut self, at: DateTime<Utc>) -> Self {
        self.inner.start_date = Some(at);
        self
    }

    pub fn end_date(mut self, at: DateTime<Utc>) -> Self {
        self.inner.end_date = Some(at);
        self
    }

    pub fn status(mut self, status: impl Into<DeliveryStatus>) -> Self {
        self.inner.statuses.push(status.into());
        self
    }

    pub fn code(mut self, code: i32) -> Self {
        self.inner.codes.push(code);
        self
    }

    pub fn client_reference(mut self, reference: impl Into<String>) -> Self {
        self.inner.client_reference = Some(reference.into());
        self
    }

    pub fn build(self) -> Result<DeliveryReportFilter, ValidationError> {
        let filter = self.inner;
        check_page_size(filter.page_size)?;
        check_items(FIELD_STATUS, filter.statuses.iter().map(DeliveryStatus::as_str))?;
        if let Some(reference) = filter.client_reference.as_deref() {
            check_item(FIELD_CLIENT_REFERENCE, reference)?;
        }
        check_range(filter.start_date.as_ref(), filter.end_date.as_ref())?;
        Ok(filter)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Query options for a batch delivery report.
pub struct BatchDeliveryReportParams {
    report_type: Option<DeliveryReportType>,
    statuses: Vec<DeliveryStatus>,
    codes: Vec<i32>,
}

impl BatchDeliveryReportParams {
    pub fn builder() -> BatchDeliveryReportParamsBuilder {
        BatchDeliveryReportParamsBuilder::default()
    }

    pub fn report_type(&self) -> Option<DeliveryReportType> {
        self.report_type
    }

    pub fn statuses(&self) -> &[DeliveryStatus] {
        &self.statuses
    }

    pub fn codes(&self) -> &[i32] {
        &self.codes
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchDeliveryReportParamsBuilder {
    inner: BatchDeliveryReportParams,
}

impl BatchDeliveryReportParamsBuilder {
    /// Report verbosity; only `Summary` and `Full` can be fetched.
    pub fn report_type(mut self, report_type: DeliveryReportType) -> Self {
        self.inner.report_type = Some(report_type);
        self
    }

    pub fn status(mut self, status: impl Into<DeliveryStatus>) -> Self {
        self.inner.statuses.push(status.into());
        self
    }

    pub fn code(mut self, code: i32) -> Self {
        self.inner.codes.push(code);
        self
    }

    pub fn build(self) -> Result<BatchDeliveryReportParams, ValidationError> {
        let params = self.inner;
        if matches!(
            params.report_type,
            Some(DeliveryReportType::None | DeliveryReportType::PerRecipient)
        ) {
            return Err(ValidationError::NotApplicable {
                field: FIELD_REPORT_TYPE,
            });
        }
        check_items(FIELD_STATUS, params.statuses.iter().map(DeliveryStatus::as_str))?;
        Ok(params)
    }
}
