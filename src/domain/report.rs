use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;
use crate::domain::value::{Address, BatchId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Delivery report verbosity requested for a batch, or fetched for it.
pub enum DeliveryReportType {
    None,
    Summary,
    Full,
    PerRecipient,
}

impl DeliveryReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Summary => "summary",
            Self::Full => "full",
            Self::PerRecipient => "per_recipient",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Delivery status as reported by the service.
///
/// The value is preserved as-is even when unknown to this crate.
pub struct DeliveryStatus(String);

impl DeliveryStatus {
    pub const FIELD: &'static str = "status";

    /// Create a validated status. Invariant: non-empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Map this status to a known variant, if one exists.
    pub fn known_kind(&self) -> Option<KnownDeliveryStatus> {
        KnownDeliveryStatus::from_status(&self.0)
    }

    /// Returns `true` if no further status change is expected.
    pub fn is_final(&self) -> bool {
        matches!(self.known_kind(), Some(kind) if kind.is_final())
    }
}

impl From<KnownDeliveryStatus> for DeliveryStatus {
    fn from(value: KnownDeliveryStatus) -> Self {
        Self(value.as_str().to_owned())
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Delivery statuses documented by the service.
pub enum KnownDeliveryStatus {
    Queued,
    Dispatched,
    Aborted,
    Rejected,
    Delivered,
    Failed,
    Expired,
    Unknown,
}

impl KnownDeliveryStatus {
    pub fn from_status(status: &str) -> Option<Self> {
        Some(match status {
            "Queued" => Self::Queued,
            "Dispatched" => Self::Dispatched,
            "Aborted" => Self::Aborted,
            "Rejected" => Self::Rejected,
            "Delivered" => Self::Delivered,
            "Failed" => Self::Failed,
            "Expired" => Self::Expired,
            "Unknown" => Self::Unknown,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::Dispatched => "Dispatched",
            Self::Aborted => "Aborted",
            Self::Rejected => "Rejected",
            Self::Delivered => "Delivered",
            Self::Failed => "Failed",
            Self::Expired => "Expired",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_final(self) -> bool {
        matches!(
            self,
            Self::Aborted | Self::Rejected | Self::Delivered | Self::Failed | Self::Expired
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One status bucket of a batch delivery report.
pub struct DeliveryStatusEntry {
    pub code: i32,
    pub status: DeliveryStatus,
    pub count: u32,
    /// Only present in `full` reports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Aggregated delivery report for a whole batch (`delivery_report_sms`).
pub struct BatchDeliveryReport {
    pub batch_id: BatchId,
    pub total_message_count: u32,
    #[serde(default)]
    pub statuses: Vec<DeliveryStatusEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_reference: Option<String>,
}

impl BatchDeliveryReport {
    /// Total message count in buckets with the given status.
    pub fn count_with_status(&self, status: KnownDeliveryStatus) -> u32 {
        self.statuses
            .iter()
            .filter(|entry| entry.status.known_kind() == Some(status))
            .map(|entry| entry.count)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Delivery report for a single recipient (`recipient_delivery_report_sms`).
pub struct RecipientDeliveryReport {
    pub batch_id: BatchId,
    pub recipient: Address,
    pub code: i32,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_status_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_reference: Option<String>,
}
