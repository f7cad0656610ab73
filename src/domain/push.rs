use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};

use crate::domain::inbound::MoSms;
use crate::domain::report::{BatchDeliveryReport, RecipientDeliveryReport};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Payload the service POSTs to a batch or plan callback URL.
pub enum PushEvent {
    BatchDeliveryReport(BatchDeliveryReport),
    RecipientDeliveryReport(RecipientDeliveryReport),
    Inbound(MoSms),
}

impl<'de> Deserialize<'de> for PushEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?
            .to_owned();

        match kind.as_str() {
            "delivery_report_sms" => serde_json::from_value(value)
                .map(Self::BatchDeliveryReport)
                .map_err(D::Error::custom),
            "recipient_delivery_report_sms" => serde_json::from_value(value)
                .map(Self::RecipientDeliveryReport)
                .map_err(D::Error::custom),
            "mo_text" | "mo_binary" => serde_json::from_value(value)
                .map(Self::Inbound)
                .map_err(D::Error::custom),
            other => Err(D::Error::unknown_variant(
                other,
                &[
                    "delivery_report_sms",
                    "recipient_delivery_report_sms",
                    "mo_text",
                    "mo_binary",
                ],
            )),
        }
    }
}
