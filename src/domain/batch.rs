use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::codec::{hex_bytes, hex_bytes_opt};
use crate::domain::report::DeliveryReportType;
use crate::domain::update::UpdateValue;
use crate::domain::validation::ValidationError;
use crate::domain::value::{Address, BatchId};

/// Maximum combined size of a binary message body and its UDH, in bytes.
pub const MAX_BINARY_SIZE: usize = 140;

const FIELD_TO: &str = "to";
const FIELD_BODY: &str = "body";
const FIELD_UDH: &str = "udh";
const FIELD_PARAMETERS: &str = "parameters";
const FIELD_TAGS: &str = "tags";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Substitution values for one template parameter.
///
/// On the wire this is `{ "<recipient>": "<value>", ..., "default": "<value>" }`.
pub struct ParameterValues {
    #[serde(flatten)]
    pub by_recipient: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Template parameters keyed by parameter name (`${name}` in the body).
pub type Parameters = BTreeMap<String, ParameterValues>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
/// Message payload of an outbound batch; the `type` field selects the variant.
pub enum MtPayload {
    #[serde(rename = "mt_text")]
    Text {
        body: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        parameters: Parameters,
    },
    #[serde(rename = "mt_binary")]
    Binary {
        #[serde(with = "hex_bytes")]
        body: Vec<u8>,
        #[serde(with = "hex_bytes")]
        udh: Vec<u8>,
    },
}

impl MtPayload {
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary { .. })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Text { body, .. } => {
                if body.is_empty() {
                    return Err(ValidationError::Empty { field: FIELD_BODY });
                }
            }
            Self::Binary { body, udh } => check_binary_size(body, udh)?,
        }
        Ok(())
    }
}

fn check_binary_size(body: &[u8], udh: &[u8]) -> Result<(), ValidationError> {
    let actual = body.len() + udh.len();
    if actual > MAX_BINARY_SIZE {
        return Err(ValidationError::BinaryTooLarge {
            max: MAX_BINARY_SIZE,
            actual,
        });
    }
    Ok(())
}

fn check_schedule(
    send_at: Option<&DateTime<Utc>>,
    expire_at: Option<&DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (send_at, expire_at) {
        (Some(send_at), Some(expire_at)) if expire_at <= send_at => {
            Err(ValidationError::InvalidSchedule)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MtBatchCreateRepr")]
/// Validated request to submit a new batch.
///
/// Build through [`MtBatchCreate::text`] or [`MtBatchCreate::binary`].
pub struct MtBatchCreate {
    from: Address,
    to: Vec<Address>,
    #[serde(flatten)]
    payload: MtPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivery_report: Option<DeliveryReportType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expire_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<Url>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_reference: Option<String>,
}

#[derive(Deserialize)]
struct MtBatchCreateRepr {
    from: Address,
    to: Vec<Address>,
    #[serde(flatten)]
    payload: MtPayload,
    #[serde(default)]
    delivery_report: Option<DeliveryReportType>,
    #[serde(default)]
    send_at: Option<DateTime<Utc>>,
    #[serde(default)]
    expire_at: Option<DateTime<Utc>>,
    #[serde(default)]
    callback_url: Option<Url>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    client_reference: Option<String>,
}

impl TryFrom<MtBatchCreateRepr> for MtBatchCreate {
    type Error = ValidationError;

    fn try_from(repr: MtBatchCreateRepr) -> Result<Self, Self::Error> {
        let batch = Self {
            from: repr.from,
            to: repr.to,
            payload: repr.payload,
            delivery_report: repr.delivery_report,
            send_at: repr.send_at,
            expire_at: repr.expire_at,
            callback_url: repr.callback_url,
            tags: repr.tags,
            client_reference: repr.client_reference,
        };
        batch.validate()?;
        Ok(batch)
    }
}

impl MtBatchCreate {
    /// Start a text batch.
    pub fn text(from: Address, body: impl Into<String>) -> MtBatchCreateBuilder {
        MtBatchCreateBuilder::new(
            from,
            MtPayload::Text {
                body: body.into(),
                parameters: Parameters::new(),
            },
        )
    }

    /// Start a binary batch. Body and UDH together must fit in [`MAX_BINARY_SIZE`] bytes.
    pub fn binary(from: Address, body: Vec<u8>, udh: Vec<u8>) -> MtBatchCreateBuilder {
        MtBatchCreateBuilder::new(from, MtPayload::Binary { body, udh })
    }

    pub fn from(&self) -> &Address {
        &self.from
    }

    pub fn to(&self) -> &[Address] {
        &self.to
    }

    pub fn payload(&self) -> &MtPayload {
        &self.payload
    }

    pub fn delivery_report(&self) -> Option<DeliveryReportType> {
        self.delivery_report
    }

    pub fn send_at(&self) -> Option<&DateTime<Utc>> {
        self.send_at.as_ref()
    }

    pub fn expire_at(&self) -> Option<&DateTime<Utc>> {
        self.expire_at.as_ref()
    }

    pub fn callback_url(&self) -> Option<&Url> {
        self.callback_url.as_ref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn client_reference(&self) -> Option<&str> {
        self.client_reference.as_deref()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.to.is_empty() {
            return Err(ValidationError::Empty { field: FIELD_TO });
        }
        self.payload.validate()?;
        check_schedule(self.send_at.as_ref(), self.expire_at.as_ref())?;
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(ValidationError::Empty { field: FIELD_TAGS });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Builder for [`MtBatchCreate`]; invariants are checked once in [`build`](Self::build).
pub struct MtBatchCreateBuilder {
    from: Address,
    to: Vec<Address>,
    payload: MtPayload,
    parameters: Parameters,
    delivery_report: Option<DeliveryReportType>,
    send_at: Option<DateTime<Utc>>,
    expire_at: Option<DateTime<Utc>>,
    callback_url: Option<Url>,
    tags: Vec<String>,
    client_reference: Option<String>,
}

impl MtBatchCreateBuilder {
    fn new(from: Address, payload: MtPayload) -> Self {
        Self {
            from,
            to: Vec::new(),
            payload,
            parameters: Parameters::new(),
            delivery_report: None,
            send_at: None,
            expire_at: None,
            callback_url: None,
            tags: Vec::new(),
            client_reference: None,
        }
    }

    /// Add one recipient.
    pub fn to(mut self, recipient: Address) -> Self {
        self.to.push(recipient);
        self
    }

    /// Add several recipients.
    pub fn recipients(mut self, recipients: impl IntoIterator<Item = Address>) -> Self {
        self.to.extend(recipients);
        self
    }

    /// Set the substitution value of `name` for one recipient. Text batches only.
    pub fn parameter(
        mut self,
        name: impl Into<String>,
        recipient: &Address,
        value: impl Into<String>,
    ) -> Self {
        self.parameters
            .entry(name.into())
            .or_default()
            .by_recipient
            .insert(recipient.as_str().to_owned(), value.into());
        self
    }

    /// Set the fallback value of `name` for recipients without their own. Text batches only.
    pub fn parameter_default(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.entry(name.into()).or_default().default = Some(value.into());
        self
    }

    pub fn delivery_report(mut self, report: DeliveryReportType) -> Self {
        self.delivery_report = Some(report);
        self
    }

    pub fn send_at(mut self, at: DateTime<Utc>) -> Self {
        self.send_at = Some(at);
        self
    }

    pub fn expire_at(mut self, at: DateTime<Utc>) -> Self {
        self.expire_at = Some(at);
        self
    }

    pub fn callback_url(mut self, url: Url) -> Self {
        self.callback_url = Some(url);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn client_reference(mut self, reference: impl Into<String>) -> Self {
        self.client_reference = Some(reference.into());
        self
    }

    /// Validate and build the batch.
    ///
    /// Errors: no recipients, empty text body, oversized binary payload,
    /// parameters on a binary batch, `expire_at` not after `send_at`, blank tag.
    pub fn build(self) -> Result<MtBatchCreate, ValidationError> {
        let payload = match self.payload {
            MtPayload::Text { body, mut parameters } => {
                parameters.extend(self.parameters);
                MtPayload::Text { body, parameters }
            }
            MtPayload::Binary { .. } if !self.parameters.is_empty() => {
                return Err(ValidationError::NotApplicable {
                    field: FIELD_PARAMETERS,
                });
            }
            binary @ MtPayload::Binary { .. } => binary,
        };

        let batch = MtBatchCreate {
            from: self.from,
            to: self.to,
            payload,
            delivery_report: self.delivery_report,
            send_at: self.send_at,
            expire_at: self.expire_at,
            callback_url: self.callback_url,
            tags: self.tags,
            client_reference: self.client_reference,
        };
        batch.validate()?;
        Ok(batch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A batch as stored by the service.
pub struct MtBatchResult {
    pub id: BatchId,
    pub from: Address,
    pub to: Vec<Address>,
    #[serde(flatten)]
    pub payload: MtPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_report: Option<DeliveryReportType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub canceled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
/// Payload changes of a batch update; the variant must match the stored batch.
pub enum MtPayloadUpdate {
    #[serde(rename = "mt_text")]
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<String>,
        #[serde(skip_serializing_if = "UpdateValue::is_unchanged")]
        parameters: UpdateValue<Parameters>,
    },
    #[serde(rename = "mt_binary")]
    Binary {
        #[serde(
            serialize_with = "hex_bytes_opt::serialize",
            skip_serializing_if = "Option::is_none"
        )]
        body: Option<Vec<u8>>,
        #[serde(
            serialize_with = "hex_bytes_opt::serialize",
            skip_serializing_if = "Option::is_none"
        )]
        udh: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Partial update of a scheduled batch.
///
/// Optional fields use [`UpdateValue`]: unchanged fields are omitted,
/// cleared fields are sent as `null`.
pub struct MtBatchUpdate {
    #[serde(flatten)]
    payload: MtPayloadUpdate,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    to_add: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    to_remove: Vec<Address>,
    #[serde(skip_serializing_if = "UpdateValue::is_unchanged")]
    delivery_report: UpdateValue<DeliveryReportType>,
    #[serde(skip_serializing_if = "UpdateValue::is_unchanged")]
    send_at: UpdateValue<DateTime<Utc>>,
    #[serde(skip_serializing_if = "UpdateValue::is_unchanged")]
    expire_at: UpdateValue<DateTime<Utc>>,
    #[serde(skip_serializing_if = "UpdateValue::is_unchanged")]
    callback_url: UpdateValue<Url>,
}

impl MtBatchUpdate {
    /// Start an update of a text batch.
    pub fn text() -> MtBatchUpdateBuilder {
        MtBatchUpdateBuilder::new(false)
    }

    /// Start an update of a binary batch.
    pub fn binary() -> MtBatchUpdateBuilder {
        MtBatchUpdateBuilder::new(true)
    }

    pub fn payload(&self) -> &MtPayloadUpdate {
        &self.payload
    }

    pub fn from(&self) -> Option<&Address> {
        self.from.as_ref()
    }

    pub fn to_add(&self) -> &[Address] {
        &self.to_add
    }

    pub fn to_remove(&self) -> &[Address] {
        &self.to_remove
    }

    pub fn delivery_report(&self) -> &UpdateValue<DeliveryReportType> {
        &self.delivery_report
    }

    pub fn send_at(&self) -> &UpdateValue<DateTime<Utc>> {
        &self.send_at
    }

    pub fn expire_at(&self) -> &UpdateValue<DateTime<Utc>> {
        &self.expire_at
    }

    pub fn callback_url(&self) -> &UpdateValue<Url> {
        &self.callback_url
    }
}

#[derive(Debug, Clone)]
/// Builder for [`MtBatchUpdate`].
pub struct MtBatchUpdateBuilder {
    binary: bool,
    text_body: Option<String>,
    parameters: UpdateValue<Parameters>,
    binary_body: Option<Vec<u8>>,
    udh: Option<Vec<u8>>,
    from: Option<Address>,
    to_add: Vec<Address>,
    to_remove: Vec<Address>,
    delivery_report: UpdateValue<DeliveryReportType>,
    send_at: UpdateValue<DateTime<Utc>>,
    expire_at: UpdateValue<DateTime<Utc>>,
    callback_url: UpdateValue<Url>,
}

impl MtBatchUpdateBuilder {
    fn new(binary: bool) -> Self {
        Self {
            binary,
            text_body: None,
            parameters: UpdateValue::Unchanged,
            binary_body: None,
            udh: None,
            from: None,
            to_add: Vec::new(),
            to_remove: Vec::new(),
            delivery_report: UpdateValue::Unchanged,
            send_at: UpdateValue::Unchanged,
            expire_at: UpdateValue::Unchanged,
            callback_url: UpdateValue::Unchanged,
        }
    }

    /// Replace the text body. Text updates only.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    /// Replace or clear the template parameters. Text updates only.
    pub fn parameters(mut self, parameters: UpdateValue<Parameters>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Replace the binary body. Binary updates only; must come with [`udh`](Self::udh).
    pub fn binary_body(mut self, body: Vec<u8>) -> Self {
        self.binary_body = Some(body);
        self
    }

    /// Replace the UDH. Binary updates only; must come with [`binary_body`](Self::binary_body).
    pub fn udh(mut self, udh: Vec<u8>) -> Self {
        self.udh = Some(udh);
        self
    }

    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn add_recipient(mut self, recipient: Address) -> Self {
        self.to_add.push(recipient);
        self
    }

    pub fn remove_recipient(mut self, recipient: Address) -> Self {
        self.to_remove.push(recipient);
        self
    }

    pub fn delivery_report(mut self, report: UpdateValue<DeliveryReportType>) -> Self {
        self.delivery_report = report;
        self
    }

    pub fn send_at(mut self, at: UpdateValue<DateTime<Utc>>) -> Self {
        self.send_at = at;
        self
    }

    pub fn expire_at(mut self, at: UpdateValue<DateTime<Utc>>) -> Self {
        self.expire_at = at;
        self
    }

    pub fn callback_url(mut self, url: UpdateValue<Url>) -> Self {
        self.callback_url = url;
        self
    }

    /// Validate and build the update.
    pub fn build(self) -> Result<MtBatchUpdate, ValidationError> {
        let payload = if self.binary {
            if self.text_body.is_some() {
                return Err(ValidationError::NotApplicable { field: FIELD_BODY });
            }
            if !self.parameters.is_unchanged() {
                return Err(ValidationError::NotApplicable {
                    field: FIELD_PARAMETERS,
                });
            }
            match (&self.binary_body, &self.udh) {
                (Some(body), Some(udh)) => check_binary_size(body, udh)?,
                (None, None) => {}
                _ => return Err(ValidationError::IncompleteBinary),
            }
            MtPayloadUpdate::Binary {
                body: self.binary_body,
                udh: self.udh,
            }
        } else {
            if self.binary_body.is_some() {
                return Err(ValidationError::NotApplicable { field: FIELD_BODY });
            }
            if self.udh.is_some() {
                return Err(ValidationError::NotApplicable { field: FIELD_UDH });
            }
            if self.text_body.as_deref() == Some("") {
                return Err(ValidationError::Empty { field: FIELD_BODY });
            }
            MtPayloadUpdate::Text {
                body: self.text_body,
                parameters: self.parameters,
            }
        };

        check_schedule(self.send_at.as_set(), self.expire_at.as_set())?;

        Ok(MtBatchUpdate {
            payload,
            from: self.from,
            to_add: self.to_add,
            to_remove: self.to_remove,
            delivery_report: self.delivery_report,
            send_at: self.send_at,
            expire_at: self.expire_at,
            callback_url: self.callback_url,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageEncoding {
    Text,
    Unicode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// How one recipient's message would be split and encoded.
pub struct DryRunPerRecipient {
    pub recipient: Address,
    pub number_of_parts: u32,
    pub body: String,
    pub encoding: MessageEncoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Outcome of a batch dry run: nothing is sent.
pub struct MtBatchDryRunResult {
    pub number_of_recipients: u32,
    pub number_of_messages: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_recipient: Vec<DryRunPerRecipient>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn address(value: &str) -> Address {
        Address::new(value).unwrap()
    }

    #[test]
    fn text_batch_serializes_only_present_fields() {
        let batch = MtBatchCreate::text(address("12345"), "Hello, ${name}!")
            .to(address("987654321"))
            .to(address("123456789"))
            .parameter("name", &address("987654321"), "Mary")
            .parameter_default("name", "friend")
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({
                "type": "mt_text",
                "from": "12345",
                "to": ["987654321", "123456789"],
                "body": "Hello, ${name}!",
                "parameters": {
                    "name": { "987654321": "Mary", "default": "friend" }
                }
            })
        );
    }

    #[test]
    fn binary_batch_hex_encodes_body_and_udh() {
        let batch = MtBatchCreate::binary(address("12345"), vec![0x00, 0x01], vec![0x05])
            .to(address("987654321"))
            .delivery_report(DeliveryReportType::PerRecipient)
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({
                "type": "mt_binary",
                "from": "12345",
                "to": ["987654321"],
                "body": "0001",
                "udh": "05",
                "delivery_report": "per_recipient"
            })
        );
    }

    #[test]
    fn create_requires_recipients_and_body() {
        let err = MtBatchCreate::text(address("12345"), "hi")
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "to" });

        let err = MtBatchCreate::text(address("12345"), "")
            .to(address("1"))
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "body" });
    }

    #[test]
    fn binary_size_limit_is_enforced() {
        let ok = MtBatchCreate::binary(address("1"), vec![0; 130], vec![0; 10])
            .to(address("2"))
            .build();
        assert!(ok.is_ok());

        let err = MtBatchCreate::binary(address("1"), vec![0; 131], vec![0; 10])
            .to(address("2"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::BinaryTooLarge {
                max: MAX_BINARY_SIZE,
                actual: 141
            }
        );
    }

    #[test]
    fn binary_rejects_parameters() {
        let err = MtBatchCreate::binary(address("1"), vec![1], vec![2])
            .to(address("2"))
            .parameter_default("name", "x")
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::NotApplicable { field: "parameters" });
    }

    #[test]
    fn expire_at_must_follow_send_at() {
        let send_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let err = MtBatchCreate::text(address("1"), "hi")
            .to(address("2"))
            .send_at(send_at)
            .expire_at(send_at)
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidSchedule);
    }

    #[test]
    fn create_deserialization_runs_validation() {
        let err = serde_json::from_value::<MtBatchCreate>(json!({
            "type": "mt_text",
            "from": "12345",
            "to": [],
            "body": "hi"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("to must not be empty"));
    }

    #[test]
    fn result_decodes_text_and_binary() {
        let text: MtBatchResult = serde_json::from_value(json!({
            "id": "5Z8QsIRsk86f-jHB",
            "type": "mt_text",
            "from": "12345",
            "to": ["987654321", "123456789"],
            "body": "Hello, world!",
            "canceled": false,
            "created_at": "2016-12-01T11:03:13.192Z",
            "modified_at": "2016-12-01T11:03:13.192Z",
            "delivery_report": "none",
            "expire_at": "2016-12-04T11:03:13.192Z"
        }))
        .unwrap();
        assert_eq!(text.id.as_str(), "5Z8QsIRsk86f-jHB");
        assert!(matches!(text.payload, MtPayload::Text { ref body, .. } if body == "Hello, world!"));
        assert_eq!(text.delivery_report, Some(DeliveryReportType::None));
        assert!(!text.canceled);

        let binary: MtBatchResult = serde_json::from_value(json!({
            "id": "5Z8QsIRsk86f-jHB",
            "type": "mt_binary",
            "from": "12345",
            "to": ["987654321"],
            "body": "cafebabe",
            "udh": "050003cc0101",
            "canceled": true
        }))
        .unwrap();
        assert_eq!(
            binary.payload,
            MtPayload::Binary {
                body: vec![0xca, 0xfe, 0xba, 0xbe],
                udh: vec![0x05, 0x00, 0x03, 0xcc, 0x01, 0x01],
            }
        );
        assert!(binary.canceled);
    }

    #[test]
    fn update_uses_tri_state_fields() {
        let update = MtBatchUpdate::text()
            .body("new body")
            .add_recipient(address("111"))
            .delivery_report(UpdateValue::Set(DeliveryReportType::Summary))
            .callback_url(UpdateValue::Clear)
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({
                "type": "mt_text",
                "body": "new body",
                "to_add": ["111"],
                "delivery_report": "summary",
                "callback_url": null
            })
        );
    }

    #[test]
    fn binary_update_requires_body_and_udh_together() {
        let err = MtBatchUpdate::binary()
            .binary_body(vec![1, 2])
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::IncompleteBinary);

        let update = MtBatchUpdate::binary()
            .binary_body(vec![0xab])
            .udh(vec![0x01])
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "type": "mt_binary", "body": "ab", "udh": "01" })
        );

        let err = MtBatchUpdate::text().udh(vec![1]).build().unwrap_err();
        assert_eq!(err, ValidationError::NotApplicable { field: "udh" });
    }

    #[test]
    fn dry_run_result_decodes() {
        let result: MtBatchDryRunResult = serde_json::from_value(json!({
            "number_of_recipients": 2,
            "number_of_messages": 2,
            "per_recipient": [
                { "recipient": "987654321", "number_of_parts": 1, "body": "Hello", "encoding": "text" },
                { "recipient": "123456789", "number_of_parts": 1, "body": "Hallå", "encoding": "unicode" }
            ]
        }))
        .unwrap();
        assert_eq!(result.number_of_messages, 2);
        assert_eq!(result.per_recipient[1].encoding, MessageEncoding::Unicode);
    }
}
