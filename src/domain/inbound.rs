use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::codec::hex_bytes;
use crate::domain::value::{Address, InboundId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MoPayload {
    #[serde(rename = "mo_text")]
    Text {
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        keyword: Option<String>,
    },
    #[serde(rename = "mo_binary")]
    Binary {
        #[serde(with = "hex_bytes")]
        body: Vec<u8>,
        #[serde(with = "hex_bytes")]
        udh: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A mobile-originated message received on one of the plan's numbers.
pub struct MoSms {
    pub id: InboundId,
    pub from: Address,
    pub to: Address,
    #[serde(flatten)]
    pub payload: MoPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    pub received_at: DateTime<Utc>,
}
