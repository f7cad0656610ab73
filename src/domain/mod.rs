//! Domain layer: strong types with validation and invariants (no I/O).

mod api_error;
mod batch;
mod codec;
mod filter;
mod group;
mod inbound;
mod page;
mod push;
mod report;
mod tags;
mod update;
mod validation;
mod value;

pub use api_error::{ApiError, BadRequestError};
pub use batch::{
    DryRunPerRecipient, MAX_BINARY_SIZE, MessageEncoding, MtBatchCreate, MtBatchCreateBuilder,
    MtBatchDryRunResult, MtBatchResult, MtBatchUpdate, MtBatchUpdateBuilder, MtPayload,
    MtPayloadUpdate, ParameterValues, Parameters,
};
pub use filter::{
    BatchDeliveryReportParams, BatchDeliveryReportParamsBuilder, BatchFilter, BatchFilterBuilder,
    DeliveryReportFilter, DeliveryReportFilterBuilder, GroupFilter, GroupFilterBuilder,
    InboundFilter, InboundFilterBuilder, MAX_PAGE_SIZE, MIN_PAGE_SIZE,
};
pub use group::{
    GroupAutoUpdate, GroupCreate, GroupCreateBuilder, GroupResult, GroupUpdate,
    GroupUpdateBuilder, KeywordPair,
};
pub use inbound::{MoPayload, MoSms};
pub use page::{DEFAULT_PAGE_SIZE, Page};
pub use push::PushEvent;
pub use report::{
    BatchDeliveryReport, DeliveryReportType, DeliveryStatus, DeliveryStatusEntry,
    KnownDeliveryStatus, RecipientDeliveryReport,
};
pub use tags::{Tags, TagsUpdate};
pub use update::UpdateValue;
pub use validation::ValidationError;
pub use value::{Address, ApiToken, BatchId, GroupId, InboundId, ServicePlanId};
