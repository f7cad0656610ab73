//! Typed async Rust client for the XMS batch SMS REST API.
//!
//! The crate is layered: a domain layer of validated types with no I/O, a
//! transport layer for the wire format and HTTP, and a client layer that
//! issues requests, decodes responses and notifies completion handlers.
//!
//! ```rust,no_run
//! use xms::{Address, ApiToken, Connection, MtBatchCreate, ServicePlanId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), xms::XmsError> {
//!     let connection = Connection::builder(
//!         ServicePlanId::new("my-plan")?,
//!         ApiToken::new("my-token")?,
//!     )
//!     .build()?;
//!     connection.start()?;
//!
//!     let batch = MtBatchCreate::text(Address::new("12345")?, "Hello")
//!         .to(Address::new("987654321")?)
//!         .build()?;
//!     let created = connection.create_batch(&batch, None)?.await?;
//!     println!("created batch {}", created.id);
//!
//!     connection.close();
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    Callback, CallbackRef, CallbackWrapper, CancelHandle, Connection, ConnectionBuilder,
    PageFilter, PagedFetcher, UnexpectedResponse, XmsError, XmsFuture, XmsResult,
    parse_push_event,
};
pub use domain::{
    Address, ApiError, ApiToken, BadRequestError, BatchDeliveryReport, BatchDeliveryReportParams,
    BatchFilter, BatchId, DeliveryReportFilter, DeliveryReportType, DeliveryStatus, GroupCreate,
    GroupFilter, GroupId, GroupResult, GroupUpdate, InboundFilter, InboundId,
    KnownDeliveryStatus, MoSms, MtBatchCreate, MtBatchDryRunResult, MtBatchResult, MtBatchUpdate,
    Page, PushEvent, RecipientDeliveryReport, ServicePlanId, Tags, TagsUpdate, UpdateValue,
    ValidationError,
};
