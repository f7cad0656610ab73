//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod error_body;
mod http;
mod page;
mod query;
mod raw_text;

pub use error_body::{ErrorBody, decode_error_body};
#[cfg(test)]
pub use http::{BoxError, BoxFuture};
pub use http::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_CONNECTIONS, DEFAULT_SOCKET_TIMEOUT, HttpRequest,
    HttpResponse, HttpTransport, PoolSettings, ReqwestTransport,
};
pub use page::decode_page;
pub use query::{
    encode_batch_delivery_report_params, encode_batch_filter, encode_delivery_report_filter,
    encode_group_filter, encode_inbound_filter, render_query,
};
