//! Data-access core for the biblioteka collection API.
//!
//! # Overview
//! `ColecaoService` builds requests for the `/colecoes` resource and shapes
//! the responses. It sends them through `HttpClient`, the shared entry point
//! that joins the base URL, executes over a `Transport`, JSOG-normalizes
//! response bodies and reports every outcome to a `NotificationSink`.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest` / `HttpResponse`),
//!   so `build_*` and `parse_*` steps stay deterministic.
//! - The network sits behind the `Transport` trait; `UreqTransport` is the
//!   blocking implementation with the configured timeout.
//! - The notification slot is injected, not global, so independent clients
//!   and tests do not share state.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod colecao;
pub mod config;
pub mod error;
pub mod http;
pub mod jsog;
pub mod notification;
pub mod transport;
pub mod types;

pub use client::HttpClient;
pub use colecao::ColecaoService;
pub use config::ClientConfig;
pub use error::{ApiError, ApplicationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use jsog::NormalizeError;
pub use notification::{Notification, NotificationKind, NotificationSink};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{Colecao, CreateColecao, PageRequest, PageResult, SortOrder, SortSpec};
