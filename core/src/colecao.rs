//! CRUD operations for library collections (`/colecoes`).
//!
//! # Design
//! As with the rest of the core, each operation is split into a pure
//! `build_*` step that produces an `HttpRequest` and, where the response
//! needs shaping, a pure `parse_*` step. The executing methods glue the two
//! through the shared `HttpClient`, which owns notifications and JSOG
//! normalization.
//!
//! Only `create` rewrites failures: an HTTP error becomes
//! `ApiError::Rejected` carrying the JSON text of the server's error body.
//! `find_search`, `update` and `delete` return client errors unchanged.

use serde_json::Value;

use crate::client::{parse_body, HttpClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Colecao, CreateColecao, PageRequest, PageResult};

pub const COLECOES_PATH: &str = "/colecoes";

pub struct ColecaoService<T = UreqTransport> {
    client: HttpClient<T>,
}

impl<T: Transport> ColecaoService<T> {
    pub fn new(client: HttpClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HttpClient<T> {
        &self.client
    }

    pub fn build_find_search(request: &PageRequest) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, COLECOES_PATH)
            .with_query("search", &request.search)
            .with_query("page", request.page)
            .with_query("size", request.items_per_page)
            .with_query("sort", request.sort_param())
    }

    pub fn build_create(input: &CreateColecao) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::new(HttpMethod::Post, COLECOES_PATH).with_json_body(body))
    }

    pub fn build_update(colecao: &Colecao, id: i64) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(colecao).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::new(HttpMethod::Put, format!("{COLECOES_PATH}/{id}")).with_json_body(body))
    }

    pub fn build_delete(id: i64) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, format!("{COLECOES_PATH}/{id}"))
    }

    /// Shape a listing body into a `PageResult`.
    ///
    /// A body whose `content` is missing or not an array yields an empty
    /// page with `{}` pagination.
    pub fn parse_find_search(body: Value) -> Result<PageResult, ApiError> {
        let content = match body.get("content") {
            Some(content @ Value::Array(_)) => content.clone(),
            _ => return Ok(PageResult::empty()),
        };
        let items = serde_json::from_value(content).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        Ok(PageResult {
            items,
            pagination: body,
        })
    }

    pub fn parse_create(body: Value) -> Result<Colecao, ApiError> {
        serde_json::from_value(body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Rewrap a failed create: HTTP and transport failures become
    /// `Rejected` with the JSON text of the error body (`null` when there
    /// was no response). Other errors pass through.
    pub fn reject_create(err: ApiError) -> ApiError {
        let data = match &err {
            ApiError::Http { body, .. } => parse_body(body),
            ApiError::Transport(_) => Value::Null,
            _ => return err,
        };
        ApiError::Rejected(data.to_string())
    }

    pub fn find_search(&self, request: &PageRequest) -> Result<PageResult, ApiError> {
        let body = self.client.send(Self::build_find_search(request))?;
        Self::parse_find_search(body)
    }

    pub fn create(&self, input: &CreateColecao) -> Result<Colecao, ApiError> {
        let request = Self::build_create(input)?;
        let body = self.client.send(request).map_err(Self::reject_create)?;
        Self::parse_create(body)
    }

    /// Replace collection `id`; returns the server's body as sent.
    pub fn update(&self, colecao: &Colecao, id: i64) -> Result<Value, ApiError> {
        self.client.send(Self::build_update(colecao, id)?)
    }

    pub fn delete(&self, id: i64) -> Result<Value, ApiError> {
        self.client.send(Self::build_delete(id))
    }
}
