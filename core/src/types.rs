//! Domain DTOs for the collection API.
//!
//! # Design
//! These mirror the back end's `Colecao` entity and Spring page shape but
//! are defined independently from the mock-server crate; integration tests
//! catch schema drift.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A library collection as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Colecao {
    pub id: i64,
    pub nome: String,
    pub descricao: String,
}

/// Payload for creating a collection; the server assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateColecao {
    pub nome: String,
    pub descricao: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            key: key.into(),
            order,
        }
    }
}

/// Parameters of one listing query, as a data table hands them over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    /// Zero is refused when decoding; the server rejects `size=0`.
    pub items_per_page: NonZeroU32,
    /// Only the first entry is used.
    #[serde(default)]
    pub sort_by: Vec<SortSpec>,
    #[serde(default)]
    pub search: String,
}

impl PageRequest {
    pub fn new(page: u32, items_per_page: NonZeroU32) -> Self {
        Self {
            page,
            items_per_page,
            sort_by: Vec::new(),
            search: String::new(),
        }
    }

    pub fn sorted_by(mut self, key: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = vec![SortSpec::new(key, order)];
        self
    }

    pub fn searching(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// The `sort` query value, `"<key>,<order>"`, defaulting to `"id,desc"`.
    pub fn sort_param(&self) -> String {
        let first = self.sort_by.first();
        let key = first
            .map(|s| s.key.as_str())
            .filter(|k| !k.is_empty())
            .unwrap_or("id");
        let order = first.map(|s| s.order).unwrap_or(SortOrder::Desc);
        format!("{key},{}", order.as_str())
    }
}

/// One page of collections plus the server's paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<Colecao>,
    /// The whole response body, or `{}` when it carried no `content`.
    pub pagination: Value,
}

impl PageResult {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            pagination: Value::Object(Map::new()),
        }
    }

    fn meta(&self, field: &str) -> Option<u64> {
        self.pagination.get(field)?.as_u64()
    }

    pub fn total_elements(&self) -> Option<u64> {
        self.meta("totalElements")
    }

    pub fn total_pages(&self) -> Option<u64> {
        self.meta("totalPages")
    }

    pub fn page_number(&self) -> Option<u64> {
        self.meta("number")
    }

    pub fn page_size(&self) -> Option<u64> {
        self.meta("size")
    }
}
