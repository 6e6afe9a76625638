//! In-memory stand-in for the library back end's `/colecoes` API.
//!
//! Responses follow the real server: listings are Spring pages, bodies are
//! JSOG-encoded and failures carry a `userMessage` for the front end.

pub mod jsog;

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Livro {
    pub id: i64,
    pub titulo: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colecao {
    pub id: i64,
    pub nome: String,
    pub descricao: String,
    #[serde(default)]
    pub livros: Vec<Livro>,
}

/// Create and update payload. An `id` in an update body is ignored.
#[derive(Debug, Deserialize)]
pub struct ColecaoInput {
    pub nome: String,
    pub descricao: String,
}

#[derive(Debug, Default)]
pub struct Store {
    last_id: i64,
    colecoes: BTreeMap<i64, Colecao>,
}

impl Store {
    /// Insert a collection with books attached, bypassing validation.
    pub fn seed(&mut self, nome: &str, descricao: &str, livros: Vec<Livro>) -> i64 {
        self.last_id += 1;
        let id = self.last_id;
        self.colecoes.insert(
            id,
            Colecao {
                id,
                nome: nome.to_string(),
                descricao: descricao.to_string(),
                livros,
            },
        );
        id
    }

    fn nome_taken(&self, nome: &str, except: Option<i64>) -> bool {
        self.colecoes
            .values()
            .any(|c| c.nome == nome && Some(c.id) != except)
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error answer in the back end's shape.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    user_message: String,
    details: Vec<String>,
}

impl ApiFailure {
    fn new(status: StatusCode, user_message: impl Into<String>) -> Self {
        Self {
            status,
            user_message: user_message.into(),
            details: Vec::new(),
        }
    }

    fn not_found(id: i64) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("Coleção com id {id} não encontrada."),
        )
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        tracing::warn!(status = %self.status, message = %self.user_message, "request rejected");
        let mut body = json!({
            "status": self.status.as_u16(),
            "error": self.status.canonical_reason().unwrap_or_default(),
            "userMessage": self.user_message,
        });
        if !self.details.is_empty() {
            body["details"] = json!(self.details);
        }
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/colecoes", get(list_colecoes).post(create_colecao))
        .route(
            "/colecoes/{id}",
            get(get_colecao).put(update_colecao).delete(delete_colecao),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(store)).await
}

fn encoded<T: Serialize>(value: &T) -> Json<Value> {
    Json(jsog::encode(&json!(value)))
}

/// Apply the entity rules: `nome` is trimmed and lower-cased and must hold
/// 3 to 100 characters, `descricao` is trimmed and must not be blank.
fn validate(input: ColecaoInput) -> Result<ColecaoInput, ApiFailure> {
    let nome = input.nome.trim().to_lowercase();
    let descricao = input.descricao.trim().to_string();

    let mut details = Vec::new();
    let len = nome.chars().count();
    if !(3..=100).contains(&len) {
        details.push("O nome deve ter entre 3 e 100 caracteres.".to_string());
    }
    if descricao.is_empty() {
        details.push("A descrição não pode estar em branco.".to_string());
    }
    if !details.is_empty() {
        return Err(ApiFailure {
            status: StatusCode::BAD_REQUEST,
            user_message: "Dados inválidos.".to_string(),
            details,
        });
    }
    Ok(ColecaoInput { nome, descricao })
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub page: usize,
    pub size: Option<usize>,
    pub sort: Option<String>,
}

fn sort_colecoes(colecoes: &mut [Colecao], sort: Option<&str>) -> Result<(), ApiFailure> {
    let (field, order) = match sort {
        Some(sort) => sort.split_once(',').unwrap_or((sort, "asc")),
        None => ("id", "asc"),
    };
    match field {
        "id" => colecoes.sort_by_key(|c| c.id),
        "nome" => colecoes.sort_by(|a, b| a.nome.cmp(&b.nome)),
        "descricao" => colecoes.sort_by(|a, b| a.descricao.cmp(&b.descricao)),
        other => {
            return Err(ApiFailure::new(
                StatusCode::BAD_REQUEST,
                format!("Não é possível ordenar por '{other}'."),
            ))
        }
    }
    if order.eq_ignore_ascii_case("desc") {
        colecoes.reverse();
    }
    Ok(())
}

async fn list_colecoes(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiFailure> {
    let size = params.size.unwrap_or(DEFAULT_PAGE_SIZE);
    if size == 0 {
        return Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "O tamanho da página deve ser maior que zero.",
        ));
    }

    let needle = params.search.to_lowercase();
    let mut matching: Vec<Colecao> = db
        .read()
        .await
        .colecoes
        .values()
        .filter(|c| {
            needle.is_empty()
                || c.nome.to_lowercase().contains(&needle)
                || c.descricao.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    sort_colecoes(&mut matching, params.sort.as_deref())?;

    let total = matching.len();
    let total_pages = total.div_ceil(size);
    let content: Vec<Colecao> = matching
        .into_iter()
        .skip(params.page * size)
        .take(size)
        .collect();
    let count = content.len();

    let page = json!({
        "content": content,
        "totalElements": total,
        "totalPages": total_pages,
        "number": params.page,
        "size": size,
        "numberOfElements": count,
        "first": params.page == 0,
        "last": params.page + 1 >= total_pages,
        "empty": count == 0,
    });
    Ok(Json(jsog::encode(&page)))
}

async fn get_colecao(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    let colecao = store.colecoes.get(&id).ok_or_else(|| ApiFailure::not_found(id))?;
    Ok(encoded(colecao))
}

async fn create_colecao(
    State(db): State<Db>,
    Json(input): Json<ColecaoInput>,
) -> Result<(StatusCode, Json<Value>), ApiFailure> {
    let input = validate(input)?;
    let mut store = db.write().await;
    if store.nome_taken(&input.nome, None) {
        return Err(ApiFailure::new(
            StatusCode::CONFLICT,
            "Já existe uma coleção com esse nome.",
        ));
    }
    let id = store.seed(&input.nome, &input.descricao, Vec::new());
    tracing::info!(id, nome = %input.nome, "created colecao");
    Ok((StatusCode::CREATED, encoded(&store.colecoes[&id])))
}

async fn update_colecao(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<ColecaoInput>,
) -> Result<Json<Value>, ApiFailure> {
    let input = validate(input)?;
    let mut store = db.write().await;
    if !store.colecoes.contains_key(&id) {
        return Err(ApiFailure::not_found(id));
    }
    if store.nome_taken(&input.nome, Some(id)) {
        return Err(ApiFailure::new(
            StatusCode::CONFLICT,
            "Já existe uma coleção com esse nome.",
        ));
    }
    let colecao = store
        .colecoes
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found(id))?;
    colecao.nome = input.nome;
    colecao.descricao = input.descricao;
    tracing::info!(id, "updated colecao");
    Ok(encoded(&*colecao))
}

async fn delete_colecao(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    let colecao = store.colecoes.get(&id).ok_or_else(|| ApiFailure::not_found(id))?;
    if !colecao.livros.is_empty() {
        return Err(ApiFailure::new(
            StatusCode::CONFLICT,
            "A coleção possui livros vinculados e não pode ser excluída.",
        ));
    }
    store.colecoes.remove(&id);
    tracing::info!(id, "deleted colecao");
    Ok(StatusCode::NO_CONTENT)
}
