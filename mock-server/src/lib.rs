use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub quantity: Option<u32>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Item>>>;

type ApiError = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/items", post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).patch(update_item),
        )
        .route("/status/{code}", get(status))
        .route("/headers", get(echo_headers))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found(id: Uuid) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("item {id} not found") })),
    )
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<NewItem>,
) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
        quantity: input.quantity,
    };
    db.write().await.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Item>, ApiError> {
    let items = db.read().await;
    items.get(&id).cloned().map(Json).ok_or_else(|| not_found(id))
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(changes): Json<ItemChanges>,
) -> Result<Json<Item>, ApiError> {
    let mut items = db.write().await;
    let item = items.get_mut(&id).ok_or_else(|| not_found(id))?;
    if let Some(name) = changes.name {
        item.name = name;
    }
    if let Some(quantity) = changes.quantity {
        item.quantity = quantity;
    }
    Ok(Json(item.clone()))
}

/// Answers with whatever status the path asks for, body empty.
async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/// Echoes the request headers back as a JSON object.
async fn echo_headers(headers: HeaderMap) -> Json<HashMap<String, String>> {
    Json(
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
    )
}
