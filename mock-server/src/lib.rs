use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const API_VERSION: &str = "3";

pub static API_VERSION_HEADER: HeaderName = HeaderName::from_static("zotero-api-version");
pub static API_KEY_HEADER: HeaderName = HeaderName::from_static("zotero-api-key");
pub static TOTAL_RESULTS_HEADER: HeaderName = HeaderName::from_static("total-results");
pub static LAST_MODIFIED_VERSION_HEADER: HeaderName =
    HeaderName::from_static("last-modified-version");
pub static IF_MODIFIED_SINCE_VERSION_HEADER: HeaderName =
    HeaderName::from_static("if-modified-since-version");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    User,
    Group,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub key: String,
    pub version: u64,
    #[serde(rename = "itemType")]
    pub item_type: String,
    pub title: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyInfo {
    pub key: String,
    #[serde(rename = "userID")]
    pub user_id: u64,
    pub username: String,
}

#[derive(Clone, Debug, Default)]
pub struct Library {
    pub version: u64,
    pub items: Vec<Item>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub libraries: HashMap<(LibraryType, u64), Library>,
    pub keys: HashMap<String, KeyInfo>,
}

pub type Db = Arc<RwLock<Store>>;

/// Fixture data: user 475425 with two items, empty group 1, one API key.
pub fn seed() -> Store {
    let mut store = Store::default();
    store.libraries.insert(
        (LibraryType::User, 475425),
        Library {
            version: 42,
            items: vec![
                Item {
                    key: "X42A7DEE".to_string(),
                    version: 40,
                    item_type: "book".to_string(),
                    title: "Structure and Interpretation of Computer Programs".to_string(),
                },
                Item {
                    key: "BM3HPQ9R".to_string(),
                    version: 42,
                    item_type: "journalArticle".to_string(),
                    title: "A Relational Model of Data for Large Shared Data Banks".to_string(),
                },
            ],
        },
    );
    store
        .libraries
        .insert((LibraryType::Group, 1), Library { version: 7, items: Vec::new() });
    store.keys.insert(
        "P9NiFoyLeZu2bZNvvuQPDWsd".to_string(),
        KeyInfo {
            key: "P9NiFoyLeZu2bZNvvuQPDWsd".to_string(),
            user_id: 475425,
            username: "librarian".to_string(),
        },
    );
    store
}

pub fn app() -> Router {
    app_with(seed())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/users/{user_id}/items", get(list_user_items))
        .route("/users/{user_id}/items/{key}", get(get_user_item))
        .route("/groups/{group_id}/items", get(list_group_items))
        .route("/keys/current", get(current_key))
        .route("/empty", get(empty))
        .layer(middleware::from_fn(require_api_version))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Reject requests that do not speak API version 3, and stamp the version on
/// every response that gets through.
async fn require_api_version(request: Request, next: Next) -> Response {
    let version = request
        .headers()
        .get(&API_VERSION_HEADER)
        .and_then(|v| v.to_str().ok());
    if version != Some(API_VERSION) {
        tracing::debug!(?version, "rejecting request with unsupported api version");
        return (StatusCode::BAD_REQUEST, "Invalid or missing Zotero-API-Version").into_response();
    }
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(API_VERSION_HEADER.clone(), HeaderValue::from_static(API_VERSION));
    response
}

async fn list_user_items(
    State(db): State<Db>,
    Path(user_id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    list_items(&db, LibraryType::User, user_id, &headers).await
}

async fn list_group_items(
    State(db): State<Db>,
    Path(group_id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    list_items(&db, LibraryType::Group, group_id, &headers).await
}

async fn list_items(db: &Db, kind: LibraryType, id: u64, headers: &HeaderMap) -> Response {
    let store = db.read().await;
    let Some(library) = store.libraries.get(&(kind, id)) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    let since = headers
        .get(&IF_MODIFIED_SINCE_VERSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if since.is_some_and(|since| since >= library.version) {
        return (
            StatusCode::NOT_MODIFIED,
            [(LAST_MODIFIED_VERSION_HEADER.clone(), library.version.to_string())],
        )
            .into_response();
    }

    (
        [
            (TOTAL_RESULTS_HEADER.clone(), library.items.len().to_string()),
            (LAST_MODIFIED_VERSION_HEADER.clone(), library.version.to_string()),
        ],
        Json(library.items.clone()),
    )
        .into_response()
}

async fn get_user_item(
    State(db): State<Db>,
    Path((user_id, key)): Path<(u64, String)>,
) -> Response {
    let store = db.read().await;
    let item = store
        .libraries
        .get(&(LibraryType::User, user_id))
        .and_then(|library| library.items.iter().find(|item| item.key == key));
    match item {
        Some(item) => (
            [(LAST_MODIFIED_VERSION_HEADER.clone(), item.version.to_string())],
            Json(item.clone()),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// 200 with a zero-length body.
async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn current_key(State(db): State<Db>, headers: HeaderMap) -> Response {
    let Some(key) = headers.get(&API_KEY_HEADER).and_then(|v| v.to_str().ok()) else {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    };
    let store = db.read().await;
    match store.keys.get(key) {
        Some(info) => Json(info.clone()).into_response(),
        None => (StatusCode::FORBIDDEN, "Invalid key").into_response(),
    }
}
