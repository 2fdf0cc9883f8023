use super::*;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    created: Arc<Mutex<Vec<Value>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

async fn handle_list() -> Json<Value> {
    Json(json!({
        "-Na1": {"title": "A New Hope", "openingText": "It is a period\nof civil war.", "releaseDate": "1977-05-25"},
        "-Nb2": {"title": "Empire", "openingText": "It is a dark time", "releaseDate": "1980-05-17"}
    }))
}

async fn handle_create(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
    state.created.lock().await.push(body);
    Json(json!({"name": "-Nc3"}))
}

async fn handle_delete(
    State(state): State<ServerState>,
    Path(file): Path<String>,
) -> StatusCode {
    state.deleted.lock().await.push(file);
    StatusCode::OK
}

async fn spawn_store_server() -> (String, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::default();
    let app = Router::new()
        .route("/movies.json", get(handle_list).post(handle_create))
        .route("/movies/:file", delete(handle_delete))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

async fn spawn_failing_server(status: StatusCode) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/movies.json", get(move || async move { status }).post(move || async move { status }))
        .route("/movies/:file", delete(move || async move { status }));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[test]
fn builds_collection_and_item_urls_under_base_path() {
    let store = HttpMovieStore::new("https://db.example.test/root/", BackendShape::Firebase)
        .expect("store");
    assert_eq!(
        store.collection_url().as_str(),
        "https://db.example.test/root/movies.json"
    );
    assert_eq!(
        store.item_url(&RecordId::from("-Na1")).as_str(),
        "https://db.example.test/root/movies/-Na1.json"
    );
}

#[test]
fn item_url_keeps_the_id_in_one_segment() {
    let store = HttpMovieStore::new("https://db.example.test", BackendShape::Firebase)
        .expect("store");
    assert_eq!(
        store.item_url(&RecordId::from("a b/c")).as_str(),
        "https://db.example.test/movies/a%20b%2Fc.json"
    );
}

#[test]
fn rejects_bases_that_cannot_carry_a_path() {
    let err = HttpMovieStore::new("mailto:movies@example.test", BackendShape::Firebase)
        .err()
        .expect("mailto is not a base");
    assert!(matches!(err, StoreError::InvalidUrl(_)));
    assert!(HttpMovieStore::new("not a url", BackendShape::Firebase).is_err());
}

#[tokio::test]
async fn list_decodes_firebase_collection() {
    let (server_url, _state) = spawn_store_server().await;
    let store = HttpMovieStore::new(&server_url, BackendShape::Firebase).expect("store");

    let records = store.list().await.expect("list");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, RecordId::from("-Na1"));
    assert_eq!(records[0].opening_text, "It is a period\nof civil war.");
    assert_eq!(records[1].title, "Empire");
}

#[tokio::test]
async fn create_posts_camel_case_draft() {
    let (server_url, state) = spawn_store_server().await;
    let store = HttpMovieStore::new(&server_url, BackendShape::Firebase).expect("store");
    let draft = Draft {
        title: "X".into(),
        opening_text: "Y".into(),
        release_date: "2020-01-01".into(),
    };

    store.create(&draft).await.expect("create");

    let created = state.created.lock().await;
    assert_eq!(
        created.as_slice(),
        &[json!({"title": "X", "openingText": "Y", "releaseDate": "2020-01-01"})]
    );
}

#[tokio::test]
async fn delete_addresses_the_item_document() {
    let (server_url, state) = spawn_store_server().await;
    let store = HttpMovieStore::new(&server_url, BackendShape::Firebase).expect("store");

    store.delete(&RecordId::from("abc")).await.expect("delete");

    assert_eq!(state.deleted.lock().await.as_slice(), &["abc.json".to_string()]);
}

#[tokio::test]
async fn non_success_status_maps_to_http_error() {
    let server_url = spawn_failing_server(StatusCode::INTERNAL_SERVER_ERROR).await;
    let store = HttpMovieStore::new(&server_url, BackendShape::Firebase).expect("store");

    assert_eq!(
        store.list().await.expect_err("list must fail"),
        StoreError::Http { status: 500 }
    );
    assert_eq!(
        store.create(&Draft::default()).await.expect_err("create must fail"),
        StoreError::Http { status: 500 }
    );
    assert_eq!(
        store
            .delete(&RecordId::from("abc"))
            .await
            .expect_err("delete must fail"),
        StoreError::Http { status: 500 }
    );
}

#[tokio::test]
async fn unreachable_store_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let store = HttpMovieStore::new(&format!("http://{addr}"), BackendShape::Firebase)
        .expect("store");
    let err = store.list().await.expect_err("nothing listens");
    assert!(matches!(err, StoreError::Transport(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn wrong_shape_is_a_parse_error() {
    let (server_url, _state) = spawn_store_server().await;
    let store = HttpMovieStore::new(&server_url, BackendShape::Swapi).expect("store");

    let err = store.list().await.expect_err("firebase body under swapi adapter");
    assert!(matches!(err, StoreError::Parse(_)), "unexpected error: {err:?}");
}
