use async_trait::async_trait;
use reqwest::{Client, StatusCode, redirect};
use sharelink::routes;
use sharelink::services::{
    key_service::KeyGenerator,
    link_service::LinkResolver,
    object_store::{MemoryStore, ObjectStore, StoreError, StoreResult},
    share_service::ShareService,
};
use std::{path::Path, sync::Arc};
use tokio::{io::AsyncRead, net::TcpListener};

const BASE_LINK: &str = "https://x.io/";
const PREFIX: &str = "s/";

// Helper to spawn the gateway on a random port against an injected backend
async fn spawn_server(store: Arc<dyn ObjectStore>) -> String {
    let service = ShareService::new(
        store,
        KeyGenerator::new(),
        LinkResolver::new(BASE_LINK.into(), PREFIX.into()),
    );
    let app = routes::routes::routes().with_state(service);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn file_form(bytes: &[u8], content_type: &str) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(bytes.to_vec())
        .file_name("clip.mp4")
        .mime_str(content_type)
        .unwrap();
    reqwest::multipart::Form::new().part("file", part)
}

// Checks the `prefix + 4 digits` shape and returns the numeric suffix.
fn assert_object_key(key: &str) -> u32 {
    let digits = key
        .strip_prefix(PREFIX)
        .expect("key carries the configured prefix");
    assert_eq!(digits.len(), 4, "suffix is four digits: {}", key);
    let value: u32 = digits.parse().expect("suffix is numeric");
    assert!((1000..2000).contains(&value), "suffix out of range: {}", value);
    value
}

// A backend whose writes always fail, for the opaque-error path.
struct FailingStore;

#[async_trait]
impl ObjectStore for FailingStore {
    async fn put_stream(
        &self,
        _key: &str,
        _reader: &mut (dyn AsyncRead + Send + Unpin),
        _content_type: &str,
    ) -> StoreResult<u64> {
        Err(StoreError::UnexpectedStatus(503))
    }

    async fn get_to_file(&self, key: &str, _dest: &Path) -> StoreResult<()> {
        Err(StoreError::ObjectNotFound(key.to_string()))
    }

    async fn bucket_exists(&self) -> StoreResult<bool> {
        Ok(true)
    }

    async fn make_bucket(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn upload_returns_generated_key_and_stores_the_bytes() {
    let store = MemoryStore::new();
    let base_url = spawn_server(Arc::new(store.clone())).await;
    let client = Client::new();

    let res = client
        .post(format!("{}/api/upload", base_url))
        .multipart(file_form(b"movie bytes", "video/mp4"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let key = body["key"].as_str().expect("key field");
    assert_object_key(key);

    let blob = store.blob(key).expect("object stored at exactly prefix+key");
    assert_eq!(&blob.data[..], b"movie bytes");
    assert_eq!(blob.content_type, "video/mp4");
}

#[tokio::test]
async fn upload_with_sharing_returns_a_full_link() {
    let store = MemoryStore::new();
    let base_url = spawn_server(Arc::new(store.clone())).await;
    let client = Client::new();

    let res = client
        .post(format!("{}/api/upload?sharing=true", base_url))
        .multipart(file_form(b"shared bytes", "video/mp4"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let link = body["link"].as_str().expect("link field");
    let key = link
        .strip_prefix(BASE_LINK)
        .expect("link starts with the base link");
    assert_object_key(key);
    assert!(store.blob(key).is_some(), "link points at the stored object");
}

#[tokio::test]
async fn upload_without_file_field_is_a_client_error() {
    let base_url = spawn_server(Arc::new(MemoryStore::new())).await;
    let client = Client::new();

    let form = reqwest::multipart::Form::new().text("comment", "no file here");
    let res = client
        .post(format!("{}/api/upload", base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_ignores_a_client_supplied_key_hint() {
    let store = MemoryStore::new();
    let base_url = spawn_server(Arc::new(store.clone())).await;
    let client = Client::new();

    let form = file_form(b"hinted", "text/plain").text("key", "my-custom-key");
    let res = client
        .post(format!("{}/api/upload", base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let key = body["key"].as_str().unwrap();
    assert_object_key(key);
    assert!(store.blob("s/my-custom-key").is_none());
}

#[tokio::test]
async fn storage_failure_surfaces_an_opaque_500() {
    let base_url = spawn_server(Arc::new(FailingStore)).await;
    let client = Client::new();

    let res = client
        .post(format!("{}/api/upload", base_url))
        .multipart(file_form(b"doomed", "video/mp4"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "something went wrong");
}

#[tokio::test]
async fn link_resolution_returns_all_forms_as_json() {
    let base_url = spawn_server(Arc::new(MemoryStore::new())).await;
    let client = Client::new();

    let res = client
        .get(format!("{}/api/link/1042", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["key"], "1042");
    assert_eq!(body["stream"], "https://x.io/s/1042");
    assert_eq!(body["iosVlc"], "vlc://https://x.io/s/1042");
}

#[tokio::test]
async fn ios_flag_redirects_to_the_player_scheme() {
    let base_url = spawn_server(Arc::new(MemoryStore::new())).await;
    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();

    let res = client
        .get(format!("{}/api/link/1042?ios=1", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        res.headers().get("location").unwrap(),
        "vlc://https://x.io/s/1042"
    );
}

#[tokio::test]
async fn ios_takes_precedence_over_stream() {
    let base_url = spawn_server(Arc::new(MemoryStore::new())).await;
    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();

    let res = client
        .get(format!("{}/api/link/1042?ios=1&stream=1", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        res.headers().get("location").unwrap(),
        "vlc://https://x.io/s/1042"
    );
}

#[tokio::test]
async fn stream_flag_redirects_to_the_share_link() {
    let base_url = spawn_server(Arc::new(MemoryStore::new())).await;
    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();

    let res = client
        .get(format!("{}/api/link/1042?stream=yes", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers().get("location").unwrap(), "https://x.io/s/1042");
}

#[tokio::test]
async fn empty_flag_values_are_falsy() {
    let base_url = spawn_server(Arc::new(MemoryStore::new())).await;
    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();

    // Present but empty flags fall through to the JSON body.
    let res = client
        .get(format!("{}/api/link/1042?ios=&stream=", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["key"], "1042");
}

#[tokio::test]
async fn upload_then_resolve_points_at_the_stored_object() {
    let store = MemoryStore::new();
    let base_url = spawn_server(Arc::new(store.clone())).await;
    let client = Client::new();

    let res = client
        .post(format!("{}/api/upload", base_url))
        .multipart(file_form(b"round trip", "video/mp4"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let object_key = body["key"].as_str().unwrap().to_string();
    let key = object_key.strip_prefix(PREFIX).unwrap();

    let res = client
        .get(format!("{}/api/link/{}", base_url, key))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let links: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        links["stream"],
        format!("{}{}", BASE_LINK, object_key),
        "stream URL points at the exact stored path"
    );
    assert!(store.blob(&object_key).is_some());
}

#[tokio::test]
async fn concurrent_uploads_all_succeed() {
    let store = MemoryStore::new();
    let base_url = spawn_server(Arc::new(store.clone())).await;
    let client = Client::new();

    let uploads = (0..8).map(|i| {
        let client = client.clone();
        let base_url = base_url.clone();
        async move {
            client
                .post(format!("{}/api/upload", base_url))
                .multipart(file_form(format!("payload {}", i).as_bytes(), "text/plain"))
                .send()
                .await
                .unwrap()
        }
    });

    // Colliding keys overwrite silently; every request still answers 200.
    for res in futures::future::join_all(uploads).await {
        assert_eq!(res.status(), StatusCode::OK);
    }
    assert!(store.object_count() >= 1);
}
