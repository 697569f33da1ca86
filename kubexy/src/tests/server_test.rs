use std::fs;
use std::path::Path;

use assertables::*;
use rocket::http::{
    ContentType,
    Status,
};
use rocket::local::asynchronous::Client;

use super::*;
use crate::server::{
    self,
    ServerConfig,
};

struct BrokenExporter;

impl SnapshotSource for BrokenExporter {
    fn export_json(&self) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("could not encode pod snapshot"))
    }
}

fn missing_static_dir() -> ServerConfig {
    ServerConfig::new(0, Path::new("/nonexistent/kubexy-html"))
}

#[rstest]
#[tokio::test]
async fn test_view_pods(registry: PodRegistry) {
    let client = Client::tracked(server::build(SnapshotExporter::new(registry), &missing_static_dir()))
        .await
        .unwrap();

    let response = client.get("/view/pods").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::JSON));
    assert_eq!(
        response.into_string().await.unwrap(),
        r#"{"shop/web-1":{"name":"web-1","namespace":"shop","node":"node-a","ownerKind":"ReplicaSet","status":2,"size":12}}"#,
    );
}

#[rstest]
#[tokio::test]
async fn test_view_pods_tracks_registry(registry: PodRegistry) {
    let client = Client::tracked(server::build(SnapshotExporter::new(registry.clone()), &missing_static_dir()))
        .await
        .unwrap();

    registry.remove(&PodKey::new("shop", "web-1"));
    let response = client.get("/view/pods").dispatch().await;
    assert_eq!(response.into_string().await.unwrap(), "{}");
}

#[rstest]
#[tokio::test]
async fn test_static_assets(registry: PodRegistry) {
    let static_dir = std::env::temp_dir().join(format!("kubexy-static-{}", std::process::id()));
    fs::create_dir_all(&static_dir).unwrap();
    fs::write(static_dir.join("kubexy.js"), "var board;").unwrap();

    let config = ServerConfig::new(0, &static_dir);
    let client = Client::tracked(server::build(SnapshotExporter::new(registry), &config)).await.unwrap();

    let response = client.get("/kubexy.js").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_contains!(response.into_string().await.unwrap(), "var board");

    let response = client.get("/view/pods").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    fs::remove_dir_all(&static_dir).unwrap();
}

#[rstest]
#[tokio::test]
async fn test_unknown_route(registry: PodRegistry) {
    let client = Client::tracked(server::build(SnapshotExporter::new(registry), &missing_static_dir()))
        .await
        .unwrap();

    let response = client.get("/view/nodes").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rstest]
#[tokio::test]
async fn test_view_pods_export_failure() {
    let client = Client::tracked(server::build(BrokenExporter, &missing_static_dir())).await.unwrap();

    let response = client.get("/view/pods").dispatch().await;
    assert_eq!(response.status(), Status::InternalServerError);
}
