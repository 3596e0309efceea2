use mockito::{Matcher, Server};
use release_publisher::{
    CallContext, GitHubReleaseService, PublishError, Publisher, ReleaseAction, Settings,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn settings_for(dir: &TempDir) -> Settings {
    Settings {
        api_key: "test_token".to_string(),
        owner: "octo".to_string(),
        repo: "hello".to_string(),
        tag: "v1.0.0".to_string(),
        event: Some("tag".to_string()),
        title: "v1.0.0".to_string(),
        note: "First release".to_string(),
        files: vec![format!("{}/*.bin", dir.path().display())],
        ..Settings::default()
    }
}

fn publisher_for(server: &Server) -> Publisher<GitHubReleaseService> {
    let service = GitHubReleaseService::new("test_token")
        .with_api_url(&server.url())
        .with_upload_url(&server.url());
    Publisher::new(Arc::new(service), CallContext::new())
}

#[tokio::test]
async fn test_create_release_and_upload() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("out.bin"), "binary").unwrap();

    let mut server = Server::new_async().await;
    let lookup = server
        .mock("GET", "/repos/octo/hello/releases/tags/v1.0.0")
        .with_status(404)
        .with_body(r#"{"message": "Not Found"}"#)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/repos/octo/hello/releases")
        .match_header("authorization", "Bearer test_token")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "tag_name": "v1.0.0",
            "draft": false,
            "name": "v1.0.0"
        })))
        .with_status(201)
        .with_body(r#"{"id": 77, "tag_name": "v1.0.0", "draft": false, "prerelease": false}"#)
        .create_async()
        .await;
    let assets = server
        .mock("GET", "/repos/octo/hello/releases/77/assets")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/repos/octo/hello/releases/77/assets")
        .match_query(Matcher::UrlEncoded("name".into(), "out.bin".into()))
        .match_body("binary")
        .with_status(201)
        .with_body(r#"{"id": 900, "name": "out.bin", "size": 6}"#)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let report = publisher_for(&server)
        .publish_settings(&settings_for(&dir))
        .await
        .unwrap();

    lookup.assert_async().await;
    create.assert_async().await;
    assets.assert_async().await;
    upload.assert_async().await;
    delete.assert_async().await;
    assert_eq!(report.release_id, 77);
    assert_eq!(report.action, ReleaseAction::Created);
    assert_eq!(report.assets.uploaded, vec!["out.bin"]);
}

#[tokio::test]
async fn test_lookup_outage_does_not_create() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let _lookup = server
        .mock("GET", "/repos/octo/hello/releases/tags/v1.0.0")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;
    let create = server
        .mock("POST", "/repos/octo/hello/releases")
        .expect(0)
        .create_async()
        .await;

    let err = publisher_for(&server)
        .publish_settings(&settings_for(&dir))
        .await
        .unwrap_err();

    create.assert_async().await;
    assert!(matches!(err, PublishError::Release(_)));
    assert!(err.to_string().contains("bad gateway"));
}
