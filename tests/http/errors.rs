use serde_json::json;

use crate::support::{read, spawn_app, stalled_contacts, start_server};

const NOT_FOUND: &str = "the requested resource could not be found";

#[tokio::test]
async fn bad_identifiers_are_404() {
    let app = spawn_app().await;
    app.create_contact("Jane Q Public", "555").await;

    for query in ["", "?id=", "?id=0", "?id=-1", "?id=abc", "?id=99", "?other=1"] {
        let resp = app
            .client
            .get(app.url(&format!("/contact{query}")))
            .send()
            .await
            .unwrap();
        let (status, body) = read(resp).await;
        assert_eq!(status, 404, "{query}");
        assert_eq!(body["error"], NOT_FOUND);

        let resp = app
            .client
            .delete(app.url(&format!("/contact{query}")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404, "{query}");
    }
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = spawn_app().await;
    let resp = app.client.get(app.url("/contacts")).send().await.unwrap();
    assert_eq!(resp.headers()["content-type"], "application/json");
    let (status, body) = read(resp).await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({ "error": NOT_FOUND }));
}

#[tokio::test]
async fn unsupported_methods_are_json_405() {
    let app = spawn_app().await;
    let cases = [
        (reqwest::Method::PATCH, "/contact?id=1"),
        (reqwest::Method::POST, "/contact/healthcheck"),
        (reqwest::Method::DELETE, "/group/healthcheck"),
    ];
    for (method, path) in cases {
        let resp = app
            .client
            .request(method.clone(), app.url(path))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.headers()["content-type"], "application/json", "{method} {path}");
        assert!(resp.headers().contains_key("allow"), "{method} {path}");
        let (status, body) = read(resp).await;
        assert_eq!(status, 405, "{method} {path}");
        assert_eq!(
            body["error"],
            format!("the {method} method is not supported for this resource")
        );
    }
}

#[tokio::test]
async fn malformed_bodies_are_400() {
    let app = spawn_app().await;
    let cases = [
        ("", "body must not be empty"),
        ("{\"full_name\": ", "body contains badly-formed JSON"),
        ("{\"email\": \"x\"}", "body contains unknown key \"email\""),
        ("{\"phone\": 5}", "body contains incorrect JSON type"),
        ("{} {}", "body must only contain a single JSON value"),
    ];
    for (raw, expected) in cases {
        let resp = app
            .client
            .post(app.url("/contact"))
            .header("content-type", "application/json")
            .body(raw)
            .send()
            .await
            .unwrap();
        let (status, body) = read(resp).await;
        assert_eq!(status, 400, "{raw}");
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with(expected), "{raw}: {message}");
    }
}

#[tokio::test]
async fn oversized_body_is_400() {
    let app = spawn_app().await;
    let padding = "x".repeat(contact_service::http::MAX_BODY_BYTES + 1);
    let resp = app
        .client
        .post(app.url("/group"))
        .header("content-type", "application/json")
        .body(format!("{{\"group_name\": \"{padding}\"}}"))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "body must not be larger than 1048576 bytes");
}

#[tokio::test]
async fn elapsed_deadline_is_opaque_500() {
    let app = start_server(stalled_contacts()).await;

    let resp = app.client.get(app.url("/contact?id=1")).send().await.unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, 500);
    assert_eq!(
        body["error"],
        "the server encountered a problem and could not process your request"
    );

    // Healthchecks never touch storage.
    let resp = app
        .client
        .get(app.url("/contact/healthcheck"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}
