use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Received};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn form_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- GET ---

#[tokio::test]
async fn get_echoes_query_and_method() {
    let resp = app()
        .oneshot(get_request("/sparql?query=ASK%20%7B%7D"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = body_json(resp).await;
    let binding = &json["results"]["bindings"][0];
    assert_eq!(binding["method"]["value"], "GET");
    assert_eq!(binding["query"]["value"], "ASK {}");
}

#[tokio::test]
async fn get_without_query_returns_400() {
    let resp = app().oneshot(get_request("/sparql")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"missing query parameter");
}

// --- POST ---

#[tokio::test]
async fn post_form_echoes_query_and_method() {
    let resp = app()
        .oneshot(form_request(
            "/sparql",
            "query=PREFIX+wd%3A%3Chttp%3A%2F%2Fwww.wikidata.org%2Fentity%2F%3E+ASK+%7B%7D",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = body_json(resp).await;
    let binding = &json["results"]["bindings"][0];
    assert_eq!(binding["method"]["value"], "POST");
    assert_eq!(
        binding["query"]["value"],
        "PREFIX wd:<http://www.wikidata.org/entity/> ASK {}"
    );
}

#[tokio::test]
async fn post_with_empty_query_returns_400() {
    let resp = app().oneshot(form_request("/sparql", "query=")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_without_form_content_type_is_rejected() {
    let req = Request::builder()
        .method("POST")
        .uri("/sparql")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(r#"{"query":"ASK {}"}"#.to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

// --- log ---

#[tokio::test]
async fn received_lists_queries_in_order() {
    // Clones of the router share one log.
    let app = app();

    let resp = app.clone().oneshot(get_request("/sparql?query=first")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(form_request("/sparql", "query=second"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(get_request("/received")).await.unwrap();
    let received: Vec<Received> = body_json(resp).await;
    assert_eq!(
        received,
        vec![
            Received {
                method: "GET".to_string(),
                query: "first".to_string(),
            },
            Received {
                method: "POST".to_string(),
                query: "second".to_string(),
            },
        ]
    );
}

// --- failure ---

#[tokio::test]
async fn broken_returns_500_with_empty_body() {
    let resp = app().oneshot(get_request("/broken?query=x")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_bytes(resp).await.is_empty());
}
