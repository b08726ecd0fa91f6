use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, PASSWORD, USERNAME};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(http::header::COOKIE, cookie);
    }
    builder.body(body.to_string()).unwrap()
}

/// Log in and return the session cookie pair (`mojolicious=<token>`).
async fn login(app: &axum::Router) -> String {
    let body = format!(r#"{{"u":"{USERNAME}","p":"{PASSWORD}"}}"#);
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/1.3/user/login", None, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
        .headers()
        .get(http::header::SET_COOKIE)
        .expect("login must set a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().trim().to_string()
}

// --- login ---

#[tokio::test]
async fn login_sets_mojolicious_cookie() {
    let app = app();
    let cookie = login(&app).await;
    assert!(cookie.starts_with("mojolicious="));
}

#[tokio::test]
async fn login_with_bad_credentials_returns_401() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/1.3/user/login",
            None,
            r#"{"u":"admin","p":"wrong"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["alerts"][0]["level"], "error");
    assert_eq!(body["alerts"][0]["text"], "Invalid username or password.");
}

#[tokio::test]
async fn login_with_unknown_version_returns_404() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/9.9/user/login",
            None,
            r#"{"u":"admin","p":"twelve!12"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- authorization ---

#[tokio::test]
async fn cdns_without_cookie_returns_401() {
    let app = app();
    let resp = app
        .oneshot(json_request("GET", "/api/1.3/cdns", None, ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["alerts"][0]["text"], "Unauthorized, please log in.");
}

#[tokio::test]
async fn cdns_with_stale_cookie_returns_401() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "GET",
            "/api/1.3/cdns",
            Some("mojolicious=not-a-real-token"),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- cdns ---

#[tokio::test]
async fn cdn_crud_lifecycle() {
    let app = app();
    let cookie = login(&app).await;

    // Empty to start.
    let resp = app
        .clone()
        .oneshot(json_request("GET", "/api/1.3/cdns", Some(&cookie), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["response"], serde_json::json!([]));

    // Create.
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/1.3/cdns",
            Some(&cookie),
            r#"{"name":"edge","domainName":"edge.example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let id = body["response"]["id"].as_i64().unwrap();
    assert_eq!(body["response"]["name"], "edge");

    // Lookup by id answers a one-element list.
    let resp = app
        .clone()
        .oneshot(json_request(
            "GET",
            &format!("/api/1.2/cdns/{id}"),
            Some(&cookie),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["response"][0]["domainName"], "edge.example.com");

    // Update.
    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/1.3/cdns/{id}"),
            Some(&cookie),
            r#"{"dnssecEnabled":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["response"]["dnssecEnabled"], true);

    // Delete, then 404 with the alerts envelope.
    let resp = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/1.3/cdns/{id}"),
            Some(&cookie),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(json_request(
            "GET",
            &format!("/api/1.2/cdns/{id}"),
            Some(&cookie),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["alerts"][0]["text"], "not found");
}

// --- delivery service server paging ---

#[tokio::test]
async fn assignments_are_paged() {
    let app = app();
    let cookie = login(&app).await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/1.3/deliveryserviceserver",
            Some(&cookie),
            r#"{"dsId":1,"servers":[1,2,3,4,5,6,7]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let mut sizes = Vec::new();
    for page in 1..=4 {
        let resp = app
            .clone()
            .oneshot(json_request(
                "GET",
                &format!("/api/1.3/deliveryserviceserver?limit=3&page={page}"),
                Some(&cookie),
                "",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        sizes.push(body["response"].as_array().unwrap().len());
    }
    assert_eq!(sizes, vec![3, 3, 1, 0]);
}
