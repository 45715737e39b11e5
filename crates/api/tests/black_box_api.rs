use std::sync::Arc;

use chaintrack_api::app::{build_app, services::build_services};
use chaintrack_core::Identity;
use chaintrack_infra::LedgerConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

const ADMIN: &str = "0xADMIN";
const CALLER_HEADER: &str = "x-caller-identity";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(LedgerConfig::default()).await
    }

    async fn spawn_with(config: LedgerConfig) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let services = build_services(config, &Identity::new(ADMIN)).expect("ledger initializes");
        let app = build_app(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, caller: &str, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(self.url(path))
            .header(CALLER_HEADER, caller)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn send(&self, method: reqwest::Method, caller: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path)).header(CALLER_HEADER, caller);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, caller: &str, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, caller, path, Some(body)).await
    }

    async fn grant(&self, role: &str, account: &str) {
        let (status, body) = self
            .send(reqwest::Method::POST, ADMIN, &format!("/roles/{role}/{account}"), None)
            .await;
        assert_eq!(status, StatusCode::OK, "grant failed: {body}");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn caller_identity_required_for_ledger_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/products")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");

    let res = srv
        .client
        .get(srv.url("/products"))
        .header(CALLER_HEADER, "  ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_lifecycle_with_cold_chain_alert() {
    let srv = TestServer::spawn().await;
    srv.grant("MANUFACTURER", "0xM").await;
    srv.grant("HANDLER", "0xH").await;

    let (status, created) = srv
        .post("0xM", "/products", json!({ "name": "Vaccine", "description": "Covid vaccine" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["id"], 1);
    assert_eq!(created["status"], "CREATED");
    assert_eq!(created["manufacturer"], "0xM");
    assert!(created["qr_code"].as_str().unwrap().contains('1'));

    let (status, receipt) = srv
        .post(
            "0xH",
            "/products/1/updates",
            json!({ "location": "Warehouse", "notes": "ok", "status": "IN_STORAGE", "temperature": 1500 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert!(receipt["alert"].is_null());
    let first_seq = receipt["sequence_number"].as_u64().unwrap();

    let (status, receipt) = srv
        .post(
            "0xH",
            "/products/1/updates",
            json!({ "location": "Truck", "status": 1, "temperature": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_eq!(receipt["alert"]["product_id"], 1);
    assert_eq!(receipt["alert"]["temperature"], 100);

    let (status, product) = srv.get("0xAnyone", "/products/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["status"], "IN_TRANSIT");
    assert_eq!(product["status_code"], 1);
    assert_eq!(product["location"], "Truck");
    assert_eq!(product["temperature"], 100);
    assert_eq!(product["update_count"], 2);

    let (status, history) = srv.get("0xAnyone", "/products/1/updates").await;
    assert_eq!(status, StatusCode::OK);
    let items = history["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["location"], "Warehouse");
    assert_eq!(items[1]["notes"], "");

    let (status, update) = srv
        .get("0xAnyone", &format!("/products/1/updates/{first_seq}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(update["handler"], "0xH");
    assert_eq!(update["status"], "IN_STORAGE");
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let srv = TestServer::spawn().await;
    srv.grant("HANDLER", "0xH").await;

    // Handler is not a manufacturer.
    let (status, body) = srv
        .post("0xH", "/products", json!({ "name": "x", "description": "y" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = srv.get("0xH", "/products/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = srv.get("0xH", "/products/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let (status, body) = srv
        .post(ADMIN, "/products", json!({ "name": "  ", "description": "y" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, _) = srv
        .send(reqwest::Method::POST, ADMIN, "/roles/SUPERUSER/0xX", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Updating an unknown product reports NotFound even for an unauthorized caller.
    let (status, _) = srv
        .post(
            "0xNobody",
            "/products/7/updates",
            json!({ "location": "x", "status": 0, "temperature": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_grant_check_and_revoke() {
    let srv = TestServer::spawn().await;

    let (_, body) = srv.get("0xAnyone", "/roles/handler/0xH").await;
    assert_eq!(body["has_role"], false);

    srv.grant("handler", "0xH").await;
    let (_, body) = srv.get("0xAnyone", "/roles/handler/0xH").await;
    assert_eq!(body["has_role"], true);

    // Only the admin may grant.
    let (status, _) = srv
        .send(reqwest::Method::POST, "0xH", "/roles/HANDLER/0xOther", None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = srv
        .send(reqwest::Method::DELETE, ADMIN, "/roles/HANDLER/0xH", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = srv.get("0xAnyone", "/roles/HANDLER/0xH").await;
    assert_eq!(body["has_role"], false);
}

#[tokio::test]
async fn batches_group_products() {
    let srv = TestServer::spawn().await;

    for name in ["a", "b"] {
        let (status, _) = srv
            .post(ADMIN, "/products", json!({ "name": name, "description": "d" }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, batch) = srv.post(ADMIN, "/batches", json!({ "product_ids": [1, 2] })).await;
    assert_eq!(status, StatusCode::CREATED, "{batch}");
    assert_eq!(batch["id"], 1);
    assert_eq!(batch["product_ids"], json!([1, 2]));

    let (_, product) = srv.get(ADMIN, "/products/2").await;
    assert_eq!(product["batch_id"], 1);

    let (status, _) = srv.post(ADMIN, "/batches", json!({ "product_ids": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = srv.post(ADMIN, "/batches", json!({ "product_ids": [9] })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = srv.get(ADMIN, "/batches").await;
    assert_eq!(list["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn thresholds_can_be_changed_by_admin_only() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("0xAnyone", "/alerts/thresholds").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["min_temperature"], 1500);
    assert_eq!(body["max_temperature"], 2500);

    let (status, _) = srv
        .send(
            reqwest::Method::PUT,
            "0xAnyone",
            "/alerts/thresholds",
            Some(json!({ "min_temperature": -2000, "max_temperature": -1500 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv
        .send(
            reqwest::Method::PUT,
            ADMIN,
            "/alerts/thresholds",
            Some(json!({ "min_temperature": -2000, "max_temperature": -1500 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["min_temperature"], -2000);

    let (status, _) = srv
        .send(
            reqwest::Method::PUT,
            ADMIN,
            "/alerts/thresholds",
            Some(json!({ "min_temperature": 10, "max_temperature": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn event_log_is_paged_in_order() {
    let srv = TestServer::spawn().await;
    let (status, _) = srv
        .post(ADMIN, "/products", json!({ "name": "a", "description": "d" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, page) = srv.get(ADMIN, "/events?from=1&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let events = page["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["sequence_number"], 1);
    assert_eq!(events[0]["payload"]["kind"], "ledger_initialized");
    assert_eq!(page["next_from"], 3);

    let last = page["last_sequence"].as_u64().unwrap();
    let (_, rest) = srv.get(ADMIN, "/events?from=3").await;
    let rest = rest["events"].as_array().unwrap();
    assert_eq!(rest.len() as u64, last - 2);
    assert_eq!(rest.last().unwrap()["payload"]["kind"], "product_created");
}
