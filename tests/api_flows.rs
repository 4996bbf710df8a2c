//! End-to-end flows against an in-process server (memory store, simulated ledger).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use shipledger::domain::model::{EntityKind, NetworkStatus};
use shipledger::infra::ledger::{AnchorRequest, LedgerClient, LedgerError, LedgerReceipt};
use shipledger::transport::http::{create_router, AppState};
use shipledger::{RecordHashService, Repository, SimulatedLedgerClient};
use std::collections::HashSet;
use std::sync::Arc;

const ADMIN: &str = "root-admin";

/// Live-mode stand-in whose RPC is always down.
struct UnreachableLedger;

#[async_trait]
impl LedgerClient for UnreachableLedger {
    fn mode(&self) -> &'static str {
        "live"
    }

    async fn submit(&self, _request: AnchorRequest<'_>) -> Result<LedgerReceipt, LedgerError> {
        Err(LedgerError::Rpc("connection refused".into()))
    }

    async fn verify(&self, _entity_type: EntityKind, _entity_id: &str) -> Result<bool, LedgerError> {
        Err(LedgerError::Rpc("connection refused".into()))
    }

    async fn network_status(&self) -> Result<NetworkStatus, LedgerError> {
        Err(LedgerError::Rpc("connection refused".into()))
    }
}

struct TestApp {
    base_url: String,
    client: reqwest::Client,
}

impl TestApp {
    async fn spawn() -> Self {
        let repo = Repository::in_memory();
        let ledger = Arc::new(SimulatedLedgerClient::new(repo.clone()));
        Self::spawn_with(repo, ledger).await
    }

    async fn spawn_with(repo: Repository, ledger: Arc<dyn LedgerClient>) -> Self {
        let records = RecordHashService::new(repo.clone(), ledger);
        let admins: HashSet<String> = [ADMIN.to_string()].into_iter().collect();
        let router = create_router(AppState::new(repo, records, admins));

        // Bind to an ephemeral port so tests can run in parallel.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, user: &str, path: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .header("x-user-id", user)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, user: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .header("x-user-id", user)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn patch(&self, user: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = self.client.patch(self.url(path)).header("x-user-id", user);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn become_role(&self, user: &str, role: &str) {
        let (status, body) = self
            .patch(user, "/api/auth/user/role", Some(json!({ "role": role })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], role);
    }

    /// Signs `user` in, then has the admin grant them `role`.
    async fn grant_role(&self, user: &str, role: &str) {
        let (status, _) = self.get(user, "/api/auth/user").await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = self
            .patch(
                ADMIN,
                &format!("/api/users/{}/role", user),
                Some(json!({ "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], role);
    }

    /// Creates and finalizes a B/L as `carrier`; returns its id.
    async fn finalized_bill(&self, carrier: &str) -> String {
        let (status, bl) = self
            .post(carrier, "/api/bills-of-lading", document_body())
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = bl["id"].as_str().unwrap().to_string();
        let (status, _) = self
            .patch(carrier, &format!("/api/bills-of-lading/{}/finalize", id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        id
    }

    async fn count(&self, user: &str, path: &str) -> usize {
        let (status, body) = self.get(user, path).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().map(Vec::len).unwrap_or_default()
    }
}

fn document_body() -> Value {
    json!({
        "shipper": "Shanghai Exports Ltd.",
        "consignee": "Rotterdam Imports BV",
        "portOfLoading": "Shanghai",
        "portOfDischarge": "Rotterdam",
        "cargoDescription": "Electronic components",
        "containerNumbers": ["MSKU1234565"]
    })
}

#[tokio::test]
async fn shipping_instruction_is_submitted_anchored_and_logged() {
    let app = TestApp::spawn().await;

    let (status, si) = app
        .post("shipper-1", "/api/shipping-instructions", document_body())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(si["status"], "submitted");
    assert_eq!(si["blockchainVerified"], true);
    assert_eq!(si["documentHash"].as_str().map(str::len), Some(64));
    assert!(si["blockchainTxHash"].as_str().is_some());

    let (_, activity) = app.get("shipper-1", "/api/transactions").await;
    let activity = activity.as_array().unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0]["type"], "shipping_instruction_created");
    assert_eq!(activity[0]["relatedId"], si["id"]);

    let tx = si["blockchainTxHash"].as_str().unwrap();
    let (status, record) = app
        .get("shipper-1", &format!("/api/blockchain/transactions/{}", tx))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["entityId"], si["id"]);
    assert_eq!(record["documentHash"], si["documentHash"]);

    let (status, verify) = app
        .get(
            "shipper-1",
            &format!("/api/blockchain/verify/shipping_instruction/{}", si["id"].as_str().unwrap()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verify["verified"], true);
}

#[tokio::test]
async fn client_cannot_spoof_created_by() {
    let app = TestApp::spawn().await;
    let mut body = document_body();
    body["createdBy"] = json!("mallory");

    let (status, si) = app.post("shipper-1", "/api/shipping-instructions", body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(si["createdBy"], "shipper-1");
}

#[tokio::test]
async fn finalizing_a_bill_of_lading_opens_an_in_transit_shipment() {
    let app = TestApp::spawn().await;
    app.become_role("carrier-1", "carrier").await;

    let (status, bl) = app
        .post("carrier-1", "/api/bills-of-lading", document_body())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bl["status"], "draft");
    assert_eq!(bl["blockchainVerified"], false);

    let id = bl["id"].as_str().unwrap();
    let (status, finalized) = app
        .patch("carrier-1", &format!("/api/bills-of-lading/{}/finalize", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finalized["document"]["status"], "finalized");
    assert_eq!(finalized["document"]["blockchainVerified"], true);
    assert!(finalized["document"]["issuedAt"].is_string());

    let shipments = finalized["shipments"].as_array().unwrap();
    assert_eq!(shipments.len(), 1);
    assert_eq!(shipments[0]["currentStatus"], "in_transit");
    assert_eq!(shipments[0]["currentLocation"], "Shanghai");
    assert_eq!(shipments[0]["events"].as_array().map(Vec::len), Some(1));

    let (status, by_container) = app
        .get("shipper-1", "/api/shipments/container/msku1234565")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_container["documentId"], id);

    // Finalizing twice is an illegal transition.
    let (status, _) = app
        .patch("carrier-1", &format!("/api/bills-of-lading/{}/finalize", id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn forbidden_requests_write_nothing() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post("shipper-1", "/api/bills-of-lading", document_body())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().is_some());

    // The role check runs before the body is parsed.
    let (status, _) = app
        .post("shipper-1", "/api/bills-of-lading", json!({ "garbage": true }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(app.count("shipper-1", "/api/transactions").await, 0);
    assert_eq!(app.count("shipper-1", "/api/blockchain/transactions").await, 0);
}

#[tokio::test]
async fn only_customs_can_decide_a_clearance_and_only_once() {
    let app = TestApp::spawn().await;

    let (_, si) = app
        .post("shipper-1", "/api/shipping-instructions", document_body())
        .await;
    let (status, clearance) = app
        .post(
            "shipper-1",
            "/api/customs/clearances",
            json!({
                "documentId": si["id"],
                "declarationType": "export",
                "hsCodes": ["8542.31"],
                "declaredValue": "125000"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(clearance["status"], "pending");
    let approve = format!(
        "/api/customs/clearances/{}/approve",
        clearance["id"].as_str().unwrap()
    );

    let (status, _) = app.patch("shipper-1", &approve, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, listed) = app.get("shipper-1", "/api/customs/clearances").await;
    assert_eq!(listed[0]["status"], "pending");

    app.grant_role("officer-1", "customs").await;
    let (status, approved) = app
        .patch("officer-1", &approve, Some(json!({ "notes": "documents in order" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["reviewedBy"], "officer-1");

    let (status, _) = app.patch("officer-1", &approve, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn shippers_only_see_their_own_bills_of_lading() {
    let app = TestApp::spawn().await;
    app.become_role("carrier-1", "carrier").await;
    let (status, _) = app
        .post("carrier-1", "/api/bills-of-lading", document_body())
        .await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(app.count("carrier-1", "/api/bills-of-lading").await, 1);
    assert_eq!(app.count("shipper-1", "/api/bills-of-lading").await, 0);
    // Customs only sees bills shared with it.
    app.grant_role("officer-1", "customs").await;
    assert_eq!(app.count("officer-1", "/api/bills-of-lading").await, 0);
}

#[tokio::test]
async fn missing_session_is_unauthorized() {
    let app = TestApp::spawn().await;
    let resp = app
        .client
        .get(app.url("/api/shipping-instructions"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn versioned_prefix_mirrors_the_api() {
    let app = TestApp::spawn().await;
    let (status, me) = app.get(ADMIN, "/api/v1/auth/user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "admin");

    let (status, _) = app
        .post(ADMIN, "/api/v1/shipping-instructions", document_body())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn ledger_failure_fails_the_request_and_leaves_record_unverified() {
    let repo = Repository::in_memory();
    let app = TestApp::spawn_with(repo, Arc::new(UnreachableLedger)).await;

    let (status, body) = app
        .post("shipper-1", "/api/shipping-instructions", document_body())
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().is_some());

    let (_, listed) = app.get("shipper-1", "/api/shipping-instructions").await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["blockchainVerified"], false);
    assert!(listed[0]["blockchainTxHash"].is_null());

    assert_eq!(app.count("shipper-1", "/api/transactions").await, 0);

    let (status, network) = app.get("shipper-1", "/api/blockchain/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(network["connected"], false);
}

#[tokio::test]
async fn a_bill_of_lading_cannot_list_a_container_twice() {
    let app = TestApp::spawn().await;
    app.become_role("carrier-1", "carrier").await;
    let mut body = document_body();
    body["containerNumbers"] = json!(["MSKU1234565", " msku1234565"]);

    let (status, err) = app.post("carrier-1", "/api/bills-of-lading", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["errors"][0]["field"], "containerNumbers");
    assert_eq!(app.count("carrier-1", "/api/bills-of-lading").await, 0);
}

#[tokio::test]
async fn finalize_skips_containers_that_already_have_a_shipment() {
    let app = TestApp::spawn().await;
    app.become_role("carrier-1", "carrier").await;
    let first = app.finalized_bill("carrier-1").await;

    // A second B/L for the same container opens no new shipment but still finalizes.
    let second = app.finalized_bill("carrier-1").await;
    let (_, doc) = app
        .get("carrier-1", &format!("/api/bills-of-lading/{}", second))
        .await;
    assert_eq!(doc["status"], "finalized");
    assert_eq!(doc["blockchainVerified"], true);

    let (_, shipment) = app
        .get("carrier-1", "/api/shipments/container/MSKU1234565")
        .await;
    assert_eq!(shipment["documentId"], first.as_str());
}

#[tokio::test]
async fn sharing_a_bill_of_lading_makes_it_visible_to_customs() {
    let app = TestApp::spawn().await;
    app.become_role("carrier-1", "carrier").await;
    app.grant_role("officer-1", "customs").await;

    let (_, draft) = app
        .post("carrier-1", "/api/bills-of-lading", document_body())
        .await;
    let share = format!("/api/bills-of-lading/{}/share", draft["id"].as_str().unwrap());
    let (status, _) = app
        .patch("carrier-1", &share, Some(json!({ "customs": true })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let id = app.finalized_bill("carrier-1").await;
    let share = format!("/api/bills-of-lading/{}/share", id);
    let (status, _) = app.patch("carrier-1", &share, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, shared) = app
        .patch("carrier-1", &share, Some(json!({ "customs": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared["status"], "shared");
    assert_eq!(shared["sharedWithCustoms"], true);
    assert_eq!(shared["sharedWithPort"], false);

    let (_, listed) = app.get("officer-1", "/api/bills-of-lading").await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());

    let (status, _) = app
        .patch("carrier-1", &share, Some(json!({ "customs": true })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let deliver = format!("/api/bills-of-lading/{}/deliver", id);
    let (status, delivered) = app.patch("carrier-1", &deliver, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["status"], "delivered");
    let (status, _) = app.patch("carrier-1", &deliver, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn tracking_appends_events_until_the_shipment_is_delivered() {
    let app = TestApp::spawn().await;
    app.become_role("carrier-1", "carrier").await;
    app.finalized_bill("carrier-1").await;
    let (_, shipment) = app
        .get("carrier-1", "/api/shipments/container/MSKU1234565")
        .await;
    let tracking = format!("/api/shipments/{}/tracking", shipment["id"].as_str().unwrap());

    let (status, _) = app
        .patch("shipper-1", &tracking, Some(json!({ "progress": 50 })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, moved) = app
        .patch(
            "carrier-1",
            &tracking,
            Some(json!({ "currentLocation": "Suez Canal", "status": "in_transit", "progress": 50 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["currentLocation"], "Suez Canal");
    assert_eq!(moved["progress"], 50);
    assert_eq!(moved["events"].as_array().map(Vec::len), Some(2));

    let (status, arrived) = app
        .patch(
            "carrier-1",
            &tracking,
            Some(json!({ "currentLocation": "Rotterdam", "status": "delivered" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(arrived["progress"], 100);
    assert!(arrived["actualArrival"].is_string());

    let (status, _) = app
        .patch("carrier-1", &tracking, Some(json!({ "progress": 10 })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, after) = app
        .get("carrier-1", &format!("/api/shipments/{}", shipment["id"].as_str().unwrap()))
        .await;
    assert_eq!(after["events"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn only_a_bank_moves_trade_finance_and_only_forward() {
    let app = TestApp::spawn().await;
    app.grant_role("bank-1", "bank").await;
    let (_, si) = app
        .post("shipper-1", "/api/shipping-instructions", document_body())
        .await;

    let (status, record) = app
        .post(
            "shipper-1",
            "/api/trade-finance",
            json!({
                "documentId": si["id"],
                "lcNumber": "LC-2026-001",
                "bank": "Harbour Bank",
                "amount": "125000.00",
                "currency": "usd"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["paymentStatus"], "pending");
    assert_eq!(record["currency"], "USD");
    assert_eq!(record["blockchainVerified"], true);
    let path = format!("/api/trade-finance/{}/status", record["id"].as_str().unwrap());

    let (status, _) = app
        .patch("shipper-1", &path, Some(json!({ "status": "approved" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, approved) = app
        .patch(
            "bank-1",
            &path,
            Some(json!({ "status": "approved", "notes": "documents compliant" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["paymentStatus"], "approved");
    assert_eq!(approved["notes"], "documents compliant");

    let (status, _) = app
        .patch("bank-1", &path, Some(json!({ "status": "approved" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app
        .patch("bank-1", &path, Some(json!({ "status": "settled" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

fn policy_body(number: &str) -> Value {
    json!({
        "policyNumber": number,
        "insuredId": "shipper-1",
        "coverageType": "all_risks",
        "coverageAmount": "250000",
        "premium": "1800",
        "startDate": "2026-01-01",
        "endDate": "2026-12-31"
    })
}

fn claim_body(policy_id: &Value) -> Value {
    json!({
        "policyId": policy_id,
        "incidentType": "water_damage",
        "incidentDate": "2026-03-14",
        "description": "Seawater ingress in two pallets",
        "claimAmount": "12000"
    })
}

#[tokio::test]
async fn claims_need_an_active_policy_and_an_insurer_to_review() {
    let app = TestApp::spawn().await;
    app.grant_role("insurer-1", "insurer").await;

    let (status, cancelled) = app
        .post("insurer-1", "/api/insurance/policies", policy_body("POL-001"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cancelled["status"], "active");
    assert_eq!(cancelled["currency"], "USD");
    let (status, _) = app
        .patch(
            "insurer-1",
            &format!("/api/insurance/policies/{}/status", cancelled["id"].as_str().unwrap()),
            Some(json!({ "status": "cancelled" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post("shipper-1", "/api/insurance/claims", claim_body(&cancelled["id"]))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, active) = app
        .post("insurer-1", "/api/insurance/policies", policy_body("POL-002"))
        .await;
    let (status, claim) = app
        .post("shipper-1", "/api/insurance/claims", claim_body(&active["id"]))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(claim["status"], "submitted");
    assert!(claim["reviewedBy"].is_null());
    let review = format!("/api/insurance/claims/{}/status", claim["id"].as_str().unwrap());

    let (status, _) = app
        .patch("shipper-1", &review, Some(json!({ "status": "approved" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, reviewed) = app
        .patch(
            "insurer-1",
            &review,
            Some(json!({ "status": "approved", "notes": "survey confirms damage" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["status"], "approved");
    assert_eq!(reviewed["reviewedBy"], "insurer-1");
    assert_eq!(reviewed["resolutionNotes"], "survey confirms damage");
    assert!(reviewed["reviewedAt"].is_string());
}

#[tokio::test]
async fn port_operations_and_coordinations_always_start_pending() {
    let app = TestApp::spawn().await;
    app.grant_role("port-1", "port_authority").await;
    app.become_role("forwarder-1", "freight_forwarder").await;

    let (status, err) = app
        .post(
            "port-1",
            "/api/port/operations",
            json!({ "operationType": "berth_allocation" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["errors"][0]["field"], "berthNumber");

    let (status, operation) = app
        .post(
            "port-1",
            "/api/port/operations",
            json!({
                "operationType": "berth_allocation",
                "berthNumber": "B-7",
                "status": "completed"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(operation["status"], "pending");
    assert_eq!(operation["createdBy"], "port-1");

    let (status, coordination) = app
        .post(
            "forwarder-1",
            "/api/freight-forwarder/coordination",
            json!({ "shipperId": "shipper-1", "carrierId": "carrier-1", "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(coordination["status"], "pending");

    let (status, _) = app
        .post(
            "forwarder-1",
            "/api/freight-forwarder/coordination",
            json!({ "notes": "no parties" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn a_refused_first_request_stores_no_user() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .post("newcomer", "/api/bills-of-lading", document_body())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, users) = app.get(ADMIN, "/api/users").await;
    assert!(users
        .as_array()
        .unwrap()
        .iter()
        .all(|u| u["id"] != "newcomer"));

    // A permitted first write stores the caller.
    let (status, _) = app
        .post("newcomer", "/api/shipping-instructions", document_body())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, users) = app.get(ADMIN, "/api/users").await;
    assert!(users
        .as_array()
        .unwrap()
        .iter()
        .any(|u| u["id"] == "newcomer" && u["role"] == "shipper"));
}

#[tokio::test]
async fn reviewer_roles_are_granted_not_chosen() {
    let app = TestApp::spawn().await;

    for role in ["customs", "bank", "insurer", "port_authority", "admin"] {
        let (status, _) = app
            .patch("shipper-1", "/api/auth/user/role", Some(json!({ "role": role })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", role);
    }
    let (_, me) = app.get("shipper-1", "/api/auth/user").await;
    assert_eq!(me["role"], "shipper");

    app.grant_role("shipper-1", "customs").await;
    let (_, me) = app.get("shipper-1", "/api/auth/user").await;
    assert_eq!(me["role"], "customs");
}
