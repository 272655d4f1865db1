//! # Full Node Stack
//!
//! The node wired from configuration, with its HTTP clients pointed at fake
//! registry and ERP servers and its gateway served on a real socket.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::NaiveDate;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use tokio::sync::oneshot;

    use key_manager_node::adapters::directory_client::{
        AccountBody, HolderBody, InstitutionBody, WireAccountType,
    };
    use key_manager_node::adapters::registry_client::{
        DeleteKeyBody, KeyEntryBody, SaveKeyBody, WireKeyType,
    };
    use key_manager_node::container::NodeConfig;
    use key_manager_node::wiring::build_orchestrator;
    use pk_02_api_gateway::{ApiGatewayService, GatewayConfig};

    // =============================================================================
    // FAKE REGISTRY
    // =============================================================================

    #[derive(Clone, Default)]
    struct FakeRegistry {
        entries: Arc<Mutex<HashMap<String, KeyEntryBody>>>,
        random_counter: Arc<Mutex<u32>>,
    }

    async fn registry_save(
        State(registry): State<FakeRegistry>,
        Json(body): Json<SaveKeyBody>,
    ) -> Result<(StatusCode, Json<KeyEntryBody>), StatusCode> {
        let key = if body.key_type == WireKeyType::Random {
            let mut counter = registry.random_counter.lock();
            *counter += 1;
            format!("registry-random-{}", *counter)
        } else {
            body.key
        };

        let mut entries = registry.entries.lock();
        if entries.contains_key(&key) {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
        let entry = KeyEntryBody {
            key_type: body.key_type,
            key: key.clone(),
            bank_account: body.bank_account,
            owner: body.owner,
            created_at: NaiveDate::from_ymd_opt(2024, 6, 1)
                .and_then(|d| d.and_hms_opt(10, 0, 0))
                .unwrap(),
        };
        entries.insert(key, entry.clone());
        Ok((StatusCode::CREATED, Json(entry)))
    }

    async fn registry_lookup(
        State(registry): State<FakeRegistry>,
        Path(key): Path<String>,
    ) -> Result<Json<KeyEntryBody>, StatusCode> {
        registry
            .entries
            .lock()
            .get(&key)
            .cloned()
            .map(Json)
            .ok_or(StatusCode::NOT_FOUND)
    }

    async fn registry_delete(
        State(registry): State<FakeRegistry>,
        Path(key): Path<String>,
        Json(body): Json<DeleteKeyBody>,
    ) -> StatusCode {
        let mut entries = registry.entries.lock();
        match entries.get(&key) {
            None => StatusCode::NOT_FOUND,
            Some(entry) if entry.bank_account.participant != body.participant => {
                StatusCode::FORBIDDEN
            }
            Some(_) => {
                entries.remove(&key);
                StatusCode::OK
            }
        }
    }

    // =============================================================================
    // FAKE ERP
    // =============================================================================

    fn erp_account(id: &str, tipo: WireAccountType) -> AccountBody {
        AccountBody {
            tipo,
            instituicao: InstitutionBody {
                nome: "ITAÚ UNIBANCO S.A.".into(),
                ispb: "60701190".into(),
            },
            agencia: "0001".into(),
            numero: "291900".into(),
            titular: HolderBody {
                id: id.into(),
                nome: "Rafael M C Ponte".into(),
                cpf: "02467781054".into(),
            },
        }
    }

    async fn erp_client(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
        if id == "c1" {
            Ok(Json(json!({ "id": id })))
        } else {
            Err(StatusCode::NOT_FOUND)
        }
    }

    async fn erp_account_lookup(
        Path(id): Path<String>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Result<Json<AccountBody>, StatusCode> {
        match (id.as_str(), query.get("tipo").map(String::as_str)) {
            ("c1", Some("CONTA_CORRENTE")) => {
                Ok(Json(erp_account(&id, WireAccountType::ContaCorrente)))
            }
            _ => Err(StatusCode::NOT_FOUND),
        }
    }

    // =============================================================================
    // HARNESS
    // =============================================================================

    async fn spawn(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    struct Node {
        base: String,
        http: reqwest::Client,
        registry: FakeRegistry,
        shutdown: Option<oneshot::Sender<()>>,
        server: tokio::task::JoinHandle<()>,
    }

    impl Node {
        async fn start(registry_url: Option<String>) -> Self {
            let registry = FakeRegistry::default();
            let registry_addr = spawn(
                Router::new()
                    .route("/api/v1/pix/keys", post(registry_save))
                    .route(
                        "/api/v1/pix/keys/:key",
                        get(registry_lookup).delete(registry_delete),
                    )
                    .with_state(registry.clone()),
            )
            .await;
            let erp_addr = spawn(
                Router::new()
                    .route("/api/v1/clientes/:id", get(erp_client))
                    .route("/api/v1/clientes/:id/contas", get(erp_account_lookup)),
            )
            .await;

            let mut config = NodeConfig::default();
            config.registry.base_url =
                registry_url.unwrap_or_else(|| format!("http://{registry_addr}"));
            config.directory.base_url = format!("http://{erp_addr}");
            config.lifecycle.registry_policy.backoff = Duration::from_millis(5);
            config.lifecycle.directory_policy.backoff = Duration::from_millis(5);
            config.validate().unwrap();

            let orchestrator = build_orchestrator(&config).unwrap();
            let gateway = ApiGatewayService::new(GatewayConfig::default(), orchestrator).unwrap();
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (tx, rx) = oneshot::channel::<()>();
            let server = tokio::spawn(async move {
                gateway
                    .serve_on(listener, async move {
                        let _ = rx.await;
                    })
                    .await
                    .unwrap();
            });

            Self {
                base: format!("http://{addr}"),
                http: reqwest::Client::new(),
                registry,
                shutdown: Some(tx),
                server,
            }
        }

        async fn send(&self, request: reqwest::RequestBuilder) -> (u16, Value) {
            let response = request.send().await.unwrap();
            let status = response.status().as_u16();
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            (status, body)
        }

        async fn get(&self, path: &str) -> (u16, Value) {
            self.send(self.http.get(format!("{}{path}", self.base))).await
        }

        async fn delete(&self, path: &str) -> (u16, Value) {
            self.send(self.http.delete(format!("{}{path}", self.base)))
                .await
        }

        async fn create(&self, owner: &str, key_type: &str, value: &str) -> (u16, Value) {
            self.send(
                self.http
                    .post(format!("{}/api/v1/keys", self.base))
                    .json(&json!({
                        "ownerId": owner,
                        "keyType": key_type,
                        "keyValue": value,
                        "accountType": "CHECKING",
                    })),
            )
            .await
        }

        async fn stop(mut self) {
            if let Some(tx) = self.shutdown.take() {
                let _ = tx.send(());
            }
            self.server.await.unwrap();
        }
    }

    // =============================================================================
    // TESTS
    // =============================================================================

    #[tokio::test]
    async fn test_lifecycle_over_http_adapters() {
        let node = Node::start(None).await;

        let (status, phone) = node.create("c1", "PHONE", "+5511940028922").await;
        assert_eq!(status, 201, "{phone}");
        assert!(node.registry.entries.lock().contains_key("+5511940028922"));

        let (status, random) = node.create("c1", "RANDOM", "").await;
        assert_eq!(status, 201, "{random}");
        assert_eq!(random["keyValue"], "registry-random-1");

        let (status, found) = node.get("/api/v1/keys/by-value/+5511940028922").await;
        assert_eq!(status, 200);
        assert_eq!(found["owner"]["name"], "Rafael M C Ponte");
        assert_eq!(found["bank"]["accountNumber"], "291900");

        let (status, listing) = node.get("/api/v1/owners/c1/keys").await;
        assert_eq!(status, 200);
        assert_eq!(listing["keys"].as_array().unwrap().len(), 2);

        let (status, internal) = node
            .get(&format!("/api/v1/owners/c1/keys/{}", random["keyId"]))
            .await;
        assert_eq!(status, 200);
        assert_eq!(internal["keyValue"], "registry-random-1");
        assert_eq!(internal["ownerId"], "c1");

        let (status, _) = node
            .delete(&format!("/api/v1/owners/c1/keys/{}", phone["keyId"]))
            .await;
        assert_eq!(status, 200);
        assert!(!node.registry.entries.lock().contains_key("+5511940028922"));

        let (status, _) = node.get("/api/v1/keys/by-value/+5511940028922").await;
        assert_eq!(status, 404);

        node.stop().await;
    }

    #[tokio::test]
    async fn test_directory_misses_surface_as_not_found() {
        let node = Node::start(None).await;

        let (status, body) = node.create("ghost", "EMAIL", "ghost@gmail.com").await;
        assert_eq!(status, 404);
        assert_eq!(body["kind"], "NOT_FOUND");

        let (status, _) = node.get("/api/v1/owners/ghost/keys").await;
        assert_eq!(status, 404);
        assert!(node.registry.entries.lock().is_empty());

        node.stop().await;
    }

    #[tokio::test]
    async fn test_unreachable_registry_aborts_create() {
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let closed_addr = closed.local_addr().unwrap();
        drop(closed);
        let node = Node::start(Some(format!("http://{closed_addr}"))).await;

        let (status, body) = node.create("c1", "EMAIL", "rafael@gmail.com").await;
        assert_eq!(status, 409);
        assert_eq!(body["kind"], "ABORTED");

        let (status, listing) = node.get("/api/v1/owners/c1/keys").await;
        assert_eq!(status, 200);
        assert_eq!(listing["keys"], json!([]));

        node.stop().await;
    }
}
