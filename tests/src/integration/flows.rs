//! # Integration Test Flows
//!
//! Complete key lifecycles driven through the gateway router, with the
//! orchestrator on in-memory adapters:
//!
//! 1. **Create → Search → InternalSearch → List → Delete** for one owner
//! 2. **Value handover**: a deleted value can be registered by another owner
//! 3. **Registry-only keys**: public search falls back to the registry
//! 4. **Partial failure**: a failed registry save leaves nothing behind

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use pk_01_key_lifecycle::adapters::{
        FixedClock, InMemoryDirectory, InMemoryKeyStore, InMemoryRegistry,
    };
    use pk_01_key_lifecycle::{
        AccountDetails, KeyOrchestrator, LifecycleConfig, RegistryBankAccount, RegistryEntry,
        RegistryError, RegistryOwner,
    };
    use pk_02_api_gateway::build_router;
    use shared_types::{AccountType, KeyType, PersonType, RegistryAccountType};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Harness {
        router: Router,
        store: Arc<InMemoryKeyStore>,
        registry: Arc<InMemoryRegistry>,
    }

    fn account(owner: &str, account_type: AccountType) -> AccountDetails {
        AccountDetails {
            branch: "0001".into(),
            account_number: format!("{owner}-{}", account_type.as_str()),
            account_type,
            owner_name: format!("Client {owner}"),
            owner_tax_id: "24852806810".into(),
            institution_name: "ITAÚ UNIBANCO S.A.".into(),
        }
    }

    fn harness_with(registry: InMemoryRegistry) -> Harness {
        let store = Arc::new(InMemoryKeyStore::new());
        let registry = Arc::new(registry);
        let directory = InMemoryDirectory::new()
            .with_account("alice", account("alice", AccountType::Checking))
            .with_account("alice", account("alice", AccountType::Savings))
            .with_account("bob", account("bob", AccountType::Checking));
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap());

        let orchestrator = KeyOrchestrator::new(
            LifecycleConfig::default(),
            store.clone(),
            registry.clone(),
            Arc::new(directory),
            Arc::new(clock),
        );

        Harness {
            router: build_router(Arc::new(orchestrator)),
            store,
            registry,
        }
    }

    fn harness() -> Harness {
        harness_with(InMemoryRegistry::default())
    }

    async fn call(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create(
        router: &Router,
        owner: &str,
        key_type: &str,
        value: &str,
        account: &str,
    ) -> (StatusCode, Value) {
        call(
            router,
            "POST",
            "/api/v1/keys",
            Some(json!({
                "ownerId": owner,
                "keyType": key_type,
                "keyValue": value,
                "accountType": account,
            })),
        )
        .await
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_full_lifecycle_for_one_owner() {
        let h = harness();

        let (status, email) = create(&h.router, "alice", "EMAIL", "alice@gmail.com", "CHECKING").await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, phone) = create(&h.router, "alice", "PHONE", "+5511940028922", "SAVINGS").await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, random) = create(&h.router, "alice", "RANDOM", "", "CHECKING").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(random["keyValue"].as_str().unwrap().len(), 36);

        let (status, found) = call(&h.router, "GET", "/api/v1/keys/by-value/+5511940028922", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["keyType"], "PHONE");
        assert_eq!(found["bank"]["accountType"], "SAVINGS");
        assert_eq!(found["owner"]["name"], "Client alice");

        let phone_id = phone["keyId"].as_u64().unwrap();
        let (status, internal) = call(
            &h.router,
            "GET",
            &format!("/api/v1/owners/alice/keys/{phone_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(internal["keyId"], phone_id);
        assert_eq!(internal["ownerId"], "alice");
        assert_eq!(internal["bank"]["bankName"], "ITAÚ UNIBANCO S.A.");

        let (status, listing) = call(&h.router, "GET", "/api/v1/owners/alice/keys", None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<u64> = listing["keys"]
            .as_array()
            .unwrap()
            .iter()
            .map(|k| k["keyId"].as_u64().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec![
                email["keyId"].as_u64().unwrap(),
                phone_id,
                random["keyId"].as_u64().unwrap()
            ]
        );

        let (status, deleted) = call(
            &h.router,
            "DELETE",
            &format!("/api/v1/owners/alice/keys/{phone_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["deletedKeyId"], phone_id);
        assert!(!h.registry.contains("+5511940028922"));

        let (status, body) = call(&h.router, "GET", "/api/v1/keys/by-value/+5511940028922", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "NOT_FOUND");
        assert_eq!(h.store.len(), 2);
    }

    #[tokio::test]
    async fn test_deleted_value_can_move_to_another_owner() {
        let h = harness();

        let (_, created) = create(&h.router, "alice", "EMAIL", "shared@gmail.com", "CHECKING").await;
        let (status, _) = create(&h.router, "bob", "EMAIL", "shared@gmail.com", "CHECKING").await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(
            &h.router,
            "DELETE",
            &format!("/api/v1/owners/bob/keys/{}", created["keyId"]),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            &h.router,
            "DELETE",
            &format!("/api/v1/owners/alice/keys/{}", created["keyId"]),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, moved) = create(&h.router, "bob", "EMAIL", "shared@gmail.com", "CHECKING").await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, found) = call(&h.router, "GET", "/api/v1/keys/by-value/shared@gmail.com", None).await;
        assert_eq!(found["owner"]["name"], "Client bob");
        assert_ne!(moved["keyId"], created["keyId"]);
    }

    #[tokio::test]
    async fn test_registry_only_key_is_publicly_searchable() {
        let registered_at = Utc.with_ymd_and_hms(2023, 12, 24, 18, 0, 0).unwrap();
        let registry = InMemoryRegistry::default().with_entry(RegistryEntry {
            key_type: KeyType::Email,
            key: "maria@outrobanco.com".into(),
            bank_account: RegistryBankAccount {
                participant: "00000000".into(),
                branch: "1234".into(),
                account_number: "998877".into(),
                account_type: RegistryAccountType::Svgs,
            },
            owner: RegistryOwner {
                person_type: PersonType::NaturalPerson,
                name: "Maria Souza".into(),
                tax_id: "36476613090".into(),
            },
            created_at: registered_at,
        });
        let h = harness_with(registry);

        let (status, found) = call(&h.router, "GET", "/api/v1/keys/by-value/maria@outrobanco.com", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["owner"]["name"], "Maria Souza");
        assert_eq!(found["bank"]["accountType"], "SAVINGS");
        assert_eq!(found["bank"]["bankName"], "00000000");
        assert_eq!(found["createdAt"], json!(registered_at));

        let (status, _) = create(&h.router, "alice", "EMAIL", "maria@outrobanco.com", "CHECKING").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_registry_save_leaves_no_local_record() {
        let h = harness();
        h.registry
            .fail_save(RegistryError::Unavailable("registry down".into()));

        let (status, body) = create(&h.router, "alice", "EMAIL", "alice@gmail.com", "CHECKING").await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "ABORTED");
        assert!(h.store.is_empty());
        assert_eq!(h.registry.save_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_owner_and_account() {
        let h = harness();

        let (status, body) = create(&h.router, "bob", "EMAIL", "bob@gmail.com", "SAVINGS").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "NOT_FOUND");

        let (status, _) = call(&h.router, "GET", "/api/v1/owners/carol/keys", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, listing) = call(&h.router, "GET", "/api/v1/owners/bob/keys", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing["keys"], json!([]));
    }
}
