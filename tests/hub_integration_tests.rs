//! End-to-end tests for the integration hub orchestrator

use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use acdeh_hub::broker::{data_topic, MemoryBroker};
use acdeh_hub::error::SchemaError;
use acdeh_hub::knowledge::MemoryKnowledgeBase;
use acdeh_hub::{
    HubError, IntegrationHub, ModuleConfig, ModuleSchema, Payload, TransformRule,
};

fn payload(pairs: &[(&str, serde_json::Value)]) -> Payload {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// One-shot HTTP endpoint returning a canned response; hands the raw
/// request it received back through the channel.
async fn spawn_endpoint(
    status_line: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text
                    .lines()
                    .find_map(|line| {
                        let lower = line.to_ascii_lowercase();
                        let value = lower.strip_prefix("content-length:")?;
                        value.trim().parse::<usize>().ok()
                    })
                    .unwrap_or(0);
                if request.len() >= header_end + 4 + content_length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
    });

    (format!("http://{addr}"), rx)
}

/// Knowledge base with an open (no required fields) schema for each module
async fn knowledge_with_schemas(module_ids: &[&str]) -> Arc<MemoryKnowledgeBase> {
    let knowledge = Arc::new(MemoryKnowledgeBase::new());
    for module_id in module_ids {
        knowledge
            .put_schema(*module_id, ModuleSchema::default())
            .await;
    }
    knowledge
}

#[tokio::test]
async fn register_module_emits_notification() {
    let knowledge = knowledge_with_schemas(&["A"]).await;
    let hub = IntegrationHub::new(knowledge, Arc::new(MemoryBroker::new())).unwrap();
    let mut events = hub.subscribe_status();

    hub.register_module("A", ModuleConfig::default()).await.unwrap();

    assert_eq!(events.recv().await.unwrap(), "Module A registered.");
    assert!(hub.registry().contains("A").await);
}

#[tokio::test]
async fn register_module_without_schema_fails_without_partial_insert() {
    let knowledge = Arc::new(MemoryKnowledgeBase::new());
    let hub = IntegrationHub::new(knowledge, Arc::new(MemoryBroker::new())).unwrap();

    let result = hub.register_module("A", ModuleConfig::default()).await;

    assert!(matches!(
        result,
        Err(HubError::Schema(SchemaError::NotFound(id))) if id == "A"
    ));
    assert!(!hub.registry().contains("A").await);
}

#[tokio::test]
async fn register_module_with_unsatisfied_schema_fails() {
    let knowledge = Arc::new(MemoryKnowledgeBase::new());
    knowledge
        .put_schema(
            "A",
            ModuleSchema {
                required: vec!["endpoint".to_string()],
            },
        )
        .await;
    let hub = IntegrationHub::new(knowledge, Arc::new(MemoryBroker::new())).unwrap();

    let result = hub.register_module("A", ModuleConfig::default()).await;

    assert!(matches!(
        result,
        Err(HubError::Schema(SchemaError::MissingField { field, .. })) if field == "endpoint"
    ));
    assert!(!hub.registry().contains("A").await);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let knowledge = knowledge_with_schemas(&["A"]).await;
    let hub = IntegrationHub::new(knowledge, Arc::new(MemoryBroker::new())).unwrap();

    hub.register_module("A", ModuleConfig::default()).await.unwrap();
    let result = hub.register_module("A", ModuleConfig::default()).await;

    assert!(matches!(result, Err(HubError::DuplicateModule(id)) if id == "A"));
}

#[tokio::test]
async fn integrate_over_endpoint_transforms_and_returns_response() {
    let (url, request_rx) = spawn_endpoint("200 OK", r#"{"ok":true}"#).await;

    let knowledge = knowledge_with_schemas(&["A", "B"]).await;
    knowledge
        .allow_integration("A", "B", vec![TransformRule::new("x", "y")])
        .await;
    let hub = IntegrationHub::new(knowledge, Arc::new(MemoryBroker::new())).unwrap();

    hub.register_module("A", ModuleConfig::default()).await.unwrap();
    hub.register_module(
        "B",
        ModuleConfig {
            endpoint: Some(url),
            api_key: Some("k".to_string()),
            extra: Payload::new(),
        },
    )
    .await
    .unwrap();

    let result = hub
        .integrate("A", "B", payload(&[("x", json!(1)), ("z", json!(2))]))
        .await
        .unwrap();

    assert_eq!(result, Some(payload(&[("ok", json!(true))])));

    let request = request_rx.await.unwrap();
    assert!(request.starts_with("POST /integrate HTTP/1.1"));
    assert!(request
        .to_ascii_lowercase()
        .contains("authorization: bearer k"));
    assert!(request.ends_with(r#"{"y":1}"#));

    let metrics = hub.registry().metrics("A").await.unwrap();
    assert_eq!(metrics.success_count, 1);
    assert_eq!(metrics.failure_count, 0);
}

#[tokio::test]
async fn integrate_over_broker_publishes_to_module_topic() {
    let broker = Arc::new(MemoryBroker::new());
    let mut subscriber = broker.subscribe(&data_topic("C")).await;

    let knowledge = knowledge_with_schemas(&["A", "C"]).await;
    knowledge
        .allow_integration("A", "C", vec![TransformRule::new("x", "y")])
        .await;
    let hub = IntegrationHub::new(knowledge, broker.clone()).unwrap();

    hub.register_module("A", ModuleConfig::default()).await.unwrap();
    hub.register_module("C", ModuleConfig::default()).await.unwrap();

    let result = hub
        .integrate("A", "C", payload(&[("x", json!(5))]))
        .await
        .unwrap();

    assert_eq!(result, None);
    assert_eq!(subscriber.recv().await.unwrap(), payload(&[("y", json!(5))]));
    assert_eq!(
        hub.registry().metrics("A").await.unwrap().success_count,
        1
    );
}

#[tokio::test]
async fn integrate_with_empty_rule_set_delivers_empty_payload() {
    let broker = Arc::new(MemoryBroker::new());
    let mut subscriber = broker.subscribe(&data_topic("C")).await;

    let knowledge = knowledge_with_schemas(&["A", "C"]).await;
    knowledge.allow_integration("A", "C", Vec::new()).await;
    let hub = IntegrationHub::new(knowledge, broker.clone()).unwrap();

    hub.register_module("A", ModuleConfig::default()).await.unwrap();
    hub.register_module("C", ModuleConfig::default()).await.unwrap();

    hub.integrate("A", "C", payload(&[("x", json!(1))]))
        .await
        .unwrap();

    assert!(subscriber.recv().await.unwrap().is_empty());
}

#[tokio::test]
async fn disallowed_pair_fails_and_counts_a_source_failure() {
    let knowledge = knowledge_with_schemas(&["A"]).await;
    let hub = IntegrationHub::new(knowledge, Arc::new(MemoryBroker::new())).unwrap();
    hub.register_module("A", ModuleConfig::default()).await.unwrap();

    let result = hub.integrate("A", "Z", Payload::new()).await;

    assert!(matches!(
        result,
        Err(HubError::NoIntegrationRule { source, target }) if source == "A" && target == "Z"
    ));
    let metrics = hub.registry().metrics("A").await.unwrap();
    assert_eq!(metrics.success_count, 0);
    assert_eq!(metrics.failure_count, 1);
}

#[tokio::test]
async fn permission_check_precedes_existence_check() {
    // Neither module registered, pair not allowed: the answer is
    // NoIntegrationRule, not UnknownModule.
    let knowledge = Arc::new(MemoryKnowledgeBase::new());
    let hub = IntegrationHub::new(knowledge, Arc::new(MemoryBroker::new())).unwrap();

    let result = hub.integrate("A", "B", Payload::new()).await;

    assert!(matches!(result, Err(HubError::NoIntegrationRule { .. })));
}

#[tokio::test]
async fn unknown_target_fails_and_leaves_metrics_unchanged() {
    let knowledge = knowledge_with_schemas(&["A"]).await;
    knowledge.allow_integration("A", "T", Vec::new()).await;
    let hub = IntegrationHub::new(knowledge, Arc::new(MemoryBroker::new())).unwrap();
    hub.register_module("A", ModuleConfig::default()).await.unwrap();

    let result = hub.integrate("A", "T", Payload::new()).await;

    assert!(matches!(result, Err(HubError::UnknownModule(id)) if id == "T"));
    let metrics = hub.registry().metrics("A").await.unwrap();
    assert_eq!(metrics.success_count, 0);
    assert_eq!(metrics.failure_count, 0);
}

#[tokio::test]
async fn unknown_source_fails() {
    let knowledge = knowledge_with_schemas(&["A"]).await;
    knowledge.allow_integration("S", "A", Vec::new()).await;
    let hub = IntegrationHub::new(knowledge, Arc::new(MemoryBroker::new())).unwrap();
    hub.register_module("A", ModuleConfig::default()).await.unwrap();

    let result = hub.integrate("S", "A", Payload::new()).await;

    assert!(matches!(result, Err(HubError::UnknownModule(id)) if id == "S"));
}

#[tokio::test]
async fn endpoint_failure_counts_a_source_failure() {
    let (url, _request_rx) = spawn_endpoint("500 Internal Server Error", "boom").await;

    let knowledge = knowledge_with_schemas(&["A", "B"]).await;
    knowledge
        .allow_integration("A", "B", vec![TransformRule::new("x", "y")])
        .await;
    let hub = IntegrationHub::new(knowledge, Arc::new(MemoryBroker::new())).unwrap();

    hub.register_module("A", ModuleConfig::default()).await.unwrap();
    hub.register_module(
        "B",
        ModuleConfig {
            endpoint: Some(url),
            api_key: None,
            extra: Payload::new(),
        },
    )
    .await
    .unwrap();

    let result = hub
        .integrate("A", "B", payload(&[("x", json!(1))]))
        .await;

    assert!(matches!(result, Err(HubError::Delivery(_))));
    let metrics = hub.registry().metrics("A").await.unwrap();
    assert_eq!(metrics.success_count, 0);
    assert_eq!(metrics.failure_count, 1);
}

#[tokio::test]
async fn broker_rejection_counts_a_source_failure() {
    let broker = Arc::new(MemoryBroker::new());

    let knowledge = knowledge_with_schemas(&["A", "C"]).await;
    knowledge.allow_integration("A", "C", Vec::new()).await;
    let hub = IntegrationHub::new(knowledge, broker.clone()).unwrap();

    hub.register_module("A", ModuleConfig::default()).await.unwrap();
    hub.register_module("C", ModuleConfig::default()).await.unwrap();

    broker.shutdown();
    let result = hub.integrate("A", "C", Payload::new()).await;

    assert!(matches!(result, Err(HubError::Delivery(_))));
    assert_eq!(hub.registry().metrics("A").await.unwrap().failure_count, 1);
}
