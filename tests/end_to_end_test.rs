use reqsuite::assertion::AssertionEngine;
use reqsuite::expander::SpecExpander;
use reqsuite::http::{HttpTransport, Response};
use reqsuite::oauth::{OAuth2Client, TokenStore};
use reqsuite::runner::RunExecutor;
use reqsuite::spec::DocumentLoader;
use reqsuite::variable::VariableContext;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 完整流程：加载文档、获取 token、展开、执行、求值
#[tokio::test]
async fn test_collection_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access_token": "e2e-token"})),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("authorization", "Bearer e2e-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "users": [
                {"id": 1, "name": "Alice"},
                {"id": 2, "name": "Bob"}
            ]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"name": "Carol"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 3, "name": "Carol"})),
        )
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let doc_path = temp_dir.path().join("collection.yaml");
    fs::write(
        &doc_path,
        r#"
defaults:
  request:
    headers:
      Accept: application/json
  oauth2:
    main:
      token_url: ${BASE}/oauth/token
      client_id: reqsuite
      client_secret: secret
requests:
  - name: List users
    tags: [smoke]
    invoke:
      url: ${BASE}/api/users
      headers:
        Authorization: "Bearer {{main}}"
    expect:
      status_code:
        - equals: 200
      headers.content-type:
        - contains: json
      body.users:
        - length: 2
        - contains: [{id: 1, name: Alice}]
      body.users.1.name:
        - matches: "B.*"
  - name: Create user
    invoke:
      method: POST
      url: ${BASE}/api/users
      payload:
        name: Carol
    expect:
      status_code:
        - in_range: "299:200"
      body:
        - equals: '{"name": "Carol", "id": 3}'
      body.id:
        - greater: 2
"#,
    )
    .unwrap();

    let context: VariableContext = [("BASE", mock_server.uri())].into_iter().collect();
    let document = DocumentLoader::new(&context).load(&doc_path).unwrap();

    let tokens = TokenStore::acquire(&document.defaults.oauth2, &OAuth2Client::new().unwrap()).await;
    let mut collection = SpecExpander::new(&document).expand(&tokens).unwrap();
    assert_eq!(collection.len(), 2);

    let ids = collection.filter(&[], &[]);
    let transport = HttpTransport::new();
    let engine = AssertionEngine::new();
    let summary = RunExecutor::new(&transport, &engine)
        .run(&mut collection, &ids)
        .await;

    for (_, instance) in collection.iter() {
        for result in instance.results() {
            assert!(result.passed, "{}: {}", result.message, result.details);
        }
    }
    assert_eq!(summary.total_requests, 2);
    assert_eq!(summary.total_assertions, 8);
    assert_eq!(summary.failed_assertions, 0);
    assert!(summary.is_success());
}

/// 过滤后只执行选中的请求，失败断言出现在摘要中
#[tokio::test]
async fn test_filtered_run_reports_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&mock_server)
        .await;

    let yaml = format!(
        r#"
defaults:
  request:
    url: {}/health
requests:
  - name: Health
    suite: ops
    expect:
      status_code:
        - equals: 200
      body:
        - type: string
  - name: Skipped
    suite: other
"#,
        mock_server.uri()
    );
    let context = VariableContext::new();
    let document = DocumentLoader::new(&context).parse(&yaml).unwrap();
    let mut collection = SpecExpander::new(&document).expand(&TokenStore::new()).unwrap();

    let ids = collection.filter(&[], &["ops".to_string()]);
    assert_eq!(ids, vec![1]);

    let transport = HttpTransport::new();
    let engine = AssertionEngine::new();
    let summary = RunExecutor::new(&transport, &engine)
        .run(&mut collection, &ids)
        .await;

    assert_eq!(summary.total_requests, 1);
    assert_eq!(summary.passed_assertions, 1);
    assert_eq!(summary.failed_assertions, 1);
    assert_eq!(summary.failed_requests[0].name, "Health");
    assert!(collection.get(2).unwrap().response().is_none());
}

/// 连接失败记录为失败响应，断言仍然求值
#[tokio::test]
async fn test_transport_failure_recorded() {
    let yaml = r#"
requests:
  - name: Unreachable
    timeout: 2
    invoke:
      url: http://127.0.0.1:1/unreachable
    expect:
      error:
        - exists: ~
      status_code:
        - not_exists: ~
      body:
        - equals: {}
"#;
    let context = VariableContext::new();
    let document = DocumentLoader::new(&context).parse(yaml).unwrap();
    let mut collection = SpecExpander::new(&document).expand(&TokenStore::new()).unwrap();

    let transport = HttpTransport::new();
    let engine = AssertionEngine::new();
    let summary = RunExecutor::new(&transport, &engine)
        .run(&mut collection, &[1])
        .await;

    let instance = collection.get(1).unwrap();
    assert!(matches!(instance.response(), Some(Response::Failed { .. })));
    assert_eq!(summary.transport_errors.len(), 1);
    assert_eq!(summary.passed_assertions, 2);
    assert_eq!(summary.failed_assertions, 1);
    assert!(!summary.is_success());
}
