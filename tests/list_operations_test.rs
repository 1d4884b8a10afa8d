use anyhow::Result;
use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use serde_json::json;
use waywedo_client::{
    ClientConfig, ProcedureFilter, TaskInstanceFilter, UserFilter, WayWeDoClient, WwdError,
};

fn client_for(server: &MockServer) -> WayWeDoClient {
    let config = ClientConfig::new("list-token").with_base_url(server.url("/v1/"));
    WayWeDoClient::new(&config).unwrap()
}

/// 篩選欄位以遠端參數名稱送出，回應原樣返回
#[tokio::test]
async fn test_list_procedures_with_filters() -> Result<()> {
    let server = MockServer::start_async().await;
    let body = json!([
        {"id": 1, "name": "Onboarding", "tags": ["hr"]},
        {"id": 2, "name": "Fire drill", "tags": ["safety"]}
    ]);

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/procedures/")
                .query_param("team_id", "5")
                .query_param("search", "drill")
                .query_param("tags", "hr,safety")
                .query_param("ordering", "-modified");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(body.clone());
        })
        .await;

    let client = client_for(&server);
    let filter = ProcedureFilter {
        team_id: Some(5),
        search: Some("drill".to_string()),
        tags: vec!["hr".to_string(), "safety".to_string()],
        ordering: Some("-modified".to_string()),
        ..Default::default()
    };

    let result = client.list_procedures(&filter).await?;

    mock.assert_async().await;
    assert_eq!(result, body);
    Ok(())
}

/// 分頁形式的回應也不做任何轉換
#[tokio::test]
async fn test_list_users_returns_paginated_envelope_unchanged() -> Result<()> {
    let server = MockServer::start_async().await;
    let body = json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [{"id": 8, "name": "Grace", "status": "active"}]
    });

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/users/")
                .query_param("team_id", "2")
                .query_param("exclude_id", "1")
                .query_param("status", "active");
            then.status(200).json_body(body.clone());
        })
        .await;

    let client = client_for(&server);
    let filter = UserFilter {
        team_id: Some(2),
        exclude_id: Some(1),
        status: Some("active".to_string()),
        ..Default::default()
    };

    let result = client.list_users(&filter).await?;

    mock.assert_async().await;
    assert_eq!(result, body);
    Ok(())
}

/// assignee 以使用者資源 URL 送出，到期日以 ISO-8601 送出
#[tokio::test]
async fn test_list_task_instances_with_assignee_and_due_dates() -> Result<()> {
    let server = MockServer::start_async().await;
    let assignee_url = server.url("/v1/users/42/");

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/taskinstances/")
                .query_param("assignee", assignee_url.as_str())
                .query_param("completed", "false")
                .query_param("content_type", "procedure")
                .query_param("object_id", "17")
                .query_param("due_date__gte", "2024-01-01T00:00:00Z")
                .query_param("due_date__lte", "2024-01-31T23:59:59Z");
            then.status(200).json_body(json!([{"id": 100, "completed": false}]));
        })
        .await;

    let client = client_for(&server);
    let filter = TaskInstanceFilter {
        assignee: Some(42),
        content_type: Some("procedure".to_string()),
        object_id: Some(17),
        completed: Some(false),
        due_date_from: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        due_date_to: Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()),
        ..Default::default()
    };

    let result = client.list_task_instances(&filter).await?;

    mock.assert_async().await;
    assert_eq!(result, json!([{"id": 100, "completed": false}]));
    Ok(())
}

/// 404 會變成帶有狀態碼的錯誤
#[tokio::test]
async fn test_list_users_not_found_raises_status_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/users/");
            then.status(404).json_body(json!({"detail": "Not found."}));
        })
        .await;

    let client = client_for(&server);
    let err = client
        .list_users(&UserFilter::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WwdError::HttpStatus { status: 404 }));
    assert_eq!(err.status_code(), Some(404));
    assert!(err.to_string().contains("404"));
    Ok(())
}

/// 4xx 與 5xx 不做區分
#[tokio::test]
async fn test_server_error_uses_same_error_kind() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/procedures/");
            then.status(503).body("upstream unavailable");
        })
        .await;

    let client = client_for(&server);
    let err = client
        .list_procedures(&ProcedureFilter::default())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(503));
    Ok(())
}
