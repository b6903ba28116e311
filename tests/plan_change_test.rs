use anyhow::Result;
use httpmock::prelude::*;
use outseta_demos::config::Credential;
use outseta_demos::{change_plan, preview_plan_change, OutsetaClient, OutsetaError, PlanChangeRequest};
use serde_json::json;

const TENANT_AUTH: &str = "Outseta key:secret";

fn client(server: &MockServer) -> OutsetaClient {
    OutsetaClient::new(server.base_url(), Some(Credential::new("key", "secret")))
}

fn mock_account(server: &MockServer, with_subscription: bool) -> httpmock::Mock<'_> {
    let body = if with_subscription {
        json!({
            "Uid": "A1",
            "Name": "Acme",
            "CurrentSubscription": {"Uid": "S1", "BillingRenewalTerm": 1, "Plan": {"Uid": "P1"}}
        })
    } else {
        json!({"Uid": "A1", "Name": "Acme", "CurrentSubscription": null})
    };

    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/crm/accounts/A1")
            .query_param("fields", "Uid,Name,CurrentSubscription.*")
            .header("Authorization", TENANT_AUTH);
        then.status(200).json_body(body);
    })
}

/// 換方案：先讀帳戶，再以讀到的訂閱送出 PUT
#[tokio::test]
async fn test_change_plan_submits_resolved_subscription() -> Result<()> {
    let server = MockServer::start();
    let account = mock_account(&server, true);
    let change = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/v1/billing/subscriptions/S1/changeSubscription")
            .query_param("startImmediately", "false")
            .header("Authorization", TENANT_AUTH)
            .json_body(json!({
                "Plan": {"Uid": "P2"},
                "BillingRenewalTerm": 1,
                "Account": {"Uid": "A1"}
            }));
        then.status(200)
            .json_body(json!({"Uid": "S2", "Plan": {"Uid": "P2", "Name": "Pro"}}));
    });

    let subscription = change_plan(&client(&server), &PlanChangeRequest::new("A1", "P2")).await?;

    account.assert_hits(1);
    change.assert_hits(1);
    assert_eq!(subscription.uid, "S2");
    Ok(())
}

#[tokio::test]
async fn test_change_plan_start_immediately_flag() -> Result<()> {
    let server = MockServer::start();
    mock_account(&server, true);
    let change = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/v1/billing/subscriptions/S1/changeSubscription")
            .query_param("startImmediately", "true");
        then.status(200).json_body(json!({"Uid": "S1"}));
    });

    let request = PlanChangeRequest::new("A1", "P2").start_immediately(true);
    change_plan(&client(&server), &request).await?;

    change.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn test_no_subscription_means_no_mutation() -> Result<()> {
    let server = MockServer::start();
    mock_account(&server, false);
    let change = server.mock(|when, then| {
        when.method(PUT);
        then.status(200).json_body(json!({"Uid": "S1"}));
    });

    let err = change_plan(&client(&server), &PlanChangeRequest::new("A1", "P2"))
        .await
        .unwrap_err();

    assert!(matches!(err, OutsetaError::PreconditionError { .. }));
    assert_eq!(err.to_string(), "Account A1 does not have an active subscription");
    change.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_account_lookup_failure_is_api_error() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/crm/accounts/A1");
        then.status(404).json_body(json!({"Message": "Account not found"}));
    });

    let err = change_plan(&client(&server), &PlanChangeRequest::new("A1", "P2"))
        .await
        .unwrap_err();

    match err {
        OutsetaError::ApiError { status, message, .. } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Account not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

/// 試算不會呼叫 changeSubscription，重複試算結果相同
#[tokio::test]
async fn test_preview_is_repeatable_and_side_effect_free() -> Result<()> {
    let server = MockServer::start();
    mock_account(&server, true);
    let preview = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/v1/billing/subscriptions/S1/changesubscriptionpreview")
            .query_param("startImmediately", "false");
        then.status(200).json_body(json!({
            "Subtotal": 20.0,
            "Tax": 0.0,
            "Total": 20.0,
            "InvoiceLineItems": [{"Description": "Pro plan", "Amount": 20.0}]
        }));
    });
    let change = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/v1/billing/subscriptions/S1/changeSubscription");
        then.status(200).json_body(json!({"Uid": "S1"}));
    });

    let client = client(&server);
    let request = PlanChangeRequest::new("A1", "P2");
    let first = preview_plan_change(&client, &request).await?;
    let second = preview_plan_change(&client, &request).await?;

    preview.assert_hits(2);
    change.assert_hits(0);
    assert_eq!(first.total, Some(20.0));
    assert_eq!(first, second);
    assert_eq!(first.invoice_line_items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_blank_inputs_fail_before_any_request() -> Result<()> {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.path_contains("/api/v1");
        then.status(200).json_body(json!({}));
    });

    let err = change_plan(&client(&server), &PlanChangeRequest::new(" ", "P2"))
        .await
        .unwrap_err();

    assert!(matches!(err, OutsetaError::ValidationError { .. }));
    any.assert_hits(0);
    Ok(())
}
