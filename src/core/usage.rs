use crate::adapters::http::OutsetaClient;
use crate::core::accounts::fetch_account;
use crate::core::orchestrator::Orchestrator;
use crate::domain::model::{Account, NewUsage, SubscriptionAddOn, UidRef, UsageRecord};
use crate::domain::ports::DependentCall;
use crate::utils::error::{OutsetaError, Result};
use crate::utils::validation::require_input;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

pub const USAGE_PATH: &str = "/api/v1/billing/usage";
pub const USAGE_ACCOUNT_FIELDS: &str = "Uid,Name,CurrentSubscription.*,CurrentSubscription.SubscriptionAddOns.*,CurrentSubscription.SubscriptionAddOns.AddOn.*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRequest {
    pub account_uid: String,
    pub add_on_uid: String,
    pub amount: i64,
}

impl UsageRequest {
    pub fn new(account_uid: impl Into<String>, add_on_uid: impl Into<String>, amount: i64) -> Self {
        Self {
            account_uid: account_uid.into(),
            add_on_uid: add_on_uid.into(),
            amount,
        }
    }

    fn validated(&self) -> Result<Self> {
        if self.amount <= 0 {
            return Err(OutsetaError::validation("Amount must be a positive number"));
        }
        Ok(Self {
            account_uid: require_input("Account UID", &self.account_uid)?.to_string(),
            add_on_uid: require_input("Add-on UID", &self.add_on_uid)?.to_string(),
            amount: self.amount,
        })
    }
}

/// 在帳戶的 add-on 清單中找出目標，且必須為用量計費類型
pub fn find_usage_add_on(account: Account, request: &UsageRequest) -> Result<SubscriptionAddOn> {
    let subscription = account.current_subscription.ok_or_else(|| {
        OutsetaError::precondition(format!(
            "Account {} does not have an active subscription",
            request.account_uid
        ))
    })?;

    let target = subscription
        .subscription_add_ons
        .unwrap_or_default()
        .into_iter()
        .find(|subscription_add_on| {
            subscription_add_on
                .add_on
                .as_ref()
                .is_some_and(|add_on| add_on.uid == request.add_on_uid)
        })
        .ok_or_else(|| {
            OutsetaError::precondition(format!(
                "Subscription for add-on with UID {} not found for account {}",
                request.add_on_uid, request.account_uid
            ))
        })?;

    let usage_billed = target
        .add_on
        .as_ref()
        .is_some_and(|add_on| add_on.is_usage_billed());
    if !usage_billed {
        return Err(OutsetaError::precondition(format!(
            "Add-on with UID {} is not a usage add-on for account {}",
            request.add_on_uid, request.account_uid
        )));
    }

    tracing::debug!("Found add-on subscription: {}", target.uid);
    Ok(target)
}

pub struct RecordUsage {
    client: OutsetaClient,
    request: UsageRequest,
}

impl RecordUsage {
    pub fn new(client: OutsetaClient, request: UsageRequest) -> Self {
        Self { client, request }
    }
}

#[async_trait]
impl DependentCall for RecordUsage {
    type Context = Account;
    type Resolved = NewUsage;
    type Output = UsageRecord;

    fn describe(&self) -> String {
        format!(
            "usage record of {} for add-on {} on account {}",
            self.request.amount, self.request.add_on_uid, self.request.account_uid
        )
    }

    async fn fetch_context(&self) -> Result<Account> {
        fetch_account(&self.client, &self.request.account_uid, USAGE_ACCOUNT_FIELDS).await
    }

    fn resolve(&self, account: Account) -> Result<NewUsage> {
        let target = find_usage_add_on(account, &self.request)?;
        Ok(NewUsage {
            usage_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            amount: self.request.amount,
            subscription_add_on: UidRef::new(target.uid),
        })
    }

    async fn submit(&self, usage: NewUsage) -> Result<UsageRecord> {
        self.client.post(USAGE_PATH, &usage).await
    }
}

/// 為用量計費的 add-on 新增一筆用量
pub async fn record_usage(client: &OutsetaClient, request: &UsageRequest) -> Result<UsageRecord> {
    let request = request.validated()?;
    Orchestrator::new(RecordUsage::new(client.clone(), request)).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account_with_add_ons(add_ons: serde_json::Value) -> Account {
        serde_json::from_value(json!({
            "Uid": "A1",
            "CurrentSubscription": {"Uid": "S1", "SubscriptionAddOns": add_ons}
        }))
        .unwrap()
    }

    #[test]
    fn test_finds_usage_add_on_by_add_on_uid() {
        let account = account_with_add_ons(json!([
            {"Uid": "SA0", "AddOn": {"Uid": "Y", "BillingAddOnType": 2}},
            {"Uid": "SA1", "AddOn": {"Uid": "X", "BillingAddOnType": 2}}
        ]));
        let found = find_usage_add_on(account, &UsageRequest::new("A1", "X", 10)).unwrap();
        assert_eq!(found.uid, "SA1");
    }

    #[test]
    fn test_missing_add_on_is_precondition() {
        let account = account_with_add_ons(json!([
            {"Uid": "SA0", "AddOn": {"Uid": "Y", "BillingAddOnType": 2}}
        ]));
        let err = find_usage_add_on(account, &UsageRequest::new("A1", "X", 10)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Subscription for add-on with UID X not found for account A1"
        );
    }

    #[test]
    fn test_null_add_on_list_is_precondition() {
        let account = account_with_add_ons(serde_json::Value::Null);
        let err = find_usage_add_on(account, &UsageRequest::new("A1", "X", 10)).unwrap_err();
        assert!(matches!(err, OutsetaError::PreconditionError { .. }));
    }

    #[test]
    fn test_flat_fee_add_on_is_rejected() {
        let account = account_with_add_ons(json!([
            {"Uid": "SA1", "AddOn": {"Uid": "X", "BillingAddOnType": 1}}
        ]));
        let err = find_usage_add_on(account, &UsageRequest::new("A1", "X", 10)).unwrap_err();
        assert!(matches!(err, OutsetaError::PreconditionError { .. }));
        assert!(err.to_string().contains("not a usage add-on"));
    }

    #[test]
    fn test_account_without_subscription_is_precondition() {
        let account: Account = serde_json::from_value(json!({"Uid": "A1"})).unwrap();
        let err = find_usage_add_on(account, &UsageRequest::new("A1", "X", 10)).unwrap_err();
        assert_eq!(err.to_string(), "Account A1 does not have an active subscription");
    }

    #[tokio::test]
    async fn test_non_positive_amount_fails_before_network() {
        let client = OutsetaClient::new("http://127.0.0.1:9", None);
        for amount in [0, -5] {
            let err = record_usage(&client, &UsageRequest::new("A1", "X", amount))
                .await
                .unwrap_err();
            assert!(matches!(err, OutsetaError::ValidationError { .. }));
        }
    }
}
