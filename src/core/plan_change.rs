use crate::adapters::http::{resource_path, OutsetaClient};
use crate::core::accounts::fetch_account;
use crate::core::orchestrator::Orchestrator;
use crate::domain::model::{Account, InvoicePreview, Subscription, SubscriptionChange, UidRef};
use crate::domain::ports::DependentCall;
use crate::utils::error::{OutsetaError, Result};
use crate::utils::validation::require_input;
use async_trait::async_trait;

pub const SUBSCRIPTIONS_PATH: &str = "/api/v1/billing/subscriptions";
pub const PLAN_CHANGE_ACCOUNT_FIELDS: &str = "Uid,Name,CurrentSubscription.*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanChangeRequest {
    pub account_uid: String,
    pub new_plan_uid: String,
    pub start_immediately: bool,
}

impl PlanChangeRequest {
    pub fn new(account_uid: impl Into<String>, new_plan_uid: impl Into<String>) -> Self {
        Self {
            account_uid: account_uid.into(),
            new_plan_uid: new_plan_uid.into(),
            start_immediately: false,
        }
    }

    pub fn start_immediately(mut self, start_immediately: bool) -> Self {
        self.start_immediately = start_immediately;
        self
    }

    fn validated(&self) -> Result<Self> {
        Ok(Self {
            account_uid: require_input("Account UID", &self.account_uid)?.to_string(),
            new_plan_uid: require_input("Plan UID", &self.new_plan_uid)?.to_string(),
            start_immediately: self.start_immediately,
        })
    }
}

/// 要變更的訂閱，以及沿用原續約週期的請求主體
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlanChange {
    pub subscription_uid: String,
    pub body: SubscriptionChange,
}

/// 帳戶必須有 current subscription 才能換方案
pub fn resolve_plan_change(account: Account, request: &PlanChangeRequest) -> Result<ResolvedPlanChange> {
    let subscription = account.current_subscription.ok_or_else(|| {
        OutsetaError::precondition(format!(
            "Account {} does not have an active subscription",
            request.account_uid
        ))
    })?;
    tracing::debug!("Found current subscription: {}", subscription.uid);

    Ok(ResolvedPlanChange {
        body: SubscriptionChange {
            plan: UidRef::new(request.new_plan_uid.clone()),
            billing_renewal_term: subscription.billing_renewal_term,
            account: UidRef::new(request.account_uid.clone()),
        },
        subscription_uid: subscription.uid,
    })
}

/// 立即生效、無法復原的方案變更
pub struct ChangePlan {
    client: OutsetaClient,
    request: PlanChangeRequest,
}

/// 解析方式同 [`ChangePlan`]，但送往沒有副作用的試算端點
pub struct PreviewPlanChange {
    client: OutsetaClient,
    request: PlanChangeRequest,
}

impl ChangePlan {
    pub fn new(client: OutsetaClient, request: PlanChangeRequest) -> Self {
        Self { client, request }
    }
}

impl PreviewPlanChange {
    pub fn new(client: OutsetaClient, request: PlanChangeRequest) -> Self {
        Self { client, request }
    }
}

fn subscription_path(subscription_uid: &str, action: &str) -> Result<String> {
    resource_path(SUBSCRIPTIONS_PATH, &[subscription_uid, action])
}

#[async_trait]
impl DependentCall for ChangePlan {
    type Context = Account;
    type Resolved = ResolvedPlanChange;
    type Output = Subscription;

    fn describe(&self) -> String {
        format!("plan change for account {}", self.request.account_uid)
    }

    async fn fetch_context(&self) -> Result<Account> {
        fetch_account(&self.client, &self.request.account_uid, PLAN_CHANGE_ACCOUNT_FIELDS).await
    }

    fn resolve(&self, account: Account) -> Result<ResolvedPlanChange> {
        resolve_plan_change(account, &self.request)
    }

    async fn submit(&self, resolved: ResolvedPlanChange) -> Result<Subscription> {
        let path = subscription_path(&resolved.subscription_uid, "changeSubscription")?;
        let start_immediately = self.request.start_immediately.to_string();
        self.client
            .put(&path, &[("startImmediately", start_immediately.as_str())], &resolved.body)
            .await
    }
}

#[async_trait]
impl DependentCall for PreviewPlanChange {
    type Context = Account;
    type Resolved = ResolvedPlanChange;
    type Output = InvoicePreview;

    fn describe(&self) -> String {
        format!("plan change preview for account {}", self.request.account_uid)
    }

    async fn fetch_context(&self) -> Result<Account> {
        fetch_account(&self.client, &self.request.account_uid, PLAN_CHANGE_ACCOUNT_FIELDS).await
    }

    fn resolve(&self, account: Account) -> Result<ResolvedPlanChange> {
        resolve_plan_change(account, &self.request)
    }

    async fn submit(&self, resolved: ResolvedPlanChange) -> Result<InvoicePreview> {
        let path = subscription_path(&resolved.subscription_uid, "changesubscriptionpreview")?;
        let start_immediately = self.request.start_immediately.to_string();
        self.client
            .put(&path, &[("startImmediately", start_immediately.as_str())], &resolved.body)
            .await
    }
}

/// 變更帳戶目前訂閱的方案
pub async fn change_plan(client: &OutsetaClient, request: &PlanChangeRequest) -> Result<Subscription> {
    let request = request.validated()?;
    Orchestrator::new(ChangePlan::new(client.clone(), request)).run().await
}

/// 試算方案變更的金額影響，不會送出任何變更
pub async fn preview_plan_change(
    client: &OutsetaClient,
    request: &PlanChangeRequest,
) -> Result<InvoicePreview> {
    let request = request.validated()?;
    Orchestrator::new(PreviewPlanChange::new(client.clone(), request)).run().await
}
