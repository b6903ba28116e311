use crate::adapters::http::OutsetaClient;
use crate::domain::model::{ItemList, NewPlan, Plan, PlanFamily, UidRef};
use crate::utils::error::{OutsetaError, Result};
use crate::utils::validation::require_input;
use regex::Regex;
use std::sync::LazyLock;

pub const PLANS_PATH: &str = "/api/v1/billing/plans";
pub const PLAN_FAMILIES_PATH: &str = "/api/v1/billing/planfamilies";

/// 新方案的註冊模式
pub const ACCOUNT_REGISTRATION_MODE: i64 = 1;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid HTML tag pattern"));

pub async fn list_plans(client: &OutsetaClient) -> Result<Vec<Plan>> {
    let list: ItemList<Plan> = client.get(PLANS_PATH, &[]).await?;
    Ok(list.items)
}

pub async fn list_plan_families(client: &OutsetaClient) -> Result<Vec<PlanFamily>> {
    let list: ItemList<PlanFamily> = client.get(PLAN_FAMILIES_PATH, &[]).await?;
    Ok(list.items)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanDraft {
    pub name: String,
    pub plan_family_uid: String,
    pub monthly_rate: f64,
    pub trial_period_days: i64,
    pub is_active: bool,
}

impl PlanDraft {
    pub fn to_payload(&self) -> Result<NewPlan> {
        let name = require_input("Plan Name", &self.name)?;
        let plan_family_uid = require_input("Plan family UID", &self.plan_family_uid)?;
        if !self.monthly_rate.is_finite() || self.monthly_rate < 0.0 {
            return Err(OutsetaError::validation(
                "Monthly rate must be a valid positive number",
            ));
        }
        if self.trial_period_days < 0 {
            return Err(OutsetaError::validation(
                "Trial period days cannot be negative",
            ));
        }

        Ok(NewPlan {
            account_registration_mode: ACCOUNT_REGISTRATION_MODE,
            is_active: self.is_active,
            name: name.to_string(),
            plan_family: UidRef::new(plan_family_uid),
            monthly_rate: self.monthly_rate,
            trial_period_days: self.trial_period_days,
        })
    }
}

pub async fn create_plan(client: &OutsetaClient, draft: &PlanDraft) -> Result<Plan> {
    let payload = draft.to_payload()?;
    client.post(PLANS_PATH, &payload).await
}

/// 顯示用：移除描述中的 HTML 標籤
pub fn strip_html(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}
