use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 依回報用量計費的 add-on 之 `BillingAddOnType`
pub const USAGE_BILLED_ADD_ON_TYPE: i64 = 2;

/// `{ "Uid": "..." }` 參照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UidRef {
    pub uid: String,
}

impl UidRef {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// 列表型端點的回應外層（`items` 為小寫）
#[derive(Debug, Clone, Deserialize)]
pub struct ItemList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_subscription: Option<Subscription>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    pub fn current_plan(&self) -> Option<&Plan> {
        self.current_subscription
            .as_ref()
            .and_then(|subscription| subscription.plan.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subscription {
    pub uid: String,
    #[serde(default)]
    pub billing_renewal_term: Option<i64>,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub subscription_add_ons: Option<Vec<SubscriptionAddOn>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionAddOn {
    pub uid: String,
    #[serde(default)]
    pub add_on: Option<AddOn>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddOn {
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub billing_add_on_type: Option<i64>,
}

impl AddOn {
    pub fn is_usage_billed(&self) -> bool {
        self.billing_add_on_type == Some(USAGE_BILLED_ADD_ON_TYPE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Plan {
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub monthly_rate: Option<f64>,
    #[serde(default)]
    pub trial_period_days: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlanFamily {
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `PUT .../changeSubscription` 與 `.../changesubscriptionpreview` 的請求主體
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionChange {
    pub plan: UidRef,
    pub billing_renewal_term: Option<i64>,
    pub account: UidRef,
}

/// 方案變更試算端點回傳的金額預估
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoicePreview {
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default, alias = "AmountRefunded")]
    pub refunded_amount: Option<f64>,
    #[serde(default, alias = "LineItems")]
    pub invoice_line_items: Vec<InvoiceLineItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceLineItem {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST /api/v1/billing/usage` 的請求主體
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewUsage {
    pub usage_date: String,
    pub amount: i64,
    pub subscription_add_on: UidRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UsageRecord {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub usage_date: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /api/v1/profile` 回傳的人員資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Profile {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_image_s3_url: Option<String>,
    #[serde(default)]
    pub account: Option<ProfileAccount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProfileAccount {
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /api/v1/tokens` 回應（欄位為 snake_case）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginRequest {
    pub username: String,
}

/// `POST /api/v1/crm/registrations` 的請求主體
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewRegistration {
    pub name: String,
    pub mascot: String,
    pub subscriptions: Vec<NewSubscription>,
    pub person_account: Vec<NewPersonAccount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewSubscription {
    pub billing_renewal_term: i64,
    pub plan: UidRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewPersonAccount {
    pub is_primary: bool,
    pub person: Person,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub coffee_preference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Registration {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mascot: Option<String>,
    #[serde(default)]
    pub primary_contact: Option<Person>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST /api/v1/billing/plans` 的請求主體
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewPlan {
    pub account_registration_mode: i64,
    pub is_active: bool,
    pub name: String,
    pub plan_family: UidRef,
    pub monthly_rate: f64,
    pub trial_period_days: i64,
}

/// 錯誤回應主體；所有欄位皆可缺省
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub entity_validation_errors: Option<Vec<EntityValidationError>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityValidationError {
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub validation_errors: Vec<FieldValidationError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldValidationError {
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl EntityValidationError {
    /// 輸出 `[TypeName] PropertyName: ErrorMessage`；沒有型別名稱時用 `Entity`
    pub fn describe(&self) -> Vec<String> {
        let type_name = self.type_name.as_deref().unwrap_or("Entity");
        self.validation_errors
            .iter()
            .map(|error| {
                format!(
                    "[{}] {}: {}",
                    type_name,
                    error.property_name.as_deref().unwrap_or(""),
                    error.error_message.as_deref().unwrap_or("")
                )
            })
            .collect()
    }
}
