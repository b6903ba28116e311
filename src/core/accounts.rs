use crate::adapters::http::{resource_path, OutsetaClient};
use crate::domain::model::{
    Account, ItemList, LoginRequest, NewPersonAccount, NewRegistration, NewSubscription, Person,
    Registration, TokenResponse, UidRef,
};
use crate::utils::error::Result;
use crate::utils::validation::require_input;

pub const ACCOUNTS_PATH: &str = "/api/v1/crm/accounts";
pub const REGISTRATIONS_PATH: &str = "/api/v1/crm/registrations";
pub const TOKENS_PATH: &str = "/api/v1/tokens";
pub const ACCOUNT_SEARCH_FIELDS: &str = "Uid,Name,CurrentSubscription.*,CurrentSubscription.Plan.*";

/// 新註冊帳戶預設的續約週期
pub const DEFAULT_BILLING_RENEWAL_TERM: i64 = 2;

/// 只取回後續步驟需要的欄位
pub async fn fetch_account(client: &OutsetaClient, account_uid: &str, fields: &str) -> Result<Account> {
    let path = resource_path(ACCOUNTS_PATH, &[account_uid])?;
    let account: Account = client.get(&path, &[("fields", fields)]).await?;
    tracing::debug!("Account data fetched for: {}", account_uid);
    Ok(account)
}

/// 以人員 email 搜尋帳戶，並帶出目前方案
pub async fn find_accounts_by_email(client: &OutsetaClient, email: &str) -> Result<Vec<Account>> {
    let email = require_input("Email", email)?;
    let list: ItemList<Account> = client
        .get(
            ACCOUNTS_PATH,
            &[
                ("PersonAccount.Person.Email", email),
                ("fields", ACCOUNT_SEARCH_FIELDS),
            ],
        )
        .await?;
    tracing::debug!("Found {} account(s) for {}", list.items.len(), email);
    Ok(list.items)
}

/// 以伺服器端金鑰替使用者產生 access token（不需要密碼）
pub async fn login(client: &OutsetaClient, email: &str) -> Result<TokenResponse> {
    let email = require_input("Email", email)?;
    let body = LoginRequest {
        username: email.to_string(),
    };
    client.post(TOKENS_PATH, &body).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub plan_uid: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub coffee_preference: String,
    pub account_name: String,
    pub account_mascot: String,
}

impl RegistrationRequest {
    pub fn to_payload(&self) -> Result<NewRegistration> {
        let plan_uid = require_input("Plan UID", &self.plan_uid)?;
        let email = require_input("Email", &self.email)?;

        Ok(NewRegistration {
            name: self.account_name.clone(),
            mascot: self.account_mascot.clone(),
            subscriptions: vec![NewSubscription {
                billing_renewal_term: DEFAULT_BILLING_RENEWAL_TERM,
                plan: UidRef::new(plan_uid),
            }],
            person_account: vec![NewPersonAccount {
                is_primary: true,
                person: Person {
                    email: Some(email.to_string()),
                    first_name: Some(self.first_name.clone()),
                    last_name: Some(self.last_name.clone()),
                    coffee_preference: Some(self.coffee_preference.clone()),
                },
            }],
        })
    }
}

/// 建立新帳戶與主要聯絡人，並訂閱所選方案
pub async fn register_account(
    client: &OutsetaClient,
    request: &RegistrationRequest,
) -> Result<Registration> {
    let payload = request.to_payload()?;
    client.post(REGISTRATIONS_PATH, &payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::OutsetaError;

    fn request() -> RegistrationRequest {
        RegistrationRequest {
            plan_uid: "P1".to_string(),
            email: "jane@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            coffee_preference: "Latte".to_string(),
            account_name: "Acme Inc".to_string(),
            account_mascot: "Roadrunner".to_string(),
        }
    }

    #[test]
    fn test_registration_payload() {
        let payload = request().to_payload().unwrap();
        assert_eq!(payload.name, "Acme Inc");
        assert_eq!(payload.subscriptions[0].billing_renewal_term, 2);
        assert!(payload.person_account[0].is_primary);
        assert_eq!(
            payload.person_account[0].person.email.as_deref(),
            Some("jane@example.com")
        );
    }

    #[test]
    fn test_registration_requires_email() {
        let mut request = request();
        request.email = "  ".to_string();
        assert!(matches!(
            request.to_payload(),
            Err(OutsetaError::ValidationError { .. })
        ));
    }
}
