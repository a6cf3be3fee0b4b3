use serde::Deserialize;

use paygate_core::Amount;
use paygate_ledger::TransactionKind;

use crate::app::services::{ProfileFields, Registration};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub company_name: String,
    /// Older dashboard builds send `pan_no`.
    #[serde(alias = "pan_no")]
    pub tax_id: String,
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(body: RegisterRequest) -> Self {
        Registration {
            name: body.name,
            email: body.email,
            mobile: body.mobile,
            company_name: body.company_name,
            tax_id: body.tax_id,
            password: body.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub company_name: String,
}

impl From<UpdateProfileRequest> for ProfileFields {
    fn from(body: UpdateProfileRequest) -> Self {
        ProfileFields {
            name: body.name,
            email: body.email,
            mobile: body.mobile,
            company_name: body.company_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: Amount,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: TransactionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_accepts_pan_no_alias() {
        let body: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "A",
            "email": "a@x.com",
            "mobile": "1",
            "company_name": "Co",
            "pan_no": "P1",
            "password": "pw",
        }))
        .unwrap();
        assert_eq!(body.tax_id, "P1");
    }

    #[test]
    fn transaction_type_defaults_to_credit() {
        let body: CreateTransactionRequest =
            serde_json::from_value(serde_json::json!({ "amount": 12.5 })).unwrap();
        assert_eq!(body.kind, TransactionKind::Credit);
        assert_eq!(body.description, "");
        assert_eq!(body.amount, "12.5".parse::<Amount>().unwrap());

        let body: CreateTransactionRequest =
            serde_json::from_value(serde_json::json!({ "amount": 3, "type": "debit" })).unwrap();
        assert_eq!(body.kind, TransactionKind::Debit);
    }
}
