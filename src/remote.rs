//! Boundary to the bookkeeping service. `BooksClient` is the contract the
//! sync and post paths depend on; `QboHttpClient` is the QuickBooks Online
//! implementation of it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::error::{Result, TallyError};

const SANDBOX_BASE_URL: &str = "https://sandbox-quickbooks.api.intuit.com";
const PRODUCTION_BASE_URL: &str = "https://quickbooks.api.intuit.com";
const API_VERSION: &str = "v3";
const MINOR_VERSION: &str = "75";

/// Remote page cap for transaction queries. The remote orders by date
/// ascending; no cross-page dedup is needed because upserts are keyed by
/// remote id.
pub const PAGE_CAP: usize = 1000;

#[derive(Debug, Default, Clone)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// An account from the remote chart of accounts that can serve as a
/// spending category.
#[derive(Debug, Clone)]
pub struct RemoteAccount {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub account_type: String,
    pub account_sub_type: Option<String>,
    pub parent_id: Option<String>,
    pub active: bool,
    pub current_balance: Option<Decimal>,
}

/// A purchase/expense as the remote reports it in list queries.
#[derive(Debug, Clone)]
pub struct RemoteTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub total_amount: Decimal,
    pub account_id: String,
    pub account_name: String,
    pub doc_number: Option<String>,
    pub memo: Option<String>,
    pub vendor_name: Option<String>,
    pub vendor_id: Option<String>,
    pub lines: Vec<RemoteLineItem>,
}

#[derive(Debug, Clone)]
pub struct RemoteLineItem {
    pub id: Option<String>,
    pub amount: Decimal,
    pub description: Option<String>,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
}

/// Everything the sync reconciler and poster need from the remote service.
/// All failures surface as `TallyError::Remote`.
pub trait BooksClient {
    fn fetch_categorization_accounts(&self) -> Result<Vec<RemoteAccount>>;

    /// Transactions in `range`, ordered by date ascending, capped at
    /// `PAGE_CAP`.
    fn fetch_transactions(&self, range: &DateRange) -> Result<Vec<RemoteTransaction>>;

    /// Raw record for one transaction, including the version token
    /// (SyncToken) and the full line list required for updates.
    fn fetch_transaction_full(&self, remote_id: &str) -> Result<Value>;

    /// Submit an update carrying `lines` in place of the record's line
    /// items. Returns the updated record.
    fn submit_transaction_update(&self, record: &Value, lines: Vec<Value>) -> Result<Value>;

    fn create_category(
        &self,
        name: &str,
        account_type: &str,
        parent_remote_id: Option<&str>,
    ) -> Result<RemoteAccount>;
}

pub struct QboHttpClient {
    http: reqwest::blocking::Client,
    base_url: &'static str,
    realm_id: String,
    access_token: String,
}

impl QboHttpClient {
    pub fn new(environment: &str, realm_id: String, access_token: String) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        let base_url = if environment == "sandbox" {
            SANDBOX_BASE_URL
        } else {
            PRODUCTION_BASE_URL
        };
        Ok(QboHttpClient {
            http,
            base_url,
            realm_id,
            access_token,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}/company/{}/{}",
            self.base_url, API_VERSION, self.realm_id, endpoint
        )
    }

    fn check(&self, response: reqwest::blocking::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TallyError::Remote(format!("HTTP {status}: {body}")));
        }
        Ok(response.json()?)
    }

    fn query(&self, query: &str) -> Result<Value> {
        let response = self
            .http
            .get(self.url("query"))
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .query(&[("query", query), ("minorversion", MINOR_VERSION)])
            .send()?;
        let mut data = self.check(response)?;
        Ok(data
            .get_mut("QueryResponse")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    fn post(&self, endpoint: &str, payload: &Value) -> Result<Value> {
        let response = self
            .http
            .post(self.url(endpoint))
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .query(&[("minorversion", MINOR_VERSION)])
            .json(payload)
            .send()?;
        self.check(response)
    }
}

impl BooksClient for QboHttpClient {
    fn fetch_categorization_accounts(&self) -> Result<Vec<RemoteAccount>> {
        let response = self.query(
            "SELECT * FROM Account WHERE AccountType IN \
             ('Expense', 'Other Expense', 'Cost of Goods Sold', \
             'Income', 'Other Income') AND Active = true",
        )?;
        json_array(&response, "Account")
            .into_iter()
            .map(parse_account)
            .collect()
    }

    fn fetch_transactions(&self, range: &DateRange) -> Result<Vec<RemoteTransaction>> {
        let mut query = String::from("SELECT * FROM Purchase");
        let mut conditions = Vec::new();
        if let Some(start) = range.start {
            conditions.push(format!("TxnDate >= '{}'", start.format("%Y-%m-%d")));
        }
        if let Some(end) = range.end {
            conditions.push(format!("TxnDate <= '{}'", end.format("%Y-%m-%d")));
        }
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(&format!(" ORDERBY TxnDate ASC MAXRESULTS {PAGE_CAP}"));

        let response = self.query(&query)?;
        json_array(&response, "Purchase")
            .into_iter()
            .map(parse_purchase)
            .collect()
    }

    fn fetch_transaction_full(&self, remote_id: &str) -> Result<Value> {
        let response = self
            .http
            .get(self.url(&format!("purchase/{remote_id}")))
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .query(&[("minorversion", MINOR_VERSION)])
            .send()?;
        let mut data = self.check(response)?;
        data.get_mut("Purchase")
            .map(Value::take)
            .ok_or_else(|| TallyError::Remote(format!("no Purchase in response for {remote_id}")))
    }

    fn submit_transaction_update(&self, record: &Value, lines: Vec<Value>) -> Result<Value> {
        let payload = json!({
            "Id": record.get("Id").cloned().unwrap_or(Value::Null),
            "SyncToken": record.get("SyncToken").cloned().unwrap_or(json!("0")),
            "PaymentType": record.get("PaymentType").cloned().unwrap_or(Value::Null),
            "AccountRef": record.get("AccountRef").cloned().unwrap_or(Value::Null),
            "Line": lines,
            "sparse": true,
        });
        tracing::debug!(payload = %payload, "submitting transaction update");
        let mut data = self.post("purchase", &payload)?;
        Ok(data
            .get_mut("Purchase")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    fn create_category(
        &self,
        name: &str,
        account_type: &str,
        parent_remote_id: Option<&str>,
    ) -> Result<RemoteAccount> {
        let mut payload = json!({
            "Name": name,
            "AccountType": account_type,
        });
        if let Some(parent) = parent_remote_id {
            payload["SubAccount"] = json!(true);
            payload["ParentRef"] = json!({ "value": parent });
        }
        let data = self.post("account", &payload)?;
        let account = data
            .get("Account")
            .ok_or_else(|| TallyError::Remote("no Account in create response".into()))?;
        parse_account(account)
    }
}

fn json_array<'a>(data: &'a Value, key: &str) -> Vec<&'a Value> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().collect())
        .unwrap_or_default()
}

// Amounts arrive as JSON numbers; going through the number's text keeps
// them exact instead of bouncing through f64.
fn json_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn json_str(value: &Value) -> Option<String> {
    value.as_str().map(|s| s.to_string())
}

pub fn parse_account(data: &Value) -> Result<RemoteAccount> {
    let id = data
        .get("Id")
        .and_then(Value::as_str)
        .ok_or_else(|| TallyError::Remote("account without Id".into()))?;
    let name = data
        .get("Name")
        .and_then(Value::as_str)
        .ok_or_else(|| TallyError::Remote(format!("account {id} without Name")))?;
    Ok(RemoteAccount {
        id: id.to_string(),
        name: name.to_string(),
        full_name: data
            .get("FullyQualifiedName")
            .and_then(Value::as_str)
            .unwrap_or(name)
            .to_string(),
        account_type: data
            .get("AccountType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        account_sub_type: data.get("AccountSubType").and_then(json_str),
        parent_id: data
            .get("ParentRef")
            .and_then(|r| r.get("value"))
            .and_then(json_str),
        active: data.get("Active").and_then(Value::as_bool).unwrap_or(true),
        current_balance: data.get("CurrentBalance").and_then(json_decimal),
    })
}

pub fn parse_purchase(data: &Value) -> Result<RemoteTransaction> {
    let id = data
        .get("Id")
        .and_then(Value::as_str)
        .ok_or_else(|| TallyError::Remote("purchase without Id".into()))?;
    let date_raw = data
        .get("TxnDate")
        .and_then(Value::as_str)
        .ok_or_else(|| TallyError::Remote(format!("purchase {id} without TxnDate")))?;
    let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
        .map_err(|e| TallyError::Remote(format!("purchase {id} bad TxnDate: {e}")))?;
    let account_ref = data.get("AccountRef");
    let entity_ref = data.get("EntityRef");
    let lines = data
        .get("Line")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(parse_line).collect())
        .unwrap_or_default();
    Ok(RemoteTransaction {
        id: id.to_string(),
        date,
        total_amount: data
            .get("TotalAmt")
            .and_then(json_decimal)
            .unwrap_or_default(),
        account_id: account_ref
            .and_then(|r| r.get("value"))
            .and_then(json_str)
            .unwrap_or_default(),
        account_name: account_ref
            .and_then(|r| r.get("name"))
            .and_then(json_str)
            .unwrap_or_default(),
        doc_number: data.get("DocNumber").and_then(json_str),
        memo: data.get("PrivateNote").and_then(json_str),
        vendor_name: entity_ref.and_then(|r| r.get("name")).and_then(json_str),
        vendor_id: entity_ref.and_then(|r| r.get("value")).and_then(json_str),
        lines,
    })
}

fn parse_line(data: &Value) -> RemoteLineItem {
    let account_ref = data
        .get("AccountBasedExpenseLineDetail")
        .and_then(|d| d.get("AccountRef"));
    RemoteLineItem {
        id: data.get("Id").and_then(json_str),
        amount: data.get("Amount").and_then(json_decimal).unwrap_or_default(),
        description: data.get("Description").and_then(json_str),
        account_id: account_ref.and_then(|r| r.get("value")).and_then(json_str),
        account_name: account_ref.and_then(|r| r.get("name")).and_then(json_str),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_full() {
        let account = parse_account(&json!({
            "Id": "70",
            "Name": "Software",
            "FullyQualifiedName": "Expenses:Software",
            "AccountType": "Expense",
            "AccountSubType": "OfficeGeneralAdministrativeExpenses",
            "ParentRef": { "value": "60" },
            "Active": true,
            "CurrentBalance": 1234.56,
        }))
        .unwrap();
        assert_eq!(account.id, "70");
        assert_eq!(account.full_name, "Expenses:Software");
        assert_eq!(account.parent_id.as_deref(), Some("60"));
        assert_eq!(account.current_balance, Some("1234.56".parse().unwrap()));
    }

    #[test]
    fn test_parse_account_minimal_defaults() {
        let account = parse_account(&json!({
            "Id": "70",
            "Name": "Software",
            "AccountType": "Expense",
        }))
        .unwrap();
        assert_eq!(account.full_name, "Software");
        assert!(account.parent_id.is_none());
        assert!(account.active);
        assert!(account.current_balance.is_none());
    }

    #[test]
    fn test_parse_account_missing_id_is_remote_error() {
        let err = parse_account(&json!({ "Name": "Software" })).unwrap_err();
        assert!(matches!(err, TallyError::Remote(_)));
    }

    #[test]
    fn test_parse_purchase_with_lines() {
        let txn = parse_purchase(&json!({
            "Id": "145",
            "TxnDate": "2025-03-10",
            "TotalAmt": 52.99,
            "DocNumber": "1042",
            "PrivateNote": "monthly invoice",
            "AccountRef": { "value": "35", "name": "Checking" },
            "EntityRef": { "value": "v9", "name": "Adobe" },
            "Line": [
                {
                    "Id": "1",
                    "Amount": 52.99,
                    "Description": "Creative Cloud",
                    "DetailType": "AccountBasedExpenseLineDetail",
                    "AccountBasedExpenseLineDetail": {
                        "AccountRef": { "value": "70", "name": "Software" }
                    }
                }
            ],
        }))
        .unwrap();
        assert_eq!(txn.id, "145");
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(txn.total_amount, "52.99".parse().unwrap());
        assert_eq!(txn.vendor_name.as_deref(), Some("Adobe"));
        assert_eq!(txn.lines.len(), 1);
        assert_eq!(txn.lines[0].account_id.as_deref(), Some("70"));
        assert_eq!(txn.lines[0].description.as_deref(), Some("Creative Cloud"));
    }

    #[test]
    fn test_parse_purchase_without_refs() {
        let txn = parse_purchase(&json!({
            "Id": "146",
            "TxnDate": "2025-03-11",
            "TotalAmt": 10,
        }))
        .unwrap();
        assert_eq!(txn.account_id, "");
        assert!(txn.vendor_name.is_none());
        assert!(txn.lines.is_empty());
    }

    #[test]
    fn test_json_decimal_stays_exact() {
        assert_eq!(json_decimal(&json!(0.1)), Some("0.1".parse().unwrap()));
        assert_eq!(json_decimal(&json!("52.99")), Some("52.99".parse().unwrap()));
        assert_eq!(json_decimal(&json!(null)), None);
    }
}
