use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Review workflow state. Only ever advances: Pending -> Categorized ->
/// Posted. `Store::update_status` is the single place that moves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Categorized,
    Posted,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Categorized => "categorized",
            Self::Posted => "posted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "categorized" => Some(Self::Categorized),
            "posted" => Some(Self::Posted),
            _ => None,
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Categorized => 1,
            Self::Posted => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Contains,
    Exact,
    Regex,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Exact => "exact",
            Self::Regex => "regex",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "contains" => Some(Self::Contains),
            "exact" => Some(Self::Exact),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }
}

/// Bearer credential for the remote service, keyed by realm.
#[derive(Debug, Clone)]
pub struct Token {
    pub id: Option<i64>,
    pub realm_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Refuse tokens this close to expiry so an in-flight batch doesn't outlive
/// its credential.
pub const TOKEN_EXPIRY_BUFFER_SECS: i64 = 300;

impl Token {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - chrono::Duration::seconds(TOKEN_EXPIRY_BUFFER_SECS) <= now
    }
}

/// Spending category mirrored from the remote chart of accounts.
///
/// `parent_remote_id` holds the parent's *remote* identity, not a local row
/// id. Building the hierarchy joins parent_remote_id against remote_id
/// (`Store::category_children`); comparing it to a local `id` is wrong.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: Option<i64>,
    pub remote_id: String,
    pub name: String,
    pub full_name: String,
    pub parent_remote_id: Option<String>,
    pub account_type: String,
    pub is_visible: bool,
    pub display_order: i64,
    pub synced_at: DateTime<Utc>,
}

/// Categorization rule. Amount bounds are inclusive and compared against
/// the absolute value of the transaction amount.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: Option<i64>,
    pub name: String,
    pub pattern: String,
    pub kind: PatternKind,
    pub category_id: i64,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub priority: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Rule {
    /// A fresh active rule targeting `category_id`, as saved from the
    /// review flow.
    pub fn for_category(
        name: &str,
        pattern: &str,
        kind: PatternKind,
        category_id: i64,
        priority: i64,
    ) -> Self {
        Rule {
            id: None,
            name: name.to_string(),
            pattern: pattern.to_string(),
            kind,
            category_id,
            min_amount: None,
            max_amount: None,
            priority,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VendorMapping {
    pub id: Option<i64>,
    pub vendor_name: String,
    pub vendor_remote_id: Option<String>,
    pub default_category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cached transaction from the remote service. Expenses are negative
/// locally; the remote convention is the opposite and the sign is flipped
/// on ingestion.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Option<i64>,
    pub remote_id: String,
    pub account_id: String,
    pub account_name: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub vendor_name: Option<String>,
    pub status: TransactionStatus,
    pub assigned_category_id: Option<i64>,
    pub fetched_at: DateTime<Utc>,
}

/// Portion of a transaction assigned to one category.
#[derive(Debug, Clone)]
pub struct TransactionSplit {
    pub id: Option<i64>,
    pub transaction_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub memo: Option<String>,
}
