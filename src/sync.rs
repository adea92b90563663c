//! Reconciles remote records into the ledger store and posts reviewed
//! categories back. Every row merges through an idempotent upsert keyed by
//! remote identity, so a crashed or cancelled batch re-runs safely.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{Result, TallyError};
use crate::models::{Category, Transaction, TransactionStatus};
use crate::remote::{BooksClient, DateRange, RemoteTransaction};
use crate::rules::RulesEngine;
use crate::store::Store;

/// Fetch the remote chart of accounts and merge it into the local
/// category table. A fetch failure aborts the whole call.
pub fn sync_categories(client: &dyn BooksClient, store: &Store) -> Result<Vec<Category>> {
    let accounts = client.fetch_categorization_accounts()?;
    info!(count = accounts.len(), "fetched categorization accounts");
    let mut categories = Vec::with_capacity(accounts.len());
    for account in accounts {
        let candidate = Category {
            id: None,
            remote_id: account.id,
            name: account.name,
            full_name: account.full_name,
            parent_remote_id: account.parent_id,
            account_type: account.account_type,
            is_visible: true,
            display_order: 0,
            synced_at: Utc::now(),
        };
        categories.push(store.upsert_category(&candidate)?);
    }
    Ok(categories)
}

/// Fetch remote transactions for `range` and merge them into the ledger.
///
/// Candidates always carry Pending status; the store's upsert ignores
/// status and assigned category for rows that already exist, so
/// already-reviewed transactions are never regressed.
pub fn sync_transactions(
    client: &dyn BooksClient,
    store: &Store,
    range: &DateRange,
) -> Result<Vec<Transaction>> {
    let remote_txns = client.fetch_transactions(range)?;
    info!(count = remote_txns.len(), "received transactions from remote");

    let categories = store.all_categories()?;
    let by_remote_id: HashMap<&str, &Category> = categories
        .iter()
        .map(|c| (c.remote_id.as_str(), c))
        .collect();

    let mut merged = Vec::with_capacity(remote_txns.len());
    for remote in &remote_txns {
        debug!(remote_id = %remote.id, date = %remote.date, "merging remote transaction");
        let candidate = candidate_from_remote(remote, &by_remote_id);
        merged.push(store.upsert_transaction(&candidate)?);
    }
    Ok(merged)
}

/// Shape a remote record into a local candidate: derive a description,
/// flip the amount sign (remote counts expenses positive), and
/// pre-categorize from the first line's account when it is already known
/// locally.
fn candidate_from_remote(
    remote: &RemoteTransaction,
    categories: &HashMap<&str, &Category>,
) -> Transaction {
    let first_line = remote.lines.first();
    let description = first_line
        .and_then(|line| line.description.clone())
        .filter(|s| !s.is_empty())
        .or_else(|| remote.memo.clone().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| {
            format!(
                "Purchase {}",
                remote.doc_number.as_deref().unwrap_or(&remote.id)
            )
        });

    let assigned_category_id = first_line
        .and_then(|line| line.account_id.as_deref())
        .and_then(|account_id| categories.get(account_id))
        .and_then(|category| category.id);

    Transaction {
        id: None,
        remote_id: remote.id.clone(),
        account_id: remote.account_id.clone(),
        account_name: remote.account_name.clone(),
        date: remote.date,
        amount: -remote.total_amount,
        description,
        vendor_name: remote.vendor_name.clone(),
        status: TransactionStatus::Pending,
        assigned_category_id,
        fetched_at: Utc::now(),
    }
}

#[derive(Debug, Default)]
pub struct CategorizeSummary {
    pub categorized: usize,
    pub unmatched: usize,
}

/// Run the active rules over every pending transaction, advancing matches
/// to Categorized through the store's single status entry point.
pub fn apply_rules(store: &Store) -> Result<CategorizeSummary> {
    let engine = RulesEngine::new(store.active_rules()?);
    let mut summary = CategorizeSummary::default();
    for txn in store.pending_transactions()? {
        let Some(id) = txn.id else { continue };
        match engine.find_match(&txn.description, txn.vendor_name.as_deref(), txn.amount) {
            Some(matched) => {
                debug!(
                    txn = id,
                    rule = %matched.rule.name,
                    category = matched.category_id,
                    "rule matched"
                );
                store.update_status(id, TransactionStatus::Categorized, Some(matched.category_id))?;
                summary.categorized += 1;
            }
            None => summary.unmatched += 1,
        }
    }
    Ok(summary)
}

/// Why a categorized transaction was not submitted. Not an error — the
/// batch records it and moves on.
#[derive(Debug)]
pub enum SkipReason {
    NoCategory,
    CategoryMissing(i64),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCategory => write!(f, "no assigned category"),
            Self::CategoryMissing(id) => write!(f, "category {id} not found"),
        }
    }
}

#[derive(Debug, Default)]
pub struct PostSummary {
    pub posted: Vec<Transaction>,
    pub skipped: Vec<(Transaction, SkipReason)>,
    pub failed: Vec<(Transaction, TallyError)>,
}

/// Push every Categorized transaction back to the remote service.
///
/// Failures are isolated per row: a fetch or update error on one
/// transaction is logged and counted, and the batch continues. Rows that
/// succeed are advanced to Posted immediately, so stopping mid-batch
/// loses nothing.
pub fn post_categorized(client: &dyn BooksClient, store: &Store) -> Result<PostSummary> {
    let categorized = store.transactions_by_status(TransactionStatus::Categorized)?;
    info!(count = categorized.len(), "categorized transactions to post");

    let mut summary = PostSummary::default();
    for txn in categorized {
        let Some(id) = txn.id else { continue };
        let Some(category_id) = txn.assigned_category_id else {
            warn!(remote_id = %txn.remote_id, "skipping: no category assigned");
            summary.skipped.push((txn, SkipReason::NoCategory));
            continue;
        };
        let Some(category) = store.category_by_id(category_id)? else {
            warn!(remote_id = %txn.remote_id, category_id, "skipping: category not found");
            summary.skipped.push((txn, SkipReason::CategoryMissing(category_id)));
            continue;
        };
        match post_one(client, store, &txn, id, &category) {
            Ok(posted) => {
                info!(remote_id = %posted.remote_id, "posted");
                summary.posted.push(posted);
            }
            Err(err) => {
                warn!(remote_id = %txn.remote_id, error = %err, "post failed");
                summary.failed.push((txn, err));
            }
        }
    }
    Ok(summary)
}

fn post_one(
    client: &dyn BooksClient,
    store: &Store,
    txn: &Transaction,
    id: i64,
    category: &Category,
) -> Result<Transaction> {
    let record = client.fetch_transaction_full(&txn.remote_id)?;
    let lines = rebuild_line_items(&record, category);
    client.submit_transaction_update(&record, lines)?;
    store.update_status(id, TransactionStatus::Posted, txn.assigned_category_id)
}

/// Rebuild a record's lines with the reviewed category applied to every
/// account-based expense line. Lines are cloned; the fetched record is
/// never mutated, so a failed submit leaves it retryable as-is.
pub fn rebuild_line_items(record: &Value, category: &Category) -> Vec<Value> {
    let Some(lines) = record.get("Line").and_then(Value::as_array) else {
        return Vec::new();
    };
    lines
        .iter()
        .map(|line| {
            let mut rebuilt = line.clone();
            let is_expense_line = line.get("DetailType").and_then(Value::as_str)
                == Some("AccountBasedExpenseLineDetail");
            if is_expense_line {
                if let Some(detail) = rebuilt.get_mut("AccountBasedExpenseLineDetail") {
                    detail["AccountRef"] = json!({
                        "value": category.remote_id,
                        "name": category.full_name,
                    });
                }
            }
            rebuilt
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatternKind, Rule};
    use crate::remote::{RemoteAccount, RemoteLineItem};
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakeClient {
        accounts: Vec<RemoteAccount>,
        transactions: Vec<RemoteTransaction>,
        records: HashMap<String, Value>,
        fail_fetch: bool,
        fail_update_for: HashSet<String>,
        submitted: RefCell<Vec<(String, Vec<Value>)>>,
    }

    impl BooksClient for FakeClient {
        fn fetch_categorization_accounts(&self) -> Result<Vec<RemoteAccount>> {
            if self.fail_fetch {
                return Err(TallyError::Remote("HTTP 500: boom".into()));
            }
            Ok(self.accounts.clone())
        }

        fn fetch_transactions(&self, _range: &DateRange) -> Result<Vec<RemoteTransaction>> {
            if self.fail_fetch {
                return Err(TallyError::Remote("HTTP 500: boom".into()));
            }
            Ok(self.transactions.clone())
        }

        fn fetch_transaction_full(&self, remote_id: &str) -> Result<Value> {
            self.records
                .get(remote_id)
                .cloned()
                .ok_or_else(|| TallyError::Remote(format!("no record {remote_id}")))
        }

        fn submit_transaction_update(&self, record: &Value, lines: Vec<Value>) -> Result<Value> {
            let id = record
                .get("Id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if self.fail_update_for.contains(&id) {
                return Err(TallyError::Remote("HTTP 400: stale SyncToken".into()));
            }
            self.submitted.borrow_mut().push((id, lines));
            Ok(record.clone())
        }

        fn create_category(
            &self,
            name: &str,
            account_type: &str,
            parent_remote_id: Option<&str>,
        ) -> Result<RemoteAccount> {
            Ok(RemoteAccount {
                id: format!("new-{name}"),
                name: name.to_string(),
                full_name: name.to_string(),
                account_type: account_type.to_string(),
                account_sub_type: None,
                parent_id: parent_remote_id.map(|s| s.to_string()),
                active: true,
                current_balance: None,
            })
        }
    }

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn remote_account(id: &str, name: &str, parent: Option<&str>) -> RemoteAccount {
        RemoteAccount {
            id: id.to_string(),
            name: name.to_string(),
            full_name: format!("Expenses:{name}"),
            account_type: "Expense".to_string(),
            account_sub_type: None,
            parent_id: parent.map(|s| s.to_string()),
            active: true,
            current_balance: None,
        }
    }

    fn remote_txn(id: &str) -> RemoteTransaction {
        RemoteTransaction {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            total_amount: "52.99".parse().unwrap(),
            account_id: "35".to_string(),
            account_name: "Checking".to_string(),
            doc_number: None,
            memo: None,
            vendor_name: Some("Adobe".to_string()),
            vendor_id: Some("v9".to_string()),
            lines: vec![RemoteLineItem {
                id: Some("1".to_string()),
                amount: "52.99".parse().unwrap(),
                description: Some("Creative Cloud".to_string()),
                account_id: None,
                account_name: None,
            }],
        }
    }

    fn record_for(id: &str) -> Value {
        json!({
            "Id": id,
            "SyncToken": "3",
            "PaymentType": "CreditCard",
            "AccountRef": { "value": "35", "name": "Checking" },
            "Line": [
                {
                    "Id": "1",
                    "Amount": 52.99,
                    "DetailType": "AccountBasedExpenseLineDetail",
                    "AccountBasedExpenseLineDetail": {
                        "AccountRef": { "value": "1", "name": "Uncategorized" }
                    }
                },
                {
                    "Id": "2",
                    "Amount": 1.00,
                    "DetailType": "ItemBasedExpenseLineDetail",
                    "ItemBasedExpenseLineDetail": { "ItemRef": { "value": "8" } }
                }
            ],
        })
    }

    fn categorized_txn(store: &Store, remote_id: &str, category_id: Option<i64>) -> Transaction {
        let client = FakeClient {
            transactions: vec![remote_txn(remote_id)],
            ..Default::default()
        };
        let merged = sync_transactions(&client, store, &DateRange::default()).unwrap();
        let txn = &merged[0];
        match category_id {
            Some(cat) => store
                .update_status(txn.id.unwrap(), TransactionStatus::Categorized, Some(cat))
                .unwrap(),
            None => txn.clone(),
        }
    }

    #[test]
    fn test_sync_categories_saves_all() {
        let (_dir, store) = test_store();
        let client = FakeClient {
            accounts: vec![
                remote_account("70", "Software", None),
                remote_account("71", "Cloud", Some("70")),
            ],
            ..Default::default()
        };
        let categories = sync_categories(&client, &store).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(store.all_categories().unwrap().len(), 2);

        let child = store.category_by_remote_id("71").unwrap().unwrap();
        assert_eq!(child.parent_remote_id.as_deref(), Some("70"));
        let parent = store.category_by_remote_id("70").unwrap().unwrap();
        assert_eq!(store.category_children(&parent).unwrap().len(), 1);
    }

    #[test]
    fn test_sync_categories_fetch_failure_aborts() {
        let (_dir, store) = test_store();
        let client = FakeClient {
            fail_fetch: true,
            ..Default::default()
        };
        assert!(matches!(
            sync_categories(&client, &store).unwrap_err(),
            TallyError::Remote(_)
        ));
        assert!(store.all_categories().unwrap().is_empty());
    }

    #[test]
    fn test_sync_transactions_negates_amount() {
        let (_dir, store) = test_store();
        let client = FakeClient {
            transactions: vec![remote_txn("145")],
            ..Default::default()
        };
        let merged = sync_transactions(&client, &store, &DateRange::default()).unwrap();
        assert_eq!(merged[0].amount, "-52.99".parse().unwrap());
        assert_eq!(merged[0].status, TransactionStatus::Pending);
    }

    #[test]
    fn test_description_prefers_line_item() {
        let (_dir, store) = test_store();
        let mut txn = remote_txn("145");
        txn.memo = Some("memo text".to_string());
        let client = FakeClient {
            transactions: vec![txn],
            ..Default::default()
        };
        let merged = sync_transactions(&client, &store, &DateRange::default()).unwrap();
        assert_eq!(merged[0].description, "Creative Cloud");
    }

    #[test]
    fn test_description_falls_back_to_memo() {
        let (_dir, store) = test_store();
        let mut txn = remote_txn("145");
        txn.lines[0].description = Some(String::new());
        txn.memo = Some("Office Paper".to_string());
        let client = FakeClient {
            transactions: vec![txn],
            ..Default::default()
        };
        let merged = sync_transactions(&client, &store, &DateRange::default()).unwrap();
        assert_eq!(merged[0].description, "Office Paper");
    }

    #[test]
    fn test_description_synthesized_from_doc_number() {
        let (_dir, store) = test_store();
        let mut txn = remote_txn("145");
        txn.lines[0].description = None;
        txn.memo = None;
        txn.doc_number = Some("1042".to_string());
        let client = FakeClient {
            transactions: vec![txn],
            ..Default::default()
        };
        let merged = sync_transactions(&client, &store, &DateRange::default()).unwrap();
        assert_eq!(merged[0].description, "Purchase 1042");
    }

    #[test]
    fn test_description_synthesized_from_remote_id() {
        let (_dir, store) = test_store();
        let mut txn = remote_txn("145");
        txn.lines.clear();
        txn.memo = None;
        let client = FakeClient {
            transactions: vec![txn],
            ..Default::default()
        };
        let merged = sync_transactions(&client, &store, &DateRange::default()).unwrap();
        assert_eq!(merged[0].description, "Purchase 145");
    }

    #[test]
    fn test_precategorizes_from_known_line_account() {
        let (_dir, store) = test_store();
        let client = FakeClient {
            accounts: vec![remote_account("70", "Software", None)],
            ..Default::default()
        };
        sync_categories(&client, &store).unwrap();
        let software = store.category_by_remote_id("70").unwrap().unwrap();

        let mut txn = remote_txn("145");
        txn.lines[0].account_id = Some("70".to_string());
        let client = FakeClient {
            transactions: vec![txn],
            ..Default::default()
        };
        let merged = sync_transactions(&client, &store, &DateRange::default()).unwrap();
        assert_eq!(merged[0].assigned_category_id, software.id);
        // Pre-categorization never advances status by itself.
        assert_eq!(merged[0].status, TransactionStatus::Pending);
    }

    #[test]
    fn test_unknown_line_account_leaves_category_unset() {
        let (_dir, store) = test_store();
        let mut txn = remote_txn("145");
        txn.lines[0].account_id = Some("999".to_string());
        let client = FakeClient {
            transactions: vec![txn],
            ..Default::default()
        };
        let merged = sync_transactions(&client, &store, &DateRange::default()).unwrap();
        assert!(merged[0].assigned_category_id.is_none());
    }

    #[test]
    fn test_resync_preserves_review_state() {
        let (_dir, store) = test_store();
        let client = FakeClient {
            accounts: vec![remote_account("70", "Software", None)],
            ..Default::default()
        };
        sync_categories(&client, &store).unwrap();
        let cat = store.category_by_remote_id("70").unwrap().unwrap();
        let reviewed = categorized_txn(&store, "145", cat.id);

        // Second sync delivers the same transaction with a new description.
        let mut changed = remote_txn("145");
        changed.lines[0].description = Some("Creative Cloud renewal".to_string());
        let client = FakeClient {
            transactions: vec![changed],
            ..Default::default()
        };
        let merged = sync_transactions(&client, &store, &DateRange::default()).unwrap();

        assert_eq!(merged[0].id, reviewed.id);
        assert_eq!(merged[0].description, "Creative Cloud renewal");
        assert_eq!(merged[0].status, TransactionStatus::Categorized);
        assert_eq!(merged[0].assigned_category_id, cat.id);
    }

    #[test]
    fn test_apply_rules_advances_matches() {
        let (_dir, store) = test_store();
        let client = FakeClient {
            accounts: vec![remote_account("70", "Software", None)],
            transactions: vec![remote_txn("145"), {
                let mut other = remote_txn("146");
                other.lines[0].description = Some("UNKNOWN VENDOR 77".to_string());
                other.vendor_name = None;
                other
            }],
            ..Default::default()
        };
        sync_categories(&client, &store).unwrap();
        sync_transactions(&client, &store, &DateRange::default()).unwrap();
        let cat = store.category_by_remote_id("70").unwrap().unwrap();
        store
            .save_rule(&Rule::for_category(
                "Adobe",
                "CREATIVE CLOUD",
                PatternKind::Contains,
                cat.id.unwrap(),
                0,
            ))
            .unwrap();

        let summary = apply_rules(&store).unwrap();
        assert_eq!(summary.categorized, 1);
        assert_eq!(summary.unmatched, 1);

        let matched = store.transaction_by_remote_id("145").unwrap().unwrap();
        assert_eq!(matched.status, TransactionStatus::Categorized);
        assert_eq!(matched.assigned_category_id, cat.id);
        let unmatched = store.transaction_by_remote_id("146").unwrap().unwrap();
        assert_eq!(unmatched.status, TransactionStatus::Pending);
    }

    #[test]
    fn test_post_success_advances_to_posted() {
        let (_dir, store) = test_store();
        let sync_client = FakeClient {
            accounts: vec![remote_account("70", "Software", None)],
            ..Default::default()
        };
        sync_categories(&sync_client, &store).unwrap();
        let cat = store.category_by_remote_id("70").unwrap().unwrap();
        let txn = categorized_txn(&store, "145", cat.id);

        let mut records = HashMap::new();
        records.insert("145".to_string(), record_for("145"));
        let client = FakeClient {
            records,
            ..Default::default()
        };
        let summary = post_categorized(&client, &store).unwrap();
        assert_eq!(summary.posted.len(), 1);
        assert!(summary.skipped.is_empty());
        assert!(summary.failed.is_empty());
        assert_eq!(summary.posted[0].status, TransactionStatus::Posted);

        let stored = store.transaction_by_id(txn.id.unwrap()).unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Posted);
        assert_eq!(stored.assigned_category_id, cat.id);

        // The submitted lines carry the reviewed category on the expense
        // line and the item line untouched.
        let submitted = client.submitted.borrow();
        let (id, lines) = &submitted[0];
        assert_eq!(id, "145");
        assert_eq!(
            lines[0]["AccountBasedExpenseLineDetail"]["AccountRef"]["value"],
            json!("70")
        );
        assert_eq!(lines[1]["ItemBasedExpenseLineDetail"]["ItemRef"]["value"], json!("8"));
    }

    #[test]
    fn test_post_skips_unresolvable_category() {
        let (_dir, store) = test_store();
        let sync_client = FakeClient {
            transactions: vec![remote_txn("145"), remote_txn("146")],
            ..Default::default()
        };
        sync_transactions(&sync_client, &store, &DateRange::default()).unwrap();
        // A hand-edited or pre-hardening database can hold categorized rows
        // with a missing or dangling category; the poster must skip them,
        // not abort.
        store
            .raw()
            .execute_batch(
                "PRAGMA foreign_keys=OFF;
                 UPDATE transactions SET status='categorized', assigned_category_id=NULL
                     WHERE remote_id='145';
                 UPDATE transactions SET status='categorized', assigned_category_id=9999
                     WHERE remote_id='146';
                 PRAGMA foreign_keys=ON;",
            )
            .unwrap();

        let client = FakeClient::default();
        let summary = post_categorized(&client, &store).unwrap();
        assert!(summary.posted.is_empty());
        assert!(summary.failed.is_empty());
        assert_eq!(summary.skipped.len(), 2);
        assert!(matches!(summary.skipped[0].1, SkipReason::NoCategory));
        assert!(matches!(summary.skipped[1].1, SkipReason::CategoryMissing(9999)));
        // Skipped rows stay Categorized.
        let stored = store.transaction_by_remote_id("146").unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Categorized);
    }

    #[test]
    fn test_post_fault_isolation() {
        let (_dir, store) = test_store();
        let sync_client = FakeClient {
            accounts: vec![remote_account("70", "Software", None)],
            ..Default::default()
        };
        sync_categories(&sync_client, &store).unwrap();
        let cat = store.category_by_remote_id("70").unwrap().unwrap();

        for (remote_id, day) in [("145", 1), ("146", 2), ("147", 3)] {
            let mut txn = remote_txn(remote_id);
            txn.date = NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
            let client = FakeClient {
                transactions: vec![txn],
                ..Default::default()
            };
            let merged = sync_transactions(&client, &store, &DateRange::default()).unwrap();
            store
                .update_status(merged[0].id.unwrap(), TransactionStatus::Categorized, cat.id)
                .unwrap();
        }

        let mut records = HashMap::new();
        for id in ["145", "146", "147"] {
            records.insert(id.to_string(), record_for(id));
        }
        let mut fail_update_for = HashSet::new();
        fail_update_for.insert("146".to_string());
        let client = FakeClient {
            records,
            fail_update_for,
            ..Default::default()
        };

        let summary = post_categorized(&client, &store).unwrap();
        assert_eq!(summary.posted.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.skipped.is_empty());

        for (remote_id, expected) in [
            ("145", TransactionStatus::Posted),
            ("146", TransactionStatus::Categorized),
            ("147", TransactionStatus::Posted),
        ] {
            let stored = store.transaction_by_remote_id(remote_id).unwrap().unwrap();
            assert_eq!(stored.status, expected, "remote_id {remote_id}");
        }
    }

    #[test]
    fn test_rebuild_line_items_never_mutates_original() {
        let record = record_for("145");
        let original = record.clone();
        let category = Category {
            id: Some(1),
            remote_id: "70".to_string(),
            name: "Software".to_string(),
            full_name: "Expenses:Software".to_string(),
            parent_remote_id: None,
            account_type: "Expense".to_string(),
            is_visible: true,
            display_order: 0,
            synced_at: Utc::now(),
        };
        let lines = rebuild_line_items(&record, &category);
        assert_eq!(record, original);
        assert_eq!(
            lines[0]["AccountBasedExpenseLineDetail"]["AccountRef"]["name"],
            json!("Expenses:Software")
        );
        // Non-expense lines are copied unchanged.
        assert_eq!(lines[1], original["Line"][1]);
    }

    #[test]
    fn test_rebuild_line_items_without_lines() {
        let category = Category {
            id: Some(1),
            remote_id: "70".to_string(),
            name: "Software".to_string(),
            full_name: "Expenses:Software".to_string(),
            parent_remote_id: None,
            account_type: "Expense".to_string(),
            is_visible: true,
            display_order: 0,
            synced_at: Utc::now(),
        };
        assert!(rebuild_line_items(&json!({ "Id": "1" }), &category).is_empty());
    }
}
