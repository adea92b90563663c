use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::error::{Result, TallyError};
use crate::migrations;
use crate::models::{
    Category, PatternKind, Rule, Token, Transaction, TransactionSplit, TransactionStatus,
    VendorMapping,
};

/// Owns the SQLite connection and all persisted entities. Single logical
/// writer; every mutation commits independently.
pub struct Store {
    conn: Connection,
}

/// Filters for `Store::search`. `None` means unfiltered on that axis.
#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub text: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Store {
    /// Open (creating if needed) the database at `path` and bring its
    /// schema up to the current version.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = Store { conn };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let current = self.schema_version();
        for script in migrations::pending(current, migrations::SCHEMA_VERSION) {
            self.conn.execute_batch(script)?;
        }
        Ok(())
    }

    /// Current schema version; 0 when the version table does not exist yet.
    pub fn schema_version(&self) -> i64 {
        self.conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0)
    }

    // Token operations

    pub fn save_token(&self, token: &Token) -> Result<Token> {
        let now = Utc::now();
        match token.id {
            None => {
                self.conn.execute(
                    "INSERT INTO tokens (realm_id, access_token, refresh_token,
                        expires_at, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(realm_id) DO UPDATE SET
                        access_token = excluded.access_token,
                        refresh_token = excluded.refresh_token,
                        expires_at = excluded.expires_at,
                        updated_at = excluded.updated_at",
                    params![
                        token.realm_id,
                        token.access_token,
                        token.refresh_token,
                        token.expires_at.to_rfc3339(),
                        now.to_rfc3339(),
                        now.to_rfc3339(),
                    ],
                )?;
                self.token_by_realm(&token.realm_id)?
                    .ok_or_else(|| TallyError::Other("token vanished after save".into()))
            }
            Some(id) => {
                self.conn.execute(
                    "UPDATE tokens SET access_token = ?1, refresh_token = ?2,
                        expires_at = ?3, updated_at = ?4 WHERE id = ?5",
                    params![
                        token.access_token,
                        token.refresh_token,
                        token.expires_at.to_rfc3339(),
                        now.to_rfc3339(),
                        id,
                    ],
                )?;
                self.token_by_id(id)?
                    .ok_or_else(|| TallyError::Other(format!("token {id} vanished after save")))
            }
        }
    }

    pub fn token_by_id(&self, id: i64) -> Result<Option<Token>> {
        let token = self
            .conn
            .query_row("SELECT * FROM tokens WHERE id = ?1", [id], row_to_token)
            .optional()?;
        Ok(token)
    }

    pub fn token_by_realm(&self, realm_id: &str) -> Result<Option<Token>> {
        let token = self
            .conn
            .query_row(
                "SELECT * FROM tokens WHERE realm_id = ?1",
                [realm_id],
                row_to_token,
            )
            .optional()?;
        Ok(token)
    }

    pub fn latest_token(&self) -> Result<Option<Token>> {
        let token = self
            .conn
            .query_row(
                "SELECT * FROM tokens ORDER BY updated_at DESC LIMIT 1",
                [],
                row_to_token,
            )
            .optional()?;
        Ok(token)
    }

    pub fn delete_token(&self, id: i64) -> Result<()> {
        self.conn.execute("DELETE FROM tokens WHERE id = ?1", [id])?;
        Ok(())
    }

    // Category operations

    /// Insert or refresh a category keyed by its remote identity. On
    /// conflict, `is_visible` and `display_order` are local preferences and
    /// survive the re-sync.
    pub fn upsert_category(&self, category: &Category) -> Result<Category> {
        match category.id {
            None => {
                self.conn.execute(
                    "INSERT INTO categories (remote_id, name, full_name, parent_remote_id,
                        account_type, is_visible, display_order, synced_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(remote_id) DO UPDATE SET
                        name = excluded.name,
                        full_name = excluded.full_name,
                        parent_remote_id = excluded.parent_remote_id,
                        account_type = excluded.account_type,
                        synced_at = excluded.synced_at",
                    params![
                        category.remote_id,
                        category.name,
                        category.full_name,
                        category.parent_remote_id,
                        category.account_type,
                        category.is_visible as i64,
                        category.display_order,
                        category.synced_at.to_rfc3339(),
                    ],
                )?;
                self.category_by_remote_id(&category.remote_id)?
                    .ok_or_else(|| TallyError::Other("category vanished after upsert".into()))
            }
            Some(id) => {
                self.conn.execute(
                    "UPDATE categories SET remote_id = ?1, name = ?2, full_name = ?3,
                        parent_remote_id = ?4, account_type = ?5, is_visible = ?6,
                        display_order = ?7, synced_at = ?8
                     WHERE id = ?9",
                    params![
                        category.remote_id,
                        category.name,
                        category.full_name,
                        category.parent_remote_id,
                        category.account_type,
                        category.is_visible as i64,
                        category.display_order,
                        category.synced_at.to_rfc3339(),
                        id,
                    ],
                )?;
                self.category_by_id(id)?
                    .ok_or_else(|| TallyError::Other(format!("category {id} vanished after save")))
            }
        }
    }

    pub fn category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT * FROM categories WHERE id = ?1",
                [id],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    pub fn category_by_remote_id(&self, remote_id: &str) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT * FROM categories WHERE remote_id = ?1",
                [remote_id],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    pub fn all_categories(&self) -> Result<Vec<Category>> {
        self.collect_categories("SELECT * FROM categories ORDER BY display_order, full_name", [])
    }

    pub fn visible_categories(&self) -> Result<Vec<Category>> {
        self.collect_categories(
            "SELECT * FROM categories WHERE is_visible = 1 ORDER BY display_order, full_name",
            [],
        )
    }

    /// Children of `parent`. The hierarchy is keyed by *remote* identity:
    /// parent_remote_id joins against remote_id, never against local ids.
    pub fn category_children(&self, parent: &Category) -> Result<Vec<Category>> {
        self.collect_categories(
            "SELECT * FROM categories WHERE parent_remote_id = ?1
             ORDER BY display_order, full_name",
            [parent.remote_id.as_str()],
        )
    }

    pub fn set_category_visibility(&self, id: i64, visible: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE categories SET is_visible = ?1 WHERE id = ?2",
            params![visible as i64, id],
        )?;
        Ok(())
    }

    fn collect_categories<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // Rule operations

    /// Rules are locally authored: insert when the id is absent, update in
    /// place when it is present.
    pub fn save_rule(&self, rule: &Rule) -> Result<Rule> {
        let min = rule.min_amount.map(|d| d.to_string());
        let max = rule.max_amount.map(|d| d.to_string());
        let id = match rule.id {
            None => {
                self.conn.execute(
                    "INSERT INTO rules (name, pattern, pattern_kind, category_id,
                        min_amount, max_amount, priority, is_active, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        rule.name,
                        rule.pattern,
                        rule.kind.as_str(),
                        rule.category_id,
                        min,
                        max,
                        rule.priority,
                        rule.is_active as i64,
                        rule.created_at.to_rfc3339(),
                    ],
                )?;
                self.conn.last_insert_rowid()
            }
            Some(id) => {
                self.conn.execute(
                    "UPDATE rules SET name = ?1, pattern = ?2, pattern_kind = ?3,
                        category_id = ?4, min_amount = ?5, max_amount = ?6,
                        priority = ?7, is_active = ?8
                     WHERE id = ?9",
                    params![
                        rule.name,
                        rule.pattern,
                        rule.kind.as_str(),
                        rule.category_id,
                        min,
                        max,
                        rule.priority,
                        rule.is_active as i64,
                        id,
                    ],
                )?;
                id
            }
        };
        self.rule_by_id(id)?
            .ok_or_else(|| TallyError::Other(format!("rule {id} vanished after save")))
    }

    pub fn rule_by_id(&self, id: i64) -> Result<Option<Rule>> {
        let rule = self
            .conn
            .query_row("SELECT * FROM rules WHERE id = ?1", [id], row_to_rule)
            .optional()?;
        Ok(rule)
    }

    /// Active rules, highest priority first. Ties keep insertion order so
    /// the rules engine's stable traversal matches the stored order.
    pub fn active_rules(&self) -> Result<Vec<Rule>> {
        self.collect_rules("SELECT * FROM rules WHERE is_active = 1 ORDER BY priority DESC, id ASC")
    }

    pub fn all_rules(&self) -> Result<Vec<Rule>> {
        self.collect_rules("SELECT * FROM rules ORDER BY priority DESC, name")
    }

    pub fn delete_rule(&self, id: i64) -> Result<()> {
        self.conn.execute("DELETE FROM rules WHERE id = ?1", [id])?;
        Ok(())
    }

    fn collect_rules(&self, sql: &str) -> Result<Vec<Rule>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([], row_to_rule)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // Vendor mapping operations

    pub fn save_vendor_mapping(&self, mapping: &VendorMapping) -> Result<VendorMapping> {
        let now = Utc::now();
        let id = match mapping.id {
            None => {
                self.conn.execute(
                    "INSERT INTO vendor_mappings (vendor_name, vendor_remote_id,
                        default_category_id, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(vendor_name) DO UPDATE SET
                        vendor_remote_id = excluded.vendor_remote_id,
                        default_category_id = excluded.default_category_id,
                        updated_at = excluded.updated_at",
                    params![
                        mapping.vendor_name,
                        mapping.vendor_remote_id,
                        mapping.default_category_id,
                        now.to_rfc3339(),
                        now.to_rfc3339(),
                    ],
                )?;
                return self
                    .vendor_mapping_by_name(&mapping.vendor_name)?
                    .ok_or_else(|| TallyError::Other("vendor mapping vanished after save".into()));
            }
            Some(id) => {
                self.conn.execute(
                    "UPDATE vendor_mappings SET vendor_name = ?1, vendor_remote_id = ?2,
                        default_category_id = ?3, updated_at = ?4
                     WHERE id = ?5",
                    params![
                        mapping.vendor_name,
                        mapping.vendor_remote_id,
                        mapping.default_category_id,
                        now.to_rfc3339(),
                        id,
                    ],
                )?;
                id
            }
        };
        self.vendor_mapping_by_id(id)?
            .ok_or_else(|| TallyError::Other(format!("vendor mapping {id} vanished after save")))
    }

    pub fn vendor_mapping_by_id(&self, id: i64) -> Result<Option<VendorMapping>> {
        let mapping = self
            .conn
            .query_row(
                "SELECT * FROM vendor_mappings WHERE id = ?1",
                [id],
                row_to_vendor_mapping,
            )
            .optional()?;
        Ok(mapping)
    }

    pub fn vendor_mapping_by_name(&self, vendor_name: &str) -> Result<Option<VendorMapping>> {
        let mapping = self
            .conn
            .query_row(
                "SELECT * FROM vendor_mappings WHERE vendor_name = ?1",
                [vendor_name],
                row_to_vendor_mapping,
            )
            .optional()?;
        Ok(mapping)
    }

    pub fn all_vendor_mappings(&self) -> Result<Vec<VendorMapping>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM vendor_mappings ORDER BY vendor_name")?;
        let rows = stmt
            .query_map([], row_to_vendor_mapping)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn delete_vendor_mapping(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM vendor_mappings WHERE id = ?1", [id])?;
        Ok(())
    }

    // Transaction operations

    /// Insert or refresh a transaction keyed by its remote identity. On
    /// conflict only the remote-owned fields are overwritten; status and
    /// assigned_category_id are review state and are never touched here, so
    /// repeated syncs cannot erase categorization work.
    pub fn upsert_transaction(&self, txn: &Transaction) -> Result<Transaction> {
        self.conn.execute(
            "INSERT INTO transactions (remote_id, account_id, account_name, date,
                amount, description, vendor_name, status, assigned_category_id, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(remote_id) DO UPDATE SET
                account_id = excluded.account_id,
                account_name = excluded.account_name,
                date = excluded.date,
                amount = excluded.amount,
                description = excluded.description,
                vendor_name = excluded.vendor_name,
                fetched_at = excluded.fetched_at",
            params![
                txn.remote_id,
                txn.account_id,
                txn.account_name,
                txn.date.format("%Y-%m-%d").to_string(),
                txn.amount.to_string(),
                txn.description,
                txn.vendor_name,
                txn.status.as_str(),
                txn.assigned_category_id,
                txn.fetched_at.to_rfc3339(),
            ],
        )?;
        self.transaction_by_remote_id(&txn.remote_id)?
            .ok_or_else(|| TallyError::Other("transaction vanished after upsert".into()))
    }

    pub fn transaction_by_id(&self, id: i64) -> Result<Option<Transaction>> {
        let txn = self
            .conn
            .query_row(
                "SELECT * FROM transactions WHERE id = ?1",
                [id],
                row_to_transaction,
            )
            .optional()?;
        Ok(txn)
    }

    pub fn transaction_by_remote_id(&self, remote_id: &str) -> Result<Option<Transaction>> {
        let txn = self
            .conn
            .query_row(
                "SELECT * FROM transactions WHERE remote_id = ?1",
                [remote_id],
                row_to_transaction,
            )
            .optional()?;
        Ok(txn)
    }

    pub fn transactions_by_status(&self, status: TransactionStatus) -> Result<Vec<Transaction>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM transactions WHERE status = ?1 ORDER BY date ASC")?;
        let rows = stmt
            .query_map([status.as_str()], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn pending_transactions(&self) -> Result<Vec<Transaction>> {
        self.transactions_by_status(TransactionStatus::Pending)
    }

    pub fn search(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(status) = filter.status {
            conditions.push("status = ?");
            args.push(Box::new(status.as_str().to_string()));
        }
        if let Some(text) = &filter.text {
            conditions.push("(description LIKE ? OR vendor_name LIKE ?)");
            let pattern = format!("%{text}%");
            args.push(Box::new(pattern.clone()));
            args.push(Box::new(pattern));
        }
        if let Some(min) = filter.min_amount {
            conditions.push("CAST(amount AS REAL) >= CAST(? AS REAL)");
            args.push(Box::new(min.to_string()));
        }
        if let Some(max) = filter.max_amount {
            conditions.push("CAST(amount AS REAL) <= CAST(? AS REAL)");
            args.push(Box::new(max.to_string()));
        }
        if let Some(start) = filter.start_date {
            conditions.push("date >= ?");
            args.push(Box::new(start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = filter.end_date {
            conditions.push("date <= ?");
            args.push(Box::new(end.format("%Y-%m-%d").to_string()));
        }
        let where_clause = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };
        let sql = format!("SELECT * FROM transactions WHERE {where_clause} ORDER BY date ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
                row_to_transaction,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// The only entry point that moves a transaction's status. Status is
    /// monotonic: Pending -> Categorized -> Posted, Posted terminal, and
    /// anything past Pending must carry a category.
    pub fn update_status(
        &self,
        id: i64,
        status: TransactionStatus,
        category_id: Option<i64>,
    ) -> Result<Transaction> {
        let current = self
            .transaction_by_id(id)?
            .ok_or(TallyError::TransactionNotFound(id))?;
        if status.rank() < current.status.rank() {
            return Err(TallyError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }
        if status != TransactionStatus::Pending && category_id.is_none() {
            return Err(TallyError::MissingCategory(status));
        }
        self.conn.execute(
            "UPDATE transactions SET status = ?1, assigned_category_id = ?2 WHERE id = ?3",
            params![status.as_str(), category_id, id],
        )?;
        self.transaction_by_id(id)?
            .ok_or(TallyError::TransactionNotFound(id))
    }

    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM transactions WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Delete all posted transactions (their splits go with them via the
    /// cascade). Returns how many rows were removed.
    pub fn purge_posted(&self) -> Result<usize> {
        let count = self
            .conn
            .execute("DELETE FROM transactions WHERE status = 'posted'", [])?;
        Ok(count)
    }

    // Split operations

    pub fn save_split(&self, split: &TransactionSplit) -> Result<TransactionSplit> {
        let id = match split.id {
            None => {
                self.conn.execute(
                    "INSERT INTO transaction_splits (transaction_id, category_id, amount, memo)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        split.transaction_id,
                        split.category_id,
                        split.amount.to_string(),
                        split.memo,
                    ],
                )?;
                self.conn.last_insert_rowid()
            }
            Some(id) => {
                self.conn.execute(
                    "UPDATE transaction_splits SET transaction_id = ?1, category_id = ?2,
                        amount = ?3, memo = ?4
                     WHERE id = ?5",
                    params![
                        split.transaction_id,
                        split.category_id,
                        split.amount.to_string(),
                        split.memo,
                        id,
                    ],
                )?;
                id
            }
        };
        self.split_by_id(id)?
            .ok_or_else(|| TallyError::Other(format!("split {id} vanished after save")))
    }

    pub fn split_by_id(&self, id: i64) -> Result<Option<TransactionSplit>> {
        let split = self
            .conn
            .query_row(
                "SELECT * FROM transaction_splits WHERE id = ?1",
                [id],
                row_to_split,
            )
            .optional()?;
        Ok(split)
    }

    pub fn splits_for_transaction(&self, transaction_id: i64) -> Result<Vec<TransactionSplit>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM transaction_splits WHERE transaction_id = ?1")?;
        let rows = stmt
            .query_map([transaction_id], row_to_split)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn delete_splits_for_transaction(&self, transaction_id: i64) -> Result<()> {
        self.conn.execute(
            "DELETE FROM transaction_splits WHERE transaction_id = ?1",
            [transaction_id],
        )?;
        Ok(())
    }

    // Settings operations

    pub fn setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete_setting(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> &Connection {
        &self.conn
    }
}

// Row mappers. Conversion failures surface as rusqlite errors so they flow
// through the same persistence error kind as constraint violations.

fn get_decimal(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: rust_decimal::Error| conversion_err(idx, e))
}

fn get_opt_decimal(row: &Row, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| s.parse().map_err(|e: rust_decimal::Error| conversion_err(idx, e)))
        .transpose()
}

fn get_date(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_err(idx, e))
}

fn get_datetime(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

fn conversion_err<E: std::error::Error + Send + Sync + 'static>(
    idx: usize,
    err: E,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn row_to_token(row: &Row) -> rusqlite::Result<Token> {
    Ok(Token {
        id: Some(row.get("id")?),
        realm_id: row.get("realm_id")?,
        access_token: row.get("access_token")?,
        refresh_token: row.get("refresh_token")?,
        expires_at: get_datetime(row, row.as_ref().column_index("expires_at")?)?,
        created_at: get_datetime(row, row.as_ref().column_index("created_at")?)?,
        updated_at: get_datetime(row, row.as_ref().column_index("updated_at")?)?,
    })
}

fn row_to_category(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(row.get("id")?),
        remote_id: row.get("remote_id")?,
        name: row.get("name")?,
        full_name: row.get("full_name")?,
        parent_remote_id: row.get("parent_remote_id")?,
        account_type: row.get("account_type")?,
        is_visible: row.get::<_, i64>("is_visible")? != 0,
        display_order: row.get("display_order")?,
        synced_at: get_datetime(row, row.as_ref().column_index("synced_at")?)?,
    })
}

fn row_to_rule(row: &Row) -> rusqlite::Result<Rule> {
    let kind_raw: String = row.get("pattern_kind")?;
    let kind = PatternKind::parse(&kind_raw).ok_or_else(|| {
        conversion_err(
            row.as_ref().column_index("pattern_kind").unwrap_or(0),
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown pattern kind: {kind_raw}"),
            ),
        )
    })?;
    Ok(Rule {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        pattern: row.get("pattern")?,
        kind,
        category_id: row.get("category_id")?,
        min_amount: get_opt_decimal(row, row.as_ref().column_index("min_amount")?)?,
        max_amount: get_opt_decimal(row, row.as_ref().column_index("max_amount")?)?,
        priority: row.get("priority")?,
        is_active: row.get::<_, i64>("is_active")? != 0,
        created_at: get_datetime(row, row.as_ref().column_index("created_at")?)?,
    })
}

fn row_to_vendor_mapping(row: &Row) -> rusqlite::Result<VendorMapping> {
    Ok(VendorMapping {
        id: Some(row.get("id")?),
        vendor_name: row.get("vendor_name")?,
        vendor_remote_id: row.get("vendor_remote_id")?,
        default_category_id: row.get("default_category_id")?,
        created_at: get_datetime(row, row.as_ref().column_index("created_at")?)?,
        updated_at: get_datetime(row, row.as_ref().column_index("updated_at")?)?,
    })
}

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let status_raw: String = row.get("status")?;
    let status = TransactionStatus::parse(&status_raw).ok_or_else(|| {
        conversion_err(
            row.as_ref().column_index("status").unwrap_or(0),
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown status: {status_raw}"),
            ),
        )
    })?;
    Ok(Transaction {
        id: Some(row.get("id")?),
        remote_id: row.get("remote_id")?,
        account_id: row.get("account_id")?,
        account_name: row.get("account_name")?,
        date: get_date(row, row.as_ref().column_index("date")?)?,
        amount: get_decimal(row, row.as_ref().column_index("amount")?)?,
        description: row.get("description")?,
        vendor_name: row.get("vendor_name")?,
        status,
        assigned_category_id: row.get("assigned_category_id")?,
        fetched_at: get_datetime(row, row.as_ref().column_index("fetched_at")?)?,
    })
}

fn row_to_split(row: &Row) -> rusqlite::Result<TransactionSplit> {
    Ok(TransactionSplit {
        id: Some(row.get("id")?),
        transaction_id: row.get("transaction_id")?,
        category_id: row.get("category_id")?,
        amount: get_decimal(row, row.as_ref().column_index("amount")?)?,
        memo: row.get("memo")?,
    })
}
