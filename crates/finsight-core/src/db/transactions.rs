//! Transaction operations

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction, TransactionKind};

impl Database {
    /// Insert a transaction, returning the new row id
    ///
    /// Amounts are unsigned; `kind` carries the direction. Negative amounts
    /// are rejected as invalid input rather than stored.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<i64> {
        if tx.amount < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Transaction amount must be non-negative, got {}",
                tx.amount
            )));
        }
        if tx.category.trim().is_empty() {
            return Err(Error::InvalidInput("Transaction category is required".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (user_id, kind, category, source, amount, description, transaction_date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.user_id,
                tx.kind.as_str(),
                tx.category,
                tx.source,
                tx.amount,
                tx.description,
                format_datetime(tx.transaction_date),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Fetch a user's transactions with optional kind and date-window filters
    ///
    /// Ordering is by transaction date ascending; the analytics engines
    /// consume the result as an unordered set, so ordering only matters for
    /// deterministic output.
    pub fn fetch_transactions(
        &self,
        user_id: i64,
        kind: Option<TransactionKind>,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut sql = String::from(
            "SELECT id, user_id, kind, category, source, amount, description, transaction_date, created_at
             FROM transactions WHERE user_id = ?",
        );
        let mut query_params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(k) = kind {
            sql.push_str(" AND kind = ?");
            query_params.push(Box::new(k.as_str()));
        }
        if let Some(s) = since {
            sql.push_str(" AND transaction_date >= ?");
            query_params.push(Box::new(format_datetime(s)));
        }
        if let Some(u) = until {
            sql.push_str(" AND transaction_date < ?");
            query_params.push(Box::new(format_datetime(u)));
        }
        sql.push_str(" ORDER BY transaction_date ASC");

        let param_refs: Vec<&dyn rusqlite::ToSql> =
            query_params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), |row| {
            let kind_str: String = row.get(2)?;
            let date_str: String = row.get(7)?;
            let created_str: String = row.get(8)?;
            Ok(Transaction {
                id: row.get(0)?,
                user_id: row.get(1)?,
                kind: kind_str.parse().unwrap_or(TransactionKind::Expense),
                category: row.get(3)?,
                source: row.get(4)?,
                amount: row.get(5)?,
                description: row.get(6)?,
                transaction_date: parse_datetime(&date_str),
                created_at: parse_datetime(&created_str),
            })
        })?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row?);
        }
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tx(user_id: i64, kind: TransactionKind, category: &str, amount: f64, days_ago: i64) -> NewTransaction {
        NewTransaction {
            user_id,
            kind,
            category: category.to_string(),
            source: None,
            amount,
            description: String::new(),
            transaction_date: Utc::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_insert_and_fetch() {
        let db = Database::in_memory().unwrap();

        db.insert_transaction(&tx(1, TransactionKind::Expense, "dining", 25.0, 5)).unwrap();
        db.insert_transaction(&tx(1, TransactionKind::Income, "salary", 3000.0, 3)).unwrap();
        db.insert_transaction(&tx(2, TransactionKind::Expense, "dining", 40.0, 1)).unwrap();

        let all = db.fetch_transactions(1, None, None, None).unwrap();
        assert_eq!(all.len(), 2);

        let expenses = db
            .fetch_transactions(1, Some(TransactionKind::Expense), None, None)
            .unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].category, "dining");
        assert_eq!(expenses[0].amount, 25.0);
    }

    #[test]
    fn test_fetch_respects_date_window() {
        let db = Database::in_memory().unwrap();

        db.insert_transaction(&tx(1, TransactionKind::Expense, "dining", 10.0, 100)).unwrap();
        db.insert_transaction(&tx(1, TransactionKind::Expense, "dining", 20.0, 10)).unwrap();

        let since = Utc::now() - Duration::days(30);
        let recent = db
            .fetch_transactions(1, Some(TransactionKind::Expense), Some(since), None)
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].amount, 20.0);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let db = Database::in_memory().unwrap();
        let result = db.insert_transaction(&tx(1, TransactionKind::Expense, "dining", -5.0, 1));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
