//! Savings goal operations

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Goal, GoalStatus, NewGoal};

impl Database {
    /// Insert a goal, returning the new row id
    pub fn insert_goal(&self, goal: &NewGoal) -> Result<i64> {
        if goal.target_amount <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Goal target amount must be positive, got {}",
                goal.target_amount
            )));
        }
        if goal.current_amount < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Goal current amount must be non-negative, got {}",
                goal.current_amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO goals (user_id, name, target_amount, current_amount) VALUES (?, ?, ?, ?)",
            params![goal.user_id, goal.name, goal.target_amount, goal.current_amount],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Fetch all goals for a user
    pub fn fetch_goals(&self, user_id: i64) -> Result<Vec<Goal>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, target_amount, current_amount, status, created_at
             FROM goals WHERE user_id = ? ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            let status_str: String = row.get(5)?;
            let created_str: String = row.get(6)?;
            Ok(Goal {
                id: row.get(0)?,
                user_id: row.get(1)?,
                name: row.get(2)?,
                target_amount: row.get(3)?,
                current_amount: row.get(4)?,
                status: status_str.parse().unwrap_or(GoalStatus::Active),
                created_at: parse_datetime(&created_str),
            })
        })?;

        let mut goals = Vec::new();
        for row in rows {
            goals.push(row?);
        }
        Ok(goals)
    }

    /// Update a goal's accumulated amount, marking it completed when the
    /// target is reached
    pub fn update_goal_progress(&self, goal_id: i64, current_amount: f64) -> Result<()> {
        if current_amount < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Goal current amount must be non-negative, got {}",
                current_amount
            )));
        }

        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE goals
            SET current_amount = ?1,
                status = CASE WHEN ?1 >= target_amount THEN 'completed' ELSE status END
            WHERE id = ?2
            "#,
            params![current_amount, goal_id],
        )?;

        if updated == 0 {
            return Err(Error::NoData(format!("Goal {} not found", goal_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_fetch_goals() {
        let db = Database::in_memory().unwrap();

        let id = db
            .insert_goal(&NewGoal {
                user_id: 1,
                name: "Emergency fund".to_string(),
                target_amount: 10_000.0,
                current_amount: 2_500.0,
            })
            .unwrap();

        let goals = db.fetch_goals(1).unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].id, id);
        assert_eq!(goals[0].status, GoalStatus::Active);
        assert_eq!(goals[0].current_amount, 2_500.0);
    }

    #[test]
    fn test_progress_completes_goal() {
        let db = Database::in_memory().unwrap();

        let id = db
            .insert_goal(&NewGoal {
                user_id: 1,
                name: "Vacation".to_string(),
                target_amount: 1_000.0,
                current_amount: 0.0,
            })
            .unwrap();

        db.update_goal_progress(id, 1_200.0).unwrap();

        let goals = db.fetch_goals(1).unwrap();
        assert_eq!(goals[0].status, GoalStatus::Completed);
        // Progress can exceed the target; it is not clamped
        assert_eq!(goals[0].current_amount, 1_200.0);
    }

    #[test]
    fn test_invalid_goal_rejected() {
        let db = Database::in_memory().unwrap();
        let result = db.insert_goal(&NewGoal {
            user_id: 1,
            name: "Bad".to_string(),
            target_amount: 0.0,
            current_amount: 0.0,
        });
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        assert!(matches!(
            db.update_goal_progress(999, 10.0),
            Err(Error::NoData(_))
        ));
    }
}
