//! Reminder operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::vehicles::clean_text;
use super::{format_date, format_datetime, parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewReminder, Reminder, ReminderPatch, ReminderView};
use crate::reminders::with_due_flag;

const REMINDER_COLUMNS: &str = "id, owner_id, vehicle_id, title, due_date, due_mileage, \
     notify_email, notify_before_days, created_at, completed_at";

impl Database {
    fn row_to_reminder(row: &rusqlite::Row) -> rusqlite::Result<Reminder> {
        let due_date: Option<String> = row.get(4)?;
        let created_at: String = row.get(8)?;
        let completed_at: Option<String> = row.get(9)?;
        Ok(Reminder {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            vehicle_id: row.get(2)?,
            title: row.get(3)?,
            due_date: due_date.as_deref().map(parse_date),
            due_mileage: row.get(5)?,
            notify_email: row.get(6)?,
            notify_before_days: row.get(7)?,
            created_at: parse_datetime(&created_at),
            completed_at: completed_at.as_deref().map(parse_datetime),
        })
    }

    pub fn create_reminder(&self, owner_id: i64, input: &NewReminder) -> Result<Reminder> {
        let title = clean_text(Some(input.title.as_str())).ok_or(Error::Validation("title_required"))?;
        if let Some(vehicle_id) = input.vehicle_id {
            self.ensure_vehicle_owned(owner_id, vehicle_id)?;
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO reminders
                (owner_id, vehicle_id, title, due_date, due_mileage, notify_email, notify_before_days)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                owner_id,
                input.vehicle_id,
                title,
                input.due_date.as_ref().map(format_date),
                input.due_mileage,
                input.notify_email,
                input.notify_before_days,
            ],
        )?;
        let id = conn.last_insert_rowid();

        self.get_reminder(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("reminder {}", id)))
    }

    pub fn get_reminder(&self, owner_id: i64, id: i64) -> Result<Option<Reminder>> {
        let conn = self.conn()?;
        let reminder = conn
            .query_row(
                &format!(
                    "SELECT {} FROM reminders WHERE id = ? AND owner_id = ?",
                    REMINDER_COLUMNS
                ),
                params![id, owner_id],
                Self::row_to_reminder,
            )
            .optional()?;
        Ok(reminder)
    }

    /// Reminders with their due flag, soonest first and undated last
    pub fn list_reminders(&self, owner_id: i64, today: NaiveDate) -> Result<Vec<ReminderView>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM reminders WHERE owner_id = ? \
             ORDER BY COALESCE(due_date, '9999-12-31') ASC, id DESC",
            REMINDER_COLUMNS
        ))?;
        let reminders = stmt
            .query_map(params![owner_id], Self::row_to_reminder)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reminders
            .into_iter()
            .map(|r| with_due_flag(r, today))
            .collect())
    }

    pub fn update_reminder(&self, owner_id: i64, id: i64, patch: ReminderPatch) -> Result<Reminder> {
        if patch.is_empty() {
            return Err(Error::Validation("no_fields"));
        }
        let current = self
            .get_reminder(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("reminder {}", id)))?;

        let title = match patch.title {
            Some(t) => clean_text(Some(t.as_str())).ok_or(Error::Validation("title_required"))?,
            None => current.title,
        };
        let due_date = patch.due_date.merge(current.due_date);
        let due_mileage = patch.due_mileage.merge(current.due_mileage);
        let notify_email = patch.notify_email.unwrap_or(current.notify_email);
        let notify_before_days = patch
            .notify_before_days
            .unwrap_or(current.notify_before_days);
        let completed_at = patch.completed_at.merge(current.completed_at);

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE reminders
            SET title = ?, due_date = ?, due_mileage = ?, notify_email = ?,
                notify_before_days = ?, completed_at = ?
            WHERE id = ? AND owner_id = ?
            "#,
            params![
                title,
                due_date.as_ref().map(format_date),
                due_mileage,
                notify_email,
                notify_before_days,
                completed_at.as_ref().map(format_datetime),
                id,
                owner_id,
            ],
        )?;

        self.get_reminder(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("reminder {}", id)))
    }

    pub fn delete_reminder(&self, owner_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM reminders WHERE id = ? AND owner_id = ?",
            params![id, owner_id],
        )?;
        Ok(deleted > 0)
    }
}
