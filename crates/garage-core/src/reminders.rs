//! Reminder due flag

use chrono::NaiveDate;

use crate::models::{Reminder, ReminderView};

/// A reminder is due once its date has arrived. Undated reminders never are.
pub fn is_due(due_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    due_date.is_some_and(|due| due <= today)
}

/// Attach the due flag for listing
pub fn with_due_flag(reminder: Reminder, today: NaiveDate) -> ReminderView {
    let is_due = is_due(reminder.due_date, today);
    ReminderView { reminder, is_due }
}
