//! Periodic service scheduling
//!
//! Calendar and odometer arithmetic plus the rules that derive a schedule's
//! next due point from its last service and intervals. Everything here is
//! pure; persistence lives in `db::schedules`.

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};
use crate::models::{NewSchedule, SchedulePatch, ServiceSchedule};

/// Gregorian leap year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Advance `base` by whole calendar months, clamping the day to the end of
/// the target month.
///
/// Jan 31 + 1 month is Feb 28 (Feb 29 in a leap year), never early March.
/// Returns `None` when the result falls outside chrono's supported years.
pub fn add_months_clamped(base: NaiveDate, months: u32) -> Option<NaiveDate> {
    let zero_based = base.month0() as i64 + months as i64;
    let year = i32::try_from(base.year() as i64 + zero_based / 12).ok()?;
    let month = (zero_based % 12) as u32 + 1;
    let day = base.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Odometer reading after travelling `delta` from `base`, `None` on overflow
pub fn add_distance(base: i64, delta: i64) -> Option<i64> {
    base.checked_add(delta)
}

/// Base facts a schedule's next due point is derived from
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScheduleFacts {
    pub last_service_date: Option<NaiveDate>,
    pub last_service_mileage: Option<i64>,
    pub interval_months: Option<i64>,
    pub interval_km: Option<i64>,
}

impl ScheduleFacts {
    /// Drop values that cannot take part in derivation: non-positive
    /// intervals and negative odometer readings.
    pub fn normalized(self) -> Self {
        Self {
            last_service_date: self.last_service_date,
            last_service_mileage: self.last_service_mileage.filter(|m| *m >= 0),
            interval_months: self.interval_months.filter(|m| *m > 0),
            interval_km: self.interval_km.filter(|k| *k > 0),
        }
    }
}

/// Caller-supplied due values that replace derivation for their axis
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DueOverrides {
    pub next_due_date: Option<NaiveDate>,
    pub next_due_mileage: Option<i64>,
}

/// Derived due point; each axis may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NextDue {
    pub date: Option<NaiveDate>,
    pub mileage: Option<i64>,
}

fn derive_date(facts: &ScheduleFacts) -> Option<NaiveDate> {
    let last = facts.last_service_date?;
    let months = facts.interval_months.filter(|m| *m > 0)?;
    let months = u32::try_from(months).ok()?;
    add_months_clamped(last, months)
}

fn derive_mileage(facts: &ScheduleFacts) -> Option<i64> {
    let last = facts.last_service_mileage.filter(|m| *m >= 0)?;
    let interval = facts.interval_km.filter(|k| *k > 0)?;
    add_distance(last, interval)
}

/// Compute the next due point, axis by axis.
///
/// An override wins outright for its axis. Otherwise the axis is derived
/// when both its last value and its interval are known, and absent when
/// either is missing.
pub fn derive_next_due(facts: &ScheduleFacts, overrides: &DueOverrides) -> NextDue {
    NextDue {
        date: overrides.next_due_date.or_else(|| derive_date(facts)),
        mileage: overrides.next_due_mileage.or_else(|| derive_mileage(facts)),
    }
}

/// Validated values for inserting a new schedule
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDraft {
    pub vehicle_id: Option<i64>,
    pub kind: String,
    pub facts: ScheduleFacts,
    pub next_due: NextDue,
}

/// Validate a create request and derive its due point
pub fn draft_new(input: &NewSchedule) -> Result<ScheduleDraft> {
    let kind = input.kind.trim();
    if kind.is_empty() {
        return Err(Error::Validation("kind_required"));
    }

    let facts = ScheduleFacts {
        last_service_date: input.last_service_date,
        last_service_mileage: input.last_service_mileage,
        interval_months: input.interval_months,
        interval_km: input.interval_km,
    }
    .normalized();
    let overrides = DueOverrides {
        next_due_date: input.next_due_date,
        next_due_mileage: input.next_due_mileage,
    };

    Ok(ScheduleDraft {
        vehicle_id: input.vehicle_id,
        kind: kind.to_string(),
        facts,
        next_due: derive_next_due(&facts, &overrides),
    })
}

/// Merge a patch onto a stored schedule.
///
/// Each due axis is re-evaluated only when the patch gives an override for
/// it or touches one of its inputs; other axes keep their stored value.
/// An explicit null override means "derive".
pub fn apply_patch(current: &ServiceSchedule, patch: SchedulePatch) -> Result<ServiceSchedule> {
    if patch.is_empty() {
        return Err(Error::Validation("no_fields"));
    }

    let kind = match patch.kind {
        Some(kind) => {
            let kind = kind.trim().to_string();
            if kind.is_empty() {
                return Err(Error::Validation("kind_required"));
            }
            kind
        }
        None => current.kind.clone(),
    };

    let date_touched = patch.next_due_date.is_present()
        || patch.last_service_date.is_present()
        || patch.interval_months.is_present();
    let mileage_touched = patch.next_due_mileage.is_present()
        || patch.last_service_mileage.is_present()
        || patch.interval_km.is_present();

    let facts = ScheduleFacts {
        last_service_date: patch.last_service_date.merge(current.last_service_date),
        last_service_mileage: patch
            .last_service_mileage
            .merge(current.last_service_mileage),
        interval_months: patch.interval_months.merge(current.interval_months),
        interval_km: patch.interval_km.merge(current.interval_km),
    }
    .normalized();
    let overrides = DueOverrides {
        next_due_date: patch.next_due_date.as_set().copied(),
        next_due_mileage: patch.next_due_mileage.as_set().copied(),
    };
    let derived = derive_next_due(&facts, &overrides);

    Ok(ServiceSchedule {
        id: current.id,
        owner_id: current.owner_id,
        vehicle_id: patch.vehicle_id.merge(current.vehicle_id),
        kind,
        interval_months: facts.interval_months,
        interval_km: facts.interval_km,
        last_service_date: facts.last_service_date,
        last_service_mileage: facts.last_service_mileage,
        next_due_date: if date_touched {
            derived.date
        } else {
            current.next_due_date
        },
        next_due_mileage: if mileage_touched {
            derived.mileage
        } else {
            current.next_due_mileage
        },
        created_at: current.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Patch;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stored() -> ServiceSchedule {
        ServiceSchedule {
            id: 1,
            owner_id: 1,
            vehicle_id: Some(3),
            kind: "Oil change".into(),
            interval_months: Some(12),
            interval_km: Some(15000),
            last_service_date: Some(date(2024, 1, 15)),
            last_service_mileage: Some(50000),
            next_due_date: Some(date(2025, 1, 15)),
            next_due_mileage: Some(65000),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2100, 2), 28);
        assert_eq!(days_in_month(2023, 4), 30);
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(add_months_clamped(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(add_months_clamped(date(2023, 1, 31), 1), Some(date(2023, 2, 28)));
        assert_eq!(add_months_clamped(date(2024, 11, 30), 3), Some(date(2025, 2, 28)));
        assert_eq!(add_months_clamped(date(2024, 3, 31), 1), Some(date(2024, 4, 30)));
    }

    #[test]
    fn test_add_months_year_rollover() {
        assert_eq!(add_months_clamped(date(2024, 12, 5), 1), Some(date(2025, 1, 5)));
        assert_eq!(add_months_clamped(date(2024, 6, 10), 30), Some(date(2026, 12, 10)));
        assert_eq!(add_months_clamped(date(2024, 2, 29), 0), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_add_months_out_of_range_is_none() {
        assert_eq!(add_months_clamped(date(2024, 1, 15), u32::MAX), None);
        assert_eq!(add_months_clamped(date(2024, 1, 15), 4_000_000_000), None);
    }

    #[test]
    fn test_add_distance_overflow_is_none() {
        assert_eq!(add_distance(50000, 15000), Some(65000));
        assert_eq!(add_distance(i64::MAX, 1), None);
    }

    #[test]
    fn test_twelve_months_keeps_month_number() {
        let mut day = date(2023, 1, 1);
        while day < date(2025, 1, 1) {
            let next = add_months_clamped(day, 12).unwrap();
            assert_eq!(next.month(), day.month());
            assert_eq!(next.year(), day.year() + 1);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_derive_date_axis() {
        let facts = ScheduleFacts {
            last_service_date: Some(date(2024, 1, 15)),
            interval_months: Some(12),
            ..Default::default()
        };
        let due = derive_next_due(&facts, &DueOverrides::default());
        assert_eq!(due.date, Some(date(2025, 1, 15)));
        assert_eq!(due.mileage, None);
    }

    #[test]
    fn test_derive_mileage_axis_only() {
        let facts = ScheduleFacts {
            last_service_mileage: Some(50000),
            interval_km: Some(15000),
            ..Default::default()
        };
        let due = derive_next_due(&facts, &DueOverrides::default());
        assert_eq!(due.mileage, Some(65000));
        assert_eq!(due.date, None);
    }

    #[test]
    fn test_override_wins() {
        let facts = ScheduleFacts {
            last_service_date: Some(date(2024, 1, 15)),
            interval_months: Some(12),
            ..Default::default()
        };
        let overrides = DueOverrides {
            next_due_date: Some(date(2099, 1, 1)),
            next_due_mileage: None,
        };
        let due = derive_next_due(&facts, &overrides);
        assert_eq!(due.date, Some(date(2099, 1, 1)));
    }

    #[test]
    fn test_non_positive_interval_is_absent() {
        let facts = ScheduleFacts {
            last_service_date: Some(date(2024, 1, 15)),
            interval_months: Some(0),
            last_service_mileage: Some(1000),
            interval_km: Some(-5),
        };
        assert_eq!(
            derive_next_due(&facts, &DueOverrides::default()),
            NextDue::default()
        );
        let normalized = facts.normalized();
        assert_eq!(normalized.interval_months, None);
        assert_eq!(normalized.interval_km, None);
    }

    #[test]
    fn test_unrepresentable_due_point_is_absent() {
        let input = NewSchedule {
            kind: "Oil change".into(),
            last_service_date: Some(date(2024, 1, 15)),
            interval_months: Some(4_000_000_000),
            last_service_mileage: Some(i64::MAX),
            interval_km: Some(1),
            ..Default::default()
        };
        let draft = draft_new(&input).unwrap();
        assert_eq!(draft.next_due, NextDue::default());
        assert_eq!(draft.facts.interval_months, Some(4_000_000_000));
    }

    #[test]
    fn test_draft_requires_kind() {
        let input = NewSchedule {
            kind: "   ".into(),
            ..Default::default()
        };
        assert_eq!(draft_new(&input).unwrap_err().code(), "kind_required");
    }

    #[test]
    fn test_draft_derives() {
        let input = NewSchedule {
            kind: " Timing belt ".into(),
            interval_km: Some(90000),
            last_service_mileage: Some(10000),
            ..Default::default()
        };
        let draft = draft_new(&input).unwrap();
        assert_eq!(draft.kind, "Timing belt");
        assert_eq!(draft.next_due.mileage, Some(100000));
        assert_eq!(draft.next_due.date, None);
    }

    #[test]
    fn test_patch_rederives_touched_axis_only() {
        let mut current = stored();
        // hand-edited mileage that derivation would not produce
        current.next_due_mileage = Some(70000);

        let patch = SchedulePatch {
            interval_months: Patch::Set(6),
            ..Default::default()
        };
        let updated = apply_patch(&current, patch).unwrap();
        assert_eq!(updated.next_due_date, Some(date(2024, 7, 15)));
        assert_eq!(updated.next_due_mileage, Some(70000));
    }

    #[test]
    fn test_patch_new_service_date() {
        let patch = SchedulePatch {
            last_service_date: Patch::Set(date(2024, 8, 31)),
            last_service_mileage: Patch::Set(62000),
            ..Default::default()
        };
        let updated = apply_patch(&stored(), patch).unwrap();
        assert_eq!(updated.next_due_date, Some(date(2025, 8, 31)));
        assert_eq!(updated.next_due_mileage, Some(77000));
    }

    #[test]
    fn test_patch_override_and_null_override() {
        let patch = SchedulePatch {
            next_due_date: Patch::Set(date(2099, 1, 1)),
            ..Default::default()
        };
        let updated = apply_patch(&stored(), patch).unwrap();
        assert_eq!(updated.next_due_date, Some(date(2099, 1, 1)));

        let patch = SchedulePatch {
            next_due_date: Patch::Null,
            ..Default::default()
        };
        let rederived = apply_patch(&updated, patch).unwrap();
        assert_eq!(rederived.next_due_date, Some(date(2025, 1, 15)));
    }

    #[test]
    fn test_patch_clearing_interval_clears_axis() {
        let patch = SchedulePatch {
            interval_km: Patch::Null,
            ..Default::default()
        };
        let updated = apply_patch(&stored(), patch).unwrap();
        assert_eq!(updated.interval_km, None);
        assert_eq!(updated.next_due_mileage, None);
        assert_eq!(updated.next_due_date, Some(date(2025, 1, 15)));
    }

    #[test]
    fn test_patch_validation() {
        assert_eq!(
            apply_patch(&stored(), SchedulePatch::default())
                .unwrap_err()
                .code(),
            "no_fields"
        );

        let patch = SchedulePatch {
            kind: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(apply_patch(&stored(), patch).unwrap_err().code(), "kind_required");
    }
}
