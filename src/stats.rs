use std::collections::HashSet;

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::models::{CoachingContext, CoachingStats, Deal, Tier};

/// Number of days, today included, scanned for the current drought.
const DROUGHT_WINDOW_DAYS: i64 = 7;

/// Today's calendar date. Read once per request and passed down.
pub fn current_snapshot() -> NaiveDate {
    Local::now().date_naive()
}

pub fn calculate_coaching_stats(
    deals: &[Deal],
    monthly_goal: u32,
    tier: Tier,
    today: NaiveDate,
) -> CoachingContext {
    let (last_year, last_month) = previous_month(today.year(), today.month());

    let mut this_month_days: Vec<NaiveDate> = Vec::new();
    let mut commission_this_month = 0.0;
    let mut deals_last_month = 0u32;
    let mut commission_last_month = 0.0;

    for deal in deals {
        let Some(day) = deal.delivery_day() else {
            tracing::debug!(
                deal_id = %deal.id,
                delivery_date = %deal.delivery_date,
                "skipping deal with unparseable delivery date"
            );
            continue;
        };
        let commission = deal.commission.filter(|value| value.is_finite()).unwrap_or(0.0);

        if day.year() == today.year() && day.month() == today.month() {
            this_month_days.push(day);
            commission_this_month += commission;
        } else if day.year() == last_year && day.month() == last_month {
            deals_last_month += 1;
            commission_last_month += commission;
        }
    }

    let deals_this_month = this_month_days.len() as u32;
    let today_deals = this_month_days.iter().filter(|day| **day == today).count() as u32;
    let active_days: HashSet<NaiveDate> = this_month_days.into_iter().collect();

    CoachingContext {
        tier,
        stats: CoachingStats {
            monthly_goal,
            deals_this_month,
            deals_last_month,
            commission_this_month,
            commission_last_month,
            avg_commission_this_month: average(commission_this_month, deals_this_month),
            avg_commission_last_month: average(commission_last_month, deals_last_month),
            days_elapsed: today.day(),
            days_in_month: days_in_month(today.year(), today.month()),
            today_deals,
            recent_days_without_deals: recent_days_without_deals(&active_days, today),
        },
    }
}

/// Counts zero-deal days walking back from today, stopping at the first day with a deal.
fn recent_days_without_deals(active_days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    for offset in 0..DROUGHT_WINDOW_DAYS {
        let day = today - Duration::days(offset);
        if active_days.contains(&day) {
            break;
        }
        streak += 1;
    }
    streak
}

fn average(total: f64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

impl CoachingStats {
    /// Month-to-date commission extrapolated linearly to the whole month.
    pub fn projected_income(&self) -> f64 {
        if self.days_elapsed == 0 {
            return 0.0;
        }
        self.commission_this_month / self.days_elapsed as f64 * self.days_in_month as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn sample_deal(delivery_date: &str, commission: Option<f64>) -> Deal {
        Deal {
            id: Uuid::new_v4(),
            customer_name: "Marcus Hill".to_string(),
            deal_type: "new".to_string(),
            delivery_date: delivery_date.to_string(),
            commission,
            note: "cash deal".to_string(),
        }
    }

    #[test]
    fn partitions_deals_by_calendar_month() {
        let deals = vec![
            sample_deal("2026-03-02", Some(400.0)),
            sample_deal("2026-03-15T18:30:00", Some(600.0)),
            sample_deal("2026-02-27", Some(300.0)),
            sample_deal("2026-01-31", Some(900.0)),
        ];

        let context = calculate_coaching_stats(&deals, 12, Tier::Pro, date(2026, 3, 15));
        let stats = &context.stats;
        assert_eq!(context.tier, Tier::Pro);
        assert_eq!(stats.deals_this_month, 2);
        assert_eq!(stats.deals_last_month, 1);
        assert_eq!(stats.commission_this_month, 1000.0);
        assert_eq!(stats.avg_commission_this_month, 500.0);
        assert_eq!(stats.commission_last_month, 300.0);
        assert_eq!(stats.avg_commission_last_month, 300.0);
        assert_eq!(stats.today_deals, 1);
        assert_eq!(stats.days_elapsed, 15);
        assert_eq!(stats.days_in_month, 31);
    }

    #[test]
    fn january_looks_back_to_previous_december() {
        let deals = vec![
            sample_deal("2025-12-20", Some(250.0)),
            sample_deal("2026-12-20", Some(250.0)),
        ];

        let context = calculate_coaching_stats(&deals, 10, Tier::Free, date(2026, 1, 10));
        assert_eq!(context.stats.deals_last_month, 1);
        assert_eq!(context.stats.deals_this_month, 0);
    }

    #[test]
    fn averages_are_zero_for_empty_periods() {
        let context = calculate_coaching_stats(&[], 20, Tier::Free, date(2026, 6, 4));
        assert_eq!(context.stats.avg_commission_this_month, 0.0);
        assert_eq!(context.stats.avg_commission_last_month, 0.0);
        assert_eq!(context.stats.recent_days_without_deals, 7);
    }

    #[test]
    fn missing_commission_counts_as_zero() {
        let deals = vec![
            sample_deal("2026-06-01", None),
            sample_deal("2026-06-02", Some(500.0)),
        ];
        let context = calculate_coaching_stats(&deals, 20, Tier::Free, date(2026, 6, 4));
        assert_eq!(context.stats.commission_this_month, 500.0);
        assert_eq!(context.stats.avg_commission_this_month, 250.0);
    }

    #[test]
    fn drought_stops_at_most_recent_active_day() {
        let deals = vec![
            sample_deal("2026-03-07", Some(100.0)),
            sample_deal("2026-03-02", Some(100.0)),
        ];
        let context = calculate_coaching_stats(&deals, 20, Tier::Guru, date(2026, 3, 10));
        assert_eq!(context.stats.recent_days_without_deals, 3);
    }

    #[test]
    fn drought_is_zero_when_today_has_a_deal() {
        let deals = vec![sample_deal("2026-03-10T09:00:00", Some(100.0))];
        let context = calculate_coaching_stats(&deals, 20, Tier::Guru, date(2026, 3, 10));
        assert_eq!(context.stats.recent_days_without_deals, 0);
    }

    #[test]
    fn drought_only_sees_current_month_deals() {
        let deals = vec![sample_deal("2026-02-28", Some(100.0))];
        let context = calculate_coaching_stats(&deals, 20, Tier::Guru, date(2026, 3, 2));
        assert_eq!(context.stats.recent_days_without_deals, 7);
    }

    #[test]
    fn malformed_dates_are_excluded() {
        let deals = vec![
            sample_deal("03/10/2026", Some(100.0)),
            sample_deal("", Some(100.0)),
            sample_deal("2026-03-10", Some(100.0)),
        ];
        let context = calculate_coaching_stats(&deals, 20, Tier::Free, date(2026, 3, 10));
        assert_eq!(context.stats.deals_this_month, 1);
        assert_eq!(context.stats.commission_this_month, 100.0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let deals = vec![
            sample_deal("2026-03-01", Some(450.0)),
            sample_deal("2026-03-09", Some(700.0)),
        ];
        let today = date(2026, 3, 10);
        let first = calculate_coaching_stats(&deals, 20, Tier::Pro, today);
        let second = calculate_coaching_stats(&deals, 20, Tier::Pro, today);
        assert_eq!(first, second);
        assert_eq!(deals.len(), 2);
    }

    #[test]
    fn month_lengths_follow_calendar() {
        assert_eq!(days_in_month(2028, 2), 29);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2026, 4), 30);
    }

    #[test]
    fn projected_income_extrapolates_month_to_date() {
        let deals = vec![sample_deal("2026-04-05", Some(1500.0))];
        let context = calculate_coaching_stats(&deals, 20, Tier::Free, date(2026, 4, 10));
        assert!((context.stats.projected_income() - 4500.0).abs() < 0.001);
    }
}
