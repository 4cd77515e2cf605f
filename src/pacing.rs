use crate::models::{CoachingStats, PacingResult, PacingStatus};

/// Deals ahead of (or behind) the expected pace before the status leaves `OnTrack`.
const PACE_TOLERANCE: f64 = 1.0;

pub fn calculate_pacing(stats: &CoachingStats) -> PacingResult {
    let goal = stats.monthly_goal as f64;
    let deals = stats.deals_this_month as f64;

    let expected_pace = if stats.days_in_month == 0 {
        0.0
    } else {
        goal / stats.days_in_month as f64 * stats.days_elapsed as f64
    };
    let pace_delta = deals - expected_pace;
    let days_remaining = i64::from(stats.days_in_month) - i64::from(stats.days_elapsed);

    let required_daily_deals = if days_remaining > 0 {
        let rate = ((goal - deals) / days_remaining as f64 * 10.0).ceil() / 10.0;
        if rate > 0.0 {
            rate
        } else {
            0.0
        }
    } else {
        0.0
    };

    PacingResult {
        status: pacing_status(pace_delta),
        pace_delta,
        days_remaining,
        required_daily_deals,
        expected_pace,
    }
}

pub fn pacing_status(pace_delta: f64) -> PacingStatus {
    if pace_delta >= PACE_TOLERANCE {
        PacingStatus::Ahead
    } else if pace_delta <= -PACE_TOLERANCE {
        PacingStatus::Behind
    } else {
        PacingStatus::OnTrack
    }
}
