use crate::models::{
    CoachMessage, CoachMessageLevel, CoachMessageType, CoachingContext, MessageData,
    PacingStatus, Tier,
};
use crate::pacing::calculate_pacing;

/// Zero-deal days in a row before the momentum alert fires.
const MOMENTUM_DROUGHT_DAYS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    GoalAchievement,
    MomentumAlert,
    MorningPacing,
    MiddayActivity,
    EveningSummary,
}

/// Every rule, highest priority first.
pub const ALL_RULES: [Rule; 5] = [
    Rule::GoalAchievement,
    Rule::MomentumAlert,
    Rule::MorningPacing,
    Rule::MiddayActivity,
    Rule::EveningSummary,
];

impl Rule {
    pub const fn name(self) -> &'static str {
        match self {
            Self::GoalAchievement => "goal_achievement",
            Self::MomentumAlert => "momentum_alert",
            Self::MorningPacing => "morning_pacing",
            Self::MiddayActivity => "midday_activity",
            Self::EveningSummary => "evening_summary",
        }
    }

    pub const fn min_tier(self) -> Option<Tier> {
        match self {
            Self::MomentumAlert => Some(Tier::Guru),
            _ => None,
        }
    }

    pub fn should_trigger(self, context: &CoachingContext) -> bool {
        let stats = &context.stats;
        match self {
            Self::GoalAchievement => stats.deals_this_month >= stats.monthly_goal,
            Self::MomentumAlert => {
                context.tier == Tier::Guru
                    && stats.recent_days_without_deals >= MOMENTUM_DROUGHT_DAYS
            }
            Self::MorningPacing | Self::MiddayActivity | Self::EveningSummary => true,
        }
    }

    pub fn generate_message(self, context: &CoachingContext) -> CoachMessage {
        match self {
            Self::GoalAchievement => goal_achievement(context),
            Self::MomentumAlert => momentum_alert(context),
            Self::MorningPacing => morning_pacing(context),
            Self::MiddayActivity => midday_activity(context),
            Self::EveningSummary => evening_summary(context),
        }
    }
}

fn goal_achievement(context: &CoachingContext) -> CoachMessage {
    let stats = &context.stats;
    let pacing = calculate_pacing(stats);
    CoachMessage {
        message_type: CoachMessageType::Achievement,
        level: CoachMessageLevel::Success,
        text: format!(
            "🎉 Goal achieved! You hit {} deals with {} days left. Every deal from here is bonus territory.",
            stats.monthly_goal,
            pacing.days_remaining.max(0)
        ),
        data: MessageData::Achievement {
            deals_this_month: stats.deals_this_month,
            monthly_goal: stats.monthly_goal,
        },
    }
}

fn momentum_alert(context: &CoachingContext) -> CoachMessage {
    let days = context.stats.recent_days_without_deals;
    CoachMessage {
        message_type: CoachMessageType::Alert,
        level: CoachMessageLevel::Warning,
        text: format!(
            "You've gone {days} days without a logged deal. Momentum is slipping – front-load follow-ups tomorrow."
        ),
        data: MessageData::Momentum {
            recent_days_without_deals: days,
        },
    }
}

fn morning_pacing(context: &CoachingContext) -> CoachMessage {
    let stats = &context.stats;
    let pacing = calculate_pacing(stats);
    let gap = rounded_gap(pacing.pace_delta);
    let gap_word = if pacing.pace_delta.abs() > 1.0 {
        "deals"
    } else {
        "deal"
    };

    let (level, text) = match pacing.status {
        PacingStatus::Ahead => (
            CoachMessageLevel::Success,
            format!(
                "Good morning! You're {gap} {} ahead of pace this month. Protect this lead with consistent follow-up today.",
                gap_word
            ),
        ),
        PacingStatus::OnTrack => (
            CoachMessageLevel::Info,
            format!(
                "Good morning! You're right on pace for your monthly goal ({}/{} deals). One solid day can put you ahead of the curve.",
                stats.deals_this_month, stats.monthly_goal
            ),
        ),
        PacingStatus::Behind => (
            CoachMessageLevel::Warning,
            format!(
                "Good morning! You're {gap} {} behind pace with {} days left. You need about {} deals per day to hit your goal.",
                gap_word,
                pacing.days_remaining,
                pacing.required_daily_deals
            ),
        ),
    };

    CoachMessage {
        message_type: CoachMessageType::Morning,
        level,
        text,
        data: MessageData::Pacing { pacing },
    }
}

fn midday_activity(context: &CoachingContext) -> CoachMessage {
    let today_deals = context.stats.today_deals;
    let pacing = calculate_pacing(&context.stats);

    let (level, text) = if today_deals == 0 {
        let text = match context.tier {
            Tier::Pro | Tier::Guru => format!(
                "No deals logged yet today. To catch your monthly goal, you need {} deals/day for the next {} days.",
                pacing.required_daily_deals, pacing.days_remaining
            ),
            Tier::Free => {
                "No deals logged yet today. You need at least 1 by close to maintain your current pace."
                    .to_string()
            }
        };
        (CoachMessageLevel::Warning, text)
    } else {
        (
            CoachMessageLevel::Success,
            format!(
                "You've already logged {today_deals} {} today. One more keeps you ahead of your current pace.",
                deals_word(u64::from(today_deals))
            ),
        )
    };

    CoachMessage {
        message_type: CoachMessageType::Midday,
        level,
        text,
        data: MessageData::Activity { today_deals, pacing },
    }
}

fn evening_summary(context: &CoachingContext) -> CoachMessage {
    let stats = &context.stats;
    let pacing = calculate_pacing(stats);
    let month = format!("{}/{}", stats.deals_this_month, stats.monthly_goal);

    let (level, text) = match stats.today_deals {
        0 => (
            CoachMessageLevel::Warning,
            format!(
                "Day complete with no deals logged. You're at {month} for the month. Tomorrow is a fresh opportunity."
            ),
        ),
        1 => {
            let closer = if pacing.status == PacingStatus::Ahead {
                "Keep the momentum!"
            } else {
                "Keep pushing!"
            };
            (
                CoachMessageLevel::Success,
                format!("Solid day with 1 deal logged. You're at {month} for the month. {closer}"),
            )
        }
        count => (
            CoachMessageLevel::Success,
            format!(
                "Great day with {count} deals logged! You're at {month} for the month. This is the kind of consistency that wins."
            ),
        ),
    };

    CoachMessage {
        message_type: CoachMessageType::Evening,
        level,
        text,
        data: MessageData::Activity {
            today_deals: stats.today_deals,
            pacing,
        },
    }
}

/// Whole-deal distance from pace, rounding halves up.
fn rounded_gap(pace_delta: f64) -> u64 {
    (pace_delta + 0.5).floor().abs() as u64
}

fn deals_word(count: u64) -> &'static str {
    if count == 1 {
        "deal"
    } else {
        "deals"
    }
}
