use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoachError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,
    pub customer_name: String,
    pub deal_type: String,
    /// Timezone-naive ISO string, either `YYYY-MM-DD` or a full timestamp.
    pub delivery_date: String,
    pub commission: Option<f64>,
    pub note: String,
}

impl Deal {
    /// Calendar day of delivery, ignoring any time-of-day suffix.
    pub fn delivery_day(&self) -> Option<NaiveDate> {
        let day = self.delivery_date.split('T').next()?;
        NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub tier: Tier,
    pub monthly_goal: u32,
}

/// Subscription level. Declaration order is the gating order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    #[default]
    Free,
    Pro,
    Guru,
}

impl Tier {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Pro => "PRO",
            Self::Guru => "GURU",
        }
    }
}

impl FromStr for Tier {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "guru" => Ok(Self::Guru),
            _ => Err(CoachError::UnknownTier(s.to_string())),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pacing-relevant aggregates for the current calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingStats {
    pub monthly_goal: u32,
    pub deals_this_month: u32,
    pub deals_last_month: u32,
    pub commission_this_month: f64,
    pub commission_last_month: f64,
    pub avg_commission_this_month: f64,
    pub avg_commission_last_month: f64,
    pub days_elapsed: u32,
    pub days_in_month: u32,
    pub today_deals: u32,
    /// Unbroken run of zero-deal days ending today, capped at 7.
    pub recent_days_without_deals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingContext {
    pub tier: Tier,
    pub stats: CoachingStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PacingStatus {
    Ahead,
    OnTrack,
    Behind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacingResult {
    pub status: PacingStatus,
    pub pace_delta: f64,
    pub days_remaining: i64,
    pub required_daily_deals: f64,
    pub expected_pace: f64,
}

/// Slot a caller asks a message for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOfDay {
    Morning,
    Midday,
    Evening,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=11 => Self::Morning,
            12..=16 => Self::Midday,
            _ => Self::Evening,
        }
    }

    pub const fn message_type(self) -> CoachMessageType {
        match self {
            Self::Morning => CoachMessageType::Morning,
            Self::Midday => CoachMessageType::Midday,
            Self::Evening => CoachMessageType::Evening,
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "midday" => Ok(Self::Midday),
            "evening" => Ok(Self::Evening),
            _ => Err(CoachError::UnknownTimeOfDay(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoachMessageType {
    Morning,
    Midday,
    Evening,
    Alert,
    Achievement,
}

impl CoachMessageType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "MORNING",
            Self::Midday => "MIDDAY",
            Self::Evening => "EVENING",
            Self::Alert => "ALERT",
            Self::Achievement => "ACHIEVEMENT",
        }
    }

    /// Alerts and achievements preempt whatever slot was requested.
    pub const fn preempts_slot(&self) -> bool {
        matches!(self, Self::Alert | Self::Achievement)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoachMessageLevel {
    Info,
    Warning,
    Success,
}

impl CoachMessageLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Success => "SUCCESS",
        }
    }
}

/// Numeric inputs behind a message, kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageData {
    Pacing {
        pacing: PacingResult,
    },
    Activity {
        #[serde(rename = "todayDeals")]
        today_deals: u32,
        pacing: PacingResult,
    },
    Momentum {
        #[serde(rename = "recentDaysWithoutDeals")]
        recent_days_without_deals: u32,
    },
    Achievement {
        #[serde(rename = "dealsThisMonth")]
        deals_this_month: u32,
        #[serde(rename = "monthlyGoal")]
        monthly_goal: u32,
    },
    Empty,
}

/// Message body produced by the coaching core, without identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachMessage {
    #[serde(rename = "type")]
    pub message_type: CoachMessageType,
    pub level: CoachMessageLevel,
    pub text: String,
    pub data: MessageData,
}

impl CoachMessage {
    pub fn stamp(self, user_id: Uuid) -> StampedMessage {
        StampedMessage {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            message: self,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampedMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub message: CoachMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal_on(delivery_date: &str) -> Deal {
        Deal {
            id: Uuid::new_v4(),
            customer_name: "Dana Ortiz".to_string(),
            deal_type: "used".to_string(),
            delivery_date: delivery_date.to_string(),
            commission: Some(350.0),
            note: String::new(),
        }
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(Tier::Free < Tier::Pro);
        assert!(Tier::Pro < Tier::Guru);
        assert_eq!(Tier::default(), Tier::Free);
    }

    #[test]
    fn tier_parsing_rejects_unknown_values() {
        assert_eq!("Guru".parse::<Tier>().unwrap(), Tier::Guru);
        assert_eq!(" pro ".parse::<Tier>().unwrap(), Tier::Pro);
        assert!(matches!(
            "platinum".parse::<Tier>(),
            Err(CoachError::UnknownTier(value)) if value == "platinum"
        ));
    }

    #[test]
    fn delivery_day_ignores_time_of_day() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(deal_on("2026-03-14").delivery_day(), Some(expected));
        assert_eq!(
            deal_on("2026-03-14T22:45:00.000Z").delivery_day(),
            Some(expected)
        );
        assert_eq!(deal_on("not a date").delivery_day(), None);
        assert_eq!(deal_on("").delivery_day(), None);
    }

    #[test]
    fn hours_map_to_slots() {
        assert_eq!(TimeOfDay::from_hour(7), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Midday);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Midday);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
    }

    #[test]
    fn message_serializes_with_wire_names() {
        let message = CoachMessage {
            message_type: CoachMessageType::Alert,
            level: CoachMessageLevel::Warning,
            text: "slipping".to_string(),
            data: MessageData::Momentum {
                recent_days_without_deals: 4,
            },
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "ALERT");
        assert_eq!(json["level"], "WARNING");
        assert_eq!(json["data"]["kind"], "momentum");
        assert_eq!(json["data"]["recentDaysWithoutDeals"], 4);
    }

    #[test]
    fn stamping_keeps_the_body() {
        let user_id = Uuid::new_v4();
        let message = CoachMessage {
            message_type: CoachMessageType::Morning,
            level: CoachMessageLevel::Info,
            text: "hello".to_string(),
            data: MessageData::Empty,
        };
        let stamped = message.clone().stamp(user_id);
        assert_eq!(stamped.user_id, user_id);
        assert_eq!(stamped.message, message);
    }
}
