use crate::models::{
    CoachMessage, CoachMessageLevel, CoachingContext, MessageData, Tier, TimeOfDay,
};
use crate::rules::{Rule, ALL_RULES};

const FALLBACK_TEXT: &str = "Keep pushing toward your goals today!";

/// Picks the single message a user sees for `time_of_day`.
pub fn generate_coaching_message(
    context: &CoachingContext,
    time_of_day: TimeOfDay,
) -> CoachMessage {
    select(&ALL_RULES, context, time_of_day)
}

/// Rules are scanned in the given order. Alerts and achievements are returned as
/// soon as they trigger; slot messages only when their type matches the slot.
fn select(
    rules: &[Rule],
    context: &CoachingContext,
    time_of_day: TimeOfDay,
) -> CoachMessage {
    let slot = time_of_day.message_type();

    for &rule in rules {
        if let Some(min_tier) = rule.min_tier() {
            if !tier_meets_minimum(context.tier, min_tier) {
                continue;
            }
        }

        if !rule.should_trigger(context) {
            continue;
        }

        let message = rule.generate_message(context);
        if message.message_type.preempts_slot() || message.message_type == slot {
            tracing::debug!(rule = rule.name(), slot = slot.as_str(), "coaching rule selected");
            return message;
        }
    }

    tracing::debug!(slot = slot.as_str(), "no coaching rule matched, using fallback");
    CoachMessage {
        message_type: slot,
        level: CoachMessageLevel::Info,
        text: FALLBACK_TEXT.to_string(),
        data: MessageData::Empty,
    }
}

pub fn tier_meets_minimum(tier: Tier, min_tier: Tier) -> bool {
    tier >= min_tier
}
