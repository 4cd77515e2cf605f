use serde::{Deserialize, Serialize};

/// Deals a free account can log before Pro is required.
pub const FREE_DEAL_LIMIT: u32 = 10;

const SOFT_WARNING_AT: u32 = FREE_DEAL_LIMIT - 2;
const HARD_WARNING_AT: u32 = FREE_DEAL_LIMIT - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningLevel {
    None,
    Soft,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellState {
    pub warning_level: WarningLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deals_remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_income: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellBanner {
    pub title: String,
    pub body: String,
    pub call_to_action: Option<String>,
}

/// Pre-limit nudge for free accounts. Fires only on the two deals before the limit.
pub fn evaluate_upsell_state(deal_count: u32, projected_income: f64) -> UpsellState {
    match deal_count {
        SOFT_WARNING_AT => UpsellState {
            warning_level: WarningLevel::Soft,
            deals_remaining: Some(FREE_DEAL_LIMIT - deal_count),
            projected_income: None,
        },
        HARD_WARNING_AT => UpsellState {
            warning_level: WarningLevel::Hard,
            deals_remaining: Some(FREE_DEAL_LIMIT - deal_count),
            projected_income: Some(projected_income),
        },
        _ => UpsellState {
            warning_level: WarningLevel::None,
            deals_remaining: None,
            projected_income: None,
        },
    }
}

impl UpsellState {
    pub fn banner(&self) -> Option<UpsellBanner> {
        match self.warning_level {
            WarningLevel::None => None,
            WarningLevel::Soft => Some(UpsellBanner {
                title: "You're almost at the Pro unlock point".to_string(),
                body: format!(
                    "{} free deals remaining. Keep crushing it!",
                    self.deals_remaining.unwrap_or_default()
                ),
                call_to_action: None,
            }),
            WarningLevel::Hard => Some(UpsellBanner {
                title: "Next deal requires Pro".to_string(),
                body: format!(
                    "Your current projected income is ${}. Don't lose your momentum!",
                    format_amount(self.projected_income.unwrap_or_default())
                ),
                call_to_action: Some("Upgrade to Pro - $9.99/mo".to_string()),
            }),
        }
    }
}

/// Formats a dollar amount with thousands separators and at most two decimals.
pub fn format_amount(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    match fraction {
        0 => format!("{sign}{grouped}"),
        f if f % 10 == 0 => format!("{sign}{grouped}.{}", f / 10),
        f => format!("{sign}{grouped}.{f:02}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_warning_two_deals_before_limit() {
        let state = evaluate_upsell_state(FREE_DEAL_LIMIT - 2, 4200.0);
        assert_eq!(state.warning_level, WarningLevel::Soft);
        assert_eq!(state.deals_remaining, Some(2));
        assert_eq!(state.projected_income, None);
        let banner = state.banner().unwrap();
        assert_eq!(banner.body, "2 free deals remaining. Keep crushing it!");
        assert!(banner.call_to_action.is_none());
    }

    #[test]
    fn hard_warning_shows_projected_income() {
        let state = evaluate_upsell_state(FREE_DEAL_LIMIT - 1, 12345.5);
        assert_eq!(state.warning_level, WarningLevel::Hard);
        assert_eq!(state.projected_income, Some(12345.5));
        let banner = state.banner().unwrap();
        assert_eq!(banner.title, "Next deal requires Pro");
        assert!(banner.body.contains("$12,345.5."));
        assert_eq!(
            banner.call_to_action.as_deref(),
            Some("Upgrade to Pro - $9.99/mo")
        );
    }

    #[test]
    fn no_warning_outside_the_two_pre_limit_counts() {
        for count in [0, FREE_DEAL_LIMIT - 3, FREE_DEAL_LIMIT, FREE_DEAL_LIMIT + 5] {
            let state = evaluate_upsell_state(count, 9000.0);
            assert_eq!(state.warning_level, WarningLevel::None, "count {count}");
            assert!(state.banner().is_none());
        }
    }

    #[test]
    fn amounts_group_thousands() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1000.0), "1,000");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(4523.05), "4,523.05");
    }

    #[test]
    fn state_serializes_without_absent_fields() {
        let json = serde_json::to_value(evaluate_upsell_state(3, 100.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "warningLevel": "NONE" }));
    }
}
