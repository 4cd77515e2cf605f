use std::fmt::Write;

use chrono::NaiveDate;

use crate::coach::generate_coaching_message;
use crate::models::{CoachingContext, PacingStatus, TimeOfDay};
use crate::pacing::calculate_pacing;
use crate::upsell::{evaluate_upsell_state, format_amount};

/// `deal_count` is every deal the user has logged, which is what the free limit counts.
pub fn build_report(
    label: &str,
    context: &CoachingContext,
    deal_count: u32,
    today: NaiveDate,
) -> String {
    let stats = &context.stats;
    let pacing = calculate_pacing(stats);
    let projected_income = stats.projected_income();

    let mut output = String::new();

    let _ = writeln!(output, "# Coaching Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} tier) on {}",
        label, context.tier, today
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Month to Date");
    let _ = writeln!(
        output,
        "- Deals: {}/{} (day {} of {})",
        stats.deals_this_month, stats.monthly_goal, stats.days_elapsed, stats.days_in_month
    );
    let _ = writeln!(
        output,
        "- Commission: ${} (avg ${} per deal)",
        format_amount(stats.commission_this_month),
        format_amount(stats.avg_commission_this_month)
    );
    let _ = writeln!(
        output,
        "- Last month: {} deals, ${} (avg ${} per deal)",
        stats.deals_last_month,
        format_amount(stats.commission_last_month),
        format_amount(stats.avg_commission_last_month)
    );
    let _ = writeln!(output, "- Projected income: ${}", format_amount(projected_income));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pacing");
    let status = match pacing.status {
        PacingStatus::Ahead => "ahead of pace",
        PacingStatus::OnTrack => "on pace",
        PacingStatus::Behind => "behind pace",
    };
    let _ = writeln!(
        output,
        "- Status: {} ({:+.1} vs expected {:.1})",
        status, pacing.pace_delta, pacing.expected_pace
    );
    let _ = writeln!(
        output,
        "- {} days left, {} deals/day needed",
        pacing.days_remaining.max(0),
        pacing.required_daily_deals
    );
    let _ = writeln!(output, "- Deals today: {}", stats.today_deals);
    let _ = writeln!(
        output,
        "- Days without a deal: {}",
        stats.recent_days_without_deals
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Coaching");
    for (slot_name, slot) in [
        ("Morning", TimeOfDay::Morning),
        ("Midday", TimeOfDay::Midday),
        ("Evening", TimeOfDay::Evening),
    ] {
        let message = generate_coaching_message(context, slot);
        let _ = writeln!(
            output,
            "- {} [{} / {}]: {}",
            slot_name,
            message.message_type.as_str(),
            message.level.as_str(),
            message.text
        );
    }

    let upsell = evaluate_upsell_state(deal_count, projected_income);
    if let Some(banner) = upsell.banner() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", banner.title);
        let _ = writeln!(output, "{}", banner.body);
        if let Some(cta) = banner.call_to_action {
            let _ = writeln!(output, "**{}**", cta);
        }
    }

    output
}
