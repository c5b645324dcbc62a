use crate::sheets::models::{
    ActionBreakdown, ActionType, MemberEarnings, MemberHistory, OverallStats, WeeklySummary,
};
use crate::utils::payout_manager::PayAllReport;
use chrono::NaiveDate;
use poise::serenity_prelude as serenity;

pub mod colors {
    pub const PRIMARY: u32 = 0x6A0DAD;
    pub const ACCENT: u32 = 0xC77DFF;
    pub const SUCCESS: u32 = 0x9D4EDD;
    pub const WARNING: u32 = 0xE040FB;
    pub const DANGER: u32 = 0xAA00FF;
    pub const INFO: u32 = 0xB388FF;
    pub const GOLD: u32 = 0xFFD700;
    pub const CHROME: u32 = 0x8A2BE2;
}

pub const WEEKLY_LOG_TARGET: usize = 50;
const PROGRESS_BAR_LENGTH: usize = 20;
const LEADERBOARD_SIZE: usize = 10;
const FOOTER: &str = "Log bot";
const EMBED_FIELD_MAX_CHARS: usize = 1024;
// ", ... and 9999 more"
const NAME_LIST_SUFFIX_ROOM: usize = 20;

pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{}{}.{:02}€", sign, cents / 100, cents % 100)
}

pub fn progress_bar(current: usize, target: usize) -> String {
    if target == 0 {
        return "░".repeat(PROGRESS_BAR_LENGTH);
    }
    let filled = PROGRESS_BAR_LENGTH * current.min(target) / target;
    format!(
        "{}{}",
        "▓".repeat(filled),
        "░".repeat(PROGRESS_BAR_LENGTH - filled)
    )
}

/// Medal for the first three places, then a numbered rank. `rank` starts at 1.
pub fn medal(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("`{}.`", n),
    }
}

fn action_emoji(label: &str) -> &'static str {
    ActionType::from_label(label)
        .map(|action| action.emoji())
        .unwrap_or("📌")
}

/// Non-zero action counts, optionally with what they earned.
pub fn format_breakdown(breakdown: &ActionBreakdown, with_earnings: bool) -> String {
    breakdown
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(action, count)| {
            if with_earnings {
                format!(
                    "{} **{}**: {}x (**{}**)\n",
                    action.emoji(),
                    action.label(),
                    count,
                    format_amount(action.amount_cents() * i64::from(count))
                )
            } else {
                format!("{} {}: **{}x**\n", action.emoji(), action.label(), count)
            }
        })
        .collect()
}

pub fn leaderboard_text(members: &[MemberEarnings]) -> String {
    let mut text: String = members
        .iter()
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(index, member)| {
            format!(
                "{} **{}** │ {} Logs │ **{}**\n",
                medal(index + 1),
                member.username,
                member.log_count,
                format_amount(member.total_cents)
            )
        })
        .collect();

    if members.len() > LEADERBOARD_SIZE {
        text.push_str(&format!(
            "\n*... and {} more*",
            members.len() - LEADERBOARD_SIZE
        ));
    }
    text
}

/// Joins `names` with commas, stopping before the text would exceed Discord's field limit.
pub fn name_list(names: &[String]) -> String {
    let mut text = String::new();
    for (index, name) in names.iter().enumerate() {
        let separator = if text.is_empty() { "" } else { ", " };
        let remaining = names.len() - index;
        let suffix_room = if remaining > 1 { NAME_LIST_SUFFIX_ROOM } else { 0 };
        if text.len() + separator.len() + name.len() + suffix_room > EMBED_FIELD_MAX_CHARS {
            text.push_str(&format!("{}... and {} more", separator, remaining));
            return text;
        }
        text.push_str(separator);
        text.push_str(name);
    }
    text
}

pub fn format_error_message(error: &str) -> String {
    format!("❌ **Error**: {}", error)
}

pub fn format_success_message(message: &str) -> String {
    format!("✅ {}", message)
}

pub fn format_info_message(message: &str) -> String {
    format!("ℹ️ {}", message)
}

// Embed utility functions
pub fn create_success_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(colors::SUCCESS)
        .timestamp(chrono::Utc::now())
}

pub fn create_error_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(colors::DANGER)
        .timestamp(chrono::Utc::now())
}

pub fn create_info_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(colors::INFO)
        .timestamp(chrono::Utc::now())
}

pub fn create_warning_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(colors::WARNING)
        .timestamp(chrono::Utc::now())
}

pub fn no_permission_embed() -> serenity::CreateEmbed {
    create_error_embed(
        "🔒 Missing permission",
        "You are not allowed to use this command.\n\nRequired: Administrator or a configured payout role",
    )
}

// Log flow
pub fn log_menu_embed() -> serenity::CreateEmbed {
    let actions: String = ActionType::ALL
        .iter()
        .map(|action| {
            format!(
                "{} {} - **{}**\n",
                action.emoji(),
                action.label(),
                format_amount(action.amount_cents())
            )
        })
        .collect();

    serenity::CreateEmbed::new()
        .author(serenity::CreateEmbedAuthor::new("💜 Log system"))
        .description(format!(
            "Pick an action and submit your log!\n\n**Available actions:**\n{}",
            actions
        ))
        .color(colors::PRIMARY)
        .footer(serenity::CreateEmbedFooter::new(FOOTER))
}

pub fn image_request_embed(action: ActionType, description: &str, timeout_secs: u64) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("📸 Upload your proof")
        .description(format!(
            "**Action:** {}\n**Description:** {}\n\nPost an image in this channel as proof.\nYou have {} seconds.",
            action.label(),
            description,
            timeout_secs
        ))
        .color(colors::ACCENT)
}

pub fn log_saved_embed(
    action: ActionType,
    description: &str,
    image_url: &str,
    username: &str,
) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .author(serenity::CreateEmbedAuthor::new("✅ Log saved"))
        .field("🎯 Action", format!("**{}**", action.label()), true)
        .field("💎 Payout", format!("**{}**", format_amount(action.amount_cents())), true)
        .field("📝 Description", format!("```{}```", description), false)
        .thumbnail(image_url)
        .color(colors::SUCCESS)
        .footer(serenity::CreateEmbedFooter::new(format!("Submitted by {}", username)))
        .timestamp(chrono::Utc::now())
}

pub struct PublicLog<'a> {
    pub user_id: serenity::UserId,
    pub username: &'a str,
    pub avatar_url: String,
    pub action: ActionType,
    pub description: &'a str,
    pub image_url: &'a str,
    pub week: &'a str,
    pub time: String,
    pub week_logs: usize,
    pub log_number: usize,
}

pub fn public_log_embed(log: &PublicLog<'_>) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .author(serenity::CreateEmbedAuthor::new("📋 New log entry"))
        .field(
            "👤 Member",
            format!("<@{}>\n`{}`", log.user_id, log.username),
            true,
        )
        .field(
            "🎯 Action",
            format!("{} **{}**", log.action.emoji(), log.action.label()),
            true,
        )
        .field(
            "💎 Payout",
            format!("**{}**", format_amount(log.action.amount_cents())),
            true,
        )
        .field("📝 Description", format!("```\n{}\n```", log.description), false)
        .field("📅 Week", log.week, true)
        .field("🕐 Time", log.time.as_str(), true);

    if log.week_logs > 0 {
        embed = embed.field(
            format!("📊 Weekly progress (target: {} logs)", WEEKLY_LOG_TARGET),
            format!(
                "{} `{}/{}`",
                progress_bar(log.week_logs, WEEKLY_LOG_TARGET),
                log.week_logs,
                WEEKLY_LOG_TARGET
            ),
            false,
        );
    }

    embed
        .thumbnail(log.avatar_url.as_str())
        .image(log.image_url)
        .color(colors::PRIMARY)
        .footer(serenity::CreateEmbedFooter::new(format!("Log #{}", log.log_number)))
        .timestamp(chrono::Utc::now())
}

pub fn member_week_embed(earnings: &MemberEarnings, avatar_url: &str) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new().author(serenity::CreateEmbedAuthor::new(format!(
        "📊 Your statistics - {}",
        earnings.week
    )));

    for (action, count) in earnings.breakdown.iter().filter(|(_, count)| *count > 0) {
        embed = embed.field(
            format!("{} {}", action.emoji(), action.label()),
            format!(
                "Count: **{}**\nEarned: **{}**",
                count,
                format_amount(action.amount_cents() * i64::from(count))
            ),
            true,
        );
    }

    embed = embed.field(
        "💎 Total earnings (this week)",
        format!("**{}**", format_amount(earnings.total_cents)),
        false,
    );

    if earnings.log_count > 0 {
        embed = embed.field(
            format!("📊 Progress (target: {} logs)", WEEKLY_LOG_TARGET),
            format!(
                "{} `{}/{}`",
                progress_bar(earnings.log_count, WEEKLY_LOG_TARGET),
                earnings.log_count,
                WEEKLY_LOG_TARGET
            ),
            false,
        );
    }

    embed
        .thumbnail(avatar_url)
        .color(colors::CHROME)
        .footer(serenity::CreateEmbedFooter::new("Statistics are live"))
        .timestamp(chrono::Utc::now())
}

// Payout flow
pub fn payout_panel_embed(week: &str, members: &[MemberEarnings]) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .author(serenity::CreateEmbedAuthor::new(format!("💎 PAYOUT PANEL • {}", week)))
        .color(colors::PRIMARY)
        .timestamp(chrono::Utc::now());

    if members.is_empty() {
        return embed.description("✅ No open payouts.");
    }

    let total_cents: i64 = members.iter().map(|m| m.total_cents).sum();
    let total_logs: usize = members.iter().map(|m| m.log_count).sum();

    embed
        .field("👥 Members with open earnings", leaderboard_text(members), false)
        .field("👥 Members", format!("**{}**", members.len()), true)
        .field("📊 Logs", format!("**{}**", total_logs), true)
        .field("💎 Total", format!("**{}**", format_amount(total_cents)), true)
        .footer(serenity::CreateEmbedFooter::new(
            "Pick a member or pay everyone at once",
        ))
}

pub fn payout_confirm_embed(earnings: &MemberEarnings) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title("💎 Confirm payout")
        .description(format!(
            "Pay out **{}** (<@{}>)?",
            earnings.username, earnings.user_id
        ))
        .field("💰 Amount", format!("**{}**", format_amount(earnings.total_cents)), true)
        .field("📊 Logs", format!("**{}**", earnings.log_count), true)
        .field("📅 Week", format!("**{}**", earnings.week), true)
        .color(colors::ACCENT);

    let breakdown = format_breakdown(&earnings.breakdown, false);
    if !breakdown.is_empty() {
        embed = embed.field("📋 Breakdown", breakdown, false);
    }
    embed
}

pub fn payout_done_embed(earnings: &MemberEarnings, archived: bool) -> serenity::CreateEmbed {
    let mut embed = create_success_embed(
        "✅ Payout complete",
        &format!(
            "**{}** was paid **{}**.",
            earnings.username,
            format_amount(earnings.total_cents)
        ),
    )
    .field("📊 Logs archived", format!("**{}**", earnings.log_count), true);

    if !archived {
        embed = embed.field(
            "⚠️ Archive",
            "The payout was recorded but the logs could not be moved to the archive. Remove them from `Logs` by hand.",
            false,
        );
    }
    embed
}

pub fn pay_all_confirm_embed(members: usize, total_cents: i64) -> serenity::CreateEmbed {
    create_warning_embed(
        "⚠️ PAY EVERYONE - CONFIRM",
        &format!(
            "You are about to pay out **{} members**.\n\n💎 **Total:** {}\n\nThis cannot be undone.\nAll paid logs move to the archive.",
            members,
            format_amount(total_cents)
        ),
    )
}

pub fn pay_all_progress_embed(done: usize, total: usize) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("⏳ Processing payouts...")
        .description(format!("{} / {} members processed", done, total))
        .color(colors::ACCENT)
}

pub fn pay_all_result_embed(report: &PayAllReport) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title("✅ All payouts processed")
        .field("✅ Paid", format!("**{}**", report.paid.len()), true)
        .field("❌ Failed", format!("**{}**", report.failed.len()), true)
        .field("💎 Total", format!("**{}**", format_amount(report.total_cents)), true)
        .color(colors::SUCCESS)
        .timestamp(chrono::Utc::now());

    if !report.failed.is_empty() {
        embed = embed.field("Failed members", name_list(&report.failed), false);
    }
    embed
}

pub fn payout_dm_embed(display_name: &str, earnings: &MemberEarnings) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .author(serenity::CreateEmbedAuthor::new("💎 PAYOUT COMPLETE"))
        .description(format!(
            "Hello **{}**!\n\nYour payout has been issued:",
            display_name
        ))
        .field("📅 Period", format!("**{}**", earnings.week), true)
        .field("💎 Amount", format!("**{}**", format_amount(earnings.total_cents)), true)
        .field("📋 Logs", format!("**{}**", earnings.log_count), true);

    let breakdown = format_breakdown(&earnings.breakdown, true);
    if !breakdown.is_empty() {
        embed = embed.field("📊 Breakdown", breakdown, false);
    }

    embed
        .field(
            "🎉 Status",
            "Your balance has been reset.\n**Good luck this week!** 🚀",
            false,
        )
        .color(colors::GOLD)
        .footer(serenity::CreateEmbedFooter::new("Payout"))
        .timestamp(chrono::Utc::now())
}

// Reports
pub fn weekly_report_embed(summary: &WeeklySummary) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new().author(serenity::CreateEmbedAuthor::new(format!(
        "📊 Weekly report - {}",
        summary.week
    )));

    if !summary.earners.is_empty() {
        let top: String = summary
            .earners
            .iter()
            .take(LEADERBOARD_SIZE)
            .enumerate()
            .map(|(index, (username, cents))| {
                format!("{} **{}**: `{}`\n", medal(index + 1), username, format_amount(*cents))
            })
            .collect();
        embed = embed.field("💎 Top 10 earners", top, false);
    }

    let actions: String = summary
        .actions
        .iter()
        .map(|(action, count)| format!("{} **{}**: `{}x`\n", action.emoji(), action.label(), count))
        .collect();

    embed
        .field("📋 Actions", actions, true)
        .field(
            "💼 Total",
            format!(
                "💵 **{}**\n📊 **{}** Logs",
                format_amount(summary.total_cents),
                summary.total_logs
            ),
            true,
        )
        .color(colors::PRIMARY)
        .footer(serenity::CreateEmbedFooter::new(FOOTER))
        .timestamp(chrono::Utc::now())
}

fn action_counts_text(counts: &[(String, usize)]) -> String {
    if counts.is_empty() {
        return "No logs".to_string();
    }
    counts
        .iter()
        .map(|(label, count)| format!("{} **{}**: `{}x`\n", action_emoji(label), label, count))
        .collect()
}

pub fn overall_stats_embed(stats: &OverallStats) -> serenity::CreateEmbed {
    let top: String = stats
        .top_members
        .iter()
        .enumerate()
        .map(|(index, member)| {
            format!(
                "{} **{}** │ {} Logs │ **{}**\n",
                medal(index + 1),
                member.username,
                member.log_count,
                format_amount(member.total_cents)
            )
        })
        .collect();

    serenity::CreateEmbed::new()
        .title("📈 Overall statistics")
        .field("📊 Logs", format!("**{}**", stats.total_logs), true)
        .field("💎 Total", format!("**{}**", format_amount(stats.total_cents)), true)
        .field("📋 Actions", action_counts_text(&stats.action_counts), false)
        .field(
            "🏆 Top members",
            if top.is_empty() { "No logs".to_string() } else { top },
            false,
        )
        .color(colors::PRIMARY)
        .timestamp(chrono::Utc::now())
}

pub fn member_stats_embed(history: &MemberHistory) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(format!("👤 Statistics for {}", history.username))
        .field("📊 Logs", format!("**{}**", history.log_count), true)
        .field("💎 Earned", format!("**{}**", format_amount(history.total_cents)), true)
        .field("📋 Actions", action_counts_text(&history.action_counts), false)
        .color(colors::CHROME)
        .timestamp(chrono::Utc::now())
}

// Admin
pub fn roles_embed(roles: &[u64]) -> serenity::CreateEmbed {
    if roles.is_empty() {
        return create_info_embed(
            "🔐 Payout roles",
            "No roles configured. Only administrators can pay out.",
        );
    }
    let list: String = roles.iter().map(|id| format!("• <@&{}>\n", id)).collect();
    create_info_embed("🔐 Payout roles", &list)
}

pub fn purge_confirm_embed(cutoff: NaiveDate, count: usize) -> serenity::CreateEmbed {
    create_warning_embed(
        "⚠️ Delete old logs",
        &format!(
            "**{}** log(s) were submitted before **{}**.\n\nDelete them permanently? Unpaid logs are lost as well.",
            count,
            cutoff.format(crate::utils::time::DATE_FORMAT)
        ),
    )
}

pub fn help_embed() -> serenity::CreateEmbed {
    let commands = [
        ("📝 `/log`", "Open the log system and submit an action"),
        ("💎 `/panel`", "Open the interactive payout panel (permission required)"),
        ("💰 `/payout @member`", "Pay out a single member (permission required)"),
        ("📊 `/weekly_report`", "Show this week's report (permission required)"),
        ("📈 `/stats`", "All-time statistics (permission required)"),
        ("👤 `/member_stats`", "All-time statistics of one member (permission required)"),
        ("🔐 `/config`", "Configure payout roles (administrators)"),
        ("💾 `/backup`", "Download all logs as CSV (administrators)"),
        ("🗑️ `/purge`", "Delete logs before a date (administrators)"),
        ("⚙️ `/setup`", "Create the spreadsheet tabs (administrators, once)"),
    ];

    commands
        .iter()
        .fold(
            serenity::CreateEmbed::new().author(serenity::CreateEmbedAuthor::new("💜 Bot commands")),
            |embed, (name, value)| embed.field(*name, *value, false),
        )
        .color(colors::PRIMARY)
        .footer(serenity::CreateEmbedFooter::new(concat!(
            "v",
            env!("CARGO_PKG_VERSION")
        )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, cents: i64, logs: usize) -> MemberEarnings {
        let mut earnings = MemberEarnings::empty("1", name, "KW1/2026");
        earnings.total_cents = cents;
        earnings.log_count = logs;
        earnings
    }

    #[test]
    fn formats_amounts() {
        assert_eq!(format_amount(1200), "12.00€");
        assert_eq!(format_amount(5), "0.05€");
        assert_eq!(format_amount(0), "0.00€");
        assert_eq!(format_amount(-250), "-2.50€");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0, 50), "░".repeat(20));
        assert_eq!(progress_bar(25, 50), format!("{}{}", "▓".repeat(10), "░".repeat(10)));
        assert_eq!(progress_bar(80, 50), "▓".repeat(20));
        assert_eq!(progress_bar(3, 0), "░".repeat(20));
    }

    #[test]
    fn medals_for_podium() {
        assert_eq!(medal(1), "🥇");
        assert_eq!(medal(3), "🥉");
        assert_eq!(medal(4), "`4.`");
    }

    #[test]
    fn leaderboard_lists_top_ten() {
        let members: Vec<MemberEarnings> = (0..12)
            .map(|i| member(&format!("m{}", i), 1000 - i * 10, 1))
            .collect();
        let text = leaderboard_text(&members);
        assert_eq!(text.lines().filter(|l| l.contains("Logs")).count(), 10);
        assert!(text.starts_with("🥇 **m0**"));
        assert!(text.ends_with("*... and 2 more*"));
    }

    #[test]
    fn name_list_fits_in_a_field() {
        let few: Vec<String> = vec!["alice".into(), "bob".into()];
        assert_eq!(name_list(&few), "alice, bob");

        let many: Vec<String> = (0..200).map(|i| format!("member_with_long_name_{:03}", i)).collect();
        let text = name_list(&many);
        assert!(text.len() <= EMBED_FIELD_MAX_CHARS);
        assert!(text.starts_with("member_with_long_name_000, "));
        assert!(text.contains("... and "));
        assert!(text.ends_with(" more"));

        let shown = text.matches("member_with_long_name_").count();
        assert!(text.ends_with(&format!("... and {} more", many.len() - shown)));
    }

    #[test]
    fn breakdown_skips_zero_counts() {
        let mut breakdown = ActionBreakdown::default();
        breakdown.record(ActionType::Repair);
        breakdown.record(ActionType::Repair);
        assert_eq!(format_breakdown(&breakdown, false), "🔧 Repair: **2x**\n");
        assert_eq!(
            format_breakdown(&breakdown, true),
            "🔧 **Repair**: 2x (**16.00€**)\n"
        );
    }
}
