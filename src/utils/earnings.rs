use crate::sheets::models::{
    ActionBreakdown, LogEntry, LogRow, MemberEarnings, MemberHistory, MemberTotals, OverallStats,
    WeeklySummary,
};
use std::collections::HashMap;

/// First data row of the `Logs` tab; row 1 holds the header.
pub const FIRST_DATA_ROW: usize = 2;

/// Parses the raw cells of `Logs!A2:H` into rows that keep their sheet position.
pub fn parse_log_rows(values: &[Vec<String>]) -> Vec<LogRow> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, cells)| {
            let row_number = index + FIRST_DATA_ROW;
            if cells.len() < 7 {
                return None;
            }
            match LogEntry::from_row(cells) {
                Some(entry) => Some(LogRow { row_number, entry }),
                None => {
                    tracing::warn!("Skipping log row {} with unreadable amount", row_number);
                    None
                }
            }
        })
        .collect()
}

/// Every member with logs in `week`, highest total first.
pub fn weekly_earnings(rows: &[LogRow], week: &str) -> Vec<MemberEarnings> {
    let mut by_member: HashMap<&str, MemberEarnings> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for row in rows.iter().filter(|row| row.entry.week == week) {
        let user_id = row.entry.user_id.as_str();
        let earnings = by_member.entry(user_id).or_insert_with(|| {
            order.push(user_id);
            MemberEarnings::empty(user_id, &row.entry.username, week)
        });
        earnings.add(row);
    }

    let mut members: Vec<MemberEarnings> = order
        .into_iter()
        .filter_map(|user_id| by_member.remove(user_id))
        .collect();
    // stable: ties keep first-seen order
    members.sort_by(|a, b| b.total_cents.cmp(&a.total_cents));
    members
}

pub fn member_earnings(rows: &[LogRow], user_id: &str, week: &str) -> MemberEarnings {
    let mut earnings = MemberEarnings::empty(user_id, "", week);

    for row in rows
        .iter()
        .filter(|row| row.entry.week == week && row.entry.user_id == user_id)
    {
        if earnings.username.is_empty() {
            earnings.username = row.entry.username.clone();
        }
        earnings.add(row);
    }

    earnings
}

pub fn weekly_summary(rows: &[LogRow], week: &str) -> WeeklySummary {
    let mut totals: Vec<(String, i64)> = Vec::new();
    let mut actions = ActionBreakdown::default();
    let mut total_cents = 0;
    let mut total_logs = 0;

    for row in rows.iter().filter(|row| row.entry.week == week) {
        let entry = &row.entry;
        match totals.iter_mut().find(|(name, _)| *name == entry.username) {
            Some((_, amount)) => *amount += entry.amount_cents,
            None => totals.push((entry.username.clone(), entry.amount_cents)),
        }
        if let Some(action) = entry.action_type() {
            actions.record(action);
        }
        total_cents += entry.amount_cents;
        total_logs += 1;
    }

    totals.sort_by(|a, b| b.1.cmp(&a.1));

    WeeklySummary {
        week: week.to_string(),
        earners: totals,
        actions,
        total_cents,
        total_logs,
    }
}

fn sorted_counts(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

pub fn overall_stats(rows: &[LogRow], top: usize) -> OverallStats {
    let mut action_counts: HashMap<String, usize> = HashMap::new();
    let mut members: HashMap<String, MemberTotals> = HashMap::new();
    let mut total_cents = 0;

    for row in rows {
        let entry = &row.entry;
        total_cents += entry.amount_cents;
        *action_counts.entry(entry.action.clone()).or_insert(0) += 1;

        let member = members
            .entry(entry.username.clone())
            .or_insert_with(|| MemberTotals {
                username: entry.username.clone(),
                log_count: 0,
                total_cents: 0,
            });
        member.log_count += 1;
        member.total_cents += entry.amount_cents;
    }

    let mut top_members: Vec<MemberTotals> = members.into_values().collect();
    top_members.sort_by(|a, b| {
        b.total_cents
            .cmp(&a.total_cents)
            .then_with(|| a.username.cmp(&b.username))
    });
    top_members.truncate(top);

    OverallStats {
        total_logs: rows.len(),
        total_cents,
        action_counts: sorted_counts(action_counts),
        top_members,
    }
}

/// All-time statistics for one username, matched case-insensitively.
pub fn member_history(rows: &[LogRow], username: &str) -> Option<MemberHistory> {
    let wanted = username.to_lowercase();
    let mut action_counts: HashMap<String, usize> = HashMap::new();
    let mut log_count = 0;
    let mut total_cents = 0;
    let mut display_name = None;

    for row in rows
        .iter()
        .filter(|row| row.entry.username.to_lowercase() == wanted)
    {
        display_name.get_or_insert_with(|| row.entry.username.clone());
        log_count += 1;
        total_cents += row.entry.amount_cents;
        *action_counts.entry(row.entry.action.clone()).or_insert(0) += 1;
    }

    display_name.map(|username| MemberHistory {
        username,
        log_count,
        total_cents,
        action_counts: sorted_counts(action_counts),
    })
}

/// Groups row numbers into `[start, end)` runs of adjacent rows, highest run first.
///
/// Deleting in this order keeps the remaining row numbers valid within one batch.
pub fn deletion_ranges(row_numbers: &[usize]) -> Vec<(usize, usize)> {
    let mut sorted = row_numbers.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for row in sorted {
        match ranges.last_mut() {
            Some((_, end)) if *end == row => *end = row + 1,
            _ => ranges.push((row, row + 1)),
        }
    }

    ranges.reverse();
    ranges
}
