use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Fertilize,
    Repair,
    PanelPlaced,
}

impl ActionType {
    pub const ALL: [ActionType; 3] = [
        ActionType::Fertilize,
        ActionType::Repair,
        ActionType::PanelPlaced,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ActionType::Fertilize => "Fertilize",
            ActionType::Repair => "Repair",
            ActionType::PanelPlaced => "Panel placed",
        }
    }

    pub fn amount_cents(&self) -> i64 {
        match self {
            ActionType::Fertilize => 500,
            ActionType::Repair => 800,
            ActionType::PanelPlaced => 1200,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ActionType::Fertilize => "🌱",
            ActionType::Repair => "🔧",
            ActionType::PanelPlaced => "⚡",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.label() == label)
    }

    /// Stable identifier used inside component custom ids.
    pub fn key(&self) -> &'static str {
        match self {
            ActionType::Fertilize => "fertilize",
            ActionType::Repair => "repair",
            ActionType::PanelPlaced => "panel_placed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.key() == key)
    }

    fn index(&self) -> usize {
        match self {
            ActionType::Fertilize => 0,
            ActionType::Repair => 1,
            ActionType::PanelPlaced => 2,
        }
    }
}

/// Per-action log counts, always iterated in price-list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionBreakdown {
    counts: [u32; 3],
}

impl ActionBreakdown {
    pub fn record(&mut self, action: ActionType) {
        self.counts[action.index()] += 1;
    }

    pub fn count(&self, action: ActionType) -> u32 {
        self.counts[action.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionType, u32)> + '_ {
        ActionType::ALL.into_iter().map(|action| (action, self.count(action)))
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// Parses an amount cell as rendered by Sheets ("5", "12.5", "8,00 €") into cents.
pub fn parse_amount_cents(value: &str) -> Option<i64> {
    let cleaned: String = value
        .trim()
        .trim_end_matches('€')
        .trim()
        .replace(',', ".");
    let amount: f64 = cleaned.parse().ok()?;
    if !amount.is_finite() {
        return None;
    }
    Some((amount * 100.0).round() as i64)
}

pub fn cents_to_value(cents: i64) -> Value {
    json!(cents as f64 / 100.0)
}

/// One row of the `Logs` tab.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub week: String,
    pub username: String,
    pub user_id: String,
    pub action: String,
    pub description: String,
    pub amount_cents: i64,
    pub image_url: String,
}

impl LogEntry {
    /// Rows with fewer than seven cells or an unreadable amount are rejected.
    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < 7 {
            return None;
        }
        let amount_cents = parse_amount_cents(&row[6])?;

        Some(LogEntry {
            timestamp: row[0].clone(),
            week: row[1].clone(),
            username: row[2].clone(),
            user_id: row[3].clone(),
            action: row[4].clone(),
            description: row[5].clone(),
            amount_cents,
            image_url: row.get(7).cloned().unwrap_or_default(),
        })
    }

    pub fn action_type(&self) -> Option<ActionType> {
        ActionType::from_label(&self.action)
    }

    pub fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.timestamp),
            json!(self.week),
            json!(self.username),
            json!(self.user_id),
            json!(self.action),
            json!(self.description),
            cents_to_value(self.amount_cents),
            json!(self.image_url),
        ]
    }

    pub fn to_archive_row(&self, archived_at: &str) -> Vec<Value> {
        let mut row = self.to_row();
        row.push(json!(archived_at));
        row
    }

    pub fn to_csv_record(&self) -> [String; 8] {
        [
            self.timestamp.clone(),
            self.week.clone(),
            self.username.clone(),
            self.user_id.clone(),
            self.action.clone(),
            self.description.clone(),
            format!("{:.2}", self.amount_cents as f64 / 100.0),
            self.image_url.clone(),
        ]
    }
}

/// A parsed log together with its 1-based row number in the `Logs` tab.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub row_number: usize,
    pub entry: LogEntry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayoutRecord {
    pub timestamp: String,
    pub week: String,
    pub username: String,
    pub user_id: String,
    pub amount_cents: i64,
    pub log_count: usize,
    pub admin: String,
}

impl PayoutRecord {
    pub const STATUS_PAID: &'static str = "Paid";

    pub fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.timestamp),
            json!(self.week),
            json!(self.username),
            json!(self.user_id),
            cents_to_value(self.amount_cents),
            json!(self.log_count),
            json!(Self::STATUS_PAID),
            json!(self.admin),
        ]
    }
}

/// Open earnings of one member for one week.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberEarnings {
    pub user_id: String,
    pub username: String,
    pub week: String,
    pub total_cents: i64,
    pub log_count: usize,
    pub breakdown: ActionBreakdown,
    pub rows: Vec<LogRow>,
}

impl MemberEarnings {
    pub fn empty(user_id: &str, username: &str, week: &str) -> Self {
        MemberEarnings {
            user_id: user_id.to_string(),
            username: username.to_string(),
            week: week.to_string(),
            total_cents: 0,
            log_count: 0,
            breakdown: ActionBreakdown::default(),
            rows: Vec::new(),
        }
    }

    pub fn add(&mut self, row: &LogRow) {
        self.total_cents += row.entry.amount_cents;
        self.log_count += 1;
        if let Some(action) = row.entry.action_type() {
            self.breakdown.record(action);
        }
        self.rows.push(row.clone());
    }

    pub fn row_numbers(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.row_number).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
    pub week: String,
    /// Username and total, highest first.
    pub earners: Vec<(String, i64)>,
    pub actions: ActionBreakdown,
    pub total_cents: i64,
    pub total_logs: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberTotals {
    pub username: String,
    pub log_count: usize,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverallStats {
    pub total_logs: usize,
    pub total_cents: i64,
    /// Action label and count, most frequent first.
    pub action_counts: Vec<(String, usize)>,
    pub top_members: Vec<MemberTotals>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberHistory {
    pub username: String,
    pub log_count: usize,
    pub total_cents: i64,
    pub action_counts: Vec<(String, usize)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn parses_amounts_in_sheet_formats() {
        assert_eq!(parse_amount_cents("5"), Some(500));
        assert_eq!(parse_amount_cents("12.5"), Some(1250));
        assert_eq!(parse_amount_cents("8,00 €"), Some(800));
        assert_eq!(parse_amount_cents(" 0.1 "), Some(10));
        assert_eq!(parse_amount_cents("n/a"), None);
        assert_eq!(parse_amount_cents(""), None);
    }

    #[test]
    fn log_entry_requires_seven_cells() {
        let short = row(&["07.03.2026 09:00:00", "KW10/2026", "alice", "1", "Repair", "fixed"]);
        assert!(LogEntry::from_row(&short).is_none());

        let without_image = row(&["07.03.2026 09:00:00", "KW10/2026", "alice", "1", "Repair", "fixed", "8"]);
        let entry = LogEntry::from_row(&without_image).unwrap();
        assert_eq!(entry.amount_cents, 800);
        assert_eq!(entry.image_url, "");
        assert_eq!(entry.action_type(), Some(ActionType::Repair));
    }

    #[test]
    fn unknown_actions_have_no_type() {
        let cells = row(&["t", "KW1/2026", "bob", "2", "Mowing", "lawn", "3", "url"]);
        let entry = LogEntry::from_row(&cells).unwrap();
        assert_eq!(entry.action_type(), None);
    }

    #[test]
    fn user_ids_are_written_as_text() {
        let entry = LogEntry {
            timestamp: "t".into(),
            week: "KW1/2026".into(),
            username: "alice".into(),
            user_id: "123456789012345678".into(),
            action: "Repair".into(),
            description: "d".into(),
            amount_cents: 800,
            image_url: "u".into(),
        };
        let cells = entry.to_row();
        assert_eq!(cells[3], json!("123456789012345678"));
        assert_eq!(cells[6], json!(8.0));
        assert_eq!(entry.to_archive_row("now").len(), 9);
    }

    #[test]
    fn action_keys_round_trip() {
        for action in ActionType::ALL {
            assert_eq!(ActionType::from_key(action.key()), Some(action));
            assert_eq!(ActionType::from_label(action.label()), Some(action));
        }
        assert_eq!(ActionType::from_key("Repair"), None);
    }

    #[test]
    fn breakdown_iterates_in_price_list_order() {
        let mut breakdown = ActionBreakdown::default();
        breakdown.record(ActionType::PanelPlaced);
        breakdown.record(ActionType::Fertilize);
        breakdown.record(ActionType::PanelPlaced);

        let counts: Vec<_> = breakdown.iter().collect();
        assert_eq!(
            counts,
            vec![
                (ActionType::Fertilize, 1),
                (ActionType::Repair, 0),
                (ActionType::PanelPlaced, 2)
            ]
        );
        assert_eq!(breakdown.total(), 3);
    }
}
