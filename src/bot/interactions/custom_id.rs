use crate::sheets::models::ActionType;
use chrono::NaiveDate;
use std::fmt;

const SEPARATOR: char = ':';
const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Every component and modal the bot creates, with the state it carries in its custom id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentAction {
    LogActionSelect,
    LogStats,
    LogModal(ActionType),
    PayoutSelect { week: String },
    PayoutConfirm { user_id: u64, week: String },
    PayoutCancel,
    PayAll { week: String },
    PayAllConfirm { week: String },
    PayAllCancel,
    PanelRefresh,
    PanelClose,
    PurgeConfirm { cutoff: NaiveDate },
    PurgeCancel,
}

impl ComponentAction {
    pub fn parse(custom_id: &str) -> Option<Self> {
        let mut parts = custom_id.split(SEPARATOR);
        let prefix = parts.next()?;
        let args: Vec<&str> = parts.collect();

        let action = match (prefix, args.as_slice()) {
            ("log_action", []) => ComponentAction::LogActionSelect,
            ("log_stats", []) => ComponentAction::LogStats,
            ("log_modal", [key]) => ComponentAction::LogModal(ActionType::from_key(key)?),
            ("payout_select", [week]) => ComponentAction::PayoutSelect {
                week: non_empty(week)?,
            },
            ("payout_confirm", [user_id, week]) => ComponentAction::PayoutConfirm {
                user_id: user_id.parse().ok()?,
                week: non_empty(week)?,
            },
            ("payout_cancel", []) => ComponentAction::PayoutCancel,
            ("pay_all", [week]) => ComponentAction::PayAll {
                week: non_empty(week)?,
            },
            ("pay_all_confirm", [week]) => ComponentAction::PayAllConfirm {
                week: non_empty(week)?,
            },
            ("pay_all_cancel", []) => ComponentAction::PayAllCancel,
            ("panel_refresh", []) => ComponentAction::PanelRefresh,
            ("panel_close", []) => ComponentAction::PanelClose,
            ("purge_confirm", [cutoff]) => ComponentAction::PurgeConfirm {
                cutoff: NaiveDate::parse_from_str(cutoff, DATE_KEY_FORMAT).ok()?,
            },
            ("purge_cancel", []) => ComponentAction::PurgeCancel,
            _ => return None,
        };
        Some(action)
    }

    pub fn custom_id(&self) -> String {
        self.to_string()
    }

    /// Components that show or move payouts; the clicker is checked again on every use.
    pub fn needs_payout_permission(&self) -> bool {
        matches!(
            self,
            ComponentAction::PayoutSelect { .. }
                | ComponentAction::PayoutConfirm { .. }
                | ComponentAction::PayAll { .. }
                | ComponentAction::PayAllConfirm { .. }
                | ComponentAction::PanelRefresh
        )
    }

    pub fn needs_administrator(&self) -> bool {
        matches!(self, ComponentAction::PurgeConfirm { .. })
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl fmt::Display for ComponentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentAction::LogActionSelect => write!(f, "log_action"),
            ComponentAction::LogStats => write!(f, "log_stats"),
            ComponentAction::LogModal(action) => write!(f, "log_modal:{}", action.key()),
            ComponentAction::PayoutSelect { week } => write!(f, "payout_select:{}", week),
            ComponentAction::PayoutConfirm { user_id, week } => {
                write!(f, "payout_confirm:{}:{}", user_id, week)
            }
            ComponentAction::PayoutCancel => write!(f, "payout_cancel"),
            ComponentAction::PayAll { week } => write!(f, "pay_all:{}", week),
            ComponentAction::PayAllConfirm { week } => write!(f, "pay_all_confirm:{}", week),
            ComponentAction::PayAllCancel => write!(f, "pay_all_cancel"),
            ComponentAction::PanelRefresh => write!(f, "panel_refresh"),
            ComponentAction::PanelClose => write!(f, "panel_close"),
            ComponentAction::PurgeConfirm { cutoff } => {
                write!(f, "purge_confirm:{}", cutoff.format(DATE_KEY_FORMAT))
            }
            ComponentAction::PurgeCancel => write!(f, "purge_cancel"),
        }
    }
}
