use crate::sheets::models::MemberEarnings;
use crate::utils::format::format_amount;
use poise::serenity_prelude as serenity;

/// Discord allows at most 25 options per select menu.
pub const MAX_SELECT_OPTIONS: usize = 25;

pub struct MemberSelector<'a> {
    members: &'a [MemberEarnings],
}

impl<'a> MemberSelector<'a> {
    pub fn new(members: &'a [MemberEarnings]) -> Self {
        Self { members }
    }

    pub fn options(&self) -> Vec<serenity::CreateSelectMenuOption> {
        self.members
            .iter()
            .take(MAX_SELECT_OPTIONS)
            .map(|member| {
                serenity::CreateSelectMenuOption::new(member.username.as_str(), member.user_id.as_str())
                    .description(format!(
                        "💎 {} • {} Logs",
                        format_amount(member.total_cents),
                        member.log_count
                    ))
                    .emoji('👤')
            })
            .collect()
    }

    pub fn create_select_menu(&self, custom_id: &str) -> Option<serenity::CreateSelectMenu> {
        if self.members.is_empty() {
            return None;
        }

        Some(
            serenity::CreateSelectMenu::new(
                custom_id,
                serenity::CreateSelectMenuKind::String {
                    options: self.options(),
                },
            )
            .placeholder("👤 Pick a member to pay out..."),
        )
    }

    pub fn total_cents(&self) -> i64 {
        self.members.iter().map(|member| member.total_cents).sum()
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(n: usize) -> Vec<MemberEarnings> {
        (0..n)
            .map(|i| {
                let mut m = MemberEarnings::empty(&i.to_string(), &format!("m{}", i), "KW1/2026");
                m.total_cents = 500;
                m.log_count = 1;
                m
            })
            .collect()
    }

    #[test]
    fn options_are_capped() {
        let all = members(30);
        let selector = MemberSelector::new(&all);
        assert_eq!(selector.options().len(), MAX_SELECT_OPTIONS);
        assert_eq!(selector.count(), 30);
        assert_eq!(selector.total_cents(), 15000);
    }

    #[test]
    fn empty_selector_has_no_menu() {
        let none = members(0);
        let selector = MemberSelector::new(&none);
        assert!(selector.is_empty());
        assert!(selector.create_select_menu("payout_select").is_none());
    }
}
