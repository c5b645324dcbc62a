use crate::bot::{Context, Data, Error};
use crate::permissions::is_authorized;
use poise::serenity_prelude as serenity;

/// Administrators, or members holding one of the configured payout roles.
pub async fn member_may_pay_out(data: &Data, member: Option<&serenity::Member>) -> bool {
    let Some(member) = member else {
        return false;
    };

    let is_admin = member
        .permissions
        .is_some_and(|permissions| permissions.administrator());
    let member_roles: Vec<u64> = member.roles.iter().map(|role| role.get()).collect();
    let payout_roles = data.roles.list().await;

    is_authorized(is_admin, &member_roles, &payout_roles)
}

/// Command check for everything that shows or moves payouts.
pub async fn has_payout_permission(ctx: Context<'_>) -> Result<bool, Error> {
    let member = ctx.author_member().await;
    let allowed = member_may_pay_out(ctx.data(), member.as_deref()).await;

    if !allowed {
        tracing::warn!(
            "{} was denied /{}",
            ctx.author().name,
            ctx.command().qualified_name
        );
    }
    Ok(allowed)
}
