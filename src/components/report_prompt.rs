use std::sync::Arc;

use serenity::all::{
    ComponentInteraction, Context, CreateInteractionResponse, CreateInteractionResponseFollowup,
};
use tracing::{debug, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::components::report_form;
use crate::constants::messages::IGNORED_BAN;
use crate::services::propagation::clear_prompt;
use crate::services::propagation::report::PendingBan;

/// "Report" pressed: open the evidence form
pub async fn handle_report(
    ctx: &Context,
    component: &ComponentInteraction,
    pending: &PendingBan,
) -> Result<(), Error> {
    component
        .create_response(
            ctx,
            CreateInteractionResponse::Modal(report_form::create_modal(pending)),
        )
        .await?;
    debug!(
        "{} opened the report form for {}",
        component.user.id, pending.account
    );
    Ok(())
}

/// "Ignore" pressed: drop the prompt without reporting
pub async fn handle_ignore(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
    pending: &PendingBan,
) -> Result<(), Error> {
    component
        .create_response(ctx, CreateInteractionResponse::Acknowledge)
        .await?;
    clear_prompt(&data.callbacks, pending);

    if let Err(e) = component.message.delete(ctx).await {
        debug!("Could not delete ban prompt: {}", e);
        component
            .create_followup(
                ctx,
                CreateInteractionResponseFollowup::new()
                    .content(IGNORED_BAN)
                    .ephemeral(true),
            )
            .await?;
    }

    info!(
        "{} ignored the ban of {} in guild {}",
        component.user.id, pending.account, pending.origin_guild
    );
    Ok(())
}
