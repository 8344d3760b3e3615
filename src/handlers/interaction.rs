use std::sync::Arc;

use serenity::all::{
    ComponentInteraction, Context, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, Interaction, ModalInteraction,
};
use tracing::{debug, error};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::components::{quick_actions, report_form, report_prompt};
use crate::constants::embeds;
use crate::constants::messages::{BUTTON_GUILD_ONLY, EXPIRED_CONTROL};
use crate::services::callbacks::{ButtonCallback, CallbackToken, FormCallback};
use crate::services::platform::ChatPlatform;
use crate::services::serenity_platform::SerenityPlatform;

pub const NOT_YOUR_BUTTON: &str = "You cannot touch someone else's buttons!";

pub async fn handle_interaction(
    ctx: &Context,
    data: &Arc<Data>,
    interaction: &Interaction,
) -> Result<(), Error> {
    match interaction {
        Interaction::Component(component) => {
            handle_component(ctx, data, component).await?;
        }
        Interaction::Modal(modal) => {
            handle_modal(ctx, data, modal).await?;
        }
        Interaction::Command(_) => {
            // Slash commands are handled by poise framework, not here
            debug!("Received ApplicationCommand interaction - should be handled by poise");
        }
        _ => {
            debug!("Unhandled interaction type: {:?}", interaction.kind());
        }
    }

    Ok(())
}

/// User that triggered the interaction a message was a reply to
#[allow(deprecated)]
fn reply_owner(component: &ComponentInteraction) -> Option<serenity::all::UserId> {
    component
        .message
        .interaction
        .as_ref()
        .map(|interaction| interaction.user.id)
}

async fn handle_component(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let custom_id = &component.data.custom_id;
    debug!("Component interaction: {}", custom_id);

    let Some(guild_id) = component.guild_id else {
        return reply_component(ctx, component, BUTTON_GUILD_ONLY).await;
    };

    if reply_owner(component).is_some_and(|owner| owner != component.user.id) {
        return reply_component(ctx, component, NOT_YOUR_BUTTON).await;
    }

    let token = CallbackToken::from(custom_id.as_str());
    let Some(callback) = data.callbacks.button(&token) else {
        debug!("No callback registered for {}", token);
        return reply_component(ctx, component, EXPIRED_CONTROL).await;
    };

    let result = match callback {
        ButtonCallback::Report(pending) => {
            report_prompt::handle_report(ctx, component, &pending).await
        }
        ButtonCallback::Ignore(pending) => {
            report_prompt::handle_ignore(ctx, data, component, &pending).await
        }
        ButtonCallback::QuickBan(context) => {
            quick_actions::handle_quick_ban(ctx, data, component, guild_id, &context).await
        }
        ButtonCallback::QuickUnban(context) => {
            quick_actions::handle_quick_unban(ctx, data, component, guild_id, &context).await
        }
    };

    // If handler failed, send error response
    if let Err(e) = result {
        let message = format!("There was an error while pressing this button: {}", e);
        SerenityPlatform::new(ctx, data.settings.log_channel_id)
            .log_error(Some(guild_id), &format!("{} ({})", message, custom_id))
            .await;
        if let Err(e) = send_component_error(ctx, component, &message).await {
            error!("Could not report button error: {:?}", e);
        }
    }

    Ok(())
}

async fn handle_modal(
    ctx: &Context,
    data: &Arc<Data>,
    modal: &ModalInteraction,
) -> Result<(), Error> {
    let custom_id = &modal.data.custom_id;
    debug!("Modal submission: {}", custom_id);

    if modal.guild_id.is_none() {
        return reply_modal(ctx, modal, BUTTON_GUILD_ONLY).await;
    }

    let token = CallbackToken::from(custom_id.as_str());
    let Some(callback) = data.callbacks.form(&token) else {
        debug!("No form registered for {}", token);
        return reply_modal(ctx, modal, EXPIRED_CONTROL).await;
    };

    let result = match callback {
        FormCallback::ReportEvidence(pending) => {
            report_form::handle_submission(ctx, data, modal, pending).await
        }
    };

    if let Err(e) = result {
        let message = format!("There was an error while submitting this modal: {}", e);
        SerenityPlatform::new(ctx, data.settings.log_channel_id)
            .log_error(modal.guild_id, &format!("{} ({})", message, custom_id))
            .await;
        if let Err(e) = send_modal_error(ctx, modal, &message).await {
            error!("Could not report modal error: {:?}", e);
        }
    }

    Ok(())
}

/// Ephemeral plain-text reply to a button press
pub async fn reply_component(
    ctx: &Context,
    component: &ComponentInteraction,
    content: &str,
) -> Result<(), Error> {
    component
        .create_response(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

async fn reply_modal(ctx: &Context, modal: &ModalInteraction, content: &str) -> Result<(), Error> {
    modal
        .create_response(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

/// Send an ephemeral error message for a component interaction,
/// as a follow-up if the press was already acknowledged
pub async fn send_component_error(
    ctx: &Context,
    component: &ComponentInteraction,
    message: &str,
) -> Result<(), Error> {
    let embed = embeds::error_embed().title("Error").description(message);

    let response = component
        .create_response(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(embed.clone())
                    .ephemeral(true),
            ),
        )
        .await;
    if response.is_err() {
        component
            .create_followup(
                ctx,
                CreateInteractionResponseFollowup::new()
                    .embed(embed)
                    .ephemeral(true),
            )
            .await?;
    }

    Ok(())
}

/// Send an ephemeral error message for a modal interaction,
/// as a follow-up if the submission was already acknowledged
pub async fn send_modal_error(
    ctx: &Context,
    modal: &ModalInteraction,
    message: &str,
) -> Result<(), Error> {
    let embed = embeds::error_embed().title("Error").description(message);

    let response = modal
        .create_response(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(embed.clone())
                    .ephemeral(true),
            ),
        )
        .await;
    if response.is_err() {
        modal
            .create_followup(
                ctx,
                CreateInteractionResponseFollowup::new()
                    .embed(embed)
                    .ephemeral(true),
            )
            .await?;
    }

    Ok(())
}
