use std::sync::Arc;

use serenity::all::{
    ActionRowComponent, Context, CreateActionRow, CreateInputText,
    CreateInteractionResponseFollowup, CreateModal, InputTextStyle, ModalInteraction,
};
use tracing::{debug, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::components::notices;
use crate::constants::limits::{
    MAX_ATTACHMENT_LINKS_LENGTH, MAX_EVIDENCE_ATTACHMENTS, MAX_EVIDENCE_LENGTH,
    MAX_RATIONALE_LENGTH,
};
use crate::constants::messages::REPORT_SUBMITTED;
use crate::handlers::interaction::send_modal_error;
use crate::services::callbacks::{ButtonCallback, CallbackToken};
use crate::services::propagation::evidence::collect_attachments;
use crate::services::propagation::report::{BanReport, EvidenceForm, PendingBan};
use crate::services::propagation::{clear_prompt, propagate_report};
use crate::services::serenity_platform::SerenityPlatform;
use crate::utils::formatting::format_user_raw;

const RATIONALE_ID: &str = "rationale";
const EVIDENCE_ID: &str = "evidence";
const ATTACHMENTS_ID: &str = "attachments";

/// Evidence form opened from a ban prompt's "Report" button
pub fn create_modal(pending: &PendingBan) -> CreateModal {
    let token = CallbackToken::report_form(pending.account, pending.origin_guild);

    CreateModal::new(token.as_str(), "Report User").components(vec![
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "Why was this user banned?", RATIONALE_ID)
                .required(true)
                .max_length(MAX_RATIONALE_LENGTH),
        ),
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Paragraph, "Evidence of misconduct:", EVIDENCE_ID)
                .required(false)
                .max_length(MAX_EVIDENCE_LENGTH),
        ),
        CreateActionRow::InputText(
            CreateInputText::new(
                InputTextStyle::Paragraph,
                "Optional attachments:",
                ATTACHMENTS_ID,
            )
            .placeholder(format!(
                "Up to {} image or file links, one per line",
                MAX_EVIDENCE_ATTACHMENTS
            ))
            .max_length(MAX_ATTACHMENT_LINKS_LENGTH)
            .required(false),
        ),
    ])
}

fn input_value<'a>(modal: &'a ModalInteraction, custom_id: &str) -> Option<&'a str> {
    modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == custom_id => {
                input.value.as_deref()
            }
            _ => None,
        })
}

/// Evidence form submitted: build the report and send it across the network
pub async fn handle_submission(
    ctx: &Context,
    data: &Arc<Data>,
    modal: &ModalInteraction,
    pending: Arc<PendingBan>,
) -> Result<(), Error> {
    let form = EvidenceForm::parse(
        input_value(modal, RATIONALE_ID),
        input_value(modal, EVIDENCE_ID),
        input_value(modal, ATTACHMENTS_ID),
    );
    let mut form = match form {
        Ok(form) => form,
        Err(e) => {
            // The form stays registered, so the moderator can try again
            send_modal_error(ctx, modal, &e.to_string()).await?;
            return Ok(());
        }
    };

    // Downloads and fan-out take longer than the response window
    modal.defer(ctx).await?;

    let attachments = collect_attachments(&data.http_client, &mut form).await;
    let report = BanReport::new(
        &pending,
        modal.user.id,
        format_user_raw(&modal.user),
        form,
        attachments,
    );

    modal
        .create_followup(
            ctx,
            CreateInteractionResponseFollowup::new()
                .content(REPORT_SUBMITTED)
                .embed(notices::report_embed(&report))
                .add_files(notices::report_attachments(&report)),
        )
        .await?;

    if let Some(prompt) = &modal.message {
        if let Err(e) = prompt.delete(ctx).await {
            debug!("Could not delete ban prompt: {}", e);
        }
    }
    clear_prompt(&data.callbacks, &pending);

    let quick_ban = CallbackToken::quick_ban(report.account);
    if !data.callbacks.register_button(
        quick_ban,
        ButtonCallback::QuickBan(Arc::new(report.quick_ban_context())),
    ) {
        warn!(
            "Quick ban for {} is still bound to an earlier report",
            report.account
        );
    }

    info!(
        "{} reported {} ({}) from guild {}",
        report.reporter_tag, report.account_tag, report.account, report.origin_guild
    );

    let platform = SerenityPlatform::new(ctx, data.settings.log_channel_id);
    propagate_report(&platform, &data.store, &report).await?;

    Ok(())
}
