use serenity::all::{
    ButtonStyle, CreateActionRow, CreateAttachment, CreateButton, CreateEmbed, CreateMessage,
    Timestamp,
};

use crate::constants::embeds;
use crate::constants::limits::{MAX_DESCRIPTION_LENGTH, MAX_FIELD_LENGTH};
use crate::services::callbacks::CallbackToken;
use crate::services::platform::Notice;
use crate::services::propagation::report::{BanReport, Broadcast, FalseReport, PendingBan};
use crate::utils::formatting::{account_age, mention_user, truncate};

/// Build the message posted for a notice
pub fn render(notice: Notice<'_>) -> CreateMessage {
    match notice {
        Notice::BanPrompt(pending) => ban_prompt(pending),
        Notice::BanReport(report) => CreateMessage::new()
            .embed(report_embed(report))
            .add_files(report_attachments(report))
            .components(vec![CreateActionRow::Buttons(vec![CreateButton::new(
                CallbackToken::quick_ban(report.account).as_str(),
            )
            .label("Ban User")
            .style(ButtonStyle::Danger)])]),
        Notice::FalseReport(retraction) => CreateMessage::new()
            .embed(false_report_embed(retraction))
            .components(vec![CreateActionRow::Buttons(vec![CreateButton::new(
                CallbackToken::quick_unban(retraction.account).as_str(),
            )
            .label("Unban User")
            .style(ButtonStyle::Success)])]),
        Notice::Broadcast(broadcast) => CreateMessage::new().embed(broadcast_embed(broadcast)),
    }
}

/// Report-or-ignore prompt shown in the origin guild
pub fn ban_prompt_text(pending: &PendingBan) -> String {
    format!(
        "{} ({}) was just banned. Would you like to report them to other servers?",
        mention_user(pending.account),
        pending.account_tag
    )
}

fn ban_prompt(pending: &PendingBan) -> CreateMessage {
    let account = pending.account;
    let guild_id = pending.origin_guild;

    CreateMessage::new()
        .content(ban_prompt_text(pending))
        .components(vec![CreateActionRow::Buttons(vec![
            CreateButton::new(CallbackToken::report(account, guild_id).as_str())
                .label("Report")
                .style(ButtonStyle::Danger),
            CreateButton::new(CallbackToken::ignore(account, guild_id).as_str())
                .label("Ignore")
                .style(ButtonStyle::Secondary),
        ])])
}

fn field_value(value: &str) -> String {
    truncate(value, MAX_FIELD_LENGTH)
}

/// Embed describing a ban report, shared by the origin copy and deliveries
pub fn report_embed(report: &BanReport) -> CreateEmbed {
    let mut embed = embeds::warning_embed()
        .title("New Ban Report")
        .description(truncate(
            &format!("### Evidence of Misconduct\n{}", report.evidence_text),
            MAX_DESCRIPTION_LENGTH,
        ))
        .field(
            "Banned User",
            format!(
                "{} ({}, {})",
                mention_user(report.account),
                report.account_tag,
                report.account
            ),
            false,
        )
        .field("Account Age", account_age(report.account), false)
        .field(
            "Originating Server",
            field_value(&format!("{} ({})", report.origin_name, report.origin_guild)),
            false,
        )
        .field(
            "Ban Reporter",
            format!(
                "{} ({}, {})",
                mention_user(report.reporter),
                report.reporter_tag,
                report.reporter
            ),
            false,
        )
        .field("Why was this user banned?", field_value(&report.rationale), false)
        .timestamp(Timestamp::now());

    if let Some(image) = report.attachments.iter().find(|file| file.is_image()) {
        embed = embed.image(format!("attachment://{}", image.spoiler_name()));
    }

    embed
}

/// Evidence files as spoilered uploads
pub fn report_attachments(report: &BanReport) -> Vec<CreateAttachment> {
    report
        .attachments
        .iter()
        .map(|file| CreateAttachment::bytes(file.data.clone(), file.spoiler_name()))
        .collect()
}

fn false_report_embed(retraction: &FalseReport) -> CreateEmbed {
    embeds::error_embed()
        .title("False Report Notification")
        .field(
            "Falsely Reported User",
            format!(
                "{} ({}, {})",
                mention_user(retraction.account),
                retraction.account_tag,
                retraction.account
            ),
            false,
        )
        .field(
            "Notification Origin",
            field_value(&format!(
                "{} ({})",
                retraction.origin_name, retraction.origin_guild
            )),
            false,
        )
        .field("Details", field_value(&retraction.details), false)
        .timestamp(Timestamp::now())
}

fn broadcast_embed(broadcast: &Broadcast) -> CreateEmbed {
    embeds::info_embed()
        .title("Network Broadcast")
        .description(&broadcast.message)
        .field(
            "Sent By",
            format!(
                "{} ({}) from {}",
                mention_user(broadcast.author),
                broadcast.author_tag,
                broadcast.origin_name
            ),
            false,
        )
        .timestamp(Timestamp::now())
}
