use std::fmt;

use reqwest::Url;
use serenity::all::{GuildId, UserId};

use crate::constants::limits::MAX_EVIDENCE_ATTACHMENTS;
use crate::constants::messages::NO_EVIDENCE;

/// A ban waiting on the origin guild's moderators to report or ignore it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBan {
    pub account: UserId,
    /// Escaped display name of the banned account
    pub account_tag: String,
    pub origin_guild: GuildId,
    pub origin_name: String,
}

/// A file attached to a report, downloaded once and re-uploaded per guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl EvidenceFile {
    /// Upload name that makes the client hide the file behind a spoiler
    pub fn spoiler_name(&self) -> String {
        format!("SPOILER_{}", self.name)
    }

    pub fn is_image(&self) -> bool {
        let lower = self.name.to_ascii_lowercase();
        [".png", ".jpg", ".jpeg", ".gif", ".webp"]
            .iter()
            .any(|ext| lower.ends_with(ext))
    }
}

/// Validated contents of the evidence form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceForm {
    pub rationale: String,
    pub evidence_text: String,
    pub attachment_links: Vec<Url>,
}

/// Why an evidence form was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingRationale,
    TooManyAttachments(usize),
    InvalidLink(String),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingRationale => write!(f, "A reason for the ban is required."),
            FormError::TooManyAttachments(count) => write!(
                f,
                "At most {} attachments can be included, got {}.",
                MAX_EVIDENCE_ATTACHMENTS, count
            ),
            FormError::InvalidLink(link) => {
                write!(f, "Attachment `{}` is not an http(s) link.", link)
            }
        }
    }
}

impl EvidenceForm {
    /// Validate raw form fields.
    ///
    /// Empty evidence becomes the "No evidence provided." placeholder;
    /// attachment links are one per line.
    pub fn parse(
        rationale: Option<&str>,
        evidence_text: Option<&str>,
        attachment_links: Option<&str>,
    ) -> Result<Self, FormError> {
        let rationale = rationale.map(str::trim).unwrap_or_default();
        if rationale.is_empty() {
            return Err(FormError::MissingRationale);
        }

        let evidence_text = match evidence_text.map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => NO_EVIDENCE.to_string(),
        };

        let lines: Vec<&str> = attachment_links
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() > MAX_EVIDENCE_ATTACHMENTS {
            return Err(FormError::TooManyAttachments(lines.len()));
        }

        let attachment_links = lines
            .into_iter()
            .map(|line| {
                Url::parse(line)
                    .ok()
                    .filter(|url| matches!(url.scheme(), "http" | "https"))
                    .ok_or_else(|| FormError::InvalidLink(line.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rationale: rationale.to_string(),
            evidence_text,
            attachment_links,
        })
    }
}

/// A reviewed ban, ready to be fanned out to the network
#[derive(Debug, Clone)]
pub struct BanReport {
    pub account: UserId,
    pub account_tag: String,
    pub origin_guild: GuildId,
    pub origin_name: String,
    pub reporter: UserId,
    pub reporter_tag: String,
    pub rationale: String,
    pub evidence_text: String,
    pub attachments: Vec<EvidenceFile>,
}

impl BanReport {
    pub fn new(
        pending: &PendingBan,
        reporter: UserId,
        reporter_tag: String,
        form: EvidenceForm,
        attachments: Vec<EvidenceFile>,
    ) -> Self {
        Self {
            account: pending.account,
            account_tag: pending.account_tag.clone(),
            origin_guild: pending.origin_guild,
            origin_name: pending.origin_name.clone(),
            reporter,
            reporter_tag,
            rationale: form.rationale,
            evidence_text: form.evidence_text,
            attachments,
        }
    }

    /// Context kept alive behind the report's "Ban User" button
    pub fn quick_ban_context(&self) -> QuickBanContext {
        QuickBanContext {
            account: self.account,
            account_tag: self.account_tag.clone(),
            rationale: self.rationale.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickBanContext {
    pub account: UserId,
    pub account_tag: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickUnbanContext {
    pub account: UserId,
    pub account_tag: String,
}

/// Retraction of an earlier report
#[derive(Debug, Clone)]
pub struct FalseReport {
    pub account: UserId,
    pub account_tag: String,
    pub origin_guild: GuildId,
    pub origin_name: String,
    pub details: String,
}

impl FalseReport {
    pub fn quick_unban_context(&self) -> QuickUnbanContext {
        QuickUnbanContext {
            account: self.account,
            account_tag: self.account_tag.clone(),
        }
    }
}

/// Free-form moderator announcement
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub author: UserId,
    pub author_tag: String,
    pub origin_name: String,
    pub message: String,
}
