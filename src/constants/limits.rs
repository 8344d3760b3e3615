/// Defaults for values that can be overridden via env vars
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LOG_FILE: &str = "log.txt";
pub const DEFAULT_CALLBACK_TTL_HOURS: u64 = 7 * 24;

/// Discord refuses bulk deletes larger than this
pub const MAX_BULK_DELETE: u8 = 100;

/// Evidence form limits
pub const MAX_EVIDENCE_ATTACHMENTS: usize = 10;
pub const MAX_RATIONALE_LENGTH: u16 = 500;
pub const MAX_EVIDENCE_LENGTH: u16 = 3000;
pub const MAX_ATTACHMENT_LINKS_LENGTH: u16 = 1000;
/// Downloads larger than this are kept as links instead of re-uploaded
pub const MAX_ATTACHMENT_BYTES: usize = 8 * 1024 * 1024;

/// False report details bounds
pub const MIN_DETAILS_LENGTH: u16 = 10;
pub const MAX_DETAILS_LENGTH: u16 = 1000;

/// Audit log reason limit
pub const MAX_AUDIT_REASON_LENGTH: usize = 512;

/// Embed field value limit
pub const MAX_FIELD_LENGTH: usize = 1024;
/// Embed description limit. Evidence plus any failed links always fit.
pub const MAX_DESCRIPTION_LENGTH: usize = 4096;

/// Error messages at or above this length are attached as a file
pub const MAX_INLINE_ERROR_LENGTH: usize = 1000;

/// Background task intervals
pub const PRESENCE_INTERVAL_SECONDS: u64 = 120;
pub const CALLBACK_SWEEP_INTERVAL_SECONDS: u64 = 60 * 60;
