use serenity::all::{GuildId, PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId};

/// Privilege tier a command or action requires.
///
/// Ordered `Everyone < BanMembers < Administrator`, but only the
/// administrator bypass relies on that: every other level is a plain bit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PermissionLevel {
    Everyone,
    BanMembers,
    Administrator,
}

impl PermissionLevel {
    /// The permission bits this level denotes
    pub fn bits(self) -> Permissions {
        match self {
            PermissionLevel::Everyone => Permissions::empty(),
            PermissionLevel::BanMembers => Permissions::BAN_MEMBERS,
            PermissionLevel::Administrator => Permissions::ADMINISTRATOR,
        }
    }
}

/// Check whether a member holding `permissions` satisfies `level`
pub fn has_permission_level(permissions: Permissions, level: PermissionLevel) -> bool {
    if level == PermissionLevel::Everyone || permissions.administrator() {
        return true;
    }
    permissions.contains(level.bits())
}

/// Check optional (possibly unfetchable) permissions; unknown means no
pub fn maybe_has_permission_level(permissions: Option<Permissions>, level: PermissionLevel) -> bool {
    permissions.is_some_and(|p| has_permission_level(p, level))
}

/// Whether the bot can see and post in a channel
pub fn can_post(channel_permissions: Permissions) -> bool {
    channel_permissions.administrator()
        || channel_permissions.contains(Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES)
}

/// Apply a channel's overwrites to a member's guild-wide permissions.
///
/// Order: @everyone overwrite, then all matching role overwrites together,
/// then the member's own overwrite.
pub fn apply_overwrites(
    base: Permissions,
    guild_id: GuildId,
    user_id: UserId,
    member_roles: &[RoleId],
    overwrites: &[PermissionOverwrite],
) -> Permissions {
    if base.administrator() {
        return Permissions::all();
    }

    let everyone = RoleId::new(guild_id.get());
    let mut permissions = base;

    if let Some(o) = overwrites
        .iter()
        .find(|o| matches!(o.kind, PermissionOverwriteType::Role(id) if id == everyone))
    {
        permissions.remove(o.deny);
        permissions.insert(o.allow);
    }

    let mut allow = Permissions::empty();
    let mut deny = Permissions::empty();
    for o in overwrites {
        if let PermissionOverwriteType::Role(id) = o.kind {
            if id != everyone && member_roles.contains(&id) {
                allow.insert(o.allow);
                deny.insert(o.deny);
            }
        }
    }
    permissions.remove(deny);
    permissions.insert(allow);

    if let Some(o) = overwrites
        .iter()
        .find(|o| matches!(o.kind, PermissionOverwriteType::Member(id) if id == user_id))
    {
        permissions.remove(o.deny);
        permissions.insert(o.allow);
    }

    permissions
}
