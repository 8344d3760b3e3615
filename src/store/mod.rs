mod guild_record;
mod guild_store;

pub use guild_record::GuildRecord;
pub use guild_store::GuildStore;
