pub mod callbacks;
pub mod maintenance;
pub mod mod_channel;
pub mod platform;
pub mod propagation;
pub mod remote_log;
pub mod serenity_platform;

#[cfg(test)]
pub mod testing;
