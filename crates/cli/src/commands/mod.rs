//! CLI command implementations.

mod init;
mod ping;
mod run;

pub use init::init;
pub use ping::ping;
pub use run::run;

#[cfg(test)]
mod tests;
