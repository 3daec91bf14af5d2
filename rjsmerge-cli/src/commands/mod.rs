//! Command implementations.
//!
//! One module per subcommand; each exposes an `Args` struct with an
//! `execute` method.

pub mod completions;
pub mod conflicts;
pub mod merge;
pub mod modules;
pub mod validate;

pub use completions::CompletionsCommand;
pub use conflicts::ConflictsCommand;
pub use merge::MergeCommand;
pub use modules::ModulesCommand;
pub use validate::ValidateCommand;
