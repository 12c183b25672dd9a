pub mod branches;
pub mod bridge;
pub mod changes;
pub mod content;
pub mod error;
pub mod refs;
pub mod runner;
pub mod types;

pub use bridge::GitBridge;
pub use error::GitError;
pub use runner::{CommandRunner, GitRunner};
