use smol_str::SmolStr;
use thiserror::Error;

/// The kind of failures produced during name-info resolution.
///
/// `NoInfoAvailable` is the ordinary miss, surfaced to the editor with the
/// name and where the lookup was attempted. `ReadActionTimeout` means the
/// module index itself could not be queried in time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoInfo {
    #[error("no info available for {name} ({context})")]
    NoInfoAvailable { name: SmolStr, context: String },
    #[error("read action timed out ({context})")]
    ReadActionTimeout { context: String },
}
