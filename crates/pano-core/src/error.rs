use thiserror::Error;

/// Errors for the configuration-time parsing paths.
///
/// Nothing on the per-frame path returns these; the frame loop tolerates bad
/// values instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanoError {
    #[error("unknown quality preset `{0}` (expected ultra, high, medium or low)")]
    UnknownPreset(String),
    #[error("unknown view key `{0}`")]
    UnknownKey(String),
}
