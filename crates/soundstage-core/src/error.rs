use thiserror::Error;

/// Errors surfaced at the engine's input boundaries. The per-frame path never
/// returns these; callers fall back to defaults instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown preset id `{0}`")]
    UnknownPreset(String),

    #[error("invalid settings snapshot: {0}")]
    Settings(#[from] serde_json::Error),
}
