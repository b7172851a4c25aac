use thiserror::Error;

/// Errors surfaced by the bot core.
///
/// Expected conditions (disabled unit, cooldown active, unknown capacity) are
/// never errors; they come back as neutral return values.
#[derive(Debug, Error)]
pub enum BotError {
	#[error("unknown food type: {0}")]
	UnknownFood(String),

	#[error("click listener unavailable: {0}")]
	ClickSourceUnavailable(String),

	#[error("perception failed: {0}")]
	Perception(String),

	#[error("failed to spawn worker thread")]
	Spawn(#[from] std::io::Error),
}
