/// One poll's worth of perceived values.
///
/// Any field may be missing (OCR miss). `current` may exceed `max` because of
/// OCR noise; decision units do not rely on `current <= max`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusReading {
	pub hp_current: Option<u32>,
	pub hp_max: Option<u32>,
	pub mana_current: Option<u32>,
	pub mana_max: Option<u32>,
}

impl StatusReading {
	pub fn new(hp_current: Option<u32>, mana_current: Option<u32>) -> Self {
		Self {
			hp_current,
			mana_current,
			..Default::default()
		}
	}
}

/// Produces a [`StatusReading`] once per poll tick.
///
/// Implementations may hand back cached values when a fresh read fails.
pub trait PerceptionSource {
	fn read_status(&mut self) -> Result<StatusReading, crate::BotError>;
}
