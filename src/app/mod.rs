pub mod controller;
pub mod sound_slot;

pub use controller::PlaybackController;
pub use sound_slot::SoundSlot;
