use crate::utils::media::MediaHandle;

/// Single-slot holder for the live media handle.
///
/// At most one handle exists at a time. Replacing or unloading releases the
/// previous handle before the slot is reused.
#[derive(Default)]
pub struct SoundSlot {
    sound: Option<Box<dyn MediaHandle>>,
}

impl SoundSlot {
    pub fn new() -> Self {
        Self { sound: None }
    }

    pub fn get(&mut self) -> Option<&mut (dyn MediaHandle + 'static)> {
        self.sound.as_deref_mut()
    }

    pub fn is_loaded(&self) -> bool {
        self.sound.is_some()
    }

    pub fn set(&mut self, sound: Box<dyn MediaHandle>) {
        self.unload();
        self.sound = Some(sound);
    }

    pub fn unload(&mut self) {
        if let Some(mut sound) = self.sound.take() {
            log::debug!("[SoundSlot] Unloading current sound");
            sound.unload();
        }
    }
}

impl Drop for SoundSlot {
    fn drop(&mut self) {
        self.unload();
    }
}
