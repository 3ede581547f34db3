use crate::store::{self, Store};
use std::sync::atomic::{AtomicBool, Ordering};

/// Player settings that outlive a run. Only sound so far.
pub struct Preferences {
    sound_enabled: AtomicBool,
    store: Store,
}

impl Preferences {
    pub async fn load(kv: Store) -> Self {
        let sound_enabled = kv.load_or(&store::SOUND_ENABLED, true).await;
        Self {
            sound_enabled: AtomicBool::new(sound_enabled),
            store: kv,
        }
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled.load(Ordering::SeqCst)
    }

    pub async fn set_sound_enabled(&self, enabled: bool) {
        self.sound_enabled.store(enabled, Ordering::SeqCst);
        self.store.save_logged(&store::SOUND_ENABLED, &enabled).await;
    }

    /// Flips the setting and returns the new value.
    pub async fn toggle_sound(&self) -> bool {
        let enabled = !self.sound_enabled.fetch_xor(true, Ordering::SeqCst);
        self.store.save_logged(&store::SOUND_ENABLED, &enabled).await;
        enabled
    }
}
