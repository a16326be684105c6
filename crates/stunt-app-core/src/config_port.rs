// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config port shared across stunt tools.

use crate::config::{ConfigError, ConfigService, ConfigStore};
use crate::prefs::{StuntPrefs, PREFS_KEY};

/// Load/save of the preference bundle as one unit.
pub trait ConfigPort {
    /// Load preferences; `None` if missing or unreadable.
    fn load_prefs(&self) -> Option<StuntPrefs>;
    /// Persist preferences.
    fn save_prefs(&self, prefs: &StuntPrefs) -> Result<(), ConfigError>;
}

impl<S: ConfigStore> ConfigPort for ConfigService<S> {
    fn load_prefs(&self) -> Option<StuntPrefs> {
        self.load(PREFS_KEY).ok().flatten()
    }

    fn save_prefs(&self, prefs: &StuntPrefs) -> Result<(), ConfigError> {
        self.save(PREFS_KEY, prefs)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::tests::MemoryStore;

    #[test]
    fn prefs_round_trip_and_tolerate_garbage() {
        let service = ConfigService::new(MemoryStore::default());
        assert!(service.load_prefs().is_none());
        let mut prefs = StuntPrefs::default();
        prefs.solver.max_beats = 20;
        service.save_prefs(&prefs).unwrap();
        assert_eq!(service.load_prefs(), Some(prefs));
        service.store().save_raw(PREFS_KEY, b"not json").unwrap();
        assert!(service.load_prefs().is_none());
    }
}
