//! Process-wide normalization defaults.
//!
//! Orbits constructed without explicit scales fall back to the defaults held here:
//! a reference distance `ro` (kpc) and a reference circular velocity `vo` (km/s).
//! The defaults can be overridden once per process, either programmatically or from
//! a TOML file with a `[normalization]` table:
//!
//! ```toml
//! [normalization]
//! ro = 8.2
//! vo = 232.0
//! ```

use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::constants::{KmPerSec, Kpc};
use crate::epicycle_errors::EpicycleError;

/// Reference scales used to normalize orbits that were constructed without explicit scales.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Normalization {
    /// Distance from the vantage point to the system center (kpc)
    pub ro: Kpc,
    /// Circular velocity at `ro` (km/s)
    pub vo: KmPerSec,
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization { ro: 8.0, vo: 220.0 }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    normalization: Normalization,
}

static NORMALIZATION: OnceCell<Normalization> = OnceCell::new();

/// Current process-wide normalization defaults.
pub fn normalization() -> Normalization {
    *NORMALIZATION.get_or_init(Normalization::default)
}

/// Install process-wide normalization defaults.
///
/// Fails with [`EpicycleError::ConfigAlreadyInstalled`] if the defaults were already
/// read or installed; install before constructing the first orbit.
pub fn install_normalization(defaults: Normalization) -> Result<(), EpicycleError> {
    NORMALIZATION
        .set(defaults)
        .map_err(|_| EpicycleError::ConfigAlreadyInstalled)
}

/// Parse normalization defaults from a TOML document with a `[normalization]` table.
pub fn normalization_from_toml(document: &str) -> Result<Normalization, EpicycleError> {
    let parsed: ConfigFile = toml::from_str(document)?;
    Ok(parsed.normalization)
}

/// Read normalization defaults from a TOML file.
pub fn normalization_from_path(path: &Path) -> Result<Normalization, EpicycleError> {
    let document = fs::read_to_string(path)?;
    normalization_from_toml(&document)
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_default_normalization() {
        let defaults = Normalization::default();
        assert_eq!(defaults.ro, 8.0);
        assert_eq!(defaults.vo, 220.0);
    }

    #[test]
    fn test_normalization_from_toml() {
        let parsed = normalization_from_toml(
            "[normalization]\n\
             ro = 8.2\n\
             vo = 232.0\n",
        )
        .unwrap();
        assert_eq!(
            parsed,
            Normalization {
                ro: 8.2,
                vo: 232.0
            }
        );
    }

    #[test]
    fn test_normalization_from_toml_rejects_garbage() {
        assert!(normalization_from_toml("[normalization]\nro = \"eight\"\n").is_err());
        assert!(normalization_from_toml("ro = 8.0\n").is_err());
    }
}
