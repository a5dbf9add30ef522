//! # Loader Configuration
//!
//! All tunables in one TOML-friendly struct. Every section and field is
//! optional; missing values fall back to the stock map format.
//!
//! ```toml
//! [container]
//! magic = "GBMP"
//! size_hint = 500
//!
//! [atlas]
//! tile_px = 64
//! atlas_px = 2048
//!
//! [geometry]
//! batch_size = 32
//! render_flipped_faces = false
//! ```

use gbmp_map::MAP_SIZE;
use gbmp_mesh::{AtlasLayout, GeometryConfig};
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, LoadResult};

/// Container framing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Four ASCII characters expected at offset 0.
    pub magic: String,
    /// Expected payload size in bytes. Only presizes internal scratch.
    pub size_hint: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            magic: "GBMP".to_string(),
            size_hint: 500,
        }
    }
}

impl ContainerConfig {
    /// The magic as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidConfig`] unless the magic is exactly four
    /// ASCII characters.
    pub fn magic_bytes(&self) -> LoadResult<[u8; 4]> {
        if !self.magic.is_ascii() {
            return Err(LoadError::InvalidConfig(format!(
                "magic {:?} is not ASCII",
                self.magic
            )));
        }
        <[u8; 4]>::try_from(self.magic.as_bytes()).map_err(|_| {
            LoadError::InvalidConfig(format!(
                "magic {:?} must be 4 bytes, got {}",
                self.magic,
                self.magic.len()
            ))
        })
    }
}

/// Complete loader configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Container framing.
    pub container: ContainerConfig,
    /// Texture atlas dimensions.
    pub atlas: AtlasLayout,
    /// Geometry builder settings.
    pub geometry: GeometryConfig,
}

impl LoaderConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidConfig`] on malformed TOML or values that
    /// fail [`LoaderConfig::validate`].
    pub fn from_toml_str(source: &str) -> LoadResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| LoadError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidConfig`] if serialisation fails.
    pub fn to_toml_string(&self) -> LoadResult<String> {
        toml::to_string(self).map_err(|e| LoadError::InvalidConfig(e.to_string()))
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> LoadResult<()> {
        self.container.magic_bytes()?;

        let batch = self.geometry.batch_size;
        if batch == 0 || MAP_SIZE % batch != 0 {
            return Err(LoadError::InvalidConfig(format!(
                "batch_size {batch} must be a non-zero divisor of {MAP_SIZE}"
            )));
        }

        let AtlasLayout { tile_px, atlas_px } = self.atlas;
        if tile_px == 0 || atlas_px == 0 || atlas_px % tile_px != 0 {
            return Err(LoadError::InvalidConfig(format!(
                "atlas_px {atlas_px} must be a non-zero multiple of tile_px {tile_px}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LoaderConfig::default();
        config.validate().unwrap();
        assert_eq!(config.container.magic_bytes().unwrap(), *b"GBMP");
        assert_eq!(config.container.size_hint, 500);
        assert_eq!(config.atlas, AtlasLayout { tile_px: 64, atlas_px: 2048 });
        assert_eq!(config.geometry.batch_size, 32);
        assert!(!config.geometry.render_flipped_faces);
    }

    #[test]
    fn test_partial_toml() {
        let config = LoaderConfig::from_toml_str(
            r#"
            [geometry]
            batch_size = 64
            render_flipped_faces = true
            "#,
        )
        .unwrap();
        assert_eq!(config.geometry.batch_size, 64);
        assert!(config.geometry.render_flipped_faces);
        assert_eq!(config.container, ContainerConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(LoaderConfig::from_toml_str("").unwrap(), LoaderConfig::default());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = LoaderConfig::default();
        config.container.magic = "TEST".to_string();
        let text = config.to_toml_string().unwrap();
        assert_eq!(LoaderConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_values() {
        for source in [
            "[container]\nmagic = \"GBM\"",
            "[container]\nmagic = \"GBMPX\"",
            "[container]\nmagic = \"GB\u{e9}\"",
            "[geometry]\nbatch_size = 0",
            "[geometry]\nbatch_size = 48",
            "[atlas]\ntile_px = 0",
            "[atlas]\ntile_px = 60",
            "[geometry]\nbatch_size = \"big\"",
        ] {
            assert!(
                matches!(LoaderConfig::from_toml_str(source), Err(LoadError::InvalidConfig(_))),
                "accepted {source:?}"
            );
        }
    }
}
