use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::LatLng;
use crate::ConfigError;

/// A shop whose visits are detected; a visit is any stay within `radius_m`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub name: String,
    pub location: LatLng,
    pub radius_m: f64,
}

#[derive(Debug, Deserialize)]
pub struct ShopsFile {
    pub shops: Vec<Shop>,
}

/// Built-in shop list used when no shops file is present.
#[must_use]
pub fn default_shops() -> Vec<Shop> {
    [
        ("Hikkaduwa FC", 6.14264, 80.10011),
        ("Aluthgama FC", 6.43296, 80.00011),
        ("Panadura FC", 6.70941, 79.90764),
    ]
    .into_iter()
    .map(|(name, lat, lng)| Shop {
        name: name.to_string(),
        location: LatLng::new(lat, lng),
        radius_m: 35.0,
    })
    .collect()
}

/// Load and validate the shop list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_shops(path: &Path) -> Result<ShopsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ShopsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let shops_file: ShopsFile = serde_yaml::from_str(&content)?;

    validate_shops(&shops_file)?;

    Ok(shops_file)
}

/// Like [`load_shops`], but a missing file yields [`default_shops`].
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_shops_or_default(path: &Path) -> Result<Vec<Shop>, ConfigError> {
    match load_shops(path) {
        Ok(file) => Ok(file.shops),
        Err(ConfigError::ShopsFileIo { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Ok(default_shops())
        }
        Err(e) => Err(e),
    }
}

fn validate_shops(shops_file: &ShopsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for shop in &shops_file.shops {
        if shop.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "shop name must be non-empty".to_string(),
            ));
        }

        if !shop.location.is_valid() {
            return Err(ConfigError::Validation(format!(
                "shop '{}' has out-of-range location {}",
                shop.name, shop.location
            )));
        }

        if !shop.radius_m.is_finite() || shop.radius_m <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "shop '{}' has invalid radius {}; must be positive",
                shop.name, shop.radius_m
            )));
        }

        if !seen_names.insert(shop.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate shop name: '{}'",
                shop.name
            )));
        }
    }

    Ok(())
}
