use std::collections::BTreeMap;

use chrono::NaiveTime;
use rust_decimal::Decimal;

use crate::ids::{PropertyId, UserId};

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Self::EARTH_RADIUS_KM * c
    }
}

/// One line of a linen bill of materials.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManifestLine {
    pub item_id: String,
    pub quantity: u32,
}

impl ManifestLine {
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// Owner-configured linen kit for a given guest count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceConfig {
    #[cfg_attr(feature = "serde", serde(rename = "bl", default))]
    pub bed_linen: Vec<ManifestLine>,
    #[cfg_attr(feature = "serde", serde(rename = "ba", default))]
    pub bathroom: Vec<ManifestLine>,
    #[cfg_attr(feature = "serde", serde(rename = "ki", default))]
    pub kitchen: Vec<ManifestLine>,
}

impl ServiceConfig {
    pub fn lines(&self) -> impl Iterator<Item = &ManifestLine> {
        self.bed_linen
            .iter()
            .chain(self.bathroom.iter())
            .chain(self.kitchen.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.lines().all(|line| line.quantity == 0)
    }
}

/// A rental property. Read-only to the reconciliation core.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub owner_id: UserId,
    pub active: bool,
    pub uses_own_linen: bool,
    pub cleaning_base_price: Decimal,
    /// Linen kits keyed by guest count.
    #[cfg_attr(feature = "serde", serde(default))]
    pub service_configs: BTreeMap<u32, ServiceConfig>,
    pub max_guests: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub checkout_time: Option<NaiveTime>,
    pub location: Option<GeoPoint>,
}

impl Property {
    pub fn service_config_for(&self, guests: u32) -> Option<&ServiceConfig> {
        self.service_configs
            .get(&guests)
            .filter(|config| !config.is_empty())
    }
}
