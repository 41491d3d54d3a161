use turnover_model::{ManifestLine, Property};

/// Inventory item ids used by the formula manifest.
pub mod items {
    pub const DOUBLE_SHEET: &str = "double_sheet";
    pub const SINGLE_SHEET: &str = "single_sheet";
    pub const PILLOWCASE: &str = "pillowcase";
    pub const BATH_TOWEL: &str = "bath_towel";
    pub const HAND_TOWEL: &str = "hand_towel";
    pub const FACE_TOWEL: &str = "face_towel";
    pub const BATH_MAT: &str = "bath_mat";
}

const SHEETS_PER_SET: u32 = 3;
const PILLOWCASES_PER_DOUBLE_SET: u32 = 2;
const PILLOWCASES_PER_SINGLE_SET: u32 = 1;

/// Linen kit for `guests` at `property`: the owner's configuration for that
/// guest count when present, otherwise the formula.
pub fn manifest_for(property: &Property, guests: u32) -> Vec<ManifestLine> {
    let guests = guests.max(1);
    match property.service_config_for(guests) {
        Some(config) => config
            .lines()
            .filter(|line| line.quantity > 0)
            .cloned()
            .collect(),
        None => fallback_manifest(guests, property.bedrooms, property.bathrooms),
    }
}

/// Formula kit. Errs on the side of over-supplying: couples fill double beds
/// up to the bedroom count, everyone else gets a single set.
pub fn fallback_manifest(guests: u32, bedrooms: u32, bathrooms: u32) -> Vec<ManifestLine> {
    let guests = guests.max(1);
    let double_sets = bedrooms.min(guests.div_ceil(2));
    let single_sets = guests.saturating_sub(double_sets * 2);
    let pillowcases =
        double_sets * PILLOWCASES_PER_DOUBLE_SET + single_sets * PILLOWCASES_PER_SINGLE_SET;

    [
        (items::DOUBLE_SHEET, double_sets * SHEETS_PER_SET),
        (items::SINGLE_SHEET, single_sets * SHEETS_PER_SET),
        (items::PILLOWCASE, pillowcases),
        (items::BATH_TOWEL, guests),
        (items::HAND_TOWEL, guests),
        (items::FACE_TOWEL, guests),
        (items::BATH_MAT, bathrooms),
    ]
    .into_iter()
    .filter(|(_, quantity)| *quantity > 0)
    .map(|(item, quantity)| ManifestLine::new(item, quantity))
    .collect()
}
