//! "View in OpenStreetMap" link derived from the visible bounds.

use super::density::GeoBounds;

pub const DEFAULT_DEEP_LINK_BASE: &str = "http://www.openstreetmap.org/index.html";

/// Link to `base` showing `bounds` with the box overlay flag set.
pub fn deep_link(base: &str, bounds: &GeoBounds) -> String {
    format!(
        "{base}?minlon={}&maxlon={}&minlat={}&maxlat={}&box=yes",
        bounds.west, bounds.east, bounds.south, bounds.north
    )
}
