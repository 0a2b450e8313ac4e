//! Geographic (EPSG:4326) to pseudo-Mercator (EPSG:3857) conversion.
use std::f64::consts::PI;

/// WGS84 semi-major axis used by EPSG:3857, in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude beyond which pseudo-Mercator is undefined (square world).
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Half the width of the projected world in meters.
pub const HALF_WORLD_M: f64 = PI * EARTH_RADIUS_M;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// EPSG:4326, longitude/latitude in degrees.
    Geographic,
    /// EPSG:3857, meters.
    WebMercator,
}

impl Projection {
    pub fn code(&self) -> &'static str {
        match self {
            Projection::Geographic => "EPSG:4326",
            Projection::WebMercator => "EPSG:3857",
        }
    }

    /// Project a longitude/latitude pair into this projection.
    pub fn from_lonlat(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            Projection::Geographic => (lon, lat),
            Projection::WebMercator => lonlat_to_mercator(lon, lat),
        }
    }

    /// Inverse of [`Projection::from_lonlat`].
    pub fn to_lonlat(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Projection::Geographic => (x, y),
            Projection::WebMercator => mercator_to_lonlat(x, y),
        }
    }
}

pub fn lonlat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

pub fn mercator_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}
