//! Great-circle distance between point-like values.

use crate::{Building, Chest, LatLng, Sighting, Target};

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Anything that can be normalised to a single coordinate.
pub trait Locate {
    /// Coordinate of the value.
    fn location(&self) -> LatLng;
}

impl Locate for LatLng {
    fn location(&self) -> LatLng {
        *self
    }
}

impl Locate for Target {
    fn location(&self) -> LatLng {
        self.coords()
    }
}

impl Locate for Building {
    fn location(&self) -> LatLng {
        self.coords
    }
}

impl Locate for Sighting {
    fn location(&self) -> LatLng {
        self.coords
    }
}

impl Locate for Chest {
    fn location(&self) -> LatLng {
        self.coords
    }
}

/// Haversine distance in meters between two point-like values.
///
/// The result is symmetric and depends only on the two coordinates.
#[must_use]
pub fn distance<A, B>(a: &A, b: &B) -> f64
where
    A: Locate + ?Sized,
    B: Locate + ?Sized,
{
    let a = a.location();
    let b = b.location();

    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lng = (b.lng() - a.lng()).to_radians();
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();

    let h = (d_lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng * 0.5).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Returns the coordinate `meters` north and east of `origin`.
///
/// Uses a local flat-earth approximation, accurate to well under a meter for
/// offsets of a few kilometers.
#[must_use]
pub fn offset(origin: LatLng, north_m: f64, east_m: f64) -> LatLng {
    let lat_rad = origin.lat().to_radians();
    let d_lat = (north_m / EARTH_RADIUS_M).to_degrees();
    let d_lng = (east_m / (EARTH_RADIUS_M * lat_rad.cos())).to_degrees();
    LatLng::new(origin.lat() + d_lat, origin.lng() + d_lng)
}
