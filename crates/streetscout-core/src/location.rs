//! # Zip Lookup
//!
//! Resolution of a zip code to the state, county and town a new street is
//! filed under.
//!
//! `ZipLookup` is the extension point for a real postal database. The only
//! implementation shipped here, `FixedRegionLookup`, answers one configured
//! region for every zip code.

use crate::Region;

/// Resolves zip codes to administrative regions.
pub trait ZipLookup: Send + Sync {
    /// Return the region for `zip`, or `None` when it is unknown.
    fn locate(&self, zip: &str) -> Option<Region>;
}

/// Stub lookup that files every zip code under one region.
#[derive(Debug, Clone)]
pub struct FixedRegionLookup {
    region: Region,
}

impl FixedRegionLookup {
    #[must_use]
    pub fn new(region: Region) -> Self {
        Self { region }
    }

    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }
}

impl Default for FixedRegionLookup {
    fn default() -> Self {
        Self::new(Region::new("MA", "Middlesex", "Chelmsford"))
    }
}

impl ZipLookup for FixedRegionLookup {
    fn locate(&self, zip: &str) -> Option<Region> {
        if zip.trim().is_empty() {
            return None;
        }
        Some(self.region.clone())
    }
}
