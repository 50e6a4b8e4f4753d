//! # Identity
//!
//! Identifier strategy for the three record kinds.
//!
//! - Streets are content-addressed: the same `(zip, roadType, name)` always
//!   maps to the same id, which is how duplicate street submissions collapse
//!   into one record.
//! - Signs and intersections get random ids. Their recorded position cannot
//!   be pinned to the physical object reliably enough to serve as a natural
//!   key, so they are only addressable by the id they were issued.

use crate::RoadType;
use crate::primitives::STREET_ID_SEPARATOR;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Derive the deterministic id of a street.
///
/// Lowercase hex of `SHA-256("{zip}-{roadType}-{name}")`.
#[must_use]
pub fn street_id(zip: &str, road_type: RoadType, name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(zip.as_bytes());
    hasher.update(STREET_ID_SEPARATOR.to_string().as_bytes());
    hasher.update(road_type.as_str().as_bytes());
    hasher.update(STREET_ID_SEPARATOR.to_string().as_bytes());
    hasher.update(name.as_bytes());
    hex::encode(hasher.finalize())
}

/// Infer a road type from the trailing word of a street name.
///
/// `"Main St."` → `Street`, `"Sunset Blvd"` → `Boulevard`. Anything the
/// abbreviation table does not know falls back to `Road`.
#[must_use]
pub fn road_type_from_name(name: &str) -> RoadType {
    let lowered = name.to_lowercase();
    let last = lowered.split_whitespace().last().unwrap_or("");
    match last.trim_end_matches('.') {
        "av" | "ave" => RoadType::Avenue,
        "blvd" => RoadType::Boulevard,
        "rd" => RoadType::Road,
        "st" => RoadType::Street,
        "dr" => RoadType::Drive,
        _ => RoadType::Road,
    }
}

/// Issue a fresh random id for a sign or intersection.
#[must_use]
pub fn random_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn street_id_matches_known_digest() {
        let expected = hex::encode(Sha256::digest(b"01824-Street-Main St"));
        assert_eq!(street_id("01824", RoadType::Street, "Main St"), expected);
    }

    #[test]
    fn street_id_is_lowercase_hex_sha256() {
        let id = street_id("01824", RoadType::Avenue, "Elm Ave");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn street_id_depends_on_every_field() {
        let base = street_id("01824", RoadType::Street, "Main St");
        assert_ne!(base, street_id("01825", RoadType::Street, "Main St"));
        assert_ne!(base, street_id("01824", RoadType::Road, "Main St"));
        assert_ne!(base, street_id("01824", RoadType::Street, "Main"));
    }

    #[test]
    fn road_type_abbreviations() {
        assert_eq!(road_type_from_name("Main St"), RoadType::Street);
        assert_eq!(road_type_from_name("Main St."), RoadType::Street);
        assert_eq!(road_type_from_name("Elm AVE"), RoadType::Avenue);
        assert_eq!(road_type_from_name("Elm av"), RoadType::Avenue);
        assert_eq!(road_type_from_name("Sunset Blvd"), RoadType::Boulevard);
        assert_eq!(road_type_from_name("Old County Rd"), RoadType::Road);
        assert_eq!(road_type_from_name("Mulholland Dr."), RoadType::Drive);
    }

    #[test]
    fn road_type_unknown_suffix_falls_back_to_road() {
        assert_eq!(road_type_from_name("Abbey Lane"), RoadType::Road);
        assert_eq!(road_type_from_name("Broadway"), RoadType::Road);
        assert_eq!(road_type_from_name(""), RoadType::Road);
    }

    #[test]
    fn random_ids_are_distinct_uuids() {
        let a = random_id();
        let b = random_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
