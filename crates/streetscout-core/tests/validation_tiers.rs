//! # Validation Tier Tests (T0-T3)
//!
//! ## Tiers
//! - T0: Identity
//! - T1: Street Upsert & Segments
//! - T2: Relationships
//! - T3: Concurrency

use streetscout_core::{
    ChildFields, ChildKind, ChildRecord, Condition, EntityKind, RoadType, ScoutError, SegmentKey,
    SignFields, SignType, StreetFields, StreetPatch, Surface, UpsertEngine, UpsertStatus,
    street_id,
};

fn street_fields(zip: &str, name: &str, patch: StreetPatch) -> StreetFields {
    StreetFields {
        zip: Some(zip.to_string()),
        name: Some(name.to_string()),
        road_type: None,
        details: patch,
    }
}

fn at(latitude: f64, longitude: f64) -> StreetPatch {
    StreetPatch {
        latitude: Some(latitude),
        longitude: Some(longitude),
        ..StreetPatch::default()
    }
}

// =============================================================================
// TIER T0: IDENTITY
// =============================================================================

mod t0_identity {
    use super::*;
    use sha2::{Digest, Sha256};

    /// T0.1: Street id is the SHA-256 of "zip-roadType-name".
    #[test]
    fn main_st_id_is_content_hash() {
        let engine = UpsertEngine::new();
        let outcome = engine
            .upsert_street(street_fields("01824", "Main St", StreetPatch::default()))
            .expect("upsert");

        assert_eq!(
            outcome.id,
            hex::encode(Sha256::digest(b"01824-Street-Main St"))
        );
    }

    /// T0.3: An explicit road type is hashed instead of the inferred one,
    /// so it files a separate record.
    #[test]
    fn explicit_road_type_files_separate_street() {
        let engine = UpsertEngine::new();
        let inferred = engine
            .upsert_street(street_fields("10001", "Broadway", StreetPatch::default()))
            .expect("inferred")
            .id;
        let explicit = engine
            .upsert_street(StreetFields {
                road_type: Some(RoadType::Street),
                ..street_fields("10001", "Broadway", StreetPatch::default())
            })
            .expect("explicit");

        assert_eq!(inferred, street_id("10001", RoadType::Road, "Broadway"));
        assert_eq!(explicit.id, street_id("10001", RoadType::Street, "Broadway"));
        assert_ne!(inferred, explicit.id);
        assert_eq!(explicit.status, UpsertStatus::Created);
        assert_eq!(engine.counts().streets, 2);
    }

    /// T0.2: Sign ids are random, not derived from content.
    #[test]
    fn identical_signs_get_distinct_ids() {
        let engine = UpsertEngine::new();
        let street = engine
            .upsert_street(street_fields("01824", "Main St", StreetPatch::default()))
            .expect("upsert")
            .id;
        let fields = SignFields {
            street_id: Some(street.clone()),
            sign_type: Some(SignType::Stop),
            ..SignFields::default()
        };

        let a = engine.upsert_sign(None, Some(fields.clone())).expect("a").id;
        let b = engine.upsert_sign(None, Some(fields)).expect("b").id;

        assert_ne!(a, b);
        assert_eq!(engine.counts().signs, 2);
    }
}

// =============================================================================
// TIER T1: STREET UPSERT & SEGMENTS
// =============================================================================

mod t1_street_upsert {
    use super::*;

    /// T1.1: Editing without `lanes` keeps the stored lanes.
    #[test]
    fn merge_preserves_unset_fields() {
        let engine = UpsertEngine::new();
        let id = engine
            .upsert_street(street_fields(
                "01824",
                "Main St",
                StreetPatch {
                    lanes: Some(6),
                    ..StreetPatch::default()
                },
            ))
            .expect("upsert")
            .id;

        engine
            .edit_street(
                &id,
                StreetPatch {
                    condition: Some(Condition::Icy),
                    ..StreetPatch::default()
                },
            )
            .expect("edit");

        let street = engine.fetch_street(&id).expect("fetch");
        assert_eq!(street.lanes(), 6);
        assert_eq!(street.condition(), Condition::Icy);
    }

    /// T1.2: New coordinates append a segment.
    #[test]
    fn new_coordinates_append_segment() {
        let engine = UpsertEngine::new();
        let id = engine
            .upsert_street(street_fields("01824", "Main St", at(42.0, -71.0)))
            .expect("upsert")
            .id;
        engine
            .upsert_street(street_fields("01824", "Main St", at(42.1, -71.1)))
            .expect("upsert");
        engine.edit_street(&id, at(42.2, -71.2)).expect("edit");

        let street = engine.fetch_street(&id).expect("fetch");
        assert_eq!(street.segments().len(), 3);
        let keys: Vec<f64> = street.segments().keys().map(|k| k.value()).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    /// T1.3: Same coordinates overwrite the segment at that key.
    #[test]
    fn same_coordinates_overwrite_segment() {
        let engine = UpsertEngine::new();
        let id = engine
            .upsert_street(street_fields("01824", "Main St", at(42.0, -71.0)))
            .expect("upsert")
            .id;
        engine
            .edit_street(
                &id,
                StreetPatch {
                    condition: Some(Condition::NewlyPaved),
                    ..at(42.0, -71.0)
                },
            )
            .expect("edit");

        let street = engine.fetch_street(&id).expect("fetch");
        assert_eq!(street.segments().len(), 1);
        let key = SegmentKey::from_position(42.0, -71.0, 0.0);
        assert_eq!(
            street.segments().get(&key).map(|a| a.condition),
            Some(Condition::NewlyPaved)
        );
    }

    /// T1.4: Timestamp is set once and survives merges.
    #[test]
    fn timestamp_is_stable() {
        let engine = UpsertEngine::new();
        let id = engine
            .upsert_street(street_fields("01824", "Main St", StreetPatch::default()))
            .expect("upsert")
            .id;
        let created = engine.fetch_street(&id).expect("fetch").timestamp();

        engine.edit_street(&id, at(1.0, 1.0)).expect("edit");

        assert_eq!(engine.fetch_street(&id).expect("fetch").timestamp(), created);
    }

    /// T1.5: Resubmitting with the no-information values keeps stored data.
    #[test]
    fn default_values_do_not_overwrite() {
        let engine = UpsertEngine::new();
        let id = engine
            .upsert_street(street_fields(
                "01824",
                "Main St",
                StreetPatch {
                    surface: Some(Surface::Asphalt),
                    lanes: Some(4),
                    latitude: Some(42.6),
                    ..StreetPatch::default()
                },
            ))
            .expect("upsert")
            .id;

        let outcome = engine
            .upsert_street(street_fields(
                "01824",
                "Main St",
                StreetPatch {
                    surface: Some(Surface::Unknown),
                    lanes: Some(2),
                    latitude: Some(0.0),
                    ..StreetPatch::default()
                },
            ))
            .expect("upsert");
        assert_eq!(outcome.status, UpsertStatus::UpdatedExisting);

        let street = engine.fetch_street(&id).expect("fetch");
        assert_eq!(street.surface(), Surface::Asphalt);
        assert_eq!(street.lanes(), 4);
        assert!((street.latitude() - 42.6).abs() < f64::EPSILON);
        assert_eq!(street.segments().len(), 1);
        assert_eq!(
            street.segments().get(&street.segment_key()).map(|a| a.surface),
            Some(Surface::Asphalt)
        );
    }
}

// =============================================================================
// TIER T2: RELATIONSHIPS
// =============================================================================

mod t2_relationships {
    use super::*;

    /// T2.1: A sign for an unknown street is rejected without side effects.
    #[test]
    fn missing_parent_changes_nothing() {
        let engine = UpsertEngine::new();
        engine
            .upsert_street(street_fields("01824", "Main St", StreetPatch::default()))
            .expect("upsert");
        let before = engine.list(EntityKind::Street, 1, 100);

        let result = engine.upsert_child(
            ChildKind::Sign,
            None,
            Some(ChildFields::Sign(SignFields {
                street_id: Some(street_id(
                    "99999",
                    RoadType::Road,
                    "Nowhere Rd",
                )),
                ..SignFields::default()
            })),
        );

        assert!(matches!(result, Err(ScoutError::MissingParent(_))));
        assert_eq!(engine.counts().signs, 0);
        assert_eq!(engine.list(EntityKind::Street, 1, 100), before);
    }

    /// T2.2: End-to-end: street, sign, fetch, delete sign, dangling id.
    #[test]
    fn sign_lifecycle_leaves_dangling_reference() {
        let engine = UpsertEngine::new();
        let street = engine
            .upsert_street(street_fields("01824", "Main St", StreetPatch::default()))
            .expect("upsert");
        assert_eq!(street.status, UpsertStatus::Created);

        let sign = engine
            .upsert_child(
                ChildKind::Sign,
                None,
                Some(ChildFields::Sign(SignFields {
                    street_id: Some(street.id.clone()),
                    sign_type: Some(SignType::Stop),
                    ..SignFields::default()
                })),
            )
            .expect("sign");
        assert_ne!(sign.id, street.id);

        let fetched = engine.fetch_street(&street.id).expect("fetch");
        assert_eq!(fetched.signs().len(), 1);
        assert!(fetched.signs().contains(&sign.id));

        engine.delete(&sign.id).expect("delete sign");

        // Deletes do not cascade into the street's relationship set.
        let fetched = engine.fetch_street(&street.id).expect("fetch");
        assert_eq!(fetched.signs().len(), 1);
        assert!(fetched.signs().contains(&sign.id));
        assert!(engine.fetch(&sign.id).is_err());
    }

    /// T2.3: Re-submitting a known child id does not duplicate the reference.
    #[test]
    fn re_registration_is_idempotent() {
        let engine = UpsertEngine::new();
        let street = engine
            .upsert_street(street_fields("01824", "Main St", StreetPatch::default()))
            .expect("upsert")
            .id;
        let sign = engine
            .upsert_sign(
                None,
                Some(SignFields {
                    street_id: Some(street.clone()),
                    ..SignFields::default()
                }),
            )
            .expect("sign")
            .id;

        for limit in [25, 30, 35] {
            engine
                .upsert_sign(
                    Some(&sign),
                    Some(SignFields {
                        speed_limit: Some(limit),
                        ..SignFields::default()
                    }),
                )
                .expect("merge");
        }

        assert_eq!(engine.fetch_street(&street).expect("fetch").signs().len(), 1);
        assert_eq!(engine.fetch_sign(&sign).expect("sign").speed_limit(), 35);
        assert_eq!(engine.fetch_sign(&sign).expect("sign").street_id(), street);
    }
}

// =============================================================================
// TIER T3: CONCURRENCY
// =============================================================================

mod t3_concurrency {
    use super::*;

    const WRITERS: usize = 16;

    /// T3.1: Concurrent submissions for one street never lose a segment.
    #[test]
    fn concurrent_street_updates_are_not_lost() {
        let engine = UpsertEngine::new();

        std::thread::scope(|scope| {
            for i in 0..WRITERS {
                let engine = &engine;
                scope.spawn(move || {
                    let offset = i as f64 + 1.0;
                    engine
                        .upsert_street(street_fields("01824", "Main St", at(offset, offset)))
                        .expect("upsert");
                });
            }
        });

        assert_eq!(engine.counts().streets, 1);
        let id = street_id("01824", RoadType::Street, "Main St");
        assert_eq!(engine.fetch_street(&id).expect("fetch").segments().len(), WRITERS);
    }

    /// T3.2: Concurrent sign submissions all land in the street's set.
    #[test]
    fn concurrent_sign_registration_is_not_lost() {
        let engine = UpsertEngine::new();
        let street = engine
            .upsert_street(street_fields("01824", "Main St", StreetPatch::default()))
            .expect("upsert")
            .id;

        std::thread::scope(|scope| {
            for _ in 0..WRITERS {
                let engine = &engine;
                let street = street.clone();
                scope.spawn(move || {
                    engine
                        .upsert_sign(
                            None,
                            Some(SignFields {
                                street_id: Some(street),
                                ..SignFields::default()
                            }),
                        )
                        .expect("sign");
                });
            }
        });

        let fetched = engine.fetch_street(&street).expect("fetch");
        assert_eq!(fetched.signs().len(), WRITERS);
        assert_eq!(engine.counts().signs, WRITERS);
    }

    /// T3.3: Readers running alongside writers always see whole records.
    #[test]
    fn readers_see_consistent_records() {
        let engine = UpsertEngine::new();
        let street = engine
            .upsert_street(street_fields("01824", "Main St", StreetPatch::default()))
            .expect("upsert")
            .id;

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..200 {
                    engine
                        .edit_street(
                            &street,
                            StreetPatch {
                                lanes: Some(i),
                                latitude: Some(f64::from(i)),
                                ..StreetPatch::default()
                            },
                        )
                        .expect("edit");
                }
            });
            scope.spawn(|| {
                for _ in 0..200 {
                    let s = engine.fetch_street(&street).expect("fetch");
                    let current = s.segments().get(&s.segment_key()).expect("segment");
                    assert_eq!(current.lanes, s.lanes());
                }
            });
        });
    }
}
