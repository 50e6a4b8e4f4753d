//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState, IntersectionPatch, StreetCreate, StreetSignPatch};
use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use streetscout_core::{
    RoadType, ScoutError, UpsertEngine, UpsertStatus, road_type_from_name, street_id,
};

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum seed file size (100 MB).
const MAX_SEED_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ScoutError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ScoutError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ScoutError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize `path` and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, ScoutError> {
    let canonical = path.canonicalize().map_err(|e| {
        ScoutError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(ScoutError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// SEED FILES
// =============================================================================

/// Initial data replayed through the engine at startup.
///
/// ```json
/// {
///   "streets": [{ "zip": "01824", "name": "Main St", "lanes": 4 }],
///   "signs": [{ "street": { "zip": "01824", "name": "Main St" }, "signType": "Stop" }],
///   "intersections": [{ "street": { "zip": "01824", "name": "Main St" }, "crossStreet": "Elm St" }]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub streets: Vec<StreetCreate>,
    pub signs: Vec<SeedSign>,
    pub intersections: Vec<SeedIntersection>,
}

/// A street named by its identity fields instead of its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetRef {
    pub zip: String,
    pub name: String,
    pub road_type: Option<RoadType>,
}

impl StreetRef {
    /// The id the referenced street is stored under.
    #[must_use]
    pub fn id(&self) -> String {
        let road_type = self
            .road_type
            .unwrap_or_else(|| road_type_from_name(&self.name));
        street_id(&self.zip, road_type, &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSign {
    pub street: StreetRef,
    #[serde(flatten)]
    pub details: StreetSignPatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedIntersection {
    pub street: StreetRef,
    #[serde(flatten)]
    pub details: IntersectionPatch,
}

/// What a seed run stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub streets_created: usize,
    pub streets_merged: usize,
    pub signs: usize,
    pub intersections: usize,
}

/// Parse a seed file and replay it through `engine`.
///
/// Streets go first so children can find their parents. The first failing
/// record aborts the run; records stored before it stay stored.
pub fn load_seed(engine: &UpsertEngine, path: &Path) -> Result<SeedReport, ScoutError> {
    let validated_path = validate_file_path(path)?;
    validate_file_size(&validated_path, MAX_SEED_FILE_SIZE)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| ScoutError::IoError(format!("Read file: {}", e)))?;
    let seed: SeedFile = serde_json::from_slice(&contents)
        .map_err(|e| ScoutError::SerializationError(format!("Invalid seed file: {}", e)))?;

    apply_seed(engine, seed)
}

/// Replay an already parsed seed.
pub fn apply_seed(engine: &UpsertEngine, seed: SeedFile) -> Result<SeedReport, ScoutError> {
    let mut report = SeedReport::default();

    for street in seed.streets {
        match engine.upsert_street(street.into_fields()?)?.status {
            UpsertStatus::Created => report.streets_created += 1,
            _ => report.streets_merged += 1,
        }
    }

    for sign in seed.signs {
        let mut fields = sign.details.into_fields()?;
        fields.street_id = Some(sign.street.id());
        engine.upsert_sign(None, Some(fields))?;
        report.signs += 1;
    }

    for intersection in seed.intersections {
        let mut fields = intersection.details.into_fields()?;
        fields.street_id = Some(intersection.street.id());
        engine.upsert_intersection(None, Some(fields))?;
        report.intersections += 1;
    }

    Ok(report)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    seed: Option<&Path>,
) -> Result<(), ScoutError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let engine = config.build_engine();
    if let Some(seed) = seed {
        let report = load_seed(&engine, seed)?;
        tracing::info!(
            event = "seed_loaded",
            streets_created = report.streets_created,
            streets_merged = report.streets_merged,
            signs = report.signs,
            intersections = report.intersections,
            "Loaded seed file {}",
            seed.display()
        );
    }

    println!("StreetScout Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!(
        "  Region:   {}, {}, {}",
        config.region.town, config.region.county, config.region.state
    );
    println!();
    println!("Endpoints:");
    println!("  GET    /api/streetscout/{{street,sign,xsection}}");
    println!("  GET    /api/streetscout/{{kind}}/{{id}}");
    println!("  POST   /api/streetscout/{{kind}}/submit");
    println!("  PUT    /api/streetscout/{{kind}}/edit/{{id}}");
    println!("  DELETE /api/streetscout/{{kind}}/delete/{{id}}");
    println!("  GET    /status - Record counts");
    println!("  GET    /health - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = config.bind_addr();
    api::run_server(&addr, AppState::new(engine, &config)).await
}

// =============================================================================
// IDENTITY COMMANDS
// =============================================================================

/// Print the id a street would be stored under.
pub fn cmd_street_id(
    json_mode: bool,
    zip: &str,
    name: &str,
    road_type: Option<&str>,
) -> Result<(), ScoutError> {
    if zip.trim().is_empty() {
        return Err(ScoutError::IdentificationFailed("zip"));
    }
    if name.trim().is_empty() {
        return Err(ScoutError::IdentificationFailed("name"));
    }

    let road_type = match road_type {
        Some(rt) => rt.parse::<RoadType>()?,
        None => road_type_from_name(name),
    };
    let id = street_id(zip, road_type, name);

    if json_mode {
        let output = serde_json::json!({
            "zip": zip,
            "name": name,
            "roadType": road_type,
            "id": id,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("{}", id);
    }
    Ok(())
}

/// Print the road type inferred from `name`.
pub fn cmd_road_type(json_mode: bool, name: &str) -> Result<(), ScoutError> {
    let road_type = road_type_from_name(name);
    if json_mode {
        let output = serde_json::json!({ "name": name, "roadType": road_type });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("{}", road_type);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
