//! # Primitives
//!
//! Fixed runtime constants for the StreetScout core.

/// Lane count assumed when a new street does not supply one.
pub const DEFAULT_LANES: i32 = 2;

/// Separator joining the identity fields before hashing.
///
/// Street id = `SHA-256("zip-roadType-name")`, lowercase hex.
pub const STREET_ID_SEPARATOR: char = '-';

// =============================================================================
// PAGINATION
// =============================================================================

/// Smallest page size a listing returns.
pub const MIN_PAGE_SIZE: i64 = 1;

/// Largest page size a listing returns; larger requests are clamped.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 8;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for zip codes.
pub const MAX_ZIP_LENGTH: usize = 16;

/// Maximum length for street names, cross streets and route numbers.
///
/// Checked at the API boundary before a candidate reaches the engine.
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length for free text such as sign text.
pub const MAX_TEXT_LENGTH: usize = 1024;
