//! Shared constants for end-to-end tests
//!
//! When test data changes (manifest contents, provider ids, etc.),
//! update only this file.

// ============================================================================
// Credentials expected by the stub providers
// ============================================================================

pub const TMDB_API_KEY: &str = "tmdb-test-key";
pub const TVDB_API_KEY: &str = "tvdb-test-key";
pub const TVDB_TOKEN: &str = "tvdb-test-token";
pub const OVERSEERR_API_KEY: &str = "overseerr-test-key";

// ============================================================================
// Manifest data
// ============================================================================

/// Sci-fi manifest: two movies and one show.
pub const SCIFI_MANIFEST: &str = r#"
Alien Collection:
  Movies Missing (TMDb IDs):
    "8077": "Alien³"
    "8078": Alien Resurrection
Star Trek:
  Shows Missing (TVDb IDs):
    "253463": Star Trek Continues
"#;

/// Repeats Alien³ under another collection and adds an id the stub does
/// not know about.
pub const DIRECTORS_MANIFEST: &str = r#"
David Fincher:
  Movies Missing (TMDb IDs):
    8077: "Alien 3"
    "99999": Unknown Movie
    "": Dropped Entry
"#;

pub const BROKEN_MANIFEST: &str = "Broken: [unclosed";

/// Movie known to the TMDb stub.
pub const ALIEN3_ID: &str = "8077";
pub const ALIEN3_TITLE: &str = "Alien³";
pub const ALIEN_RESURRECTION_ID: &str = "8078";
/// Movie the TMDb stub answers with 404.
pub const UNKNOWN_MOVIE_ID: &str = "99999";
/// Show known to the TVDb stub.
pub const STAR_TREK_CONTINUES_ID: &str = "253463";

/// Overseerr stub fails any request for this id with a 500.
pub const OVERSEERR_FAILING_ID: u64 = 666;

// ============================================================================
// Timeouts
// ============================================================================

pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
