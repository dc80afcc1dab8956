//! File persistence and serialization configuration

pub struct CacheConfig {
    /// Directory path for storing fetched straddle history
    pub directory: &'static str,
    /// Base filename for cache files (without extension)
    pub filename_without_ext: &'static str,
    /// Current version of the cache serialization format
    pub version: f64,
    /// Maximum age of a cache file before it is ignored (seconds)
    pub acceptable_age_sec: i64,
}

pub struct PersistenceConfig {
    pub cache: CacheConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    cache: CacheConfig {
        directory: "straddle_data",
        filename_without_ext: "straddle",
        version: 1.0,
        // 12 hours (60 * 60 * 12)
        acceptable_age_sec: 43_200,
    },
};

/// Cache filename for one selection
/// Example: "straddle_NIFTY_23400_v1.bin"
pub fn straddle_cache_filename(index: &str, strike_label: &str) -> String {
    format!(
        "{}_{}_{}_v{}.bin",
        PERSISTENCE.cache.filename_without_ext,
        index.to_uppercase(),
        strike_label,
        PERSISTENCE.cache.version
    )
}
