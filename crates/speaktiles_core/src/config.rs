//! Host-supplied configuration values.
//!
//! Nothing here reads files or globals; hosts build these values and pass
//! them into the components that need them.

use url::Url;

/// Cache generation name used by the current release.
pub const DEFAULT_CACHE_VERSION: &str = "speaktiles-v1";

/// Application shell resources cached at install time, relative to the scope.
pub const DEFAULT_SHELL_MANIFEST: &[&str] = &[
    "./",
    "./index.html",
    "./src/main.jsx",
    "./src/App.jsx",
    "./manifest.webmanifest",
    "./icon-192.png",
    "./icon-512.png",
];

/// Entry point served for offline navigations that miss the cache.
pub const DEFAULT_SHELL_ENTRY: &str = "./index.html";

/// Recognition language used when no voice is selected.
pub const DEFAULT_RECOGNITION_LANG: &str = "en-US";

/// Name of one cache generation, e.g. `speaktiles-v2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheVersion(String);

impl CacheVersion {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CacheVersion {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_VERSION)
    }
}

impl std::fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration of one cache controller generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub version: CacheVersion,
    /// Scope URL the manifest paths are resolved against; also fixes the origin.
    pub scope: Url,
    pub manifest: Vec<String>,
    pub shell_entry: String,
}

impl CacheConfig {
    /// Default manifest and version for the given scope.
    pub fn for_scope(scope: Url) -> Self {
        Self {
            version: CacheVersion::default(),
            scope,
            manifest: DEFAULT_SHELL_MANIFEST
                .iter()
                .map(|path| path.to_string())
                .collect(),
            shell_entry: DEFAULT_SHELL_ENTRY.to_string(),
        }
    }

    pub fn with_version(mut self, version: CacheVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_manifest<I, S>(mut self, manifest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest = manifest.into_iter().map(Into::into).collect();
        self
    }
}

/// Speech settings applied to every utterance and recognition session.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    pub default_lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Speak recognized text back after it lands in the phrase buffer.
    pub echo_recognized: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            default_lang: DEFAULT_RECOGNITION_LANG.to_string(),
            rate: 0.9,
            pitch: 1.0,
            volume: 1.0,
            echo_recognized: true,
        }
    }
}
