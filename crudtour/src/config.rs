//! Fixed parameters of the demo run.
//!
//! The binary always runs with [`DemoConfig::default`]; the builder exists so tests and
//! embedders can point the sequence elsewhere or skip the final pause.

use std::time::Duration;

/// Address of the MongoDB server the demo connects to.
pub const DEFAULT_URI: &str = "mongodb://localhost:27017";
/// Database holding the demo collection.
pub const DEFAULT_DATABASE: &str = "test";
/// Collection the demo writes to and drops at the end.
pub const DEFAULT_COLLECTION: &str = "mongo";
/// How long the demo waits before exiting.
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub pause: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            pause: DEFAULT_PAUSE,
        }
    }
}

impl DemoConfig {
    pub fn builder() -> DemoConfigBuilder {
        DemoConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DemoConfigBuilder {
    config: DemoConfig,
}

impl DemoConfigBuilder {
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.config.uri = uri.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.config.collection = collection.into();
        self
    }

    pub fn pause(mut self, pause: Duration) -> Self {
        self.config.pause = pause;
        self
    }

    pub fn build(self) -> DemoConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_constants() {
        let config = DemoConfig::default();

        assert_eq!(config.uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "test");
        assert_eq!(config.collection, "mongo");
        assert_eq!(config.pause, Duration::from_secs(20));
    }

    #[test]
    fn builder_overrides_only_given_fields() {
        let config = DemoConfig::builder()
            .collection("scratch")
            .pause(Duration::ZERO)
            .build();

        assert_eq!(config.uri, DEFAULT_URI);
        assert_eq!(config.collection, "scratch");
        assert_eq!(config.pause, Duration::ZERO);
    }
}
