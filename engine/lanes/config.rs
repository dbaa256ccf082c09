#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error parsing TOML: {0}")]
    TomlParsingError(#[from] toml::de::Error),
    #[error("Error serializing TOML: {0}")]
    TomlSerializingError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/** What to do with a map made of several disconnected pieces. */
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentPolicy {
    /** Fail; a track is expected to be a single connected piece. */
    Reject,
    /** Walk every piece from its own first edge, in map order. */
    CompileAll,
}

impl Default for ComponentPolicy {
    fn default() -> Self {
        ComponentPolicy::Reject
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    pub components: ComponentPolicy,
    /**
     * Edge to start the walk from, as `[previous, start]`. Defaults to the first node of the map
     * and its first neighbor.
     */
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<(String, String)>,
    /** Connect the inbound lane of every dead end to its outbound lane, at no cost. */
    pub dead_end_turnaround: bool,
}

impl CompileConfig {
    pub fn load(data: &str) -> Result<Self, Error> {
        return Ok(toml::from_str(data)?);
    }

    pub fn load_file(path: &std::path::Path) -> Result<Self, Error> {
        return Ok(Self::load(&std::fs::read_to_string(path)?)?);
    }

    pub fn dump(&self) -> Result<String, Error> {
        return Ok(toml::to_string(self)?);
    }

    pub fn dump_file(&self, path: &std::path::Path) -> Result<(), Error> {
        return Ok(std::fs::write(path, self.dump()?)?);
    }
}

#[cfg(test)]
mod config_tests {
    use crate::config::*;

    #[test]
    fn defaults() {
        let config = CompileConfig::load("").unwrap();
        assert_eq!(config, CompileConfig::default());
        assert_eq!(config.components, ComponentPolicy::Reject);
        assert!(!config.dead_end_turnaround);
    }

    #[test]
    fn load_all_fields() {
        let config = CompileConfig::load(
            r#"
            components = "compile-all"
            start = ["A", "B"]
            dead_end_turnaround = true
            "#,
        )
        .unwrap();
        assert_eq!(config.components, ComponentPolicy::CompileAll);
        assert_eq!(config.start, Some(("A".to_string(), "B".to_string())));
        assert!(config.dead_end_turnaround);
        assert_eq!(CompileConfig::load(&config.dump().unwrap()).unwrap(), config);
    }

    #[test]
    fn bad_policy() {
        assert!(CompileConfig::load(r#"components = "some""#).is_err());
    }
}
