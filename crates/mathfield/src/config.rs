use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use crate::error::{MathFieldError, Result, SerDeError};

/// Script handed to the renderer as its first argument unless configured otherwise.
pub const BUNDLED_SCRIPT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/js/generate_html.js");

pub const DEFAULT_PROGRAM: &str = "node";
pub const DEFAULT_LOCALE: &str = "en_US.UTF-8";

/// How to reach the external math renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Executable looked up on `PATH`.
    pub program: String,
    /// Passed before the fragments. `None` runs `program` with fragments only.
    pub script: Option<PathBuf>,
    /// Exported as `LC_ALL` so the renderer can emit UTF-8.
    pub locale: String,
    /// Extra environment for the renderer process.
    pub env: BTreeMap<String, String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_owned(),
            script: Some(PathBuf::from(BUNDLED_SCRIPT)),
            locale: DEFAULT_LOCALE.to_owned(),
            env: BTreeMap::new(),
        }
    }
}

impl RendererConfig {
    /// Defaults, overridden by environment variables.
    ///
    /// - `MATHFIELD_RENDERER`: renderer executable
    /// - `MATHFIELD_SCRIPT`: script path, empty to pass none
    /// - `MATHFIELD_LOCALE`: value for `LC_ALL`
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(program) = std::env::var("MATHFIELD_RENDERER") {
            self.program = program;
        }
        if let Ok(script) = std::env::var("MATHFIELD_SCRIPT") {
            self.script = (!script.is_empty()).then(|| PathBuf::from(script));
        }
        if let Ok(locale) = std::env::var("MATHFIELD_LOCALE") {
            self.locale = locale;
        }
        self
    }

    /// Loads the configuration from the provided loader.
    pub fn load(loader: &impl Loader) -> Result<Self> {
        loader.load()
    }

    /// Saves the configuration using the provided saver.
    pub fn save(&self, saver: &impl Saver) -> Result<()> {
        saver.save(self)
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    fn load(&self) -> Result<RendererConfig>;
}

/// The trait for saving configuration data.
pub trait Saver {
    fn save(&self, config: &RendererConfig) -> Result<()>;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// The format follows the file extension: `.json` or `.toml`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unsupported(&self) -> MathFieldError {
        MathFieldError::Config(format!(
            "unsupported config file format: {}",
            self.path.display()
        ))
    }
}

impl Loader for FileStore {
    fn load(&self) -> Result<RendererConfig> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&std::fs::read_to_string(
                &self.path,
            )?)?),
            Some("toml") => Ok(toml::from_str(&std::fs::read_to_string(&self.path)?)
                .map_err(SerDeError::from)?),
            _ => Err(self.unsupported()),
        }
    }
}

impl Saver for FileStore {
    fn save(&self, config: &RendererConfig) -> Result<()> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(std::fs::write(
                &self.path,
                serde_json::to_string_pretty(config)?,
            )?),
            Some("toml") => Ok(std::fs::write(
                &self.path,
                toml::to_string_pretty(config).map_err(SerDeError::from)?,
            )?),
            _ => Err(self.unsupported()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RendererConfig {
        let mut config = RendererConfig {
            program: "katex-render".into(),
            script: Some(PathBuf::from("/opt/mathfield/render.js")),
            locale: "C.UTF-8".into(),
            ..Default::default()
        };
        config.env.insert("NODE_PATH".into(), "/opt/node_modules".into());
        config
    }

    #[test]
    fn defaults_point_at_node_and_bundled_script() {
        let config = RendererConfig::default();
        assert_eq!(config.program, "node");
        assert_eq!(config.locale, "en_US.UTF-8");
        let script = config.script.unwrap();
        assert!(script.ends_with("js/generate_html.js"));
    }

    #[test]
    fn json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("mathfield.json"));
        sample().save(&store).unwrap();
        assert_eq!(RendererConfig::load(&store).unwrap(), sample());
    }

    #[test]
    fn toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("mathfield.toml"));
        sample().save(&store).unwrap();
        assert_eq!(RendererConfig::load(&store).unwrap(), sample());
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mathfield.toml");
        std::fs::write(&path, "program = \"nodejs\"\n").unwrap();
        let config = RendererConfig::load(&FileStore::new(&path)).unwrap();
        assert_eq!(config.program, "nodejs");
        assert_eq!(config.locale, DEFAULT_LOCALE);
        assert_eq!(config.script, RendererConfig::default().script);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let store = FileStore::new("mathfield.yaml");
        assert!(matches!(
            RendererConfig::load(&store),
            Err(MathFieldError::Config(_))
        ));
    }
}
