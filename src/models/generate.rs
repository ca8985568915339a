//! Rendering model templates from JSON configs.

mod var_lib;

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use minijinja::{
    Environment, Error as TemplateError, ErrorKind, Value as TemplateValue, value::ValueKind,
};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::support::dirs::{DirError, RunDirs};

use super::{Mode, modes_for};

pub use var_lib::{DEFAULT_VAR_LIB_ROOT, FetchError, VarLibError, VarLibFetcher};

use var_lib::VarLibLoader;

/// Basename given to models generated from inline configs.
const INLINE_BASENAME: &str = "autorun";

/// Errors that can occur while generating a model.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The config file could not be read.
    #[error("failed to read config {}", .path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file is not valid JSON.
    #[error("failed to parse config {}", .path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The config is valid JSON but not an object.
    #[error("config {name} is not a JSON object")]
    ConfigNotObject { name: String },

    /// The config's `"model"` entry is not a string.
    #[error("`model` in config {name} must be a string")]
    ModelNotString { name: String },

    /// The requested mode is not available for the model type.
    #[error("model `{model}` does not support mode `{mode}`")]
    UnsupportedMode { model: String, mode: Mode },

    /// The variable library could not be loaded.
    #[error(transparent)]
    VarLib(#[from] VarLibError),

    /// A run directory could not be created.
    #[error(transparent)]
    Dir(#[from] DirError),

    /// The template is missing or failed to render.
    #[error("failed to render template `{template}`")]
    Render {
        template: String,
        #[source]
        source: TemplateError,
    },

    /// A generated source file could not be written.
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where a model config comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelConfig {
    /// A JSON file on disk. The file stem becomes the model's basename.
    File(PathBuf),
    /// An in-memory JSON object, generated under the basename `autorun`.
    Inline(Map<String, Value>),
}

impl From<PathBuf> for ModelConfig {
    fn from(path: PathBuf) -> Self {
        ModelConfig::File(path)
    }
}

impl From<&Path> for ModelConfig {
    fn from(path: &Path) -> Self {
        ModelConfig::File(path.to_path_buf())
    }
}

impl From<Map<String, Value>> for ModelConfig {
    fn from(map: Map<String, Value>) -> Self {
        ModelConfig::Inline(map)
    }
}

/// A config after loading: display name, basename, and contents.
struct LoadedConfig {
    name: String,
    basename: String,
    values: Map<String, Value>,
}

impl ModelConfig {
    fn load(self) -> Result<LoadedConfig, GenerateError> {
        match self {
            ModelConfig::Inline(values) => Ok(LoadedConfig {
                name: INLINE_BASENAME.to_owned(),
                basename: INLINE_BASENAME.to_owned(),
                values,
            }),
            ModelConfig::File(path) => {
                let text = fs::read_to_string(&path).map_err(|source| {
                    GenerateError::ReadConfig {
                        path: path.clone(),
                        source,
                    }
                })?;
                let name = path.display().to_string();
                let values = match serde_json::from_str(&text) {
                    Ok(Value::Object(values)) => values,
                    Ok(_) => return Err(GenerateError::ConfigNotObject { name }),
                    Err(source) => return Err(GenerateError::ParseConfig { path, source }),
                };
                let basename = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(LoadedConfig {
                    name,
                    basename,
                    values,
                })
            }
        }
    }
}

/// The rendered sources of one model, keyed by mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModel {
    basename: String,
    sources: BTreeMap<Mode, String>,
}

impl GeneratedModel {
    /// Returns the model's basename (the config file stem, or `autorun`).
    #[must_use]
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Returns the rendered source for `mode`, if it was generated.
    #[must_use]
    pub fn source(&self, mode: Mode) -> Option<&str> {
        self.sources.get(&mode).map(String::as_str)
    }

    /// Iterates over the generated modes and their sources.
    pub fn sources(&self) -> impl Iterator<Item = (Mode, &str)> {
        self.sources.iter().map(|(mode, src)| (*mode, src.as_str()))
    }

    /// Returns the entry point name for `mode`, `<basename>_<mode>`.
    #[must_use]
    pub fn entry_point(&self, mode: Mode) -> String {
        format!("{}_{mode}", self.basename)
    }
}

/// Renders model templates.
///
/// Templates are looked up by name (`<model>.py.template`) in a template
/// directory and rendered with Jinja semantics: `trim_blocks` is enabled and a
/// `droptable` filter removes the `"table"` key from a mapping.
pub struct Generator {
    env: Environment<'static>,
    dirs: RunDirs,
    var_lib_root: String,
    fetcher: Option<Box<dyn VarLibFetcher>>,
}

impl Generator {
    /// Creates a generator with no templates and the given run directories.
    #[must_use]
    pub fn new(dirs: RunDirs) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_filter("droptable", droptable);
        Self {
            env,
            dirs,
            var_lib_root: DEFAULT_VAR_LIB_ROOT.to_owned(),
            fetcher: None,
        }
    }

    /// Creates a generator that loads templates from `template_dir`.
    #[must_use]
    pub fn with_template_dir(dirs: RunDirs, template_dir: impl AsRef<Path>) -> Self {
        let mut generator = Self::new(dirs);
        generator
            .env
            .set_loader(minijinja::path_loader(template_dir.as_ref().to_path_buf()));
        generator
    }

    /// Registers a template from a string, shadowing any file of the same name.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerateError::Render`] if the template does not parse.
    pub fn add_template(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), GenerateError> {
        let name = name.into();
        self.env
            .add_template_owned(name.clone(), source.into())
            .map_err(|source| GenerateError::Render {
                template: name,
                source,
            })
    }

    /// Sets the root URL that remote variable libraries are resolved against.
    #[must_use]
    pub fn with_var_lib_root(mut self, root: impl Into<String>) -> Self {
        self.var_lib_root = root.into();
        self
    }

    /// Installs the fetcher used for remote variable libraries.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: impl VarLibFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Returns the run directories this generator reads and writes.
    #[must_use]
    pub fn dirs(&self) -> &RunDirs {
        &self.dirs
    }

    /// Generates a model's source for `mode`, or for every supported mode.
    ///
    /// Returns `Ok(None)` if the config has no `"model"` key.
    ///
    /// Before rendering, any `"var_lib_file"` is merged into `"var_lib"`, and
    /// the config gains `"modelname"` (the basename) and `"template_mode"`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerateError`] if the config cannot be loaded, the mode is
    /// not supported by the model type, the variable library cannot be loaded,
    /// or the template is missing or fails to render.
    pub fn generate(
        &self,
        config: impl Into<ModelConfig>,
        mode: Option<Mode>,
    ) -> Result<Option<GeneratedModel>, GenerateError> {
        let LoadedConfig {
            name,
            basename,
            values: mut config,
        } = config.into().load()?;

        let Some(model) = config.get("model") else {
            tracing::info!("Not generating {name}");
            return Ok(None);
        };
        let model = model
            .as_str()
            .ok_or_else(|| GenerateError::ModelNotString { name: name.clone() })?
            .to_owned();

        let modes = match mode {
            Some(mode) => vec![mode],
            None => modes_for(&model).to_vec(),
        };
        if let Some(&mode) = modes.iter().find(|m| !m.is_supported_by(&model)) {
            return Err(GenerateError::UnsupportedMode { model, mode });
        }

        VarLibLoader {
            dirs: &self.dirs,
            remote_root: &self.var_lib_root,
            fetcher: self.fetcher.as_deref(),
        }
        .apply(&mut config)?;

        config.insert("modelname".to_owned(), Value::from(basename.as_str()));

        let template_name = format!("{model}.py.template");
        let render_error = |source| GenerateError::Render {
            template: template_name.clone(),
            source,
        };
        let template = self.env.get_template(&template_name).map_err(render_error)?;

        let mut sources = BTreeMap::new();
        for mode in modes {
            tracing::info!("Running {basename} with mode {mode}");
            config.insert("template_mode".to_owned(), Value::from(mode.as_str()));
            let source = template.render(&config).map_err(render_error)?;
            sources.insert(mode, source);
        }

        Ok(Some(GeneratedModel { basename, sources }))
    }

    /// Writes each generated source to `<models>/<basename>_<mode>.py`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerateError`] if the models directory or a file cannot be written.
    pub fn write(&self, model: &GeneratedModel) -> Result<Vec<PathBuf>, GenerateError> {
        let dir = self.dirs.models_dir()?;
        model
            .sources()
            .map(|(mode, source)| {
                let path = dir.join(format!("{}.py", model.entry_point(mode)));
                fs::write(&path, source).map_err(|source| GenerateError::Write {
                    path: path.clone(),
                    source,
                })?;
                Ok(path)
            })
            .collect()
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("dirs", &self.dirs)
            .field("var_lib_root", &self.var_lib_root)
            .field("fetcher", &self.fetcher.is_some())
            .finish_non_exhaustive()
    }
}

/// Template filter returning a copy of a mapping without its `"table"` key.
fn droptable(value: TemplateValue) -> Result<TemplateValue, TemplateError> {
    if value.kind() != ValueKind::Map {
        return Err(TemplateError::new(
            ErrorKind::InvalidOperation,
            "droptable expects a mapping",
        ));
    }

    let mut entries = BTreeMap::new();
    for key in value.try_iter()? {
        if key.as_str() == Some("table") {
            continue;
        }
        let item = value.get_item(&key)?;
        entries.insert(key.to_string(), item);
    }
    Ok(TemplateValue::from_serialize(&entries))
}
