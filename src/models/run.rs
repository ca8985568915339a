//! Dispatching model runs to registered entry points.

use std::{collections::BTreeMap, marker::PhantomData};

use thiserror::Error;
use twine_core::Model;

use super::{GenerateError, Generator, Mode, ModelConfig};

/// The simulation year passed to entry points by [`ModelRegistry::run_model`].
pub const BASE_YEAR: i32 = 2010;

/// The input to a model entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRun<D> {
    pub dataset: D,
    pub year: i32,
}

impl<D> ModelRun<D> {
    pub fn new(dataset: D, year: i32) -> Self {
        Self { dataset, year }
    }
}

/// Errors returned by [`ModelRegistry::run_model`].
#[derive(Debug, Error)]
pub enum RunError<E> {
    /// The model could not be generated.
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// The config has no `"model"` key, so there is nothing to run.
    #[error("config does not describe a model")]
    NotAModel,

    /// No entry point is registered under the generated name.
    #[error("no entry point registered for `{0}`")]
    UnknownEntryPoint(String),

    /// The entry point failed.
    #[error("model `{entry_point}` failed")]
    Model {
        entry_point: String,
        #[source]
        source: E,
    },
}

/// Adapts a closure into a [`Model`] over [`ModelRun`] inputs.
pub struct FnModel<F, D, O, E> {
    f: F,
    _signature: PhantomData<fn(&ModelRun<D>) -> Result<O, E>>,
}

impl<F, D, O, E> FnModel<F, D, O, E>
where
    F: Fn(&ModelRun<D>) -> Result<O, E>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _signature: PhantomData,
        }
    }
}

impl<F, D, O, E> Model for FnModel<F, D, O, E>
where
    F: Fn(&ModelRun<D>) -> Result<O, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Input = ModelRun<D>;
    type Output = O;
    type Error = E;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        (self.f)(input)
    }
}

type BoxedModel<D, O, E> = Box<dyn Model<Input = ModelRun<D>, Output = O, Error = E>>;

/// Model entry points keyed by name (`<basename>_<mode>`).
///
/// All entry points in a registry share a dataset type `D`, an output type
/// `O`, and an error type `E`.
pub struct ModelRegistry<D, O, E> {
    entries: BTreeMap<String, BoxedModel<D, O, E>>,
}

impl<D, O, E> Default for ModelRegistry<D, O, E> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<D, O, E> ModelRegistry<D, O, E>
where
    D: 'static,
    O: 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `model` under `name`, replacing any previous entry.
    pub fn register<M>(&mut self, name: impl Into<String>, model: M) -> &mut Self
    where
        M: Model<Input = ModelRun<D>, Output = O, Error = E> + 'static,
    {
        self.entries.insert(name.into(), Box::new(model));
        self
    }

    /// Registers a closure under `name`, replacing any previous entry.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&ModelRun<D>) -> Result<O, E> + 'static,
    {
        self.register(name, FnModel::new(f))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over registered entry point names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Calls the entry point `name` directly.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::UnknownEntryPoint`] if nothing is registered under
    /// `name`, or [`RunError::Model`] if the entry point fails.
    pub fn call(&self, name: &str, input: &ModelRun<D>) -> Result<O, RunError<E>> {
        let model = self
            .entries
            .get(name)
            .ok_or_else(|| RunError::UnknownEntryPoint(name.to_owned()))?;
        model.call(input).map_err(|source| RunError::Model {
            entry_point: name.to_owned(),
            source,
        })
    }

    /// Generates `config` for `mode` and runs its entry point on `dataset`.
    ///
    /// The entry point `<basename>_<mode>` receives the dataset and
    /// [`BASE_YEAR`].
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] if generation fails, the config has no model,
    /// no entry point is registered, or the entry point itself fails.
    pub fn run_model(
        &self,
        generator: &Generator,
        config: impl Into<ModelConfig>,
        dataset: D,
        mode: Mode,
    ) -> Result<O, RunError<E>> {
        let model = generator
            .generate(config, Some(mode))?
            .ok_or(RunError::NotAModel)?;
        let entry_point = model.entry_point(mode);

        tracing::info!("{} {mode}", model.basename());
        self.call(&entry_point, &ModelRun::new(dataset, BASE_YEAR))
    }
}

impl<D, O, E> std::fmt::Debug for ModelRegistry<D, O, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Map, Value, json};
    use tempfile::tempdir;

    use crate::support::dirs::RunDirs;

    #[derive(Debug, Error, PartialEq)]
    #[error("empty dataset")]
    struct EmptyDataset;

    struct Households {
        incomes: Vec<f64>,
    }

    struct MeanIncome;

    impl Model for MeanIncome {
        type Input = ModelRun<&'static Households>;
        type Output = f64;
        type Error = EmptyDataset;

        fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
            let incomes = &input.dataset.incomes;
            if incomes.is_empty() {
                return Err(EmptyDataset);
            }
            Ok(incomes.iter().sum::<f64>() / incomes.len() as f64)
        }
    }

    fn config(model: &str) -> Map<String, Value> {
        match json!({ "model": model }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn generator(root: &std::path::Path) -> Generator {
        let mut generator = Generator::new(RunDirs::new(root));
        generator
            .add_template("hlcm.py.template", "def {{ modelname }}_{{ template_mode }}(): pass\n")
            .unwrap();
        generator
            .add_template("transitionmodel.py.template", "{{ modelname }}\n")
            .unwrap();
        generator
    }

    static HOUSEHOLDS: Households = Households {
        incomes: Vec::new(),
    };

    #[test]
    fn dispatches_to_generated_entry_point() {
        let tmp = tempdir().unwrap();
        let generator = generator(tmp.path());

        let mut registry = ModelRegistry::new();
        registry
            .register_fn("autorun_estimate", |run: &ModelRun<Vec<f64>>| {
                Ok::<_, EmptyDataset>(run.dataset.len() as f64 + f64::from(run.year))
            })
            .register_fn("autorun_simulate", |_: &ModelRun<Vec<f64>>| Ok(-1.0));

        let out = registry
            .run_model(&generator, config("hlcm"), vec![1.0, 2.0], Mode::Estimate)
            .unwrap();
        assert_eq!(out, 2012.0);

        let out = registry
            .run_model(&generator, config("hlcm"), vec![], Mode::Simulate)
            .unwrap();
        assert_eq!(out, -1.0);
    }

    #[test]
    fn model_trait_implementations_register_directly() {
        let tmp = tempdir().unwrap();
        let generator = generator(tmp.path());

        let mut registry = ModelRegistry::new();
        registry.register("autorun_estimate", MeanIncome);
        assert!(registry.contains("autorun_estimate"));

        let err = registry
            .run_model(&generator, config("hlcm"), &HOUSEHOLDS, Mode::Estimate)
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Model { ref entry_point, source: EmptyDataset } if entry_point == "autorun_estimate"
        ));
    }

    #[test]
    fn missing_entry_point() {
        let tmp = tempdir().unwrap();
        let generator = generator(tmp.path());
        let registry: ModelRegistry<(), (), EmptyDataset> = ModelRegistry::new();

        let err = registry
            .run_model(&generator, config("transitionmodel"), (), Mode::Run)
            .unwrap_err();
        assert!(matches!(err, RunError::UnknownEntryPoint(ref name) if name == "autorun_run"));
    }

    #[test]
    fn generation_errors_are_surfaced() {
        let tmp = tempdir().unwrap();
        let generator = generator(tmp.path());
        let mut registry = ModelRegistry::new();
        registry.register_fn("autorun_run", |_: &ModelRun<()>| Ok::<_, EmptyDataset>(()));

        let err = registry
            .run_model(&generator, config("hlcm"), (), Mode::Run)
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Generate(GenerateError::UnsupportedMode { .. })
        ));

        let no_model = Map::new();
        let err = registry
            .run_model(&generator, no_model, (), Mode::Run)
            .unwrap_err();
        assert!(matches!(err, RunError::NotAModel));
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = ModelRegistry::new();
        registry
            .register_fn("b_run", |_: &ModelRun<()>| Ok::<_, EmptyDataset>(()))
            .register_fn("a_run", |_: &ModelRun<()>| Ok(()));
        assert_eq!(registry.names().collect::<Vec<_>>(), ["a_run", "b_run"]);
    }
}
