use crate::classifier::{ClassifyError, Classifier};
use crate::context::GenContext;
use crate::emit::{emit_impl, EmitError};
use crate::output::{annotate, format_source, Generated};
use crate::plan::{EncodingPlan, PlanError};
use crate::selector::{select, SelectError};
use ssz_loader::{LoadError, PackageLoader, DEFAULT_CFG_FLAG};
use std::path::PathBuf;
use thiserror::Error;

/* Crate path emitted code imports the runtime from */
pub const DEFAULT_RUNTIME_CRATE: &str = "ssz_runtime";

#[derive(Debug, Error)]
pub enum GenError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// One generator run over one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /* Input package directory */
    pub dir: PathBuf,
    /* Restrict generation to this type */
    pub type_name: Option<String>,
    pub runtime_crate: String,
    /* cfg flag set while loading and negated in the output guard */
    pub cfg_flag: String,
}

impl Config {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            type_name: None,
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
            cfg_flag: DEFAULT_CFG_FLAG.to_string(),
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_runtime_crate(mut self, runtime_crate: impl Into<String>) -> Self {
        self.runtime_crate = runtime_crate.into();
        self
    }

    pub fn with_cfg_flag(mut self, cfg_flag: impl Into<String>) -> Self {
        self.cfg_flag = cfg_flag.into();
        self
    }

    /* Full pipeline: the formatted, annotated source of the output module */
    pub fn process(&self) -> Result<String, GenError> {
        let generated = self.generate()?;
        Ok(annotate(&format_source(&generated.assemble()), &self.cfg_flag))
    }

    /* Encoding plans of the selected types, in selection order */
    pub fn plans(&self) -> Result<Vec<EncodingPlan>, GenError> {
        Ok(self.load_plans()?.1)
    }

    fn load_plans(&self) -> Result<(String, Vec<EncodingPlan>), GenError> {
        let package = PackageLoader::new(&self.dir)
            .with_cfg(self.cfg_flag.clone())
            .load()?;
        let selected = select(&package, self.type_name.as_deref())?;
        if selected.is_empty() {
            tracing::warn!(package = %package.name, "no exported struct types to generate");
        }

        let classes = Classifier::new(&package).classify(&selected)?;
        let mut plans = Vec::with_capacity(selected.len());
        for desc in selected {
            plans.push(EncodingPlan::build(desc, &classes)?);
        }
        Ok((package.name, plans))
    }

    /* Rendered but unformatted parts */
    pub fn generate(&self) -> Result<Generated, GenError> {
        let (package_name, plans) = self.load_plans()?;
        let mut ctx = GenContext::new(package_name, self.runtime_crate.clone());

        let mut chunks = Vec::with_capacity(plans.len());
        for plan in &plans {
            tracing::debug!(type_name = %plan.type_name, "emitting");
            chunks.push(emit_impl(plan, &mut ctx)?);
        }
        tracing::info!(
            package = %ctx.package(),
            types = chunks.len(),
            "generated encoders"
        );

        Ok(Generated {
            header: ctx.header(),
            imports: ctx.render_imports(),
            chunks,
        })
    }
}
