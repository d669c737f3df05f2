//! Build orchestration
//!
//! [`Runner::contribute`] drives one build end to end:
//!
//! ```text
//! Init → ProbeRuntime → ComputeArgs → ExecuteBuild → LocateArtifact
//!      → ContributeLayer → ReplaceSource → Done
//! ```
//!
//! Any failing stage moves the runner to [`Stage::Failed`] and aborts the
//! remaining stages. Nothing is retried; the pipeline decides whether to run
//! the whole step again.

use crate::artifact::Artifact;
use crate::buildsystem::{BuildSystem, BuildSystemId};
use crate::config::BuildConfig;
use crate::error::{BuildError, ExecutionError};
use crate::exec::{Executor, ProcessExecutor};
use crate::layers::{ApplicationContributor, BuildCacheContributor, LayerFlags, Layers};
use crate::replace::SourceReplacer;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Position in the linear run state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Init,
    ProbeRuntime,
    ComputeArgs,
    ExecuteBuild,
    LocateArtifact,
    ContributeLayer,
    ReplaceSource,
    Done,
    Failed,
}

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub build_system: BuildSystemId,
    pub application_root: PathBuf,
    pub arguments: Vec<String>,
    pub artifact: Artifact,
    pub layer: PathBuf,
    pub flags: LayerFlags,
    /// The cached application layer matched the artifact and was kept
    pub reused: bool,
    /// Dependency cache layer, when a home directory was configured
    pub cache_layer: Option<PathBuf>,
    pub stage: Stage,
}

/// Drives one build system over one application root
pub struct Runner<E: Executor = ProcessExecutor> {
    build_system: BuildSystem,
    layers: Layers,
    config: BuildConfig,
    executor: E,
    stage: Stage,
    failed_stage: Option<Stage>,
}

impl Runner<ProcessExecutor> {
    pub fn new(build_system: BuildSystem, layers: Layers, config: BuildConfig) -> Self {
        Self::with_executor(build_system, layers, config, ProcessExecutor::new())
    }
}

impl<E: Executor> Runner<E> {
    pub fn with_executor(
        build_system: BuildSystem,
        layers: Layers,
        config: BuildConfig,
        executor: E,
    ) -> Self {
        Self {
            build_system,
            layers,
            config,
            executor,
            stage: Stage::Init,
            failed_stage: None,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn build_system(&self) -> &BuildSystem {
        &self.build_system
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Stage that was running when the last run failed
    pub fn failed_stage(&self) -> Option<Stage> {
        self.failed_stage
    }

    /// Arguments the build will run with: the override if set, else the defaults
    pub fn build_arguments(&self) -> Vec<String> {
        self.build_system
            .arguments(self.config.build_arguments.as_deref())
    }

    /// Runs the build and replaces the application source with its result
    pub fn contribute(&mut self) -> Result<BuildReport, BuildError> {
        info!(
            build_system = %self.build_system.id(),
            root = %self.build_system.root().display(),
            "Starting build"
        );
        self.stage = Stage::Init;
        self.failed_stage = None;

        match self.run() {
            Ok(report) => {
                self.stage = Stage::Done;
                info!(layer = %report.layer.display(), reused = report.reused, "Build complete");
                Ok(report)
            }
            Err(e) => {
                error!(stage = ?self.stage, error = %e, "Build failed");
                self.failed_stage = Some(self.stage);
                self.stage = Stage::Failed;
                Err(e)
            }
        }
    }

    fn run(&mut self) -> Result<BuildReport, BuildError> {
        self.config.validate()?;
        let module = self.config.built_module.clone();
        let module = module.as_deref();

        self.stage = Stage::ProbeRuntime;
        let probe = self
            .build_system
            .runtime_probe(self.config.java_home.as_deref());
        let version = self
            .executor
            .execute(probe)
            .map_err(|e| ExecutionError::Probe(Box::new(e)))?;
        info!(runtime = %version.trim(), "Runtime version");

        self.stage = Stage::ComputeArgs;
        let arguments = self.build_arguments();
        debug!(arguments = ?arguments, "Computed build arguments");

        let cache_layer = match &self.config.home {
            Some(home) => {
                let layer = BuildCacheContributor::new(&self.layers)
                    .contribute(home, self.build_system.cache_dir())?;
                Some(layer.root)
            }
            None => {
                warn!("No home directory configured, building without a cached dependency layer");
                None
            }
        };

        self.stage = Stage::ExecuteBuild;
        let wrapper = self.build_system.wrapper();
        if !wrapper.is_file() {
            return Err(ExecutionError::WrapperMissing(wrapper).into());
        }
        let command = self.build_system.build_command(arguments.clone());
        self.executor.execute(command)?;

        self.stage = Stage::LocateArtifact;
        let artifact = self.build_system.locate_artifact(module)?;

        self.stage = Stage::ContributeLayer;
        let flags = self
            .build_system
            .layer_policy()
            .flags_for(artifact.kind.is_exploded());
        let contribution = ApplicationContributor::new(&self.layers).contribute(&artifact, flags)?;

        self.stage = Stage::ReplaceSource;
        let policy = self.build_system.replacement_policy(module);
        SourceReplacer::new(self.build_system.root())
            .replace(contribution.root(), &policy)
            .map_err(|source| BuildError::Replacement {
                layer: contribution.layer.root.clone(),
                source,
            })?;

        Ok(BuildReport {
            build_system: self.build_system.id(),
            application_root: self.build_system.root().to_path_buf(),
            arguments,
            artifact,
            layer: contribution.layer.root,
            flags: contribution.flags,
            reused: contribution.reused,
            cache_layer,
            stage: Stage::Done,
        })
    }
}
