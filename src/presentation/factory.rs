//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::{CloudBackend, DeployUseCase, DestroyUseCase, PlanUseCase};
use crate::config::{Config, DeploySettings, ProviderKind, CONFIG_FILE};
use crate::error::{LiftoffError, LiftoffResult};
use crate::infrastructure::{
    DirectoryFunctionHasher, JsonProjectRepository, LocalCloud, TomlRecordRepository,
};

/// Type alias for the concrete DeployUseCase with all dependencies
pub type ConcreteDeployUseCase =
    DeployUseCase<JsonProjectRepository, TomlRecordRepository, DirectoryFunctionHasher>;

/// Type alias for the concrete DestroyUseCase
pub type ConcreteDestroyUseCase = DestroyUseCase<JsonProjectRepository, TomlRecordRepository>;

/// Type alias for the concrete PlanUseCase
pub type ConcretePlanUseCase =
    PlanUseCase<JsonProjectRepository, TomlRecordRepository, DirectoryFunctionHasher>;

/// Connect the cloud backend selected by `provider.kind`
pub fn connect_backend(config: &Config, project_root: &Path) -> LiftoffResult<CloudBackend> {
    match config.provider.kind {
        ProviderKind::Local => {
            let root = project_root.join(&config.provider.root);
            debug!(root = %root.display(), "using local cloud");
            let cloud = LocalCloud::open(&root);
            Ok(CloudBackend::new(
                Arc::new(cloud.stacks),
                Arc::new(cloud.objects),
                Arc::new(cloud.hooks),
            ))
        }
        ProviderKind::Aws => connect_aws(config, project_root),
    }
}

#[cfg(feature = "aws")]
fn connect_aws(config: &Config, _project_root: &Path) -> LiftoffResult<CloudBackend> {
    use crate::infrastructure::cloud::aws::{AwsCloud, AwsSettings};

    let cloud = AwsCloud::connect(&AwsSettings {
        region: config.deploy.region.clone(),
        endpoint: config.provider.endpoint.clone(),
    })?;
    Ok(CloudBackend::new(
        Arc::new(cloud.stacks),
        Arc::new(cloud.objects),
        Arc::new(cloud.hooks),
    ))
}

#[cfg(not(feature = "aws"))]
fn connect_aws(_config: &Config, project_root: &Path) -> LiftoffResult<CloudBackend> {
    Err(LiftoffError::Config {
        file: project_root.join(CONFIG_FILE),
        message: "provider 'aws' requires a build with the `aws` feature".to_string(),
    })
}

pub fn create_deploy_use_case(
    settings: &DeploySettings,
    backend: CloudBackend,
) -> ConcreteDeployUseCase {
    DeployUseCase::new(
        JsonProjectRepository::new(&settings.descriptor_dir),
        TomlRecordRepository::new(&settings.state_dir),
        DirectoryFunctionHasher::new(&settings.build_dir),
        backend,
        settings.clone(),
    )
}

pub fn create_destroy_use_case(
    settings: &DeploySettings,
    backend: CloudBackend,
) -> ConcreteDestroyUseCase {
    DestroyUseCase::new(
        JsonProjectRepository::new(&settings.descriptor_dir),
        TomlRecordRepository::new(&settings.state_dir),
        backend,
        settings.clone(),
    )
}

pub fn create_plan_use_case(settings: &DeploySettings, backend: CloudBackend) -> ConcretePlanUseCase {
    PlanUseCase::new(
        JsonProjectRepository::new(&settings.descriptor_dir),
        TomlRecordRepository::new(&settings.state_dir),
        DirectoryFunctionHasher::new(&settings.build_dir),
        backend,
        settings.clone(),
    )
}
