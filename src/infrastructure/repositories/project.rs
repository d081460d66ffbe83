//! JSON Project Repository
//!
//! Reads what the build step left in the descriptor directory:
//! - `project.json` - the project descriptor
//! - `stack-create-{stage}.json` - template for the initial create
//! - `stack-update-{stage}.json` - template rendered for every update

use std::path::PathBuf;

use tracing::debug;

use crate::domain::entities::ProjectDescriptor;
use crate::domain::ports::ProjectRepository;
use crate::domain::value_objects::Stage;
use crate::error::{LiftoffError, LiftoffResult};

pub const DESCRIPTOR_FILE: &str = "project.json";

pub struct JsonProjectRepository {
    descriptor_dir: PathBuf,
}

impl JsonProjectRepository {
    pub fn new(descriptor_dir: impl Into<PathBuf>) -> Self {
        Self {
            descriptor_dir: descriptor_dir.into(),
        }
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.descriptor_dir.join(DESCRIPTOR_FILE)
    }

    fn template_path(&self, kind: &str, stage: &Stage) -> PathBuf {
        self.descriptor_dir
            .join(format!("stack-{}-{}.json", kind, stage))
    }
}

impl ProjectRepository for JsonProjectRepository {
    fn load(&self) -> LiftoffResult<ProjectDescriptor> {
        let path = self.descriptor_path();
        if !path.exists() {
            return Err(LiftoffError::DescriptorMissing { path });
        }

        let content = std::fs::read_to_string(&path)?;
        let project: ProjectDescriptor =
            serde_json::from_str(&content).map_err(|e| LiftoffError::DescriptorInvalid {
                path: path.clone(),
                message: e.to_string(),
            })?;
        project
            .validate()
            .map_err(|message| LiftoffError::DescriptorInvalid {
                path: path.clone(),
                message,
            })?;

        debug!(
            project = %project.project_name,
            functions = project.functions.len(),
            "loaded project descriptor"
        );
        Ok(project)
    }

    fn create_template(&self, stage: &Stage) -> LiftoffResult<String> {
        let path = self.template_path("create", stage);
        if !path.exists() {
            return Err(LiftoffError::TemplateMissing { path });
        }
        Ok(std::fs::read_to_string(&path)?)
    }

    fn update_template(&self, stage: &Stage) -> LiftoffResult<String> {
        let path = self.template_path("update", stage);
        if !path.exists() {
            return Err(LiftoffError::TemplateMissing { path });
        }
        Ok(std::fs::read_to_string(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DESCRIPTOR: &str = r#"{
        "project_name": "shop",
        "compilation_timestamp": "20240101T0000",
        "functions": [
            {
                "entry_point": "com.shop.Orders",
                "artifact": "orders.jar",
                "stages": ["dev", "prod"],
                "version_token": "${ORDERS_VERSION}"
            }
        ],
        "exports": {
            "dev": [
                {"export_name": "shop-dev-ApiUrl", "substitution_token": "${API_URL}", "message": "API: "}
            ]
        },
        "after_deploy": {"dev": ["shop-dev-warmup"]}
    }"#;

    #[test]
    fn loads_descriptor_with_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(DESCRIPTOR_FILE), DESCRIPTOR).unwrap();
        let repo = JsonProjectRepository::new(dir.path());

        let project = repo.load().unwrap();

        assert_eq!(project.project_name, "shop");
        assert!(project.assemble);
        assert_eq!(project.hooks_for(&Stage::default()), ["shop-dev-warmup"]);
        assert_eq!(project.exports_for(&Stage::default()).len(), 1);
        assert!(project.file_uploads_for(&Stage::default()).is_empty());
    }

    #[test]
    fn missing_descriptor_is_fatal() {
        let dir = tempdir().unwrap();
        let repo = JsonProjectRepository::new(dir.path());

        assert!(matches!(
            repo.load(),
            Err(LiftoffError::DescriptorMissing { .. })
        ));
    }

    #[test]
    fn duplicate_entry_points_are_rejected() {
        let dir = tempdir().unwrap();
        let descriptor = r#"{
            "project_name": "shop",
            "compilation_timestamp": "t1",
            "functions": [
                {"entry_point": "a.A", "artifact": "a.jar", "version_token": "${A}"},
                {"entry_point": "a.A", "artifact": "b.jar", "version_token": "${B}"}
            ]
        }"#;
        std::fs::write(dir.path().join(DESCRIPTOR_FILE), descriptor).unwrap();

        let err = JsonProjectRepository::new(dir.path()).load().unwrap_err();

        assert!(err.to_string().contains("duplicate entry point 'a.A'"));
    }

    #[test]
    fn malformed_json_is_fatal() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(DESCRIPTOR_FILE), "{ nope").unwrap();

        assert!(matches!(
            JsonProjectRepository::new(dir.path()).load(),
            Err(LiftoffError::DescriptorInvalid { .. })
        ));
    }

    #[test]
    fn templates_are_per_stage() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("stack-create-dev.json"), "{}").unwrap();
        let repo = JsonProjectRepository::new(dir.path());

        assert_eq!(repo.create_template(&Stage::default()).unwrap(), "{}");
        assert!(matches!(
            repo.update_template(&Stage::default()),
            Err(LiftoffError::TemplateMissing { .. })
        ));
    }
}
