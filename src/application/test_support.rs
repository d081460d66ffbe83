//! Shared fixture for use case tests: a two-function project deployed to the
//! directory-backed cloud, with a manual clock.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use crate::config::DeploySettings;
use crate::domain::entities::ProjectDescriptor;
use crate::domain::ports::{DeployEvent, DeployEventSink, ManualClock};
use crate::domain::value_objects::{PollPolicy, RetryPolicy};
use crate::infrastructure::cloud::local::LocalCloud;
use crate::infrastructure::{
    DirectoryFunctionHasher, JsonProjectRepository, LocalHookInvoker, LocalObjectStore,
    TomlRecordRepository,
};

use super::backend::CloudBackend;
use super::deploy::DeployUseCase;
use super::destroy::DestroyUseCase;
use super::plan::PlanUseCase;

pub const STACK: &str = "shop-dev";
pub const BUCKET: &str = "shop-dev-deploymentbucket";

pub const CREATE_TEMPLATE: &str = r#"{
  "Resources": {
    "DeploymentBucket": {
      "Type": "AWS::S3::Bucket",
      "Properties": {"VersioningConfiguration": {"Status": "Enabled"}}
    }
  },
  "Outputs": {
    "DeploymentBucketName": {
      "Value": {"Ref": "DeploymentBucket"},
      "Export": {"Name": "shop-dev-DeploymentBucketName"}
    }
  }
}"#;

pub const UPDATE_TEMPLATE: &str = r#"{
  "Resources": {
    "DeploymentBucket": {
      "Type": "AWS::S3::Bucket",
      "Properties": {"VersioningConfiguration": {"Status": "Enabled"}}
    },
    "Orders": {
      "Type": "AWS::Lambda::Function",
      "Properties": {"Code": {"S3Bucket": {"Ref": "DeploymentBucket"}, "S3Key": "${ORDERS_VERSION}"}}
    },
    "Billing": {
      "Type": "AWS::Lambda::Function",
      "Properties": {"Code": {"S3Bucket": {"Ref": "DeploymentBucket"}, "S3Key": "${BILLING_VERSION}"}}
    }
  },
  "Outputs": {
    "DeploymentBucketName": {
      "Value": {"Ref": "DeploymentBucket"},
      "Export": {"Name": "shop-dev-DeploymentBucketName"}
    },
    "ApiUrl": {
      "Value": "https://api.shop.example/dev",
      "Export": {"Name": "shop-dev-ApiUrl"}
    }
  }
}"#;

const DESCRIPTOR: &str = r#"{
  "project_name": "shop",
  "compilation_timestamp": "20240101T0000",
  "functions": [
    {
      "entry_point": "com.shop.Orders",
      "artifact": "orders.jar",
      "stages": ["dev", "prod"],
      "version_token": "${ORDERS_VERSION}"
    },
    {
      "entry_point": "com.shop.Billing",
      "artifact": "billing.jar",
      "stages": ["dev"],
      "version_token": "${BILLING_VERSION}"
    }
  ],
  "exports": {
    "dev": [
      {"export_name": "shop-dev-ApiUrl", "substitution_token": "${API_URL}", "message": "REST API: "}
    ]
  }
}"#;

pub type LocalDeploy =
    DeployUseCase<JsonProjectRepository, TomlRecordRepository, DirectoryFunctionHasher>;

pub struct Fixture {
    pub dir: TempDir,
    pub clock: Arc<ManualClock>,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self {
            dir: TempDir::new().unwrap(),
            clock: Arc::new(ManualClock::new()),
        };
        fixture.write_build("orders.jar", "orders-v1");
        fixture.write_build("billing.jar", "billing-v1");
        fixture.write_build("com/shop/Orders.class", "orders-class-v1");
        fixture.write_build("com/shop/Billing.class", "billing-class-v1");
        fixture.write_descriptor_dir("project.json", DESCRIPTOR);
        fixture.write_descriptor_dir("stack-create-dev.json", CREATE_TEMPLATE);
        fixture.write_descriptor_dir("stack-update-dev.json", UPDATE_TEMPLATE);
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn cloud_root(&self) -> PathBuf {
        self.root().join("cloud")
    }

    pub fn settings(&self) -> DeploySettings {
        DeploySettings::for_project(self.root())
            .unwrap()
            .with_poll(PollPolicy {
                interval: Duration::from_secs(1),
                timeout: Duration::from_secs(30),
            })
            .with_exports(RetryPolicy::new(3, Duration::from_secs(1)))
    }

    pub fn backend(&self) -> CloudBackend {
        let cloud = LocalCloud::open(&self.cloud_root());
        CloudBackend::new(
            Arc::new(cloud.stacks),
            Arc::new(cloud.objects),
            Arc::new(cloud.hooks),
        )
    }

    pub fn objects(&self) -> LocalObjectStore {
        LocalObjectStore::new(self.cloud_root())
    }

    pub fn hooks(&self) -> LocalHookInvoker {
        LocalHookInvoker::new(self.cloud_root())
    }

    pub fn records(&self) -> TomlRecordRepository {
        TomlRecordRepository::new(self.settings().state_dir)
    }

    pub fn deploy(&self) -> LocalDeploy {
        let settings = self.settings();
        DeployUseCase::new(
            JsonProjectRepository::new(settings.descriptor_dir.clone()),
            TomlRecordRepository::new(settings.state_dir.clone()),
            DirectoryFunctionHasher::new(settings.build_dir.clone()),
            self.backend(),
            settings,
        )
        .with_clock(self.clock.clone())
    }

    pub fn destroy(&self) -> DestroyUseCase<JsonProjectRepository, TomlRecordRepository> {
        let settings = self.settings();
        DestroyUseCase::new(
            JsonProjectRepository::new(settings.descriptor_dir.clone()),
            TomlRecordRepository::new(settings.state_dir.clone()),
            self.backend(),
            settings,
        )
        .with_clock(self.clock.clone())
    }

    pub fn plan(
        &self,
    ) -> PlanUseCase<JsonProjectRepository, TomlRecordRepository, DirectoryFunctionHasher> {
        let settings = self.settings();
        PlanUseCase::new(
            JsonProjectRepository::new(settings.descriptor_dir.clone()),
            TomlRecordRepository::new(settings.state_dir.clone()),
            DirectoryFunctionHasher::new(settings.build_dir.clone()),
            self.backend(),
            settings,
        )
        .with_clock(self.clock.clone())
    }

    /// Write a file below the build directory
    pub fn write_build(&self, rel: &str, contents: &str) {
        let path = self.root().join("build").join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn write_descriptor_dir(&self, name: &str, contents: &str) {
        let dir = self.root().join("build").join("liftoff");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), contents).unwrap();
    }

    pub fn descriptor(&self) -> ProjectDescriptor {
        let path = self.root().join("build/liftoff/project.json");
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    pub fn write_descriptor(&self, descriptor: &ProjectDescriptor) {
        self.write_descriptor_dir(
            "project.json",
            &serde_json::to_string_pretty(descriptor).unwrap(),
        );
    }

    /// Simulate a new build with the given timestamp
    pub fn recompile(&self, timestamp: &str) {
        let mut descriptor = self.descriptor();
        descriptor.compilation_timestamp = timestamp.to_string();
        self.write_descriptor(&descriptor);
    }
}

/// Event sink that keeps everything it receives
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DeployEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<DeployEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl DeployEventSink for RecordingSink {
    fn on_event(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }
}
