//! AWS backend (feature `aws`)
//!
//! CloudFormation, S3 and Lambda clients behind the synchronous ports. One
//! multi-threaded Tokio runtime is shared by all three; every port call is a
//! `block_on` of the SDK future, so it can be made from upload worker threads.

mod hooks;
mod object_store;
mod stack_provider;

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use tokio::runtime::Runtime;
use tracing::info;

pub use hooks::AwsHookInvoker;
pub use object_store::AwsObjectStore;
pub use stack_provider::AwsStackProvider;

/// Connection settings
#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    pub region: Option<String>,
    /// Custom endpoint (localstack and friends)
    pub endpoint: Option<String>,
}

/// The three AWS services sharing one runtime and SDK configuration
pub struct AwsCloud {
    pub stacks: AwsStackProvider,
    pub objects: AwsObjectStore,
    pub hooks: AwsHookInvoker,
}

impl AwsCloud {
    pub fn connect(settings: &AwsSettings) -> std::io::Result<Self> {
        let runtime = Arc::new(Runtime::new()?);

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let sdk_config = runtime.block_on(loader.load());
        info!(
            region = sdk_config.region().map(|r| r.as_ref()).unwrap_or("default"),
            "connected AWS backend"
        );

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.endpoint.is_some())
            .build();

        Ok(Self {
            stacks: AwsStackProvider::new(
                runtime.clone(),
                aws_sdk_cloudformation::Client::new(&sdk_config),
            ),
            objects: AwsObjectStore::new(
                runtime.clone(),
                aws_sdk_s3::Client::from_conf(s3_config),
                sdk_config.region().map(|r| r.as_ref().to_string()),
                settings.endpoint.clone(),
            ),
            hooks: AwsHookInvoker::new(runtime, aws_sdk_lambda::Client::new(&sdk_config)),
        })
    }
}
