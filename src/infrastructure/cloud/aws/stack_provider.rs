//! CloudFormation stack provider

use std::sync::Arc;

use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::Capability;
use aws_sdk_cloudformation::Client;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::domain::ports::{
    CreateOutcome, ExportPage, ProviderError, ProviderResult, StackExport, StackProvider,
    UpdateOutcome,
};
use crate::domain::value_objects::StackStatus;

const NO_UPDATES: &str = "No updates are to be performed";

pub struct AwsStackProvider {
    runtime: Arc<Runtime>,
    client: Client,
}

impl AwsStackProvider {
    pub fn new(runtime: Arc<Runtime>, client: Client) -> Self {
        Self { runtime, client }
    }
}

/// Service errors are rejections; transport failures mean unavailable
fn classify<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match err {
        SdkError::ServiceError(_) => ProviderError::Rejected(message),
        _ => ProviderError::Unavailable(message),
    }
}

impl StackProvider for AwsStackProvider {
    fn create_stack(&self, name: &str, template_body: &str) -> ProviderResult<CreateOutcome> {
        let result = self.runtime.block_on(
            self.client
                .create_stack()
                .stack_name(name)
                .template_body(template_body)
                .capabilities(Capability::CapabilityIam)
                .capabilities(Capability::CapabilityNamedIam)
                .send(),
        );
        match result {
            Ok(_) => Ok(CreateOutcome::Created),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_already_exists_exception()) =>
            {
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(err) => Err(classify(err)),
        }
    }

    fn update_stack(&self, name: &str, template_url: &str) -> ProviderResult<UpdateOutcome> {
        let result = self.runtime.block_on(
            self.client
                .update_stack()
                .stack_name(name)
                .template_url(template_url)
                .capabilities(Capability::CapabilityIam)
                .capabilities(Capability::CapabilityNamedIam)
                .send(),
        );
        match result {
            Ok(_) => Ok(UpdateOutcome::Updating),
            Err(err)
                if err
                    .as_service_error()
                    .and_then(|e| e.message())
                    .is_some_and(|m| m.contains(NO_UPDATES)) =>
            {
                Ok(UpdateOutcome::NoChanges)
            }
            Err(err) => Err(classify(err)),
        }
    }

    fn delete_stack(&self, name: &str) -> ProviderResult<()> {
        self.runtime
            .block_on(self.client.delete_stack().stack_name(name).send())
            .map(|_| ())
            .map_err(classify)
    }

    fn stack_status(&self, name: &str) -> ProviderResult<StackStatus> {
        let result = self
            .runtime
            .block_on(self.client.describe_stacks().stack_name(name).send());
        match result {
            Ok(output) => {
                let status = output
                    .stacks()
                    .first()
                    .and_then(|stack| stack.stack_status())
                    .map(|status| StackStatus::parse(status.as_str()))
                    .unwrap_or(StackStatus::Absent);
                debug!(stack = name, %status, "described stack");
                Ok(status)
            }
            Err(err)
                if err
                    .as_service_error()
                    .and_then(|e| e.message())
                    .is_some_and(|m| m.contains("does not exist")) =>
            {
                Ok(StackStatus::Absent)
            }
            Err(err) => Err(classify(err)),
        }
    }

    fn list_exports(&self, next_token: Option<&str>) -> ProviderResult<ExportPage> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .list_exports()
                    .set_next_token(next_token.map(str::to_string))
                    .send(),
            )
            .map_err(classify)?;

        let exports = output
            .exports()
            .iter()
            .filter_map(|export| {
                Some(StackExport {
                    name: export.name()?.to_string(),
                    value: export.value()?.to_string(),
                })
            })
            .collect();
        Ok(ExportPage {
            exports,
            next_token: output.next_token().map(str::to_string),
        })
    }
}
