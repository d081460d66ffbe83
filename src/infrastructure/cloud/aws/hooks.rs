//! Lambda hook invoker

use std::sync::Arc;

use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::Client;
use tokio::runtime::Runtime;

use crate::domain::ports::{HookError, HookInvoker};

pub struct AwsHookInvoker {
    runtime: Arc<Runtime>,
    client: Client,
}

impl AwsHookInvoker {
    pub fn new(runtime: Arc<Runtime>, client: Client) -> Self {
        Self { runtime, client }
    }
}

impl HookInvoker for AwsHookInvoker {
    fn invoke(&self, function_name: &str) -> Result<(), HookError> {
        let output = self
            .runtime
            .block_on(self.client.invoke().function_name(function_name).send())
            .map_err(|err| HookError::Invoke {
                name: function_name.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        if let Some(kind) = output.function_error() {
            let payload = output
                .payload()
                .map(|blob| String::from_utf8_lossy(blob.as_ref()).into_owned())
                .unwrap_or_default();
            return Err(HookError::Failed {
                name: function_name.to_string(),
                message: format!("{}: {}", kind, payload),
            });
        }
        Ok(())
    }
}
