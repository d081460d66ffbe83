//! Stack provider emulated on the local filesystem
//!
//! Each stack is a JSON document under `{root}/stacks/`. Templates are
//! CloudFormation-shaped JSON; two parts of them are interpreted:
//! - `AWS::S3::Bucket` resources become buckets in the local object store
//!   (versioned when `VersioningConfiguration.Status` is `Enabled`)
//! - `Outputs.*.Export.Name` become exports, with `{"Ref": ...}` values
//!   resolved to bucket names
//!
//! A resource of type `Liftoff::Local::Failure` makes the operation roll back,
//! which lets tests drive the failure terminals.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{
    CreateOutcome, ExportPage, ObjectStore, ProviderError, ProviderResult, StackExport,
    StackProvider, UpdateOutcome,
};
use crate::domain::value_objects::StackStatus;
use crate::infrastructure::fs::atomic_write;

use super::object_store::LocalObjectStore;

const BUCKET_TYPE: &str = "AWS::S3::Bucket";
const FAILURE_TYPE: &str = "Liftoff::Local::Failure";
const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredStack {
    status: String,
    template: Value,
    /// Logical id → physical bucket name
    #[serde(default)]
    buckets: BTreeMap<String, String>,
}

pub struct LocalStackProvider {
    root: PathBuf,
    objects: LocalObjectStore,
    page_size: usize,
}

impl LocalStackProvider {
    pub fn new(root: impl Into<PathBuf>, objects: LocalObjectStore) -> Self {
        Self {
            root: root.into(),
            objects,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Export listing page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn stack_path(&self, name: &str) -> PathBuf {
        self.root.join("stacks").join(format!("{}.json", name))
    }

    fn load(&self, name: &str) -> ProviderResult<Option<StoredStack>> {
        let path = self.stack_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(unavailable)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ProviderError::Unavailable(format!("corrupt stack {}: {}", name, e)))
    }

    fn save(&self, name: &str, stack: &StoredStack) -> ProviderResult<()> {
        let content = serde_json::to_vec_pretty(stack).map_err(unavailable)?;
        atomic_write(&self.stack_path(name), &content).map_err(unavailable)
    }

    fn all_stacks(&self) -> ProviderResult<Vec<StoredStack>> {
        let dir = self.root.join("stacks");
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = std::fs::read_dir(&dir)
            .map_err(unavailable)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|n| n.strip_suffix(".json"))
                    .map(str::to_string)
            })
            .collect();
        names.sort();

        let mut stacks = Vec::new();
        for name in names {
            if let Some(stack) = self.load(&name)? {
                stacks.push(stack);
            }
        }
        Ok(stacks)
    }

    /// Create the buckets a template declares; returns logical → physical names
    fn provision(&self, stack: &str, template: &Value) -> ProviderResult<BTreeMap<String, String>> {
        let mut buckets = BTreeMap::new();
        for (logical, resource) in resources(template) {
            if resource_type(resource) != Some(BUCKET_TYPE) {
                continue;
            }
            let physical = resource
                .pointer("/Properties/BucketName")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}-{}", stack, logical).to_lowercase());
            self.objects.create_bucket(&physical).map_err(unavailable)?;
            let versioned = resource
                .pointer("/Properties/VersioningConfiguration/Status")
                .and_then(Value::as_str)
                == Some("Enabled");
            if versioned {
                self.objects
                    .enable_versioning(&physical)
                    .map_err(unavailable)?;
            }
            buckets.insert(logical.clone(), physical);
        }
        Ok(buckets)
    }
}

fn unavailable(err: impl std::fmt::Display) -> ProviderError {
    ProviderError::Unavailable(err.to_string())
}

fn parse_template(body: &[u8]) -> ProviderResult<Value> {
    let template: Value = serde_json::from_slice(body)
        .map_err(|e| ProviderError::Rejected(format!("template is not valid JSON: {}", e)))?;
    if !template.is_object() {
        return Err(ProviderError::Rejected(
            "template must be a JSON object".to_string(),
        ));
    }
    Ok(template)
}

fn resources(template: &Value) -> impl Iterator<Item = (&String, &Value)> {
    template
        .get("Resources")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|resources| resources.iter())
}

fn resource_type(resource: &Value) -> Option<&str> {
    resource.get("Type").and_then(Value::as_str)
}

fn requests_failure(template: &Value) -> bool {
    resources(template).any(|(_, resource)| resource_type(resource) == Some(FAILURE_TYPE))
}

fn exports_of(stack: &StoredStack) -> Vec<StackExport> {
    let Some(outputs) = stack.template.get("Outputs").and_then(Value::as_object) else {
        return Vec::new();
    };
    outputs
        .values()
        .filter_map(|output| {
            let name = output.pointer("/Export/Name")?.as_str()?.to_string();
            let value = match output.get("Value")? {
                Value::String(s) => s.clone(),
                Value::Object(map) => match map.get("Ref").and_then(Value::as_str) {
                    Some(logical) => stack
                        .buckets
                        .get(logical)
                        .cloned()
                        .unwrap_or_else(|| logical.to_string()),
                    None => Value::Object(map.clone()).to_string(),
                },
                other => other.to_string(),
            };
            Some(StackExport { name, value })
        })
        .collect()
}

impl StackProvider for LocalStackProvider {
    fn create_stack(&self, name: &str, template_body: &str) -> ProviderResult<CreateOutcome> {
        if self.load(name)?.is_some() {
            return Ok(CreateOutcome::AlreadyExists);
        }
        let template = parse_template(template_body.as_bytes())?;

        let stack = if requests_failure(&template) {
            StoredStack {
                status: StackStatus::RollbackComplete.as_str().to_string(),
                template: Value::Null,
                buckets: BTreeMap::new(),
            }
        } else {
            StoredStack {
                status: StackStatus::CreateComplete.as_str().to_string(),
                buckets: self.provision(name, &template)?,
                template,
            }
        };
        self.save(name, &stack)?;
        debug!(stack = name, status = %stack.status, "local stack created");
        Ok(CreateOutcome::Created)
    }

    fn update_stack(&self, name: &str, template_url: &str) -> ProviderResult<UpdateOutcome> {
        let mut stack = self
            .load(name)?
            .ok_or_else(|| ProviderError::Rejected(format!("stack {} does not exist", name)))?;
        let body = self
            .objects
            .read_url(template_url)
            .map_err(|e| ProviderError::Rejected(e.to_string()))?
            .ok_or_else(|| {
                ProviderError::Rejected(format!("template not found at {}", template_url))
            })?;
        let template = parse_template(&body)?;

        if template == stack.template {
            return Ok(UpdateOutcome::NoChanges);
        }

        if requests_failure(&template) {
            stack.status = StackStatus::UpdateRollbackComplete.as_str().to_string();
        } else {
            let provisioned = self.provision(name, &template)?;
            stack.buckets.extend(provisioned);
            stack.template = template;
            stack.status = StackStatus::UpdateComplete.as_str().to_string();
        }
        self.save(name, &stack)?;
        debug!(stack = name, status = %stack.status, "local stack updated");
        Ok(UpdateOutcome::Updating)
    }

    fn delete_stack(&self, name: &str) -> ProviderResult<()> {
        let Some(mut stack) = self.load(name)? else {
            return Ok(());
        };

        for bucket in stack.buckets.values() {
            if !self.objects.bucket_exists(bucket) {
                continue;
            }
            if !self.objects.is_empty(bucket).map_err(unavailable)? {
                stack.status = StackStatus::DeleteFailed.as_str().to_string();
                return self.save(name, &stack);
            }
        }
        for bucket in stack.buckets.values() {
            if self.objects.bucket_exists(bucket) {
                self.objects.delete_bucket(bucket).map_err(unavailable)?;
            }
        }
        std::fs::remove_file(self.stack_path(name)).map_err(unavailable)?;
        debug!(stack = name, "local stack deleted");
        Ok(())
    }

    fn stack_status(&self, name: &str) -> ProviderResult<StackStatus> {
        Ok(match self.load(name)? {
            Some(stack) => StackStatus::parse(&stack.status),
            None => StackStatus::Absent,
        })
    }

    fn list_exports(&self, next_token: Option<&str>) -> ProviderResult<ExportPage> {
        let exports: Vec<StackExport> = self.all_stacks()?.iter().flat_map(exports_of).collect();
        let start = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ProviderError::Rejected(format!("invalid next token {}", token)))?,
            None => 0,
        };
        let end = (start + self.page_size).min(exports.len());
        let page = exports.get(start..end).unwrap_or_default().to_vec();
        Ok(ExportPage {
            exports: page,
            next_token: (end < exports.len()).then(|| end.to_string()),
        })
    }
}
