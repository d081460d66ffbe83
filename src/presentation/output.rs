//! Output Rendering
//!
//! Renders use case results as human-readable text or as one JSON line.

use crate::application::{DeployResult, DestroyResult, PlanResult};
use crate::domain::services::{FullRedeployReason, RedeployMode};

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

/// Icons for output rendering
struct Icons {
    check: &'static str,
    cross: &'static str,
    upload: &'static str,
    reuse: &'static str,
    warn: &'static str,
}

impl Icons {
    fn unicode() -> Self {
        Self {
            check: "✓",
            cross: "✗",
            upload: "↑",
            reuse: "○",
            warn: "⚠",
        }
    }

    fn ascii() -> Self {
        Self {
            check: "[OK]",
            cross: "[FAIL]",
            upload: "^",
            reuse: "[ ]",
            warn: "[!]",
        }
    }
}

/// Short human description of how the redeploy set was computed
pub fn describe_mode(mode: &RedeployMode) -> String {
    match mode {
        RedeployMode::Incremental => "incremental".to_string(),
        RedeployMode::Full(FullRedeployReason::FirstDeployment) => {
            "full (first deployment)".to_string()
        }
        RedeployMode::Full(FullRedeployReason::SharedArtifact) => {
            "full (shared artifact)".to_string()
        }
        RedeployMode::Full(FullRedeployReason::MarkerMismatch { local, remote }) => format!(
            "full (local record {} does not match remote marker {})",
            local,
            remote.as_deref().unwrap_or("<none>")
        ),
    }
}

/// Trait for rendering use case results
pub trait ResultRenderer {
    fn deploy(&self, result: &DeployResult) -> String;
    fn destroy(&self, result: &DestroyResult) -> String;
    fn plan(&self, result: &PlanResult) -> String;
}

/// Text renderer
pub struct TextRenderer {
    /// Whether to use unicode
    pub unicode: bool,
    /// Verbosity level
    pub verbose: u8,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            unicode: true,
            verbose: 0,
        }
    }
}

impl TextRenderer {
    fn icons(&self) -> Icons {
        if self.unicode {
            Icons::unicode()
        } else {
            Icons::ascii()
        }
    }
}

impl ResultRenderer for TextRenderer {
    fn deploy(&self, result: &DeployResult) -> String {
        let icons = self.icons();
        let mut out = String::new();

        let headline = if result.hook_failures.is_empty() {
            icons.check
        } else {
            icons.warn
        };
        out.push_str(&format!(
            "{} Deployed {} ({})\n\n",
            headline, result.stack, result.stage
        ));
        out.push_str(&format!("  Mode: {}\n", describe_mode(&result.mode)));
        out.push_str(&format!(
            "  Stack: {}\n",
            match (result.created, result.stack_updated) {
                (true, _) => "created",
                (false, true) => "updated",
                (false, false) => "unchanged",
            }
        ));

        if !result.uploaded.is_empty() {
            out.push_str(&format!("  Uploaded ({}):\n", result.uploaded.len()));
            for key in &result.uploaded {
                out.push_str(&format!("    {} {}\n", icons.upload, key));
            }
        }
        if !result.reused.is_empty() {
            if self.verbose > 0 {
                out.push_str(&format!("  Reused ({}):\n", result.reused.len()));
                for entry in &result.reused {
                    out.push_str(&format!("    {} {}\n", icons.reuse, entry));
                }
            } else {
                out.push_str(&format!("  Reused: {} function(s)\n", result.reused.len()));
            }
        }
        if !result.files.is_empty() {
            out.push_str(&format!("  Files: {} object(s)\n", result.files.len()));
        }

        if !result.outputs.is_empty() {
            out.push('\n');
            for output in &result.outputs {
                out.push_str(&format!("  {}{}\n", output.message, output.value));
            }
        }

        if !result.hook_failures.is_empty() || !result.warnings.is_empty() {
            out.push('\n');
            for failure in &result.hook_failures {
                out.push_str(&format!("  {} {}\n", icons.cross, failure));
            }
            for warning in &result.warnings {
                out.push_str(&format!("  {} {}\n", icons.warn, warning));
            }
        }
        out
    }

    fn destroy(&self, result: &DestroyResult) -> String {
        let icons = self.icons();
        let mut out = String::new();
        if result.stack_existed {
            out.push_str(&format!(
                "{} Destroyed {} ({})\n",
                icons.check, result.stack, result.stage
            ));
            if let Some(bucket) = &result.bucket {
                out.push_str(&format!(
                    "  Bucket {}: {} object version(s) removed\n",
                    bucket, result.removed_objects
                ));
            }
        } else {
            out.push_str(&format!(
                "{} Nothing to destroy: {} does not exist\n",
                icons.check, result.stack
            ));
        }
        for warning in &result.warnings {
            out.push_str(&format!("  {} {}\n", icons.warn, warning));
        }
        out
    }

    fn plan(&self, result: &PlanResult) -> String {
        let icons = self.icons();
        let mut out = String::new();
        out.push_str(&format!("Plan for {} ({})\n\n", result.stack, result.stage));
        out.push_str(&format!(
            "  Stack: {}\n",
            if result.stack_exists {
                "exists"
            } else {
                "would be created"
            }
        ));
        out.push_str(&format!("  Mode: {}\n", describe_mode(&result.mode)));
        if result.to_deploy.is_empty() {
            out.push_str("  Nothing to upload\n");
        }
        for entry in &result.to_deploy {
            out.push_str(&format!("    {} {}\n", icons.upload, entry));
        }
        for entry in &result.reused {
            out.push_str(&format!("    {} {}\n", icons.reuse, entry));
        }
        for warning in &result.warnings {
            out.push_str(&format!("  {} {}\n", icons.warn, warning));
        }
        out
    }
}

/// JSON renderer: one object per result, on one line
pub struct JsonRenderer;

impl ResultRenderer for JsonRenderer {
    fn deploy(&self, result: &DeployResult) -> String {
        serde_json::json!({
            "event": "result",
            "command": "deploy",
            "stack": result.stack,
            "stage": result.stage.as_str(),
            "created": result.created,
            "stack_updated": result.stack_updated,
            "mode": describe_mode(&result.mode),
            "incremental": result.mode.is_incremental(),
            "deployed": result.deployed,
            "reused": result.reused,
            "uploaded": result.uploaded,
            "template_url": result.template_url,
            "outputs": result.outputs.iter().map(|o| serde_json::json!({
                "name": o.name,
                "value": o.value,
            })).collect::<Vec<_>>(),
            "files": result.files.iter().map(|f| format!("{}/{}", f.bucket, f.key)).collect::<Vec<_>>(),
            "hooks_succeeded": result.hooks_succeeded,
            "hook_failures": result.hook_failures.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            "warnings": result.warnings,
        })
        .to_string()
    }

    fn destroy(&self, result: &DestroyResult) -> String {
        serde_json::json!({
            "event": "result",
            "command": "destroy",
            "stack": result.stack,
            "stage": result.stage.as_str(),
            "stack_existed": result.stack_existed,
            "bucket": result.bucket,
            "removed_objects": result.removed_objects,
            "warnings": result.warnings,
        })
        .to_string()
    }

    fn plan(&self, result: &PlanResult) -> String {
        serde_json::json!({
            "event": "result",
            "command": "plan",
            "stack": result.stack,
            "stage": result.stage.as_str(),
            "stack_exists": result.stack_exists,
            "marker": result.marker,
            "mode": describe_mode(&result.mode),
            "incremental": result.mode.is_incremental(),
            "to_deploy": result.to_deploy,
            "reused": result.reused,
            "uploads": result.uploads,
            "warnings": result.warnings,
        })
        .to_string()
    }
}

/// Create a renderer based on format
pub fn create_renderer(format: OutputFormat, unicode: bool, verbose: u8) -> Box<dyn ResultRenderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer { unicode, verbose }),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}
