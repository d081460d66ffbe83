//! Test environment for running the `liftoff` binary against a temp project.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

use super::fixtures;

/// Variables the binary reads that must not leak in from the host
const SCRUBBED_VARS: &[&str] = &[
    "RUST_LOG",
    "LIFTOFF_STAGE",
    "LIFTOFF_REGION",
    "LIFTOFF_BUILD_DIR",
    "LIFTOFF_DESCRIPTOR_DIR",
    "LIFTOFF_STATE_DIR",
    "LIFTOFF_UPLOAD_CONCURRENCY",
    "LIFTOFF_POLL_INTERVAL_SECS",
    "LIFTOFF_POLL_TIMEOUT_SECS",
    "LIFTOFF_EXPORT_ATTEMPTS",
    "LIFTOFF_EXPORT_INTERVAL_SECS",
    "LIFTOFF_PROVIDER",
    "LIFTOFF_LOCAL_ROOT",
    "LIFTOFF_ENDPOINT",
];

/// Result of running a Liftoff CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Non-empty stdout lines parsed as JSON
    pub fn json_lines(&self) -> Vec<Value> {
        self.stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .unwrap_or_else(|e| panic!("stdout line is not JSON ({}): {}", e, line))
            })
            .collect()
    }

    /// The final `"event": "result"` line of a `--json` run
    pub fn json_result(&self) -> Value {
        let lines = self.json_lines();
        let last = lines.last().cloned().expect("no JSON output");
        assert_eq!(last["event"], "result", "last line is not the result");
        last
    }
}

/// Isolated project directory with helpers to run the binary in it
pub struct TestEnv {
    pub project_root: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    /// Empty project directory
    pub fn empty() -> Self {
        Self {
            project_root: TempDir::new().expect("Failed to create temp dir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_liftoff")),
        }
    }

    /// Project as the build step leaves it, with fast polling configured
    pub fn with_project() -> Self {
        let env = Self::empty();
        env.write(fixtures::CONFIG_PATH, fixtures::FAST_CONFIG);
        env.write_build("orders.jar", "orders-v1");
        env.write_build("billing.jar", "billing-v1");
        env.write_build("com/shop/Orders.class", "orders-class-v1");
        env.write_build("com/shop/Billing.class", "billing-class-v1");
        env.write("build/liftoff/project.json", fixtures::DESCRIPTOR);
        env.write("build/liftoff/stack-create-dev.json", fixtures::CREATE_TEMPLATE);
        env.write("build/liftoff/stack-update-dev.json", fixtures::UPDATE_TEMPLATE);
        env
    }

    pub fn root(&self) -> &Path {
        self.project_root.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file relative to the project root
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
    }

    pub fn write_build(&self, relative: &str, content: &str) {
        self.write(&format!("build/{}", relative), content);
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    /// Change the descriptor's compilation timestamp, as a new build would
    pub fn recompile(&self, timestamp: &str) {
        let mut descriptor: Value =
            serde_json::from_str(&self.read("build/liftoff/project.json")).unwrap();
        descriptor["compilation_timestamp"] = Value::String(timestamp.to_string());
        self.write(
            "build/liftoff/project.json",
            &serde_json::to_string_pretty(&descriptor).unwrap(),
        );
    }

    /// Hook names the local cloud recorded, in invocation order
    pub fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(self.path(".liftoff/cloud/invocations.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Run liftoff from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.root()).args(args);
        for var in SCRUBBED_VARS {
            cmd.env_remove(var);
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute liftoff");
        to_result(output)
    }
}

fn to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
