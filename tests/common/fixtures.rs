//! Test fixtures - the build output of a small two-function project.

pub const CONFIG_PATH: &str = "liftoff.toml";

/// Keeps poll and export retry loops short
pub const FAST_CONFIG: &str = r#"[deploy]
stage = "dev"

[polling]
interval_secs = 1
timeout_secs = 10

[exports]
attempts = 2
interval_secs = 1
"#;

pub const DESCRIPTOR: &str = r#"{
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
  },
  "after_deploy": {
    "dev": ["shop-dev-warmup", "shop-dev-seed"]
  }
}"#;

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
