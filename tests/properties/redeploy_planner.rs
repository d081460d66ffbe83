//! Property tests for the redeploy decision.

use std::collections::BTreeMap;

use proptest::prelude::*;

use liftoff::domain::entities::{FunctionDescriptor, ProjectDescriptor, StageDeploymentRecord};
use liftoff::domain::ports::{FunctionHasher, HashError};
use liftoff::domain::services::{RedeployMode, RedeployPlanner};
use liftoff::domain::value_objects::{ContentHash, Stage};

/// Hashes looked up by entry point; a missing entry fails to hash
struct FixedHasher(BTreeMap<String, String>);

impl FunctionHasher for FixedHasher {
    fn hash(&self, function: &FunctionDescriptor) -> Result<ContentHash, HashError> {
        self.0
            .get(&function.entry_point)
            .map(|content| ContentHash::from_bytes(content.as_bytes()))
            .ok_or_else(|| HashError::NotFound {
                entry_point: function.entry_point.clone(),
            })
    }
}

fn project(timestamp: &str, count: usize) -> ProjectDescriptor {
    let functions: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "entry_point": format!("com.app.F{}", i),
                "artifact": format!("f{}.jar", i),
                "stages": ["dev"],
                "version_token": format!("${{F{}_VERSION}}", i),
            })
        })
        .collect();
    serde_json::from_value(serde_json::json!({
        "project_name": "app",
        "compilation_timestamp": timestamp,
        "functions": functions,
    }))
    .unwrap()
}

fn hasher(contents: &[u8]) -> FixedHasher {
    FixedHasher(
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| (format!("com.app.F{}", i), format!("class-{}", c)))
            .collect(),
    )
}

/// Compiled contents of each function for two consecutive builds
fn two_builds() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (1usize..8).prop_flat_map(|n| {
        (
            proptest::collection::vec(0u8..3, n),
            proptest::collection::vec(0u8..3, n),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every active function is either deployed or reused, and
    /// gets exactly one token binding and one record entry.
    #[test]
    fn property_plan_partitions_active_functions((first, _) in two_builds()) {
        let stage = Stage::default();
        let project = project("t1", first.len());
        let hasher = hasher(&first);

        let plan = RedeployPlanner::new(&hasher)
            .plan(&project, &stage, &StageDeploymentRecord::new(), None);

        prop_assert_eq!(plan.total(), first.len());
        prop_assert_eq!(plan.tokens.len(), first.len());
        prop_assert_eq!(plan.record.len(), first.len());
        prop_assert_eq!(plan.record.last_compilation_timestamp(), Some("t1"));
    }

    /// PROPERTY: a first deployment uploads one artifact per function, all
    /// under the new timestamp.
    #[test]
    fn property_first_deployment_uploads_everything((first, _) in two_builds()) {
        let stage = Stage::default();
        let project = project("t1", first.len());
        let hasher = hasher(&first);

        let plan = RedeployPlanner::new(&hasher)
            .plan(&project, &stage, &StageDeploymentRecord::new(), None);

        prop_assert!(!plan.mode.is_incremental());
        prop_assert!(plan.reused.is_empty());
        prop_assert_eq!(plan.uploads.len(), first.len());
        prop_assert!(plan.uploads.iter().all(|u| u.key().starts_with("t1/")));
    }

    /// PROPERTY: with a trusted record, exactly the functions whose compiled
    /// content changed are redeployed; the rest keep their old version.
    #[test]
    fn property_incremental_redeploys_only_changes((first, second) in two_builds()) {
        let stage = Stage::default();
        let count = first.len();
        let previous = RedeployPlanner::new(&hasher(&first))
            .plan(&project("t1", count), &stage, &StageDeploymentRecord::new(), None)
            .record;

        let plan = RedeployPlanner::new(&hasher(&second))
            .plan(&project("t2", count), &stage, &previous, Some("t1"));

        prop_assert_eq!(&plan.mode, &RedeployMode::Incremental);
        for i in 0..count {
            let entry_point = format!("com.app.F{}", i);
            let token = format!("${{F{}_VERSION}}", i);
            let changed = first[i] != second[i];

            prop_assert_eq!(
                plan.to_deploy.iter().any(|f| f.entry_point == entry_point),
                changed
            );
            prop_assert_eq!(plan.reused.contains(&entry_point), !changed);
            let expected = if changed {
                format!("t2/f{}.jar", i)
            } else {
                format!("t1/f{}.jar", i)
            };
            prop_assert_eq!(plan.tokens.get(&token), Some(expected.as_str()));
        }
        prop_assert_eq!(plan.uploads.len(), plan.to_deploy.len());
    }

    /// PROPERTY: a marker that does not match the local record forces a full
    /// redeploy, whatever the hashes say.
    #[test]
    fn property_untrusted_record_forces_full((first, _) in two_builds(), marker in "t[0-9]") {
        prop_assume!(marker != "t1");
        let stage = Stage::default();
        let count = first.len();
        let previous = RedeployPlanner::new(&hasher(&first))
            .plan(&project("t1", count), &stage, &StageDeploymentRecord::new(), None)
            .record;

        let plan = RedeployPlanner::new(&hasher(&first))
            .plan(&project("t2", count), &stage, &previous, Some(marker.as_str()));

        prop_assert!(!plan.mode.is_incremental());
        prop_assert_eq!(plan.to_deploy.len(), count);
    }

    /// PROPERTY: a function that cannot be hashed is always redeployed.
    #[test]
    fn property_unhashable_function_is_redeployed((first, _) in two_builds()) {
        let stage = Stage::default();
        let count = first.len();
        let previous = RedeployPlanner::new(&hasher(&first))
            .plan(&project("t1", count), &stage, &StageDeploymentRecord::new(), None)
            .record;
        let mut partial = hasher(&first);
        partial.0.remove("com.app.F0");

        let plan = RedeployPlanner::new(&partial)
            .plan(&project("t2", count), &stage, &previous, Some("t1"));

        prop_assert!(plan.to_deploy.iter().any(|f| f.entry_point == "com.app.F0"));
        prop_assert_eq!(plan.hash_warnings.len(), 1);
    }
}
