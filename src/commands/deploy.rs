use anyhow::Result;
use tracing::info;

use liftoff::application::DeployOptions;
use liftoff::domain::value_objects::CancellationFlag;
use liftoff::presentation::create_deploy_use_case;

use super::context::{GlobalArgs, RunContext};

pub fn cmd_deploy(
    global: &GlobalArgs,
    stage: Option<&str>,
    region: Option<&str>,
    skip_hooks: bool,
    cancel: CancellationFlag,
) -> Result<()> {
    let ctx = RunContext::load(global, stage, region, cancel)?;
    let _lock = ctx.lock()?;

    let use_case =
        create_deploy_use_case(&ctx.settings, ctx.backend()?).with_cancellation(ctx.cancel.clone());
    let options = DeployOptions::new(ctx.stage.clone()).with_skip_hooks(skip_hooks);

    let events = ctx.event_sink();
    let result = use_case.execute_with_events(&options, events.as_ref())?;

    if !result.hook_failures.is_empty() {
        info!(
            failed = result.hook_failures.len(),
            "deploy finished with failed post-deploy hooks"
        );
    }
    print!("{}", with_newline(ctx.renderer().deploy(&result)));
    Ok(())
}

pub(crate) fn with_newline(mut rendered: String) -> String {
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    rendered
}
