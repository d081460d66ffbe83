use anyhow::Result;

use liftoff::application::DestroyOptions;
use liftoff::domain::value_objects::CancellationFlag;
use liftoff::presentation::create_destroy_use_case;

use super::context::{GlobalArgs, RunContext};
use super::deploy::with_newline;

pub fn cmd_destroy(
    global: &GlobalArgs,
    stage: Option<&str>,
    region: Option<&str>,
    cancel: CancellationFlag,
) -> Result<()> {
    let ctx = RunContext::load(global, stage, region, cancel)?;
    let _lock = ctx.lock()?;

    let use_case = create_destroy_use_case(&ctx.settings, ctx.backend()?)
        .with_cancellation(ctx.cancel.clone());
    let events = ctx.event_sink();
    let result =
        use_case.execute_with_events(&DestroyOptions::new(ctx.stage.clone()), events.as_ref())?;

    print!("{}", with_newline(ctx.renderer().destroy(&result)));
    Ok(())
}
