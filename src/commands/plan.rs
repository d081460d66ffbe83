use anyhow::Result;

use liftoff::domain::value_objects::CancellationFlag;
use liftoff::presentation::create_plan_use_case;

use super::context::{GlobalArgs, RunContext};
use super::deploy::with_newline;

/// Read-only: takes no lock and writes nothing
pub fn cmd_plan(
    global: &GlobalArgs,
    stage: Option<&str>,
    region: Option<&str>,
    cancel: CancellationFlag,
) -> Result<()> {
    let ctx = RunContext::load(global, stage, region, cancel)?;

    let use_case = create_plan_use_case(&ctx.settings, ctx.backend()?);
    let result = use_case.execute(&ctx.stage)?;

    print!("{}", with_newline(ctx.renderer().plan(&result)));
    Ok(())
}
