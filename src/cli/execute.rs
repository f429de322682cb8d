use crate::cli::commands::ExecuteArgs;
use crate::cli::context::AppContext;
use crate::errors::PocForgeError;
use crate::execution::ExecutionDispatcher;
use crate::models::ExecutionHeadline;
use crate::render::renderer::render_execution_report;

pub async fn handle_execute(ctx: &AppContext, args: ExecuteArgs) -> Result<(), PocForgeError> {
    let dispatcher = ExecutionDispatcher::new(ctx.backend.clone());
    let report = dispatcher.execute(args.id, &args.url).await?;

    if report.headline() == ExecutionHeadline::Failed {
        return report.into_verdict().map(|_| ());
    }
    println!("{}", render_execution_report(&report));
    ctx.success("Execution finished");
    Ok(())
}
