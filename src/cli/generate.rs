use std::path::Path;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::info;

use crate::artifact::PocArtifact;
use crate::cli::commands::GenerateArgs;
use crate::cli::context::AppContext;
use crate::errors::PocForgeError;
use crate::render::progress::GenerationProgress;
use crate::render::renderer::render_generation_result;
use crate::session::GenerationController;

pub async fn handle_generate(ctx: &AppContext, args: GenerateArgs) -> Result<(), PocForgeError> {
    let info = match (&args.info, &args.info_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path).await?,
        (None, None) => String::new(),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = GenerationController::new(ctx.backend.clone()).with_event_channel(tx);

    let target = args.target.clone();
    // Owning the controller here drops the sender once the session ends,
    // which closes the progress loop even when no event was published.
    let run = async move {
        let outcome = controller.start(&info, target.as_deref()).await;
        drop(controller);
        outcome
    };
    let progress = async move {
        let mut display = GenerationProgress::new();
        while let Some(event) = rx.recv().await {
            display.handle_event(&event);
            if event.is_terminal() {
                break;
            }
        }
    };

    let (outcome, ()) = tokio::join!(run, progress);
    let result = outcome?;

    println!("{}", render_generation_result(&result));
    if result.saved {
        ctx.success(format!("{} POC generated and saved to the library", result.vulnerability_type));
    } else {
        ctx.warning("POC generated but not saved to the library");
    }

    if let Some(dir) = &args.save {
        let artifact = PocArtifact::from_generation(&result, Utc::now())?;
        let path = artifact.save_to(Path::new(dir)).await?;
        info!(path = %path.display(), "Generated POC saved");
        ctx.success(format!("Saved {}", path.display()));
    }
    Ok(())
}
