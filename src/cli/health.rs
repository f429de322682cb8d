use console::style;
use serde_json::json;

use crate::cli::commands::StatsArgs;
use crate::cli::context::AppContext;
use crate::errors::PocForgeError;
use crate::render::renderer::render_health;

pub async fn handle_health(ctx: &AppContext) -> Result<(), PocForgeError> {
    let body = ctx.backend.health().await?;
    println!("{}", render_health(ctx.backend.base_url(), &body));
    Ok(())
}

pub async fn handle_stats(ctx: &AppContext, args: StatsArgs) -> Result<(), PocForgeError> {
    let stats = ctx.backend.statistics().await?;
    let types = ctx.backend.vuln_types().await?;

    if args.json {
        let out = json!({ "statistics": stats, "vuln_types": types });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "\n  {} {}\n  {} {}\n  {} {}\n",
        style("Total POCs:").dim(),
        style(stats.total_pocs).white().bold(),
        style("Python:").dim(),
        style(stats.python_pocs).white(),
        style("Nuclei:").dim(),
        style(stats.nuclei_pocs).white(),
    );
    if !types.is_empty() {
        println!("  {}", style("By type:").white().bold());
        for t in &types {
            println!("    {:<24} {}", t.vuln_type, style(t.count).cyan());
        }
    }
    if !stats.recent_used.is_empty() {
        println!("\n  {}", style("Recently used:").white().bold());
        for r in &stats.recent_used {
            println!(
                "    {} {} {}",
                style(format!("#{}", r.id)).cyan(),
                r.name,
                style(r.last_used.as_deref().unwrap_or("-")).dim(),
            );
        }
    }
    Ok(())
}
