use std::path::Path;

use chrono::Utc;
use serde_json::json;

use crate::cli::commands::{DownloadArgs, IdArgs, LibraryArgs};
use crate::cli::context::AppContext;
use crate::errors::PocForgeError;
use crate::library::{Category, PocLibrary, SortKey};
use crate::render::renderer::{render_guide, render_library, render_record_detail};

fn open_library(ctx: &AppContext) -> PocLibrary {
    PocLibrary::new(ctx.backend.clone()).with_page_size(ctx.config.page_size)
}

pub async fn handle_library(ctx: &AppContext, args: LibraryArgs) -> Result<(), PocForgeError> {
    let category: Category = args.category.parse().map_err(PocForgeError::Validation)?;
    let sort: SortKey = args.sort.parse().map_err(PocForgeError::Validation)?;

    let mut library = open_library(ctx);
    library.reload().await?;
    library.set_category(category);
    library.set_sort(sort);
    if let Some(keyword) = args.keyword {
        library.set_keyword(keyword);
    }
    library.set_vuln_type(args.vuln_type);

    let view = library.view();
    let stats = library.statistics();
    if args.json {
        let out = json!({
            "statistics": stats,
            "vuln_types": library.vuln_types(),
            "pocs": view,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", render_library(&view, &stats, Utc::now()));
    }
    Ok(())
}

pub async fn handle_show(ctx: &AppContext, args: IdArgs) -> Result<(), PocForgeError> {
    let record = ctx.backend.get_poc(args.id).await?;
    println!("{}", render_record_detail(&record, Utc::now()));
    if record.is_manual() {
        println!("{}", render_guide(record.guide()));
    }
    Ok(())
}

pub async fn handle_guide(ctx: &AppContext, args: IdArgs) -> Result<(), PocForgeError> {
    let record = ctx.backend.get_poc(args.id).await?;
    println!("{}", render_guide(record.guide()));
    Ok(())
}

pub async fn handle_code(ctx: &AppContext, args: IdArgs) -> Result<(), PocForgeError> {
    let code = open_library(ctx).fetch_code(args.id).await?;
    if code.trim().is_empty() {
        return Err(PocForgeError::Validation("no code to download".into()));
    }
    println!("{}", code);
    Ok(())
}

pub async fn handle_download(ctx: &AppContext, args: DownloadArgs) -> Result<(), PocForgeError> {
    let artifact = open_library(ctx).download(args.id).await?;
    let path = artifact.save_to(Path::new(&args.dir)).await?;
    ctx.success(format!("Saved {}", path.display()));
    Ok(())
}

pub async fn handle_delete(ctx: &AppContext, args: IdArgs) -> Result<(), PocForgeError> {
    let mut library = open_library(ctx);
    library.delete(args.id).await?;
    ctx.success(format!("POC #{} deleted", args.id));
    Ok(())
}
