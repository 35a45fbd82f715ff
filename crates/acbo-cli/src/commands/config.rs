use acbo_infrastructure::ConfigService;
use anyhow::Result;
use colored::Colorize;

use super::Context;

pub fn run(ctx: &Context, service: &ConfigService, init: bool) -> Result<()> {
    if init {
        let path = service.save(&ctx.config)?;
        if ctx.json {
            println!("{}", serde_json::json!({ "written": path }));
        } else {
            println!("{} {}", "Wrote".green(), path.display());
        }
        return Ok(());
    }

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&ctx.config)?);
        return Ok(());
    }

    match service.config_path() {
        Ok(path) => println!("{}", format!("# {}", path.display()).dimmed()),
        Err(e) => println!("{}", format!("# {}", e).dimmed()),
    }
    print!("{}", ConfigService::render(&ctx.config)?);
    Ok(())
}
