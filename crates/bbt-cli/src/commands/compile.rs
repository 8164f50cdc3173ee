//! Compile command implementation - render templates without executing

use anyhow::{Context, Result};
use std::fs;

use crate::cli::{CompileArgs, GlobalArgs};
use crate::commands::common::{compile_project, load_project, resolve_selection};

/// Execute the compile command
///
/// Renders every model, then writes compiled SQL for the selected ones to
/// `target/compiled/<name>.sql`. Never opens the database.
pub(crate) async fn execute(args: &CompileArgs, global: &GlobalArgs) -> Result<()> {
    let mut project = load_project(global)?;
    let dag = compile_project(&mut project)?;
    let order = resolve_selection(&project, &dag, &args.targets, &args.select)?;

    let compiled_dir = project.compiled_dir();
    fs::create_dir_all(&compiled_dir).context("Failed to create compiled output directory")?;

    for name in &order {
        let model = project.get_model(name)?;
        let sql = model
            .compiled_sql
            .as_ref()
            .with_context(|| format!("Model '{}' has no compiled SQL", name))?;

        let out_path = compiled_dir.join(format!("{}.sql", name));
        fs::write(&out_path, sql)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;

        if global.verbose {
            println!("  compiled {} -> {}", name, out_path.display());
        }
    }

    println!(
        "Compiled {} models to {}",
        order.len(),
        compiled_dir.display()
    );
    Ok(())
}
