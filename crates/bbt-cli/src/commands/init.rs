//! Init command implementation - scaffolds a new BlockBT project

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::cli::{GlobalArgs, InitArgs};

/// Execute the init command
///
/// The new project lands under `--project-dir`, so callers (and tests) never
/// depend on the process-wide working directory.
pub(crate) async fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    // Reject names that could cause path traversal or confusing directory names
    if args.name.contains('/')
        || args.name.contains('\\')
        || args.name.contains("..")
        || args.name.starts_with('.')
        || args.name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not contain '/', '\\', '..', or start with '.' or '-'",
            args.name
        );
    }

    let project_dir = Path::new(&global.project_dir).join(&args.name);
    if project_dir.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Choose a different project name.",
            args.name
        );
    }

    println!("Creating new BlockBT project: {}\n", args.name);

    for dir in ["", "models/staging", "models/marts"] {
        let path = project_dir.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }

    let safe_name = args.name.replace('"', "\\\"");
    let safe_adapter = args.adapter.replace('"', "\\\"");
    let config_content = format!(
        r#"name: "{name}"
version: "1.0.0"

model_paths: ["models"]
target_path: "target"

materialization: view

database:
  type: duckdb
  path: "{name}.duckdb"

adapter:
  name: "{adapter}"

execution:
  threads: 1

vars:
  start_block: 0
"#,
        name = safe_name,
        adapter = safe_adapter,
    );
    fs::write(project_dir.join("bbt_project.yml"), config_content)
        .context("Failed to write bbt_project.yml")?;

    let stg_sql = format!(
        r#"SELECT
    number AS block_number,
    hash AS block_hash,
    miner,
    timestamp AS block_time
FROM {{{{ source('{adapter}', 'blocks') }}}}
WHERE number >= {{{{ var('start_block') }}}}
"#,
        adapter = args.adapter
    );
    fs::write(project_dir.join("models/staging/stg_blocks.sql"), stg_sql)
        .context("Failed to write example staging model")?;

    let stg_yml = r#"version: 1
description: "Staged blocks from the chain source"
tags:
  - staging

columns:
  - name: block_number
    description: "Block height"
    tests:
      - unique
      - not_null
  - name: block_hash
    tests:
      - unique
      - not_null
  - name: miner
    tests:
      - not_null
"#;
    fs::write(project_dir.join("models/staging/stg_blocks.yml"), stg_yml)
        .context("Failed to write example staging schema")?;

    let mart_sql = r#"{{ config(materialized='table', tags=['daily']) }}

SELECT
    miner,
    COUNT(*) AS blocks_mined,
    MIN(block_number) AS first_block,
    MAX(block_number) AS last_block
FROM {{ ref('stg_blocks') }}
GROUP BY miner
"#;
    fs::write(project_dir.join("models/marts/block_stats.sql"), mart_sql)
        .context("Failed to write example mart model")?;

    let mart_yml = r#"version: 1
description: "Per-miner block production summary"

columns:
  - name: miner
    tests:
      - unique
      - not_null
"#;
    fs::write(project_dir.join("models/marts/block_stats.yml"), mart_yml)
        .context("Failed to write example mart schema")?;

    let gitignore = "target/\n*.duckdb\n*.duckdb.wal\n";
    fs::write(project_dir.join(".gitignore"), gitignore).context("Failed to write .gitignore")?;

    println!("  Created bbt_project.yml");
    println!("  Created models/staging/stg_blocks.sql");
    println!("  Created models/staging/stg_blocks.yml");
    println!("  Created models/marts/block_stats.sql");
    println!("  Created models/marts/block_stats.yml");
    println!("  Created .gitignore");
    println!();
    println!("Project '{}' initialized successfully!", args.name);
    println!();
    println!("Next steps:");
    println!("  cd {}", project_dir.display());
    println!("  bbt compile    # Render models without executing");
    println!("  bbt run        # Materialize all models");

    Ok(())
}
