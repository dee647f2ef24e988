use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tp_core::Rule;
use tp_core::template::find_builtin;
use tracing_subscriber::EnvFilter;

use tp_cli::commands::{apply, diff, history, presets, preview, templates, util};
use tp_cli::{Cli, Commands, Config, PresetsAction, RuleSource};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(tp_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = tp_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

/// Resolve the rule list for a preview from exactly one source.
fn resolve_rules(source: &RuleSource, config_path: Option<&Path>) -> Result<Vec<Rule>> {
    if let Some(path) = &source.rules {
        return util::load_rules(path);
    }
    if let Some(name) = &source.preset {
        let (db, _config) = open_database(config_path)?;
        return presets::load(&db, name);
    }
    if let Some(key) = &source.template {
        let Some(template) = find_builtin(key) else {
            bail!("no built-in template named '{key}'. Run 'tp templates' to list them");
        };
        return Ok(template.instantiate());
    }
    if !source.then.is_empty() {
        return Ok(vec![util::inline_rule(&source.when, &source.then, source.any)?]);
    }
    bail!("no rules given: use --rules, --preset, --template or --then")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config_path = cli.config.as_deref();

    match &cli.command {
        Some(Commands::Preview { plan, source, json }) => {
            let rules = resolve_rules(source, config_path)?;
            preview::run(plan, &rules, *json)?;
        }
        Some(Commands::Apply {
            plan,
            source,
            output,
            json,
        }) => {
            let rules = resolve_rules(source, config_path)?;
            let (mut db, config) = open_database(config_path)?;
            apply::run(&mut db, plan, &rules, output, config.history_limit, *json)?;
        }
        Some(Commands::Diff {
            before,
            after,
            json,
            record,
        }) => {
            if *record {
                let (mut db, config) = open_database(config_path)?;
                let recorder = diff::Recorder {
                    db: &mut db,
                    limit: config.history_limit,
                };
                diff::run(before, after, *json, Some(recorder))?;
            } else {
                diff::run(before, after, *json, None)?;
            }
        }
        Some(Commands::History { limit, json }) => {
            let (db, _config) = open_database(config_path)?;
            history::run(&db, *limit, *json)?;
        }
        Some(Commands::Presets(action)) => {
            let (mut db, config) = open_database(config_path)?;
            match action {
                PresetsAction::List { json } => presets::list(&db, *json)?,
                PresetsAction::Show { name, json } => presets::show(&db, name, *json)?,
                PresetsAction::Save {
                    name,
                    description,
                    rules,
                } => {
                    presets::save(&mut db, name, description, rules, config.preset_limit)?;
                }
                PresetsAction::Duplicate { name, rule } => {
                    presets::duplicate(&mut db, name, rule, config.preset_limit)?;
                }
                PresetsAction::Delete { name } => presets::delete(&mut db, name)?,
            }
        }
        Some(Commands::Templates { json }) => {
            templates::run(*json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
