//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Batch rule engine for weekly training plans.
///
/// Previews declarative rules against a plan, commits the result, and keeps
/// an audit log of what changed.
#[derive(Debug, Parser)]
#[command(name = "tp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where the rules for a preview come from.
#[derive(Debug, Args)]
pub struct RuleSource {
    /// JSON file with a rule list or a template.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["preset", "template", "then"])]
    pub rules: Option<PathBuf>,

    /// Saved preset, by id or name.
    #[arg(long, value_name = "NAME", conflicts_with_all = ["template", "then"])]
    pub preset: Option<String>,

    /// Built-in template, by id or name.
    #[arg(long, value_name = "ID", conflicts_with = "then")]
    pub template: Option<String>,

    /// Inline condition: "<type> <comparator> <value>" (repeatable).
    #[arg(long, value_name = "CONDITION", requires = "then")]
    pub when: Vec<String>,

    /// Inline action: "<action> [<mode>] <value>" (repeatable).
    #[arg(long, value_name = "ACTION")]
    pub then: Vec<String>,

    /// Match when any inline condition holds instead of all.
    #[arg(long, requires = "then")]
    pub any: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show what a set of rules would change, without writing anything.
    Preview {
        /// Plan JSON file.
        #[arg(long, value_name = "FILE")]
        plan: PathBuf,

        #[command(flatten)]
        source: RuleSource,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Apply rules and write the resulting plan.
    Apply {
        /// Plan JSON file.
        #[arg(long, value_name = "FILE")]
        plan: PathBuf,

        #[command(flatten)]
        source: RuleSource,

        /// Where to write the updated plan.
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Report the impact of a manual edit between two plan snapshots.
    Diff {
        /// Plan before the edit.
        #[arg(long, value_name = "FILE")]
        before: PathBuf,

        /// Plan after the edit.
        #[arg(long, value_name = "FILE")]
        after: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Record the edit in the change history.
        #[arg(long)]
        record: bool,
    },

    /// Show the change history, newest first.
    History {
        /// Show at most this many entries.
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Manage saved rule presets.
    #[command(subcommand)]
    Presets(PresetsAction),

    /// List the built-in rule templates.
    Templates {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Preset library actions.
#[derive(Debug, Subcommand)]
pub enum PresetsAction {
    /// List saved presets, most recent first.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one preset's rules.
    Show {
        /// Preset id or name.
        name: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Save a rule list as a preset.
    Save {
        /// Preset name.
        #[arg(long)]
        name: String,

        /// Short description.
        #[arg(long, default_value = "")]
        description: String,

        /// JSON file with a rule list or a template.
        #[arg(long, value_name = "FILE")]
        rules: PathBuf,
    },

    /// Copy one rule of a preset, appending the copy to the same preset.
    Duplicate {
        /// Preset id or name.
        name: String,

        /// Rule id or name within the preset.
        rule: String,
    },

    /// Delete a preset.
    Delete {
        /// Preset id or name.
        name: String,
    },
}
