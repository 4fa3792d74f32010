//! Fabula CLI
//!
//! Command-line surface over the fabula engine.
//!
//! Paths are dotted: `dune.novies` addresses document `novies` in work
//! `dune`; a leading `temps.` segment routes the work into the temporary
//! class. String values prefixed with `gen:` are sent to the generation
//! collaborator; everything else is stored literally.

mod commands;

use clap::{Parser, Subcommand};
use fabula_core::{config, Config, Engine, Kind, MergeStrategy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Fabula command-line tools.
#[derive(Parser)]
#[command(name = "fabula")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workspace root (defaults to ~/.fabula)
    #[arg(global = true, long)]
    root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Declare a work and its initial documents
    Register {
        /// Dotted path, e.g. `dune.novies`
        path: String,

        /// Narrative description of the work
        #[arg(short, long)]
        description: Option<String>,

        /// Persona labels (repeatable)
        #[arg(short, long = "persona")]
        personas: Vec<String>,

        /// Setting descriptions (repeatable)
        #[arg(short, long = "setting")]
        settings: Vec<String>,

        /// Artifact labels (repeatable)
        #[arg(short, long = "artifact")]
        artifacts: Vec<String>,
    },

    /// Install a work into a fresh collection
    Deploy {
        /// Dotted target path
        path: String,

        /// On-disk package directory to import
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Package identifier to record as canonical source
        #[arg(short, long)]
        package: Option<String>,
    },

    /// Merge an on-disk source tree into an existing work
    Update {
        /// Dotted path of the work to update
        path: String,

        /// Collection-shaped source directory
        #[arg(short, long)]
        source: PathBuf,

        /// Merge strategy (overlay, strict, patch, interactive)
        #[arg(short, long, default_value = "overlay")]
        merge: String,

        /// Branch into this namespace instead of updating in place
        #[arg(short, long)]
        branch_to: Option<String>,
    },

    /// Create a work with a single setting narrative
    Fabricate {
        /// Dotted target path
        path: String,

        /// Setting text (prefix with `gen:` to generate)
        #[arg(short, long)]
        setting: String,
    },

    /// Write a ruleset document
    Core {
        /// Dotted path of the document
        path: String,

        /// Axioms (repeatable)
        #[arg(short, long = "axiom")]
        axioms: Vec<String>,

        /// Constraints (repeatable)
        #[arg(short, long = "constraint")]
        constraints: Vec<String>,

        /// Merge strategy
        #[arg(short, long, default_value = "overlay")]
        merge: String,
    },

    /// Write a persona document
    Persona {
        /// Dotted path of the document
        path: String,

        /// Traits (repeatable)
        #[arg(short, long = "trait")]
        traits: Vec<String>,

        /// Constraints (repeatable)
        #[arg(short, long = "constraint")]
        constraints: Vec<String>,

        /// Merge strategy
        #[arg(short, long, default_value = "overlay")]
        merge: String,
    },

    /// Fuse documents from several works into a new one
    Mix {
        /// Dotted source paths (repeatable)
        #[arg(short, long = "source", required = true)]
        sources: Vec<String>,

        /// Weight per source (repeatable, same order)
        #[arg(short, long = "weight", required = true)]
        weights: Vec<f64>,

        /// Target kind (narrative, ruleset, persona, artifact)
        #[arg(short, long)]
        kind: String,

        /// Dotted target path (collection + new document id)
        #[arg(short, long)]
        target: String,
    },

    /// Create a fate variant of a persona
    Mirror {
        /// Dotted path of the work
        path: String,

        /// Source persona id
        #[arg(short = 'f', long)]
        of: String,

        /// Fate change description
        #[arg(short, long)]
        reason: String,

        /// Id of the new variant
        #[arg(short, long = "as")]
        as_id: String,

        /// Merge strategy if the variant id is occupied
        #[arg(short, long, default_value = "overlay")]
        merge: String,
    },

    /// Derive a whole new work, preserving lineage
    Transmute {
        /// Dotted path of the source work
        path: String,

        /// Target namespace
        #[arg(short, long)]
        to: String,

        /// Lineage description
        #[arg(short, long)]
        reason: String,
    },

    /// Record a narrative event
    Run {
        /// Dotted path of the event document
        path: String,

        /// Trigger condition
        #[arg(short, long)]
        when: Option<String>,

        /// Event name
        #[arg(short, long)]
        then: String,

        /// Outcome mapping as a JSON object
        #[arg(short, long)]
        outcome: Option<String>,
    },

    /// Print one document
    Inspect {
        /// Dotted path of the document
        path: String,

        /// Document kind
        #[arg(short, long, default_value = "persona")]
        kind: String,
    },

    /// Scan all works for a keyword
    Search {
        /// Keyword matched against ids and namespaces
        keyword: String,

        /// Restrict to one work (qualified namespace)
        #[arg(short, long)]
        work: Option<String>,

        /// Restrict to one kind
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Erase every temporary work
    ClearTemps,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if matches!(cli.command, Commands::Version) {
        println!("fabula CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("fabula core v{}", fabula_core::VERSION);
        return Ok(());
    }

    let root = cli.root.unwrap_or_else(config::default_root);
    let engine = Engine::open(Config::new().root(root))?;

    match cli.command {
        Commands::Register {
            path,
            description,
            personas,
            settings,
            artifacts,
        } => commands::work::register(&engine, &path, description, personas, settings, artifacts)?,
        Commands::Deploy {
            path,
            source,
            package,
        } => commands::work::deploy(&engine, &path, source.as_deref(), package.as_deref())?,
        Commands::Update {
            path,
            source,
            merge,
            branch_to,
        } => {
            let strategy: MergeStrategy = merge.parse()?;
            commands::work::update(&engine, &path, &source, strategy, branch_to.as_deref())?;
        }
        Commands::Fabricate { path, setting } => {
            commands::work::fabricate(&engine, &path, &setting)?;
        }
        Commands::Core {
            path,
            axioms,
            constraints,
            merge,
        } => {
            let strategy: MergeStrategy = merge.parse()?;
            commands::entity::core(&engine, &path, axioms, constraints, strategy)?;
        }
        Commands::Persona {
            path,
            traits,
            constraints,
            merge,
        } => {
            let strategy: MergeStrategy = merge.parse()?;
            commands::entity::persona(&engine, &path, traits, constraints, strategy)?;
        }
        Commands::Mix {
            sources,
            weights,
            kind,
            target,
        } => {
            let kind: Kind = kind.parse()?;
            commands::mix::run(&engine, &sources, &weights, kind, &target)?;
        }
        Commands::Mirror {
            path,
            of,
            reason,
            as_id,
            merge,
        } => {
            let strategy: MergeStrategy = merge.parse()?;
            commands::entity::mirror(&engine, &path, &of, &reason, &as_id, strategy)?;
        }
        Commands::Transmute { path, to, reason } => {
            commands::work::transmute(&engine, &path, &to, &reason)?;
        }
        Commands::Run {
            path,
            when,
            then,
            outcome,
        } => commands::entity::run(&engine, &path, when, &then, outcome.as_deref())?,
        Commands::Inspect { path, kind } => {
            let kind: Kind = kind.parse()?;
            commands::entity::inspect(&engine, &path, kind)?;
        }
        Commands::Search {
            keyword,
            work,
            kind,
        } => {
            let kind = kind.map(|k| k.parse::<Kind>()).transpose()?;
            commands::search::run(&engine, &keyword, work.as_deref(), kind)?;
        }
        Commands::ClearTemps => {
            let removed = engine.clear_temporary()?;
            println!("Removed {removed} temporary work(s)");
        }
        Commands::Version => unreachable!("handled above"),
    }

    Ok(())
}
