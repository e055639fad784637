use clap::{ArgAction, Parser, Subcommand};
use rig_retarget::core::{init_with_level, level_from_verbosity};
use rig_retarget::live::{LandmarkRecording, LiveConfig};
use rig_retarget::mapping::{resolve, MappingDocument};
use rig_retarget::pipeline::{self, EntryStatus};
use rig_retarget::skeleton::ScaffoldBuilder;
use std::path::PathBuf;
use std::process::ExitCode;

/// Motion-capture retargeting tools
#[derive(Parser, Debug)]
#[command(name = "rig-retarget", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit structured JSON logs (requires the `tracing` feature)
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split bone names into prefix, base and side
    Resolve {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Build a synthetic skeleton for a mapping file
    Scaffold {
        mapping: PathBuf,
        /// Output skeleton JSON (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Scaffold rules JSON overriding the humanoid defaults
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Report bound, unbound and unresolvable mapping entries
    Check {
        mapping: PathBuf,
        /// Skeleton export to check against (scaffold if omitted)
        #[arg(long)]
        skeleton: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the live scheduler over a landmark recording
    Replay {
        mapping: PathBuf,
        recording: PathBuf,
        /// Live configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
        /// Skeleton export to retarget onto (scaffold if omitted)
        #[arg(long)]
        skeleton: Option<PathBuf>,
        /// Pace ticks by the configured interval
        #[arg(long)]
        realtime: bool,
        /// Output pose JSON (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(cli: &Cli) {
    #[cfg(feature = "tracing")]
    if cli.json_logs {
        rig_retarget::core::init_tracing(true);
        let _ = tracing_log::LogTracer::init();
        return;
    }
    if cli.json_logs {
        eprintln!("--json-logs needs the `tracing` feature, using plain logs");
    }
    let _ = init_with_level(level_from_verbosity(cli.verbose));
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Command::Resolve { names } => {
            for name in names {
                let r = resolve(&name);
                println!(
                    "{name}\tbase={}\tside={}\tprefix={}",
                    r.base,
                    r.side.map_or("-".to_string(), |s| s.to_string()),
                    r.prefix.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Scaffold {
            mapping,
            output,
            rules,
        } => {
            let doc = MappingDocument::load_json(&mapping)?;
            let builder = match rules {
                Some(path) => ScaffoldBuilder::new(rig_retarget::skeleton::ScaffoldRules::load_json(path)?),
                None => ScaffoldBuilder::default(),
            };
            let scaffold = builder.build_or_fallback(&doc)?;
            let export = scaffold.skeleton.export();
            match output {
                Some(path) => {
                    export.write_json(&path)?;
                    eprintln!(
                        "wrote {} bones to {} ({} scattered, {} discarded)",
                        export.bones.len(),
                        path.display(),
                        scaffold.report.scattered.len(),
                        scaffold.report.discarded.len()
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&export)?),
            }
        }
        Command::Check {
            mapping,
            skeleton,
            json,
        } => {
            let doc = MappingDocument::load_json(&mapping)?;
            let graph = pipeline::target_skeleton(&doc, skeleton.as_deref())?;
            let report = pipeline::check_mapping(&doc, &graph);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for entry in &report.entries {
                    match &entry.status {
                        EntryStatus::Bound { bone } => println!("bound\t{}\t{bone}", entry.driver),
                        EntryStatus::Unbound => println!("unbound\t{}", entry.driver),
                        EntryStatus::Unresolvable { bone } => {
                            println!("unresolvable\t{}\t{bone}", entry.driver)
                        }
                    }
                }
                println!(
                    "{} bound, {} unbound, {} unresolvable",
                    report.bound, report.unbound, report.unresolvable
                );
            }
            if !report.is_clean() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Replay {
            mapping,
            recording,
            config,
            skeleton,
            realtime,
            output,
        } => {
            let doc = MappingDocument::load_json(&mapping)?;
            let graph = pipeline::target_skeleton(&doc, skeleton.as_deref())?;
            let recording = LandmarkRecording::load_json(&recording)?;
            let config = match config {
                Some(path) => LiveConfig::load_json(path)?,
                None => LiveConfig::default(),
            };
            let out = pipeline::replay(doc, graph, recording, &config, realtime)?;
            eprintln!(
                "{} ticks, {} applications, {} updates",
                out.summary.ticks, out.summary.applications, out.summary.updates
            );
            match output {
                Some(path) => pipeline::write_json(&out.pose, path)?,
                None => println!("{}", serde_json::to_string_pretty(&out.pose)?),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
