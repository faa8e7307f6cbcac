use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use topo_engine::dag;
use topo_engine::script::{replay, Operation};
use topo_engine::{EngineConfig, TopologyHandle, TopologyState};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("topo-engine")
        .version(topo_engine::VERSION)
        .about("Topology graph editing engine")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("replay")
                .about("Seed an engine from a graph document and replay an operation script")
                .arg(
                    Arg::new("graph")
                        .long("graph")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON document with nodes, links and optional auditLogs"),
                )
                .arg(
                    Arg::new("ops")
                        .long("ops")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of operations"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Engine configuration (TOML)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the final document as JSON"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Report structural problems in a graph document")
                .arg(
                    Arg::new("graph")
                        .long("graph")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON document with nodes and links"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn run_replay(args: &ArgMatches) -> Result<bool> {
    let graph_path = args.get_one::<PathBuf>("graph").context("missing --graph")?;
    let ops_path = args.get_one::<PathBuf>("ops").context("missing --ops")?;

    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let state: TopologyState = read_json(graph_path)?;
    let ops: Vec<Operation> = read_json(ops_path)?;

    let mut handle = TopologyHandle::from_state(state, config)?;
    let summary = replay(&mut handle, ops);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&handle.state())?);
    } else {
        println!("Replay Summary:");
        println!("  Operations: {}", summary.total());
        println!("  Committed: {}", summary.committed);
        println!("  Rejected: {}", summary.rejected.len());
        for step in &summary.rejected {
            println!("    #{} {}: {}", step.index, step.op, step.reason);
        }
        println!("  Undo depth: {}", handle.undo_depth());
        println!("  Redo depth: {}", handle.redo_depth());
        println!("  Audit entries: {}", handle.audit().len());
    }
    Ok(true)
}

fn run_check(args: &ArgMatches) -> Result<bool> {
    let graph_path = args.get_one::<PathBuf>("graph").context("missing --graph")?;
    let state: TopologyState = read_json(graph_path)?;
    let report = dag::inspect(&state.nodes, &state.links);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Topology Report");
        println!("===============");
        println!("  Nodes: {}", report.node_count);
        println!("  Links: {}", report.link_count);
        println!("  Duplicate node ids: {}", report.duplicate_node_ids.len());
        for id in &report.duplicate_node_ids {
            println!("    {id}");
        }
        println!("  Duplicate links: {}", report.duplicate_links.len());
        for (src, dst) in &report.duplicate_links {
            println!("    {src} -> {dst}");
        }
        println!("  Self loops: {}", report.self_loops.len());
        println!("  Dangling links: {}", report.dangling_links.len());
        for (src, dst) in &report.dangling_links {
            println!("    {src} -> {dst}");
        }
        println!("  Cyclic: {}", report.is_cyclic);
        println!("  Status: {}", if report.is_clean() { "CLEAN" } else { "ISSUES FOUND" });
    }
    Ok(report.is_clean())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let ok = match matches.subcommand() {
        Some(("replay", args)) => run_replay(args)?,
        Some(("check", args)) => run_check(args)?,
        _ => true,
    };

    std::process::exit(if ok { 0 } else { 1 });
}
