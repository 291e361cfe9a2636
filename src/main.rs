use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use flowgraph::{DiagramConfig, DiagramResult, DslFormat, InstanceStatus, WorkflowDiagram};

/// Render a workflow definition as a positioned diagram (JSON on stdout).
#[derive(Debug, Parser)]
#[command(name = "flowgraph", version, about)]
struct Cli {
    /// Workflow definition (.yaml, .yml, .json or .toml)
    workflow: PathBuf,

    /// Visited state ids in execution order, comma separated
    #[arg(long, value_delimiter = ',')]
    trace: Vec<String>,

    /// Instance status: complete, failed, cancelled, pending or running
    #[arg(long)]
    status: Option<InstanceStatus>,

    /// Diagram configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Include diagnostics in the output
    #[arg(long)]
    validate: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, workflow = %cli.workflow.display(), "failed to render diagram");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> DiagramResult<()> {
    let config = match &cli.config {
        Some(path) => DiagramConfig::from_file(path)?,
        None => DiagramConfig::default(),
    };

    let source = std::fs::read_to_string(&cli.workflow)?;
    let mut diagram =
        WorkflowDiagram::new(config.layout).with_format(DslFormat::from_path(&cli.workflow));
    diagram.update(&source, &cli.trace, cli.status)?;

    let (nodes, edges) = diagram
        .graph()
        .map(|g| (g.nodes.as_slice(), g.edges.as_slice()))
        .unwrap_or_default();
    let mut output = serde_json::json!({
        "nodes": nodes,
        "edges": edges,
    });
    if cli.validate {
        output["diagnostics"] = serde_json::to_value(diagram.diagnostics())?;
    }

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}
