//! CLI entry point for `edgectl`.
//!
//! Results are written to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, EnvFilter};

use edge_client::{ExportedGraph, GraphSession, NodeView};
use edge_core::{EdgeConfig, GraphId, NodeId};

#[derive(Parser)]
#[command(name = "edgectl")]
#[command(about = "Manage and query graphs on an Edge server")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Override the graph ID (otherwise read from config).
    #[arg(long, global = true)]
    graph_id: Option<String>,

    /// Override the API token.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Override the graphs API base URL.
    #[arg(long, global = true)]
    url: Option<String>,

    /// Config file prefix (default: edge).
    #[arg(short, long, default_value = "edge", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new graph and print its ID.
    Create {
        name: String,
    },
    /// Rename the graph.
    Rename {
        name: String,
    },
    /// Delete the graph.
    Delete,
    /// Show one node's properties.
    Node {
        id: String,
    },
    /// List a node's successors (or predecessors).
    Successors {
        id: String,
        /// List predecessors instead.
        #[arg(long)]
        predecessors: bool,
        /// Include edge weights.
        #[arg(long)]
        weights: bool,
    },
    /// Show the outgoing edges of the given nodes.
    Edges {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Download the whole graph as node-link JSON.
    Export,
    /// Upload a file as a new node.
    ImportFile {
        path: PathBuf,
    },
    /// Upload a JSON document as a new node.
    AddJson {
        path: PathBuf,
    },
    /// Create a view node.
    CreateView {
        label: String,
        /// Existing x axis node.
        #[arg(long)]
        x: Option<String>,
        /// Existing y axis node.
        #[arg(long)]
        y: Option<String>,
        /// Filter nodes, in order.
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Command::Create { ref name } = cli.command {
        let session = GraphSession::create_graph_with_config(&config, name).await?;
        return print_json(&json!({ "graph_id": session.graph_id() }));
    }

    let graph_id = resolve_graph_id(&cli, &config)?;
    tracing::debug!(%graph_id, url = %config.url, "Opening Edge session");
    let mut session = GraphSession::from_config(&config, graph_id).await?;
    run(&mut session, &cli.command).await
}

async fn run(session: &mut GraphSession, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Create { .. } => {
            anyhow::bail!("create does not operate on an existing graph");
        }
        Command::Rename { name } => {
            session.rename_graph(name).await?;
        }
        Command::Delete => {
            session.delete_graph().await?;
        }
        Command::Node { id } => {
            let node = session.get_node(parse_node_id(id)?).await?;
            print_json(&node.as_ref().map(node_json).unwrap_or(Value::Null))?;
        }
        Command::Successors {
            id,
            predecessors,
            weights,
        } => {
            let id = parse_node_id(id)?;
            let result = match (*predecessors, *weights) {
                (false, false) => json!(session.get_successors(id).await?),
                (true, false) => json!(session.get_predecessors(id).await?),
                (false, true) => json!(session.get_successors_weighted(id).await?),
                (true, true) => json!(session.get_predecessors_weighted(id).await?),
            };
            print_json(&result)?;
        }
        Command::Edges { ids } => {
            let ids = parse_node_ids(ids)?;
            print_json(&json!(session.get_edges(&ids).await?))?;
        }
        Command::Export => {
            let graph = session.export_graph().await?;
            print_json(&node_link_json(&graph))?;
        }
        Command::ImportFile { path } => {
            let contents = std::fs::read(path)?;
            let id = session.import_file_as_node(&file_name(path)?, contents).await?;
            print_json(&json!({ "node_id": id }))?;
        }
        Command::AddJson { path } => {
            let document: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            let id = session.add_json_as_node(&file_name(path)?, &document).await?;
            print_json(&json!({ "node_id": id }))?;
        }
        Command::CreateView {
            label,
            x,
            y,
            filters,
        } => {
            let x = x.as_deref().map(parse_node_id).transpose()?;
            let y = y.as_deref().map(parse_node_id).transpose()?;
            let filters = parse_node_ids(filters)?;
            let view = session.create_view(label, x, y, &filters).await?;
            print_json(&json!({ "view_id": view }))?;
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<EdgeConfig> {
    let mut config = EdgeConfig::load(&cli.config)?;
    if let Some(token) = &cli.token {
        config.token = token.clone();
    }
    if let Some(url) = &cli.url {
        config.url = url.clone();
    }
    if let Some(graph_id) = &cli.graph_id {
        config.graph_id = Some(graph_id.clone());
    }
    Ok(config)
}

fn resolve_graph_id(cli: &Cli, config: &EdgeConfig) -> anyhow::Result<GraphId> {
    config.graph_id()?.ok_or_else(|| {
        anyhow::anyhow!(
            "Graph ID required: set --graph-id, graph_id in {}.toml, or EDGE_GRAPH_ID",
            cli.config
        )
    })
}

fn parse_node_id(raw: &str) -> anyhow::Result<NodeId> {
    Ok(raw.parse()?)
}

fn parse_node_ids(raw: &[String]) -> anyhow::Result<Vec<NodeId>> {
    raw.iter().map(|id| parse_node_id(id)).collect()
}

fn file_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("Not a file path: {}", path.display()))
}

fn node_json(node: &NodeView) -> Value {
    json!({ "id": node.id(), "properties": node.properties() })
}

fn node_link_json(graph: &ExportedGraph) -> Value {
    let nodes: Vec<Value> = graph
        .nodes
        .iter()
        .map(|n| json!({ "id": n.id, "properties": n.properties }))
        .collect();
    let links: Vec<Value> = graph
        .adjacency
        .iter()
        .enumerate()
        .flat_map(|(source, edges)| {
            edges.iter().map(move |e| {
                json!({
                    "source": graph.nodes[source].id,
                    "target": graph.nodes[e.target_index].id,
                    "weight": e.weight,
                })
            })
        })
        .collect();
    json!({ "directed": true, "multigraph": false, "nodes": nodes, "links": links })
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
