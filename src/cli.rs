use crate::adapters::engine::{DumpFileEngine, ExternalEngine};
use crate::app::config::{
    DEFAULT_NEO4J_PASSWORD, DEFAULT_NEO4J_URI, DEFAULT_NEO4J_USER, EngineConfig, ExportConfig,
    SQLITE_DEFAULT_FILE, SinkConfig,
};
use crate::app::export::export_call_graph;
use crate::domain::pipeline::ExportSummary;
use crate::domain::predicate::EdgeFilter;
use crate::domain::ports::CallGraphEngine;
use crate::domain::progress::LogProgress;
use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// mapping.json + edges.json in the output folder
    Json,
    /// Neo4j over Bolt
    Neo4j,
    /// Embedded SQLite property graph
    Sqlite,
}

#[derive(Parser, Debug)]
#[command(name = "cgexport")]
#[command(version)]
#[command(about = "Export a program's static call graph to JSON files or a graph database", long_about = None)]
pub struct Args {
    /// Input folder containing .jar files being analyzed
    #[arg(short = 'i', long = "input", required_unless_present = "call_graph")]
    pub input_folder: Option<PathBuf>,

    /// Output folder to which the graph .jsons will be emitted.
    /// Required for the json sink, and for sqlite without --sqlite-db; unused by neo4j.
    #[arg(short = 'o', long = "output")]
    pub output_folder: Option<PathBuf>,

    /// Identifier of the main class containing the program's entry point
    #[arg(short = 'm', long = "main-class", required_unless_present = "call_graph")]
    pub main_class: Option<String>,

    /// A string that must appear in a jar filename for it to be analyzed.
    /// Repeatable; if none is given every jar in the input folder is included.
    #[arg(long = "jar-filter")]
    pub jar_filter: Vec<String>,

    /// A string that must appear in both an edge's source and target identifier
    /// (`Class.method`). Repeatable; if none is given every edge is included.
    #[arg(long = "edge-filter")]
    pub edge_filter: Vec<String>,

    /// A string that must appear in the declaring type of both endpoints. Repeatable.
    #[arg(long = "namespace-filter")]
    pub namespace_filter: Vec<String>,

    #[arg(long, value_enum, default_value_t = SinkKind::Json)]
    pub sink: SinkKind,

    /// Also derive the class-level DEPENDS_ON graph (database sinks)
    #[arg(long)]
    pub class_graph: bool,

    #[arg(long, default_value = DEFAULT_NEO4J_URI)]
    pub neo4j_uri: String,

    #[arg(long, default_value = DEFAULT_NEO4J_USER)]
    pub neo4j_user: String,

    #[arg(long, default_value = DEFAULT_NEO4J_PASSWORD)]
    pub neo4j_password: String,

    /// SQLite database file (default: <output>/callgraph.sqlite)
    #[arg(long)]
    pub sqlite_db: Option<PathBuf>,

    /// Analyzer executable producing the call graph as JSON lines
    #[arg(long, default_value = "callgraph-engine")]
    pub engine: PathBuf,

    /// Export a previously captured call graph instead of running the analyzer
    #[arg(long)]
    pub call_graph: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn sink_config(&self) -> Result<SinkConfig> {
        let config = match self.sink {
            SinkKind::Json => SinkConfig::Json {
                output_folder: self
                    .output_folder
                    .clone()
                    .context("--output is required for the json sink")?,
            },
            SinkKind::Neo4j => SinkConfig::Neo4j {
                uri: self.neo4j_uri.clone(),
                user: self.neo4j_user.clone(),
                password: self.neo4j_password.clone(),
                class_graph: self.class_graph,
            },
            SinkKind::Sqlite => {
                let path = match (&self.sqlite_db, &self.output_folder) {
                    (Some(db), _) => db.clone(),
                    (None, Some(out)) => out.join(SQLITE_DEFAULT_FILE),
                    (None, None) => {
                        anyhow::bail!("--output or --sqlite-db is required for the sqlite sink")
                    }
                };
                SinkConfig::Sqlite {
                    path,
                    class_graph: self.class_graph,
                }
            }
        };
        Ok(config)
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        match (&self.input_folder, &self.main_class) {
            (Some(input), Some(main_class)) => {
                Ok(EngineConfig::discover(input, &self.jar_filter, main_class.clone())?)
            }
            _ if self.call_graph.is_some() => Ok(EngineConfig {
                input_folder: self.input_folder.clone().unwrap_or_default(),
                main_class: self.main_class.clone().unwrap_or_default(),
                ..EngineConfig::default()
            }),
            _ => anyhow::bail!("--input and --main-class are required unless --call-graph is given"),
        }
    }

    pub fn to_config(&self) -> Result<ExportConfig> {
        Ok(ExportConfig {
            engine: self.engine_config()?,
            filter: EdgeFilter::new(self.namespace_filter.clone(), self.edge_filter.clone()),
            sink: self.sink_config()?,
        })
    }

    fn engine_adapter(&self) -> Box<dyn CallGraphEngine> {
        match &self.call_graph {
            Some(dump) => Box::new(DumpFileEngine::new(dump)),
            None => Box::new(ExternalEngine::new(self.engine.clone())),
        }
    }
}

/// Run one export as described by `args` and print its summary.
pub fn run(args: &Args) -> Result<ExportSummary> {
    let config = args.to_config().context("Invalid configuration")?;
    let engine = args.engine_adapter();

    let summary = export_call_graph(&config, engine.as_ref(), &mut LogProgress)
        .context("Call graph export failed")?;

    print_summary(&summary, &config.sink);
    Ok(summary)
}

fn print_summary(summary: &ExportSummary, sink: &SinkConfig) {
    println!("Export Summary:");
    println!("  Edges in call graph: {}", summary.total);
    println!("  Edges processed:     {}", summary.processed);
    println!("  Edges exported:      {}", summary.admitted);
    match sink {
        SinkConfig::Json { output_folder } => println!("  Output: {}", output_folder.display()),
        SinkConfig::Neo4j { uri, .. } => println!("  Output: {}", uri),
        SinkConfig::Sqlite { path, .. } => println!("  Output: {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_flags_and_defaults() {
        let args = Args::try_parse_from(["cgexport", "-i", "in", "-o", "out", "-m", "a.Main"]).unwrap();
        assert_eq!(args.sink, SinkKind::Json);
        assert!(args.jar_filter.is_empty());
        assert_eq!(
            args.sink_config().unwrap(),
            SinkConfig::Json {
                output_folder: PathBuf::from("out")
            }
        );
    }

    #[test]
    fn test_missing_main_class_is_rejected() {
        assert!(Args::try_parse_from(["cgexport", "-i", "in", "-o", "out"]).is_err());
    }

    #[test]
    fn test_call_graph_makes_input_optional() {
        let args = Args::try_parse_from(["cgexport", "-o", "out", "--call-graph", "g.jsonl"]).unwrap();
        let config = args.to_config().unwrap();
        assert!(config.engine.input_archives.is_empty());
    }

    #[test]
    fn test_filters_are_repeatable() {
        let args = Args::try_parse_from([
            "cgexport",
            "-o",
            "out",
            "--call-graph",
            "g.jsonl",
            "--edge-filter",
            "jadx",
            "--edge-filter",
            "Parser",
            "--namespace-filter",
            "jadx.core",
        ])
        .unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.filter.identifier_patterns, vec!["jadx", "Parser"]);
        assert_eq!(config.filter.namespace_patterns, vec!["jadx.core"]);
    }

    #[test]
    fn test_sqlite_defaults_into_output_folder() {
        let args = Args::try_parse_from([
            "cgexport", "-o", "out", "--call-graph", "g.jsonl", "--sink", "sqlite", "--class-graph",
        ])
        .unwrap();
        assert_eq!(
            args.sink_config().unwrap(),
            SinkConfig::Sqlite {
                path: PathBuf::from("out").join(SQLITE_DEFAULT_FILE),
                class_graph: true
            }
        );
    }

    #[test]
    fn test_neo4j_sink_needs_no_output_folder() {
        let args = Args::try_parse_from(["cgexport", "--call-graph", "g.jsonl", "--sink", "neo4j"]).unwrap();
        assert!(args.output_folder.is_none());
        assert!(matches!(args.to_config().unwrap().sink, SinkConfig::Neo4j { .. }));
    }

    #[test]
    fn test_json_sink_without_output_folder_is_rejected() {
        let args = Args::try_parse_from(["cgexport", "--call-graph", "g.jsonl"]).unwrap();
        assert!(args.to_config().is_err());
    }

    #[test]
    fn test_sqlite_db_stands_in_for_output_folder() {
        let args = Args::try_parse_from([
            "cgexport", "--call-graph", "g.jsonl", "--sink", "sqlite", "--sqlite-db", "g.sqlite",
        ])
        .unwrap();
        assert_eq!(
            args.sink_config().unwrap(),
            SinkConfig::Sqlite {
                path: PathBuf::from("g.sqlite"),
                class_graph: false
            }
        );
    }

    #[test]
    fn test_neo4j_defaults() {
        let args = Args::try_parse_from([
            "cgexport", "-o", "out", "--call-graph", "g.jsonl", "--sink", "neo4j",
        ])
        .unwrap();
        match args.sink_config().unwrap() {
            SinkConfig::Neo4j { uri, user, .. } => {
                assert_eq!(uri, "bolt://localhost:7687");
                assert_eq!(user, "neo4j");
            }
            other => panic!("unexpected sink {other:?}"),
        }
    }
}
