use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agile_map::api::{self, AppState};
use agile_map::attributes::IterationLabelMode;
use agile_map::catalog::Catalog;
use agile_map::client::ProviderClient;
use agile_map::config::{spacing_from_slider, Config};
use agile_map::db::Database;
use agile_map::host::{connect_host, MemoryHost, RenderHost};
use agile_map::session::Dataset;
use agile_map::status::Status;
use agile_map::tree_render::render_tree;
use agile_map::workbench::Workbench;

#[derive(Parser)]
#[command(name = "agmap")]
#[command(about = "Lay out agile work item hierarchies as node maps in a 3D/VR graph host")]
struct Cli {
    /// Data provider base URL (overrides config)
    #[arg(long, global = true)]
    provider_url: Option<String>,

    /// Render host bridge URL (overrides config)
    #[arg(long, global = true)]
    host_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the fixture data provider
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Catalog JSON file (default: built-in demo catalog)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Keep saved maps in memory instead of the data directory
        #[arg(long)]
        memory_db: bool,
    },
    /// Load work items and lay them out on the host
    Layout {
        #[command(flatten)]
        selection: Selection,

        /// Lay out against an in-memory host and print the positions
        #[arg(long)]
        dry_run: bool,

        /// Horizontal spacing as a slider position (0-1000); --x-spacing wins
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=1000))]
        spacing_slider: Option<u32>,

        #[arg(long)]
        x_spacing: Option<f64>,

        #[arg(long)]
        y_spacing: Option<f64>,

        #[arg(long)]
        z_offset: Option<f64>,

        /// Link labels: name or start-date
        #[arg(long)]
        labels: Option<IterationLabelMode>,
    },
    /// Print the loaded hierarchy as a tree
    Tree {
        #[command(flatten)]
        selection: Selection,
    },
    /// List organizations, projects, teams and saved queries
    Meta,
    /// List a team's sprints
    Sprints {
        #[arg(short, long)]
        team: String,
    },
    /// List host nodes, or show one
    Nodes { uuid: Option<String> },
    /// List host links, or show one
    Links { uuid: Option<String> },
    /// Save the host map and send it to the provider
    SaveMap {
        /// Also write the map to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Replace the host map with a saved one
    LoadMap { file: PathBuf },
    /// Remove everything from the host map
    ClearMap,
    /// Show the host user
    User,
}

#[derive(clap::Args)]
struct Selection {
    #[arg(short, long)]
    team: Option<String>,

    #[arg(short, long)]
    sprint: Option<String>,

    /// Saved query id, used instead of a sprint
    #[arg(short, long)]
    query: Option<String>,
}

enum Source {
    Sprint { team: String, sprint: String },
    Query { query: String, team: String },
}

impl Selection {
    fn source(self) -> anyhow::Result<Source> {
        match (self.team, self.sprint, self.query) {
            (Some(team), None, Some(query)) => Ok(Source::Query { query, team }),
            (Some(team), Some(sprint), None) => Ok(Source::Sprint { team, sprint }),
            _ => bail!("Select either --team with --sprint, or --query with --team"),
        }
    }
}

/// Initialize tracing on stderr so command output on stdout stays clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "agile_map=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(port: u16, catalog: Option<PathBuf>, memory_db: bool) -> anyhow::Result<()> {
    let catalog = match catalog {
        Some(path) => Catalog::load(&path)?,
        None => Catalog::sample()?,
    };
    let db = if memory_db {
        Database::open_memory()?
    } else {
        Database::open_default()?
    };
    db.migrate()?;

    let app = api::create_router(AppState::new(catalog, db));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!(
        "Data provider listening on http://127.0.0.1:{}/api/agile",
        port
    );

    axum::serve(listener, app).await?;
    Ok(())
}

async fn fetch(bench: &mut Workbench, source: &Source) -> anyhow::Result<Dataset> {
    let dataset = match source {
        Source::Sprint { team, sprint } => bench.fetch_sprint(team, sprint).await?,
        Source::Query { query, team } => bench.fetch_query(query, team).await?,
    };
    Ok(dataset)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the final status line; an error status fails the command.
fn finish(bench: &Workbench) -> anyhow::Result<()> {
    match bench.status().status() {
        Status::Error(message) => bail!("{}", message),
        Status::Success(message) => {
            eprintln!("{}", message);
            Ok(())
        }
        Status::Idle => Ok(()),
    }
}

/// Connect the provider and host for one command. Dry runs use an in-memory host,
/// returned alongside so its contents can be printed.
async fn workbench(config: &Config, dry_run: bool) -> (Workbench, Option<MemoryHost>) {
    let provider = ProviderClient::from_config(config);
    if dry_run {
        let host = MemoryHost::default();
        let bench = Workbench::new(provider, Arc::new(host.clone()), config.layout);
        return (bench, Some(host));
    }
    let host: Arc<dyn RenderHost> = connect_host(config.host_url.as_deref()).await;
    (Workbench::new(provider, host, config.layout), None)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::load();
    if let Some(url) = cli.provider_url {
        config.provider_url = url;
    }
    if let Some(url) = cli.host_url {
        config.host_url = Some(url);
    }

    let bench = match cli.command {
        Commands::Serve {
            port,
            catalog,
            memory_db,
        } => return serve(port, catalog, memory_db).await,
        Commands::Layout {
            selection,
            dry_run,
            spacing_slider,
            x_spacing,
            y_spacing,
            z_offset,
            labels,
        } => {
            let layout = &mut config.layout;
            if let Some(position) = spacing_slider {
                layout.x_spacing = spacing_from_slider(position);
            }
            layout.x_spacing = x_spacing.unwrap_or(layout.x_spacing);
            layout.y_spacing = y_spacing.unwrap_or(layout.y_spacing);
            layout.z_offset = z_offset.unwrap_or(layout.z_offset);
            layout.iteration_labels = labels.unwrap_or(layout.iteration_labels);

            let source = selection.source()?;
            let (mut bench, memory_host) = workbench(&config, dry_run).await;
            let report = match &source {
                Source::Sprint { team, sprint } => {
                    bench.select_team(team).await?;
                    bench.load_by_sprint(team, sprint).await?
                }
                Source::Query { query, team } => {
                    bench.select_team(team).await?;
                    bench.load_by_query(query, team).await?
                }
            };

            if let Some(report) = report {
                println!(
                    "created {}  updated {}  placeholders {}  links {} (deleted {}, skipped {})  failures {}",
                    report.nodes_created,
                    report.nodes_updated,
                    report.placeholders,
                    report.links_created,
                    report.links_deleted,
                    report.links_skipped,
                    report.failures.len()
                );
            }
            for node in memory_host.map(|h| h.nodes()).unwrap_or_default() {
                println!(
                    "{:>8}  x={:>7.3} y={:>7.3} z={:>7.3}  {}",
                    node.notes, node.location.x, node.location.y, node.location.z, node.title
                );
            }
            bench
        }
        command => {
            let (mut bench, _) = workbench(&config, false).await;
            run(&mut bench, command).await?;
            bench
        }
    };

    finish(&bench)
}

async fn run(bench: &mut Workbench, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve { .. } | Commands::Layout { .. } => {}
        Commands::Tree { selection } => {
            let source = selection.source()?;
            let dataset = fetch(bench, &source).await?;
            print!("{}", render_tree(&dataset));
        }
        Commands::Meta => {
            let metadata = bench.refresh_metadata().await?;
            println!("Organizations: {}", metadata.organizations.join(", "));
            println!("Projects:      {}", metadata.projects.join(", "));
            println!("Teams:         {}", metadata.teams.join(", "));
            println!("Queries:");
            for query in &metadata.queries {
                println!("  {}  {}", query.uuid, query.path);
            }
        }
        Commands::Sprints { team } => {
            for sprint in bench.select_team(&team).await? {
                let start = sprint.start.map(|d| d.format("%Y-%m-%d").to_string());
                let end = sprint.end.map(|d| d.format("%Y-%m-%d").to_string());
                println!(
                    "{}  {} .. {}",
                    sprint.name,
                    start.unwrap_or_default(),
                    end.unwrap_or_default()
                );
            }
        }
        Commands::Nodes { uuid } => match uuid {
            Some(uuid) => {
                if let Some(node) = bench.get_node(&uuid).await {
                    print_json(&node)?;
                }
            }
            None => print_json(&bench.list_nodes().await)?,
        },
        Commands::Links { uuid } => match uuid {
            Some(uuid) => {
                if let Some(link) = bench.get_link(&uuid).await {
                    print_json(&link)?;
                }
            }
            None => print_json(&bench.list_links().await)?,
        },
        Commands::SaveMap { out } => {
            if let (Some(json), Some(path)) = (bench.save_map().await?, out) {
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }
        Commands::LoadMap { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            bench.load_map(Some(&json)).await;
        }
        Commands::ClearMap => {
            bench.clear_map().await;
        }
        Commands::User => {
            if let Some(user) = bench.populate_user().await {
                println!("{}", user.user_id);
            }
        }
    }
    Ok(())
}
