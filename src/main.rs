mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, CreateArgs, DbCommands, UpdateArgs, VcenterCommands};
use octopunch_common::{BackendKind, Config, RequestContext, VcenterId};
use octopunch_db::api::Database;
use octopunch_db::backend::Backend;
use octopunch_db::migrations;
use octopunch_db::models::{NewVcenter, VcenterFilters, VcenterInfo, VcenterUpdate};
use octopunch_db::sqlite::SqliteBackend;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATHS: &[&str] = &["./octopunch.toml", "/etc/octopunch/octopunch.toml"];

fn load_config(
    custom_path: Option<&Path>,
    database: Option<String>,
    backend: Option<BackendKind>,
) -> Result<Config> {
    let mut config = match custom_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => {
            let found = DEFAULT_CONFIG_PATHS
                .iter()
                .map(|p| PathBuf::from(*p))
                .find(|p| p.exists());
            Config::load_or_default(found.as_deref())
        }
    };

    if let Some(connection) = database {
        config.database.connection = connection;
    }
    if let Some(backend) = backend {
        config.database.backend = backend;
    }

    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    Ok(config)
}

fn parse_id(id: &str) -> Result<VcenterId> {
    Ok(id.parse()?)
}

/// Copy with the password replaced, for display.
fn masked(vcenter: &VcenterInfo) -> VcenterInfo {
    VcenterInfo {
        password: "******".to_string(),
        ..vcenter.clone()
    }
}

fn print_vcenter(vcenter: &VcenterInfo) {
    println!("ID:          {}", vcenter.id);
    println!("Name:        {}", vcenter.name);
    println!("Endpoint:    {}:{}", vcenter.host, vcenter.port);
    println!("Username:    {}", vcenter.username);
    println!("Datacenter:  {}", vcenter.datacenter.as_deref().unwrap_or("-"));
    println!("Description: {}", vcenter.description.as_deref().unwrap_or("-"));
    println!("Status:      {}", vcenter.status);
    println!("Created:     {}", vcenter.created_at.to_rfc3339());
    if let Some(updated_at) = vcenter.updated_at {
        println!("Updated:     {}", updated_at.to_rfc3339());
    }
}

fn run_db_command(config: &Config, command: DbCommands) -> Result<()> {
    match command {
        DbCommands::Sync | DbCommands::Version => {
            let backend = match config.database.backend {
                BackendKind::Sqlite => SqliteBackend::new(config.database.clone()),
            };
            if matches!(command, DbCommands::Sync) {
                let applied = backend.sync_schema()?;
                println!("Applied {} migration(s)", applied);
            }
            println!(
                "Schema version: {} (latest {})",
                backend.schema_version()?,
                migrations::latest_version()
            );
            Ok(())
        }
        DbCommands::Dispose => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let db = Database::open(&config.database)?;
                let disposed = db.backend().supports_safe_dispose();
                db.dispose_engine().await?;
                if disposed {
                    println!("Disposed {} engine", db.engine_name());
                } else {
                    println!("Engine {} is embedded; dispose skipped", db.engine_name());
                }
                Ok::<(), anyhow::Error>(())
            })
        }
    }
}

async fn run_vcenter_command(config: &Config, command: VcenterCommands) -> Result<()> {
    let db = Database::open(&config.database)?;
    let ctx = RequestContext::admin();

    match command {
        VcenterCommands::List {
            name,
            host,
            datacenter,
            status,
            json,
        } => {
            let filters = VcenterFilters {
                name,
                host,
                datacenter,
                status,
                ..Default::default()
            };
            let filters = (!filters.is_empty()).then_some(filters);
            let vcenters: Vec<_> = db
                .vcenter_get_all(&ctx, filters)
                .await?
                .iter()
                .map(masked)
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&vcenters)?);
            } else if vcenters.is_empty() {
                println!("No vCenters registered");
            } else {
                for vc in &vcenters {
                    println!(
                        "{}  {:<20} {}:{}  {}",
                        vc.id, vc.name, vc.host, vc.port, vc.status
                    );
                }
            }
        }
        VcenterCommands::Show { id, json } => {
            let vcenter = masked(&db.vcenter_get(&ctx, parse_id(&id)?).await?);
            if json {
                println!("{}", serde_json::to_string_pretty(&vcenter)?);
            } else {
                print_vcenter(&vcenter);
            }
        }
        VcenterCommands::Create(args) => {
            let values = new_vcenter(args)?;
            let vcenter = db.vcenter_create(&ctx, values).await?;
            tracing::info!("Registered vCenter {} ({})", vcenter.name, vcenter.id);
            print_vcenter(&masked(&vcenter));
        }
        VcenterCommands::Update(args) => {
            let id = parse_id(&args.id)?;
            let body = vcenter_update(args);
            let body = (!body.is_empty()).then_some(body);
            let vcenter = db.vcenter_update(&ctx, id, body).await?;
            print_vcenter(&masked(&vcenter));
        }
        VcenterCommands::Delete { id } => {
            let id = parse_id(&id)?;
            db.vcenter_delete(&ctx, id).await?;
            println!("Deleted vCenter {}", id);
        }
    }

    Ok(())
}

fn new_vcenter(args: CreateArgs) -> Result<NewVcenter> {
    let mut values = NewVcenter::new(args.name, args.host, args.username, args.password)
        .with_port(args.port);
    if let Some(id) = args.id {
        values = values.with_id(parse_id(&id)?);
    }
    values.datacenter = args.datacenter;
    values.description = args.description;
    Ok(values)
}

/// `Some(None)` clears the column, `None` leaves it alone.
fn clearable(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

fn vcenter_update(args: UpdateArgs) -> VcenterUpdate {
    VcenterUpdate {
        name: args.name,
        host: args.host,
        port: args.port,
        username: args.username,
        password: args.password,
        datacenter: clearable(args.datacenter, args.clear_datacenter),
        description: clearable(args.description, args.clear_description),
        status: args.status,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "octopunch_manage=debug,octopunch_db=debug,octopunch_common=debug".to_string()
        } else {
            "octopunch_manage=info,octopunch_db=info,octopunch_common=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => {
            println!("octopunch-manage {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Db(command) => {
            let config = load_config(cli.config.as_deref(), cli.database, cli.backend)?;
            run_db_command(&config, command)
        }
        Commands::Vcenter(command) => {
            let config = load_config(cli.config.as_deref(), cli.database, cli.backend)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_vcenter_command(&config, command))
        }
    }
}
