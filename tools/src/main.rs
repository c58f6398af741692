use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use control::FieldExportTable;
use glob::Pattern;
use session::{Session, SessionConfig, SessionError};
use tools::{format_report_pretty, inspect_datagram};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use wire::Limits;

#[derive(Parser)]
#[command(
    name = "uenet-tools",
    version,
    about = "uenet connection and datagram inspection tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Handshake with a server, then send hello and login.
    Connect {
        host: String,
        port: u16,
        /// Travel URL sent in the login.
        #[arg(long, default_value = "/Game/Maps/Entry")]
        url: String,
        /// Network version announced in the hello (decimal or 0x-prefixed hex).
        #[arg(long, value_parser = parse_u32)]
        network_version: Option<u32>,
        /// Receive timeout in milliseconds; 0 waits forever.
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,
        /// Send a join after the login.
        #[arg(long)]
        join: bool,
        /// Export this object path under `--export-guid`.
        #[arg(long, requires = "export_guid")]
        export_path: Option<String>,
        #[arg(long, value_parser = parse_u32)]
        export_guid: Option<u32>,
        /// Send the placeholder field export table.
        #[arg(long)]
        export_fields: bool,
        /// Control messages to wait for after sending.
        #[arg(long, default_value_t = 1)]
        listen: usize,
    },
    /// Decode captured datagrams.
    Inspect {
        /// A datagram file, or a directory of them.
        path: PathBuf,
        /// Filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected datagrams.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected datagrams (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Connect {
            host,
            port,
            url,
            network_version,
            timeout_ms,
            join,
            export_path,
            export_guid,
            export_fields,
            listen,
        } => {
            let remote = resolve(&host, port)?;
            let mut config =
                SessionConfig::default().with_recv_timeout(Some(Duration::from_millis(timeout_ms)));
            if let Some(version) = network_version {
                config = config.with_network_version(version);
            }

            let mut session = Session::connect_udp(remote, config)
                .with_context(|| format!("connect to {remote}"))?;
            session.hello().context("send hello")?;
            session.login(&url).context("send login")?;
            if join {
                session.join().context("send join")?;
            }
            if let (Some(net_guid), Some(path)) = (export_guid, export_path.as_deref()) {
                session.export_guid(net_guid, path).context("send guid export")?;
            }
            if export_fields {
                session
                    .export_fields(&FieldExportTable::default())
                    .context("send field exports")?;
            }

            for _ in 0..listen {
                match session.receive_message() {
                    Ok(message) => println!("{message:?}"),
                    Err(err @ SessionError::PeerFailure { .. }) => {
                        println!("{err}");
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, class = ?err.class(), "receive failed");
                        break;
                    }
                }
            }
        }
        Command::Inspect {
            path,
            glob,
            sort,
            limit,
            format,
        } => {
            let limits = Limits::default();
            if path.is_dir() {
                let mut entries = collect_entries(&path, glob.as_deref())?;
                if let Some(InspectSort::Size) = sort {
                    entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
                }
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    inspect_file(&entry.path, &limits, format)?;
                }
            } else {
                inspect_file(&path, &limits, format)?;
            }
        }
    }
    Ok(())
}

fn parse_u32(value: &str) -> Result<u32, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|err| format!("invalid u32 {value:?}: {err}"))
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("resolve {host}:{port}"))?
        .next()
        .with_context(|| format!("no address for {host}:{port}"))
}

fn inspect_file(path: &Path, limits: &Limits, format: OutputFormat) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("read datagram {}", path.display()))?;
    let report = inspect_datagram(&bytes, limits)
        .with_context(|| format!("inspect {}", path.display()))?;
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => print!("{}", format_report_pretty(&report)),
    }
    Ok(())
}

struct DatagramEntry {
    path: PathBuf,
    size: u64,
}

fn collect_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<DatagramEntry>> {
    let pattern = glob
        .map(|value| Pattern::new(value).context("invalid glob pattern"))
        .transpose()?;

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !pattern.matches_path(&path) && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(DatagramEntry { path, size });
    }
    Ok(entries)
}
