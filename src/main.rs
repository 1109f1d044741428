use std::ffi::OsString;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ovirt_clusters::telemetry::{self, LogFormat};
use ovirt_clusters::Module;

/// Manage oVirt clusters the way Ansible binary modules do: read a JSON
/// argument file, print one JSON result document.
#[derive(Parser, Debug)]
#[command(name = "ovirt-clusters", version, about, long_about = None)]
struct Cli {
    /// Format of the log lines written to stderr
    #[arg(long, env = "OVIRT_CLUSTERS_LOG_FORMAT", value_enum, default_value_t)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create, update or remove a cluster to match its declared state
    Clusters {
        /// JSON argument file
        args: PathBuf,
    },

    /// Gather facts about clusters, optionally filtered by a name glob
    ClustersFacts {
        /// JSON argument file
        args: PathBuf,
    },
}

impl Commands {
    fn module(&self) -> (Module, &Path) {
        match self {
            Commands::Clusters { args } => (Module::Clusters, args),
            Commands::ClustersFacts { args } => (Module::ClustersFacts, args),
        }
    }
}

/// Command line, with the subcommand implied when invoked through a module
/// symlink such as `library/ovirt_clusters`.
fn cli_args() -> Vec<OsString> {
    let mut args: Vec<OsString> = std::env::args_os().collect();
    let module = args
        .first()
        .and_then(|program| Path::new(program).file_stem())
        .and_then(|stem| stem.to_str())
        .and_then(Module::from_program_name);

    if let Some(module) = module {
        args.insert(1, module.subcommand().into());
    }
    args
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_from(cli_args());
    telemetry::init(cli.log_format).await?;

    let (module, args) = cli.command.module();
    let result = module.run(args).await;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, &result)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(match result.failed {
        true => ExitCode::FAILURE,
        false => ExitCode::SUCCESS,
    })
}
