use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use log::error;
use mirror::Acl;
use snapshot::{SnapshotId, StorageTarget, TargetKind};
use std::path::PathBuf;
use std::process::ExitCode;
use zkmirror::Config;

/// Back up a ZooKeeper tree to a local mirror and restore it again
#[derive(Parser, Debug)]
#[command(name = "zkmirror", version)]
struct Cli {
    /// ZooKeeper connect string, host:port[,host:port]
    #[arg(long, env = "ZKMIRROR_ENDPOINT", default_value = "", global = true)]
    endpoint: String,

    /// Storage target for snapshot archives
    #[arg(long, env = "ZKMIRROR_TARGET", default_value = "tty", global = true)]
    target: TargetKind,

    /// Directory holding archives for the local target
    #[arg(long, env = "ZKMIRROR_TARGET_DIR", global = true)]
    target_dir: Option<PathBuf>,

    /// Directory where mirrors are staged
    #[arg(long, env = "ZKMIRROR_WORK_DIR", default_value = ".", global = true)]
    work_dir: PathBuf,

    /// ACL for nodes created during restore
    #[arg(long, value_enum, default_value_t = AclArg::Open, global = true)]
    acl: AclArg,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mirror the tree and send it to the storage target
    Backup {
        /// Name for the snapshot instead of the current Unix time
        #[arg(long)]
        snapshot_id: Option<SnapshotId>,
    },
    /// Create every node of a stored snapshot that is absent from the tree
    Restore {
        /// Snapshot to restore
        snapshot_id: SnapshotId,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AclArg {
    Open,
    ReadOnly,
    CreatorAll,
}

impl From<AclArg> for Acl {
    fn from(arg: AclArg) -> Self {
        match arg {
            AclArg::Open => Acl::Open,
            AclArg::ReadOnly => Acl::ReadOnly,
            AclArg::CreatorAll => Acl::CreatorAll,
        }
    }
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let target = StorageTarget::from_kind(self.target, self.target_dir.clone())?;
        Ok(Config::new()
            .endpoint(self.endpoint.trim())
            .target(target)
            .work_dir(&self.work_dir)
            .acl(self.acl.into()))
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let succeeded = match cli.command {
        Command::Backup { snapshot_id } => {
            let config = match snapshot_id {
                Some(id) => config.snapshot_id(id),
                None => config,
            };
            zkmirror::backup(&config)
        }
        Command::Restore { snapshot_id } => zkmirror::restore(&config, &snapshot_id),
    };

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
