use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;
use uvkit_core::{
    CancelContext, CommandBuilder, CommandError, InstallOutcome, Installer, ManagedExecutable,
    UvConfig,
};

#[derive(Parser, Debug)]
#[clap(name = "uvkit", author, version = "0.1.0", about = "Provision and run Astral's uv")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(
        long,
        global = true,
        help = "Installation directory (defaults to $UVKIT_INSTALL_DIR, then an OS temp location)"
    )]
    install_dir: Option<PathBuf>,

    #[clap(long, short, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install uv and uvx unless already present
    Install {
        #[clap(long, help = "Fetch the install script from this URL instead of astral.sh")]
        script_url: Option<String>,

        #[clap(long, help = "HTTP timeout in seconds for the script download")]
        timeout: Option<u64>,
    },
    /// Print resolved paths
    Path {
        #[clap(value_enum, default_value = "dir")]
        target: PathTarget,
    },
    /// Run uv with the given arguments
    Uv(RunArgs),
    /// Run uvx with the given arguments
    Uvx(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    #[clap(long, help = "Kill the process after this many seconds")]
    timeout: Option<u64>,

    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PathTarget {
    Dir,
    Uv,
    Uvx,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let mut config = UvConfig::from_env();
    if let Some(dir) = cli.install_dir {
        config = config.with_install_dir(dir);
    }

    match cli.command {
        Commands::Install { script_url, timeout } => {
            if let Some(url) = script_url {
                config = config.with_script_url(url);
            }
            run_install(config, timeout).await
        }
        Commands::Path { target } => {
            let builder = CommandBuilder::new(config);
            let path = match target {
                PathTarget::Dir => builder.install_dir().to_path_buf(),
                PathTarget::Uv => builder.uv_path(),
                PathTarget::Uvx => builder.uvx_path(),
            };
            println!("{}", path.display());
            Ok(())
        }
        Commands::Uv(args) => run_managed(config, ManagedExecutable::Uv, args).await,
        Commands::Uvx(args) => run_managed(config, ManagedExecutable::Uvx, args).await,
    }
}

async fn run_install(config: UvConfig, timeout: Option<u64>) -> Result<()> {
    let mut client = reqwest::Client::builder();
    if let Some(secs) = timeout {
        client = client.timeout(Duration::from_secs(secs));
    }
    let client = client.build().context("Failed to build HTTP client")?;

    let installer = Installer::new(config).with_client(client);
    match installer.install().await? {
        InstallOutcome::AlreadyInstalled => {
            println!("uv already installed at {}", installer.config().install_dir().display())
        }
        InstallOutcome::Installed => {
            println!("uv installed at {}", installer.config().install_dir().display())
        }
    }
    Ok(())
}

async fn run_managed(config: UvConfig, exe: ManagedExecutable, run: RunArgs) -> Result<()> {
    let mut ctx = CancelContext::new();
    if let Some(secs) = run.timeout {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupted, stopping child process");
            interrupt.cancel();
        }
    });

    let builder = CommandBuilder::new(config);
    let command = builder.build_with_context(exe, &ctx, &run.args);
    match command.status().await {
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(CommandError::Spawn(e)) => Err(anyhow::Error::new(e).context(format!(
            "Could not start {} (run `uvkit install` first?)",
            builder.path(exe).display()
        ))),
        Err(e) => Err(e.into()),
    }
}
