// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand, ValueEnum};
use n8n_deploy::config::DeployArgs;
use n8n_deploy::deploy::EdgePhase;
use n8n_deploy::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "n8n-deploy")]
#[command(about = "Idempotent remote deployment for self-hosted n8n stacks")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Normal, global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Normal,
    /// Only the final result
    Quiet,
    /// JSON lines
    Json,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Normal => OutputMode::Normal,
            OutputFormat::Quiet => OutputMode::Quiet,
            OutputFormat::Json => OutputMode::Json,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sync project files, converge containers, and optionally configure the edge
    Deploy {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        edge: EdgeArgs,

        /// Number of worker replicas
        #[arg(long)]
        workers: Option<u32>,

        /// Describe every remote action without performing any
        #[arg(long)]
        dry_run: bool,
    },

    /// Configure (or resume configuring) reverse proxy and TLS only
    Edge {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        edge: EdgeArgs,

        /// Sub-phase to start from
        #[arg(long, default_value = "scripts-staged")]
        from: EdgePhase,

        /// Worker replicas to keep when services are recreated
        #[arg(long)]
        workers: Option<u32>,

        /// Describe every remote action without performing any
        #[arg(long)]
        dry_run: bool,
    },

    /// Report service health without deploying
    Status {
        #[command(flatten)]
        target: TargetArgs,

        /// Include the reverse proxy in the report
        #[arg(long)]
        domain: Option<String>,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    /// Remote host, optionally as user@host:port
    #[arg(long)]
    pub host: Option<String>,

    /// SSH user
    #[arg(short, long)]
    pub user: Option<String>,

    /// Private key path, or "agent" to use the SSH agent [default: ~/.ssh/id_rsa]
    #[arg(short, long)]
    pub key: Option<String>,

    /// SSH port [default: 22]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Deployment directory on the remote host [default: /opt/n8n]
    #[arg(long)]
    pub remote_path: Option<String>,

    /// Local project directory
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Refuse unknown host keys instead of trusting them on first use
    #[arg(long)]
    pub strict_host_key: bool,
}

#[derive(Args)]
pub struct EdgeArgs {
    /// Public domain served through nginx
    #[arg(long)]
    pub domain: Option<String>,

    /// Obtain a TLS certificate (requires --domain and --email)
    #[arg(long)]
    pub ssl: bool,

    /// Contact email for the certificate authority
    #[arg(long)]
    pub email: Option<String>,
}

impl TargetArgs {
    pub fn into_deploy_args(self) -> DeployArgs {
        DeployArgs {
            host: self.host,
            user: self.user,
            port: self.port,
            key: self.key,
            remote_path: self.remote_path,
            strict_host_key: self.strict_host_key,
            project_dir: self.project_dir,
            ..Default::default()
        }
    }
}

impl EdgeArgs {
    pub fn apply(self, args: &mut DeployArgs) {
        args.domain = self.domain;
        args.ssl = self.ssl;
        args.email = self.email;
    }
}
