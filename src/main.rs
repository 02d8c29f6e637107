#![forbid(unsafe_code)]

//! `lumos` command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use lumos_cli::config::{self, GlobalConfig};
use lumos_cli::console::{Console, TerminalConsole};
use lumos_cli::gateway::http::HttpGateway;
use lumos_cli::request::{
    cancel_request, prompt_request_id, report_poll, run_request, show_status, Poller,
    RequestArgs, StatusView,
};
use lumos_cli::{AppError, Result, Session};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "lumos", about = "Command line interface for Lumos", version, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Enable debug logging.
    #[arg(long, global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Request access to an app.
    #[command(args_conflicts_with_subcommands = true)]
    Request {
        #[command(flatten)]
        args: RequestFlags,

        #[command(subcommand)]
        command: Option<RequestCommand>,
    },

    /// Show information about the currently logged in user.
    Whoami {
        /// Show the current user's email only.
        #[arg(long, conflicts_with = "id")]
        username: bool,
        /// Show the current user's ID only.
        #[arg(long)]
        id: bool,
    },

    /// Store an API key in the OS keychain.
    Login,

    /// Remove the stored API key.
    Logout,
}

#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
struct RequestFlags {
    /// Business justification for the request.
    #[arg(long)]
    reason: Option<String>,

    /// ID of the user to request access for. Takes precedence over --user-like.
    #[arg(long, conflicts_with_all = ["for_me", "mine"])]
    for_user: Option<Uuid>,

    /// Make the request for the current user.
    #[arg(long)]
    for_me: bool,

    /// Make the request for the current user. Same as --for-me.
    #[arg(long)]
    mine: bool,

    /// App ID. Takes precedence over --app-like.
    #[arg(long)]
    app: Option<Uuid>,

    /// Permission ID; repeatable. Takes precedence over --permission-like.
    #[arg(long = "permission")]
    permissions: Vec<Uuid>,

    /// Access length in seconds, or text like '12 hours', '2d', 'unlimited'.
    #[arg(long)]
    length: Option<String>,

    /// Filters users shown when the request is not for the current user.
    #[arg(long)]
    user_like: Option<String>,

    /// Filters apps shown when selecting.
    #[arg(long)]
    app_like: Option<String>,

    /// Filters permissions shown when selecting.
    #[arg(long)]
    permission_like: Option<String>,

    /// Wait for the request to complete.
    #[arg(long, conflicts_with = "no_wait")]
    wait: bool,

    /// Do not wait for the request to complete.
    #[arg(long)]
    no_wait: bool,

    /// Print the request command without making the request.
    #[arg(long)]
    dry_run: bool,
}

impl RequestFlags {
    fn into_args(self) -> RequestArgs {
        let wait = match (self.wait, self.no_wait) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        RequestArgs {
            app_id: self.app,
            app_like: self.app_like,
            permission_ids: self.permissions,
            permission_like: self.permission_like,
            length: self.length,
            reason: self.reason,
            for_user: self.for_user,
            for_me: self.for_me || self.mine,
            user_like: self.user_like,
            wait,
            dry_run: self.dry_run,
        }
    }
}

#[derive(Debug, Subcommand)]
enum RequestCommand {
    /// Check the status of a request by ID, or `--last` for the most recent one.
    Status {
        /// Request ID.
        #[arg(long, conflicts_with = "last")]
        request_id: Option<String>,
        /// Show the most recent request.
        #[arg(long)]
        last: bool,
        /// Output status only.
        #[arg(long, group = "view")]
        status_only: bool,
        /// Output permissions only.
        #[arg(long, group = "view")]
        permission_only: bool,
        /// Output request ID only.
        #[arg(long, group = "view")]
        id_only: bool,
    },

    /// Poll a request by ID for up to 5 minutes.
    Poll {
        /// Request ID.
        #[arg(long)]
        request_id: Option<String>,
        /// How many minutes to wait (1-5).
        #[arg(long, default_value_t = 2)]
        wait: u64,
    },

    /// Cancel a pending request.
    Cancel {
        /// Request ID.
        #[arg(long)]
        request_id: Option<String>,
        /// Reason for cancellation.
        #[arg(long)]
        reason: Option<String>,
    },
}

/// Clamp a `poll --wait` value to whole minutes in `1..=5`.
fn wait_minutes_to_seconds(minutes: u64) -> u64 {
    minutes.clamp(1, 5) * 60
}

fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(args.log_format, args.debug) {
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")));

    let result = match runtime {
        Ok(runtime) => runtime.block_on(run(args)),
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    let mut console = TerminalConsole::new();

    match args.command {
        Command::Login => return login(config, &mut console).await,
        Command::Logout => {
            config::delete_api_key().await?;
            console.say(" 👋 Logged out!");
            return Ok(());
        }
        _ => {}
    }

    config.load_credentials().await?;
    let gateway = Arc::new(HttpGateway::new(&config)?);
    let session = Session::new(config, gateway);
    info!("session ready");

    match args.command {
        Command::Request { args, command } => {
            run_request_command(&session, &mut console, args, command).await
        }
        Command::Whoami { username, id } => whoami(&session, &mut console, username, id).await,
        Command::Login | Command::Logout => Ok(()),
    }
}

async fn run_request_command(
    session: &Session,
    console: &mut dyn Console,
    flags: RequestFlags,
    command: Option<RequestCommand>,
) -> Result<()> {
    match command {
        None => {
            run_request(session, console, flags.into_args()).await?;
            Ok(())
        }
        Some(RequestCommand::Status {
            request_id,
            last,
            status_only,
            permission_only,
            id_only,
        }) => {
            let view = if status_only {
                StatusView::StatusOnly
            } else if permission_only {
                StatusView::PermissionsOnly
            } else if id_only {
                StatusView::IdOnly
            } else {
                StatusView::Full
            };
            let request_id = match (last, request_id) {
                (false, raw) => Some(prompt_request_id(console, raw)?),
                (true, _) => None,
            };
            show_status(session, console, request_id, last, view).await?;
            Ok(())
        }
        Some(RequestCommand::Poll { request_id, wait }) => {
            let request_id = prompt_request_id(console, request_id)?;
            let outcome = Poller::from_config(&session.config().polling)
                .poll(
                    session.gateway(),
                    console,
                    request_id,
                    wait_minutes_to_seconds(wait),
                )
                .await?;
            report_poll(console, &outcome);
            Ok(())
        }
        Some(RequestCommand::Cancel { request_id, reason }) => {
            cancel_request(session, console, request_id, reason).await?;
            Ok(())
        }
    }
}

async fn whoami(
    session: &Session,
    console: &mut dyn Console,
    username: bool,
    show_id: bool,
) -> Result<()> {
    let user = session.current_user().await?;
    if username {
        console.say(&user.email);
    } else if show_id {
        console.say(&user.id.to_string());
    } else {
        console.say(&format!(" 💻 Logged in as {user}"));
        console.say(&format!("Your ID is {}, if you need to reference it", user.id));
    }
    Ok(())
}

async fn login(mut config: GlobalConfig, console: &mut dyn Console) -> Result<()> {
    console.say(" ⚙️ Go to your Lumos account > Settings > API Tokens > Add an API Token, and copy the token.");
    let api_key = console.input("API key")?;
    config::store_api_key(api_key.clone()).await?;
    config.api_key = api_key;

    let gateway = Arc::new(HttpGateway::new(&config)?);
    let session = Session::new(config, gateway);
    whoami(&session, console, false, false).await
}

fn init_tracing(log_format: LogFormat, debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
