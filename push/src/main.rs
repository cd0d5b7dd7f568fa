//! Operator CLI driving the push pipeline against a file-backed store.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use serde::Serialize;
use tokio::runtime::Builder;

use momtn_push::config::PushSettings;
use momtn_push::domain::{
    DisplayedNotification, NavigationTarget, NotificationEvent, NotificationEventKind,
    PendingNotification,
};
use momtn_push::inbound::fcm::{parse_data_map, parse_remote_message};
use momtn_push::inbound::host::{InProcessHost, register_push_handlers};
use momtn_push::logging::init_tracing;
use momtn_push::outbound::kv::FileKeyValueStore;
use momtn_push::outbound::presenter::TracingNotificationPresenter;
use momtn_push::{PushPipeline, PushPipelinePorts};

/// `momtn-push` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "momtn-push",
    about = "Run Momtn push handling against a local store",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the background handler for a remote message (`-` reads stdin).
    Deliver {
        /// Remote message JSON file.
        #[arg(value_name = "path")]
        envelope: PathBuf,
    },
    /// Simulate a press on a notification carrying the given data map.
    Press {
        /// Data map JSON file.
        #[arg(value_name = "path")]
        data: PathBuf,
        /// Press an action button instead of the notification body.
        #[arg(long = "action", value_name = "id")]
        action: Option<String>,
    },
    /// Simulate a dismissal.
    Dismiss,
    /// Read and clear the pending navigation record.
    TakePending,
}

#[derive(Serialize)]
struct TakenPending<'a> {
    pending: &'a PendingNotification,
    target: Option<NavigationTarget>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = CliArgs::parse();
    let settings = PushSettings::load_from_iter([OsString::from("momtn-push")])
        .map_err(|error| eyre!("load settings: {error}"))?;
    init_tracing(settings.log_format()?);

    let store = FileKeyValueStore::open(&settings.store_dir()?)?;
    let pipeline = PushPipeline::new(
        PushPipelinePorts::new(
            Arc::new(store),
            Arc::new(TracingNotificationPresenter),
            Arc::new(DefaultClock),
        ),
        settings.presentation(),
    );
    let mut host = InProcessHost::new();
    register_push_handlers(&mut host, &pipeline);

    match args.command {
        Command::Deliver { envelope } => {
            let envelope = parse_remote_message(&read_input(&envelope)?)?;
            let outcome = host.deliver(envelope).await?;
            emit(&outcome)
        }
        Command::Press { data, action } => {
            let kind = action.map_or(NotificationEventKind::Press, |action_id| {
                NotificationEventKind::ActionPress { action_id }
            });
            let event = NotificationEvent {
                kind,
                notification: Some(DisplayedNotification {
                    id: None,
                    data: parse_data_map(&read_input(&data)?)?,
                }),
            };
            emit(&host.dispatch(event).await?)
        }
        Command::Dismiss => emit(&host.dispatch(NotificationEvent::dismissed()).await?),
        Command::TakePending => match pipeline.recorder.take_pending().await? {
            Some(pending) => emit(&TakenPending {
                target: pending.navigation_target(),
                pending: &pending,
            }),
            None => emit(&serde_json::Value::Null),
        },
    }
}

fn emit(value: &impl Serialize) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value).wrap_err("encode output")?;
    writeln!(stdout).wrap_err("write output")
}

fn read_input(path: &Path) -> Result<String> {
    let mut contents = String::new();
    if path == Path::new("-") {
        io::stdin()
            .read_to_string(&mut contents)
            .wrap_err("read stdin")?;
        return Ok(contents);
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("input path must be a file: {}", path.display()))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("open input directory '{}'", parent.display()))?;
    directory
        .open(Path::new(file_name))
        .and_then(|mut file| file.read_to_string(&mut contents))
        .wrap_err_with(|| format!("read input file '{}'", path.display()))?;
    Ok(contents)
}
