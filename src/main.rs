use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sos_beacon::alert::{RecordingDispatcher, SystemDispatcher, UriDispatcher};
use sos_beacon::clock::{format_clock, Clock, SystemClock};
use sos_beacon::config::{self, AppConfig};
use sos_beacon::contacts::format_for_display;
use sos_beacon::db::{self, Database};
use sos_beacon::device::{
    DeviceProbes, IpClient, LocationProvider, NoLocation, StaticLocation, SysfsBattery,
};
use sos_beacon::models::{Channel, SendPolicy};
use sos_beacon::widget::{Command, StatusMessage, Widget};

#[derive(Parser)]
#[command(name = "sos")]
#[command(about = "Send emergency SOS alerts by call, SMS or WhatsApp")]
struct Cli {
    /// Print URIs instead of opening them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Config file to use instead of the one in the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage emergency contacts
    Contacts {
        #[command(subcommand)]
        command: ContactCommands,
    },
    /// Send an SOS alert to the stored contacts
    Sos {
        #[arg(short, long, value_enum, default_value_t = ChannelArg::Sms)]
        channel: ChannelArg,

        /// Override the configured send policy for this channel
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
    },
    /// Call a contact by list position, a phone number, or an emergency
    /// number such as 112
    Call { target: String },
    /// Share the alert over WhatsApp with one contact, or with all of them
    Share {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        position: Option<u64>,
    },
    /// Show location, public IP and battery
    Status,
    /// Print the alert message that would be sent now
    Message,
    /// Show a clock that updates every second
    Clock {
        /// Stop after this many updates (0 runs until interrupted)
        #[arg(long, default_value = "0")]
        ticks: u64,
    },
    /// Turn the SOS tone on or off
    Sound,
}

#[derive(Subcommand)]
enum ContactCommands {
    List,
    Add {
        number: String,
    },
    Remove {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        position: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelArg {
    Call,
    Sms,
    Whatsapp,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Call => Channel::Call,
            ChannelArg::Sms => Channel::Sms,
            ChannelArg::Whatsapp => Channel::WhatsApp,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    BroadcastFirst,
    Sequential,
}

impl From<PolicyArg> for SendPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::BroadcastFirst => SendPolicy::BroadcastFirst,
            PolicyArg::Sequential => SendPolicy::Sequential,
        }
    }
}

/// Logs go to stderr so stdout carries only messages and URIs.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "sos_beacon=info,sos=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// The config file in use and its settings. An explicit `--config` file
/// must parse; the default one falls back to defaults.
fn load_config(path: Option<PathBuf>) -> anyhow::Result<(PathBuf, AppConfig)> {
    match path {
        Some(path) => {
            let mut config = AppConfig::load_from(&path)?;
            config.apply_env(|key| std::env::var(key).ok());
            Ok((path, config))
        }
        None => {
            let path = config::config_path()?;
            let config = AppConfig::load(&path);
            Ok((path, config))
        }
    }
}

fn build_probes(config: &AppConfig) -> anyhow::Result<DeviceProbes> {
    let location: Arc<dyn LocationProvider> = match config.location {
        Some(location) => Arc::new(StaticLocation(location)),
        None => Arc::new(NoLocation),
    };
    let ip = IpClient::new(config.ip_url.clone(), config.ip_timeout())
        .context("Failed to build HTTP client")?;
    let battery = SysfsBattery::new(config.power_supply_dir.clone());

    Ok(DeviceProbes::new(location, Arc::new(ip), Arc::new(battery)))
}

fn finish(status: StatusMessage) -> anyhow::Result<()> {
    if status.is_error() {
        anyhow::bail!(status.text);
    }
    println!("{}", status.text);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let (config_path, mut config) = load_config(cli.config.clone())?;
    if let Commands::Sos {
        channel,
        policy: Some(policy),
    } = &cli.command
    {
        config.policies.set((*channel).into(), (*policy).into());
    }

    let db_path = match &config.database_path {
        Some(path) => path.clone(),
        None => db::default_path()?,
    };
    let db = Database::open(db_path)?;
    db.migrate()?;

    let recorder = RecordingDispatcher::new();
    let dispatcher: Arc<dyn UriDispatcher> = if cli.dry_run {
        Arc::new(recorder.clone())
    } else {
        Arc::new(SystemDispatcher)
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.utc_offset()));

    let probes = build_probes(&config)?;
    let mut widget = Widget::mount(config, db, probes, dispatcher, clock.clone());

    let result = run(cli.command, &mut widget, &config_path, clock.as_ref()).await;

    for uri in recorder.uris() {
        println!("{}", uri);
    }
    result
}

async fn run(
    command: Commands,
    widget: &mut Widget,
    config_path: &Path,
    clock: &dyn Clock,
) -> anyhow::Result<()> {
    match command {
        Commands::Contacts { command } => match command {
            ContactCommands::List => {
                if widget.contacts().is_empty() {
                    println!("No emergency contacts added");
                }
                for (i, contact) in widget.contacts().iter().enumerate() {
                    println!(
                        "Emergency Contact {}: {}",
                        i + 1,
                        format_for_display(contact.as_str())
                    );
                }
                Ok(())
            }
            ContactCommands::Add { number } => {
                finish(widget.handle(Command::AddContact(number)).await)
            }
            ContactCommands::Remove { position } => {
                finish(widget.handle(Command::RemoveContact(to_index(position))).await)
            }
        },
        Commands::Sos { channel, .. } => {
            for e in widget.refresh_device().await {
                tracing::debug!("device probe failed: {}", e);
            }
            let status = widget.handle(Command::SendSos(channel.into())).await;
            if status.is_error() {
                return finish(status);
            }
            println!("{}", status.text);
            drive_sequential(widget).await
        }
        Commands::Call { target } => {
            let command = Command::call(&target).with_context(|| {
                format!("Not a contact position, phone number or emergency number: {}", target)
            })?;
            finish(widget.handle(command).await)
        }
        Commands::Share { position } => {
            for e in widget.refresh_device().await {
                tracing::debug!("device probe failed: {}", e);
            }
            let command = match position {
                Some(position) => Command::ShareWithContact(to_index(position)),
                None => Command::ShareWithAll,
            };
            finish(widget.handle(command).await)
        }
        Commands::Status => {
            widget.refresh_device().await;
            let snapshot = widget.snapshot();
            println!("Location: {}", widget.location_status());
            println!("IP Address: {}", snapshot.ip);
            println!("Battery: {}", snapshot.battery);
            println!("Time: {}", format_clock(&clock.now()));
            println!("Contacts: {}", widget.contacts().len());
            Ok(())
        }
        Commands::Message => {
            widget.refresh_device().await;
            println!("{}", widget.compose_now());
            Ok(())
        }
        Commands::Clock { ticks } => {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            let mut shown = 0u64;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        println!("{}", format_clock(&clock.now()));
                        shown += 1;
                        if ticks > 0 && shown >= ticks {
                            return Ok(());
                        }
                    }
                    _ = tokio::signal::ctrl_c() => return Ok(()),
                }
            }
        }
        Commands::Sound => {
            let status = widget.handle(Command::ToggleSound).await;
            AppConfig::store_sound_enabled(config_path, widget.sound_enabled())
                .with_context(|| format!("Failed to save {}", config_path.display()))?;
            finish(status)
        }
    }
}

/// Walk the user through a sequential send, one contact per confirmation.
async fn drive_sequential(widget: &mut Widget) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let Some((next, remaining)) = widget
            .pending_send()
            .and_then(|send| Some((send.peek()?.clone(), send.remaining())))
        else {
            return Ok(());
        };

        eprint!(
            "Press Enter to send to {} ({} left), or type c to cancel: ",
            format_for_display(next.as_str()),
            remaining
        );
        let line = lines.next_line().await?;
        let command = match line.as_deref().map(str::trim) {
            None | Some("c") | Some("cancel") => Command::CancelSend,
            Some(_) => Command::ContinueSend,
        };
        println!("{}", widget.handle(command).await.text);
    }
}

/// One-based list position to zero-based index.
fn to_index(position: u64) -> usize {
    position
        .checked_sub(1)
        .and_then(|p| usize::try_from(p).ok())
        .unwrap_or(usize::MAX)
}
