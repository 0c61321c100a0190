use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;

use clap_verbosity_flag::{InfoLevel, Verbosity};
use linux_embedded_hal::I2cdev;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use i2ckbd_lib::constants::{DEFAULT_ADDRESS, DEFAULT_BUS};
use i2ckbd_lib::{I2cTransport, KeyId, KeyMap, Session};

const SAMPLE_TEXT: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ\nabcdefghijklmnopqrstuvwxyz\n0123456789\n";

type BusSession = Session<I2cTransport<I2cdev>>;

/// Drive an Arduino HID keyboard attached to the I2C bus.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The I2C bus device
    #[arg(short, long, default_value = DEFAULT_BUS)]
    bus: PathBuf,
    /// Bus address of the keyboard (decimal or 0x-prefixed hex)
    #[arg(short, long, default_value = "0x10", value_parser = parse_address)]
    address: u8,
    /// JSON key map to use instead of the built-in German layout
    #[arg(short, long)]
    keymap: Option<PathBuf>,
    /// Optional path to a file to write logs to, in addition to the console.
    #[arg(short, long)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify the keyboard and report the switch and LED state
    Status,
    /// Run every key action for every key id and measure the throughput
    Speedtest,
    /// Type TEXT, or a set of sample lines when omitted
    SendText { text: Option<String> },
    /// Press every sequence of the key map once
    SendKeymap,
    /// Press a single key id
    Press {
        #[arg(value_parser = parse_key_id)]
        key: KeyId,
    },
    /// Release a single key id
    Release {
        #[arg(value_parser = parse_key_id)]
        key: KeyId,
    },
    /// Release every key
    ReleaseAll,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    let address = parsed.map_err(|e| format!("invalid address {:?}: {}", s, e))?;
    if address > 0x7f {
        return Err(format!("address {:#04x} is outside the 7-bit range", address));
    }
    Ok(address)
}

fn parse_key_id(s: &str) -> Result<KeyId, String> {
    s.parse::<u8>()
        .map(KeyId)
        .map_err(|e| format!("invalid key id {:?}: {}", s, e))
}

fn setup_logging(
    log_file_path: Option<PathBuf>,
    verbosity: &Verbosity<InfoLevel>,
) -> Result<Option<WorkerGuard>> {
    // Logs go to stderr, stdout only carries command results.
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = if let Some(ref path) = log_file_path {
        let log_file = File::create(path)
            .with_context(|| format!("Failed to create log file at: {:?}", path))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(log_file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // INFO by default, DEBUG with -v, nothing below ERROR with -q
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file_path {
        info!("Logging to file: {:?}", path);
    }

    Ok(guard)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file.clone(), &cli.verbose)?;

    if let Err(e) = run(cli) {
        error!("i2ckbd failed: {:?}", e);
        process::exit(1);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let keymap = match &cli.keymap {
        Some(path) => KeyMap::from_path(path)
            .with_context(|| format!("Failed to load key map from {:?}", path))?,
        None => KeyMap::german(),
    };

    let mut session = open_session(&cli.bus, cli.address)?;

    match cli.command {
        Command::Status => {
            let enabled = session.keyboard_enabled()?;
            println!("{}", status_line(&cli.bus, cli.address, enabled, session.led_on()));
        }
        Command::Speedtest => {
            let report = session.speed_test()?;
            println!("{}", report);
        }
        Command::SendText { text } => {
            warn_if_disabled(&mut session)?;
            let text = text.as_deref().unwrap_or(SAMPLE_TEXT);
            let typed = session.send_text(text, &keymap)?;
            info!("Typed {} of {} characters", typed, text.chars().count());
        }
        Command::SendKeymap => {
            warn_if_disabled(&mut session)?;
            send_keymap(&mut session, &keymap)?;
        }
        Command::Press { key } => {
            let outcome = session.press(key)?;
            if let Err(e) = outcome.result {
                bail!("press of key {} was not confirmed: {}", key, e);
            }
        }
        Command::Release { key } => {
            let outcome = session.release(key)?;
            if let Err(e) = outcome.result {
                bail!("release of key {} was not confirmed: {}", key, e);
            }
        }
        Command::ReleaseAll => {
            if !session.release_all()? {
                bail!("release all did not get through to {:#04x}", cli.address);
            }
        }
    }

    Ok(())
}

fn open_session(bus: &Path, address: u8) -> Result<BusSession> {
    let dev = I2cdev::new(bus).with_context(|| format!("Failed to open I2C bus {:?}", bus))?;
    info!("Opened I2C bus {:?}, keyboard address {:#04x}", bus, address);
    if address != DEFAULT_ADDRESS {
        warn!("Using non-default keyboard address {:#04x}", address);
    }

    let session = Session::new(I2cTransport::new(dev), address);
    if !session.is_verified() {
        bail!("No i2ckeyboard found on {:?} at address {:#04x}", bus, address);
    }
    Ok(session)
}

fn warn_if_disabled(session: &mut BusSession) -> Result<()> {
    if !session.keyboard_enabled()? {
        warn!("Keyboard is not set to sending keys! Enable hardware switch for testing!");
    }
    Ok(())
}

fn send_keymap(session: &mut BusSession, keymap: &KeyMap) -> Result<()> {
    for (c, strokes) in keymap.entries() {
        session.type_strokes(c, strokes)?;
    }
    info!("Sent {} key map entries", keymap.len());
    Ok(())
}

fn status_line(bus: &Path, address: u8, switch_on: bool, led_on: bool) -> String {
    let on_off = |on: bool| if on { "on" } else { "off" };
    format!(
        "i2ckeyboard on {:?} at {:#04x}: switch is {}, LED is {}",
        bus,
        address,
        on_off(switch_on),
        on_off(led_on)
    )
}
