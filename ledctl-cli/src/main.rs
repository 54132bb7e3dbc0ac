use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use ledctl_lib::constants::{DEFAULT_BAUD_RATE, DEFAULT_PORT};
use ledctl_lib::{Command, Controller, DeviceConfig, LedError, Response, Rgb, decode};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Send commands to an LED-matrix display controller over a serial line (8N1).
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serial device the controller is attached to
    #[arg(short, long, env = "LEDCTL_PORT", default_value = DEFAULT_PORT)]
    port: PathBuf,

    /// Screen to address (1 = primary, 2 = secondary, ...)
    #[arg(short, long, env = "LEDCTL_SCREEN", default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..))]
    screen: u8,

    /// Line rate in bits per second
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// How long to wait for a response after each command, in milliseconds
    #[arg(long, default_value_t = 500)]
    timeout_ms: u64,

    /// Do not wait for responses
    #[arg(long)]
    no_response: bool,

    /// Print the frames as hex instead of opening the port
    #[arg(long)]
    dry_run: bool,

    /// Refuse commands the controller is known to reject
    #[arg(long)]
    strict: bool,

    /// Print decoded responses as JSON
    #[arg(long)]
    json: bool,

    /// Optional path to a file to write logs to, in addition to the console
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Clear the screen
    Clear,
    /// Set brightness in percent (0-100)
    Brightness { level: u8 },
    /// Play a GIF stored on the controller
    Gif {
        /// Path on the controller
        filename: String,
        #[arg(long, default_value_t = 0)]
        x: u16,
        #[arg(long, default_value_t = 0)]
        y: u16,
        #[arg(long, default_value_t = 96)]
        width: u16,
        #[arg(long, default_value_t = 96)]
        height: u16,
    },
    /// Draw a line of text
    Text {
        text: String,
        #[arg(long, default_value_t = 0)]
        x: u16,
        #[arg(long, default_value_t = 0)]
        y: u16,
        /// Font size (1-8)
        #[arg(long, default_value_t = 2)]
        size: u8,
        /// Colour as RRGGBB
        #[arg(long, default_value = "ffffff")]
        color: Rgb,
        /// Font name on the controller; empty for the default font
        #[arg(long, default_value = "")]
        font: String,
    },
    /// Ask the controller for its status
    Status,
    /// Run the bench sequence: clear, brightness, two texts, a GIF, status
    Demo,
}

/// A command and how long to pause after it
type Step = (Command, Duration);

fn setup_logging(log_file_path: Option<&PathBuf>, verbosity: &Verbosity<InfoLevel>) -> Result<Option<WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = if let Some(path) = log_file_path {
        let log_file = File::create(path).with_context(|| format!("Failed to create log file at: {:?}", path))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(log_file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // INFO by default, DEBUG with -v (frame hex), TRACE with -vv
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn steps(action: &Action) -> Vec<Step> {
    let none = Duration::ZERO;
    match action {
        Action::Clear => vec![(Command::ClearScreen, none)],
        Action::Brightness { level } => vec![(Command::SetBrightness { level: *level }, none)],
        Action::Gif {
            filename,
            x,
            y,
            width,
            height,
        } => vec![(
            Command::LoadGif {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
                filename: filename.clone(),
            },
            none,
        )],
        Action::Text {
            text,
            x,
            y,
            size,
            color,
            font,
        } => vec![(
            Command::DisplayText {
                x: *x,
                y: *y,
                font_size: *size,
                color: *color,
                text: text.clone(),
                font_name: font.clone(),
            },
            none,
        )],
        Action::Status => vec![(Command::GetStatus, none)],
        Action::Demo => demo_steps(),
    }
}

fn demo_steps() -> Vec<Step> {
    let short = Duration::from_millis(500);
    let long = Duration::from_secs(2);
    vec![
        (Command::ClearScreen, short),
        (Command::SetBrightness { level: 80 }, short),
        (
            Command::DisplayText {
                x: 10,
                y: 10,
                font_size: 2,
                color: Rgb::YELLOW,
                text: "HELLO!".to_string(),
                font_name: String::new(),
            },
            long,
        ),
        (
            Command::DisplayText {
                x: 10,
                y: 40,
                font_size: 3,
                color: Rgb::GREEN,
                text: "Test OK".to_string(),
                font_name: String::new(),
            },
            long,
        ),
        (
            Command::LoadGif {
                x: 96,
                y: 96,
                width: 96,
                height: 96,
                filename: "anim/1.gif".to_string(),
            },
            long,
        ),
        (Command::GetStatus, Duration::ZERO),
    ]
}

fn print_response(raw: &[u8], json: bool) -> Result<()> {
    println!("Received response ({} bytes): {}", raw.len(), hex::encode(raw));

    let response = match decode(raw).and_then(|frame| Response::try_from(&frame)) {
        Ok(response) => response,
        Err(e) => {
            debug!("Response is not a single response frame: {}", e);
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!(
            "  screen {}: {} ({} data bytes)",
            response.screen_id,
            response.code,
            response.data.len()
        );
    }
    Ok(())
}

async fn run<T>(controller: &mut Controller<T>, screen: u8, steps: &[Step], cli: &Cli) -> Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    for (command, pause) in steps {
        info!("Sending {} to screen {}", command.command_type(), screen);
        controller
            .send(screen, command)
            .await
            .with_context(|| format!("Failed to send {}", command.command_type()))?;

        if !cli.no_response {
            match controller.read_response().await {
                Ok(raw) => print_response(&raw, cli.json)?,
                Err(LedError::Timeout(_)) => warn!("No response within {} ms", cli.timeout_ms),
                Err(e) => return Err(e).context("Failed to read response"),
            }
        }

        if !pause.is_zero() {
            tokio::time::sleep(*pause).await;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file.as_ref(), &cli.verbose)?;

    let steps = steps(&cli.action);

    if cli.strict {
        for (command, _) in &steps {
            if let Err(e) = command.validate() {
                bail!("Refusing to send {}: {}", command.command_type(), e);
            }
        }
    }

    if cli.dry_run {
        for (command, _) in &steps {
            let frame = command.to_frame(cli.screen)?;
            println!("{}", hex::encode(frame.to_bytes()));
        }
        return Ok(());
    }

    let config = DeviceConfig::new(cli.port.clone())
        .with_baud_rate(cli.baud)
        .with_response_timeout(Duration::from_millis(cli.timeout_ms))
        .with_screen_id(cli.screen);

    let mut controller =
        Controller::open(config).with_context(|| format!("Failed to open {}", cli.port.display()))?;

    // Release the port on every path, then report the first failure
    let result = run(&mut controller, cli.screen, &steps, &cli).await;
    let closed = controller.close().await.context("Failed to close port");
    result?;
    closed?;

    info!("Done");
    Ok(())
}
