//! PinchLink LED command server: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  TcpAcceptor      StatusLed<Pin, Delay>    LogEventSink      │
//! │  (Acceptor)       (LedPort)                (EventSink)       │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │     CommandServer: accept · parse · dispatch · reply    │  │
//! │  │     DeviceState (LED level, optional temperature)       │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! On ESP-IDF the LED is a GPIO and the device brings up its own access
//! point. On the host the LED is simulated and the server binds a local
//! port, which is how the gesture client is exercised end to end.

use anyhow::{Context, Result};
use log::info;

use pinchlink::adapters::log_sink::LogEventSink;
use pinchlink::config::SystemConfig;
use pinchlink::drivers::status_led::StatusLed;
use pinchlink::server::CommandServer;
use pinchlink::server::device::DeviceState;
use pinchlink::server::listener::TcpAcceptor;

// ── ESP-IDF ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const AP_SSID: &str = "pinchlink";

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::gpio::PinDriver;
    use esp_idf_hal::peripherals::Peripherals;

    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PinchLink v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // Compiled-in defaults; the device has no config file.
    let config = SystemConfig::default();
    config
        .validate()
        .map_err(pinchlink::error::Error::from)
        .context("default config")?;

    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let _wifi = start_access_point(peripherals.modem)?;

    let pin = PinDriver::output(peripherals.pins.gpio2).context("LED pin")?;
    let device = DeviceState::new(StatusLed::new(pin, FreeRtos), config.server.blink);

    let acceptor = TcpAcceptor::bind(config.server.port, config.server.io_timeout_ms)
        .with_context(|| format!("bind port {}", config.server.port))?;

    let mut server = CommandServer::new(acceptor, device, config.server);
    server.run(&mut LogEventSink::new())
}

/// Open access point; the device answers at the AP gateway address.
#[cfg(target_os = "espidf")]
fn start_access_point(
    modem: esp_idf_hal::modem::Modem,
) -> Result<esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>> {
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{
        AccessPointConfiguration, AuthMethod, BlockingWifi, Configuration, EspWifi,
    };

    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

    let ssid = AP_SSID
        .try_into()
        .map_err(|_| anyhow::anyhow!("SSID too long"))?;
    wifi.set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
        ssid,
        auth_method: AuthMethod::None,
        channel: 1,
        ..Default::default()
    }))?;
    wifi.start()?;
    wifi.wait_netif_up()?;

    let ip = wifi.wifi().ap_netif().get_ip_info()?;
    info!("WIFI | AP '{}' up at {}", AP_SSID, ip.ip);
    Ok(wifi)
}

// ── Host ──────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(clap::Parser, Debug)]
#[command(name = "pinchlink", about = "LED command server (simulated LED)")]
struct Cli {
    /// JSON config file; defaults are used when omitted.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Override `server.port`.
    #[arg(long)]
    port: Option<u16>,

    /// Report this temperature on the status page.
    #[arg(long)]
    temperature: Option<f32>,

    /// Print version and exit.
    #[arg(long)]
    version: bool,
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use clap::Parser;
    use pinchlink::adapters::sim_led::{SimDelay, SimPin, SimTemperature};

    let cli = Cli::parse();
    if cli.version {
        println!("pinchlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinchlink=info".into()),
        )
        .init();

    info!("pinchlink v{} starting (simulated LED)", env!("CARGO_PKG_VERSION"));

    let mut config = SystemConfig::load_or_default(cli.config.as_deref())
        .map_err(pinchlink::error::Error::from)
        .context("loading config")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let led = StatusLed::new(SimPin::verbose(), SimDelay::sleeping());
    let acceptor = TcpAcceptor::bind(config.server.port, config.server.io_timeout_ms)
        .with_context(|| format!("bind port {}", config.server.port))?;
    let mut sink = LogEventSink::new();

    match cli.temperature {
        Some(t) => {
            let device = DeviceState::with_sensor(led, SimTemperature(t), config.server.blink);
            CommandServer::new(acceptor, device, config.server).run(&mut sink)
        }
        None => {
            let device = DeviceState::new(led, config.server.blink);
            CommandServer::new(acceptor, device, config.server).run(&mut sink)
        }
    }
}
