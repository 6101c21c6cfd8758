// Create a virtual keyboard, press and release KEY_1 on it, then tear it down.
// Generally this requires root, or a udev rule granting access to /dev/uinput.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use signal_hook::consts::{SIGINT, SIGTERM};

use uinput_keyboard::recording::{Call, RecordingBackend, Trace};
use uinput_keyboard::uinput::UINPUT_PATH;
use uinput_keyboard::wait::CancelToken;
use uinput_keyboard::{
    Backend, BusType, DeviceDescriptor, FailurePolicy, InputId, KeySet, RunOutcome, Session,
    SessionConfig, SettlePolicy, DEMO_KEY, DEMO_KEYS,
};

/// Inject one key press/release through a uinput virtual keyboard
#[derive(Parser, Debug)]
#[command(name = "uinput-keyboard")]
#[command(version)]
#[command(about, long_about = None)]
struct Args {
    /// uinput control interface
    #[arg(long, value_name = "PATH", default_value = UINPUT_PATH)]
    uinput_path: PathBuf,

    /// Pause after creating the device, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    settle_ms: u64,

    /// Wait for the device's /dev/input node instead of a fixed pause
    #[arg(long)]
    wait_for_node: bool,

    /// Give up waiting for the node after this long, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    settle_timeout_ms: u64,

    /// Keep the device alive after emitting, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    hold_secs: u64,

    /// What to do when a device call fails after capabilities are registered
    #[arg(long, value_enum, default_value_t = Policy::Abort)]
    policy: Policy,

    /// Device name
    #[arg(long, default_value = DeviceDescriptor::DEFAULT_NAME)]
    name: String,

    /// USB vendor id, hex
    #[arg(long, value_parser = parse_hex_u16, default_value = "0x1234")]
    vendor: u16,

    /// USB product id, hex
    #[arg(long, value_parser = parse_hex_u16, default_value = "0x5678")]
    product: u16,

    /// Print the calls that would be made instead of touching the uinput interface
    #[arg(long)]
    dry_run: bool,

    /// Make the given dry-run call fail
    #[arg(long, value_enum, value_name = "CALL", hide = true, requires = "dry_run")]
    dry_run_fail: Option<FailAt>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Policy {
    Abort,
    Continue,
}

impl From<Policy> for FailurePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Abort => FailurePolicy::Abort,
            Policy::Continue => FailurePolicy::LogAndContinue,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FailAt {
    Evbit,
    Keybit,
    Setup,
    Create,
    Write,
    Destroy,
}

impl FailAt {
    fn matches(self, call: &Call) -> bool {
        matches!(
            (self, call),
            (FailAt::Evbit, Call::EnableEventType(_))
                | (FailAt::Keybit, Call::EnableKey(_))
                | (FailAt::Setup, Call::Setup { .. })
                | (FailAt::Create, Call::Create)
                | (FailAt::Write, Call::Write(_))
                | (FailAt::Destroy, Call::Destroy)
        )
    }
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("{s:?} is not a 16-bit hex id: {e}"))
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        let settle = if self.wait_for_node {
            SettlePolicy::WaitForNode {
                timeout: Duration::from_millis(self.settle_timeout_ms),
            }
        } else {
            SettlePolicy::Fixed(Duration::from_millis(self.settle_ms))
        };
        SessionConfig {
            settle,
            hold: Duration::from_secs(self.hold_secs),
            policy: self.policy.into(),
        }
    }

    fn descriptor(&self) -> uinput_keyboard::Result<DeviceDescriptor> {
        let id = InputId::new(BusType::BUS_USB, self.vendor, self.product, 0);
        DeviceDescriptor::new(id, self.name.as_str())
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

// The first signal cancels the token; a second one, arriving while it is still set, exits 1.
fn register_signals(token: &CancelToken) -> std::io::Result<()> {
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register_conditional_shutdown(signal, 1, token.flag())?;
        signal_hook::flag::register(signal, token.flag())?;
    }
    Ok(())
}

fn drive<B: Backend>(
    mut session: Session<B>,
    descriptor: &DeviceDescriptor,
) -> uinput_keyboard::Result<()> {
    let keys: KeySet = DEMO_KEYS.iter().collect();
    match session.run(&keys, descriptor, DEMO_KEY)? {
        RunOutcome::Completed => log::info!("done"),
        RunOutcome::CancelledBeforeEmit => log::info!("interrupted before emitting"),
        RunOutcome::CancelledDuringHold => log::info!("interrupted, device removed early"),
    }
    Ok(())
}

fn run(args: &Args) -> uinput_keyboard::Result<()> {
    let descriptor = args.descriptor()?;
    let config = args.session_config();

    let token = CancelToken::new();
    register_signals(&token)?;

    if args.dry_run {
        let trace = Trace::new();
        let mut backend = RecordingBackend::open(&args.uinput_path, &trace)
            .with_device_node("/dev/input/event-dry-run");
        if let Some(fail_at) = args.dry_run_fail {
            backend = backend.fail_when(move |call| fail_at.matches(call));
        }
        let result = drive(
            Session::with_backend(backend, config).with_cancel_token(token),
            &descriptor,
        );
        for call in trace.calls() {
            println!("{call}");
        }
        return result;
    }

    let session = Session::acquire(&args.uinput_path, config)?.with_cancel_token(token);
    drive(session, &descriptor)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("uinput-keyboard: {e}");
            ExitCode::FAILURE
        }
    }
}
