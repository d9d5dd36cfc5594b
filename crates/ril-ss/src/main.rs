//! ussdctl: inspect USSD frames the way the transaction layer sees them.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ril_ss::{
    IpcTransport, RadioState, RadioStatus, RequestSink, RequestStatus, RequestToken, SsResult,
    UnsolicitedEvent, UssdConfig, UssdLayer,
};
use ril_ss_protocol::{
    CodingScheme, IpcMessage, IpcType, ProtocolError, UssdDialect, UssdRequestFrame, UssdState,
    IPC_SS_USSD, IPC_TYPE_NOTI,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ussdctl")]
#[command(about = "Encode and decode Samsung IPC USSD frames")]
struct Args {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the send frame for a USSD string as hex
    Encode {
        /// Session state code the frame is built for
        #[arg(long, default_value_t = 0)]
        session: u8,

        /// Text to send
        text: String,
    },
    /// Decode an inbound notification frame given as hex
    Decode {
        /// Frame bytes, header included
        hex: String,
    },
    /// Classify a data coding scheme byte
    Dcs {
        /// DCS byte, decimal or 0x-prefixed hex
        #[arg(value_parser = parse_byte)]
        byte: u8,
    },
}

fn parse_byte(value: &str) -> Result<u8, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid byte '{}': {}", value, e))
}

/// Context that prints what the layer emits instead of forwarding it.
struct PrintContext;

impl RadioStatus for PrintContext {
    fn radio_state(&self) -> RadioState {
        RadioState::SimReady
    }
}

impl IpcTransport for PrintContext {
    fn send(&mut self, _seq: u8, _command: u16, _kind: IpcType, _data: &[u8]) -> SsResult<()> {
        Ok(())
    }
}

impl RequestSink for PrintContext {
    fn request_seq(&mut self, token: RequestToken) -> u8 {
        token.0 as u8
    }

    fn request_token(&self, _seq: u8) -> Option<RequestToken> {
        None
    }

    fn complete(&mut self, token: RequestToken, status: RequestStatus, _payload: &[u8]) {
        println!("request {} completed: {}", token, status.as_str());
    }

    fn unsolicited(&mut self, event: UnsolicitedEvent) {
        match event {
            UnsolicitedEvent::OnUssd(notification) => {
                println!("state:   {:?}", notification.state);
                println!("text:    {:?}", notification.text);
            }
        }
    }
}

fn run(args: Args) -> SsResult<()> {
    let config = match &args.config {
        Some(path) => UssdConfig::load(path)?,
        None => UssdConfig::default(),
    };
    tracing::debug!(modem = %config.modem, "Loaded configuration");

    match args.command {
        Command::Encode { session, text } => {
            let dialect = UssdDialect::for_session(UssdState::from(session));
            let frame = UssdRequestFrame::build(dialect, text.as_bytes())?;
            tracing::info!(%dialect, payload = frame.payload_len(), "Encoded USSD request");
            println!("{}", hex::encode(frame.as_bytes()));
        }
        Command::Decode { hex } => {
            let data = hex::decode(hex.trim())
                .map_err(|e| ProtocolError::invalid_data(format!("bad hex: {}", e)))?;
            let message = IpcMessage::new(0, IPC_SS_USSD, IPC_TYPE_NOTI, data);
            let mut layer = UssdLayer::new(config);
            match layer.handle_ussd_notification(&mut PrintContext, &message) {
                Some(inbound) => {
                    println!("scheme:  {}", inbound.scheme);
                    println!("outcome: {:?}", inbound.outcome);
                }
                None => {
                    return Err(ProtocolError::invalid_data("frame shorter than USSD header").into())
                }
            }
        }
        Command::Dcs { byte } => {
            let scheme = CodingScheme::from_dcs(byte);
            println!("0x{:02X}: {}", byte, scheme);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    ril_ss_metrics::describe_metrics();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
