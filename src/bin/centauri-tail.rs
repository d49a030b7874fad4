use std::time::Duration;

use clap::Parser;
use tokio::net::TcpStream;

use centauri_broadcast::broadcast::protocol::{read_frame, DEFAULT_MAX_PAYLOAD};
use centauri_broadcast::broadcast::ProtocolError;
use centauri_broadcast::resilience::backoff::Backoff;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "centauri-tail")]
#[command(about = "Connect to a centauri-broadcast server and print every configuration it sends", long_about = None)]
struct Cli {
    /// Server address
    #[arg(short, long, default_value = "localhost:8080")]
    addr: String,

    /// Exit after the first configuration
    #[arg(long)]
    once: bool,

    /// Reconnect when the connection drops
    #[arg(short, long)]
    reconnect: bool,

    /// Largest payload accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_PAYLOAD)]
    max_payload: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut backoff = Backoff::new(500, 10_000);

    loop {
        match tail(&cli, &mut backoff).await {
            Ok(()) => return Ok(()),
            Err(e) if cli.reconnect => {
                let delay = backoff.next_delay();
                eprintln!("Connection lost: {}. Reconnecting in {:?}", e, delay);
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn tail(cli: &Cli, backoff: &mut Backoff) -> Result<(), ProtocolError> {
    let mut stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&cli.addr))
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"))??;
    eprintln!("Connected to {}", cli.addr);
    backoff.reset();

    loop {
        let payload = read_frame(&mut stream, cli.max_payload).await?;
        println!("# {} bytes", payload.len());
        println!("{}", String::from_utf8_lossy(&payload));

        if cli.once {
            return Ok(());
        }
    }
}
