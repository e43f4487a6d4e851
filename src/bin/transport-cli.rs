use clap::{Parser, Subcommand};

use rpc_transport::auth::signature::{plain_signature, user_signature, DigestPool};
use rpc_transport::http::builtin::{CONTROL_TOKEN_HEADER, PING_PATH, SHUTDOWN_PATH, STATS_PATH};

#[derive(Parser)]
#[command(name = "transport-cli")]
#[command(about = "Management CLI for rpc-transport services", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the liveness probe
    Ping,
    /// Dump per-route latency statistics
    Stats,
    /// Ask the service to exit
    Shutdown {
        #[arg(short, long)]
        token: String,
    },
    /// Print the signature a client must send
    Sign {
        #[arg(short, long)]
        timestamp: i64,
        #[arg(short, long)]
        secret: String,
        /// Use the user-scoped scheme
        #[arg(long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Ping => {
            let res = client.get(format!("{}{}", cli.url, PING_PATH)).send().await?;
            print_response(res).await?;
        }
        Commands::Stats => {
            let res = client.get(format!("{}{}", cli.url, STATS_PATH)).send().await?;
            print_response(res).await?;
        }
        Commands::Shutdown { token } => {
            // The service exits before answering, so a dropped connection is success.
            match client
                .get(format!("{}{}", cli.url, SHUTDOWN_PATH))
                .header(CONTROL_TOKEN_HEADER, token)
                .send()
                .await
            {
                Ok(res) => print_response(res).await?,
                Err(e) if e.is_connect() => return Err(e.into()),
                Err(_) => println!("Service stopped"),
            }
        }
        Commands::Sign {
            timestamp,
            secret,
            user,
        } => {
            let digests = DigestPool::new();
            let signature = match user {
                Some(user) => user_signature(&digests, &user, &secret, timestamp),
                None => plain_signature(&digests, timestamp, &secret),
            };
            println!("{}", signature);
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }
    print!("{}", text);
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}
