use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "courier",
    about = "Signed shell command dispatch over an AMQP bus",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate an ECDSA key pair, or serve key generation over HTTP
    Crypto(CryptoArgs),
    /// Consume and execute signed commands on a channel
    Listen(ListenArgs),
    /// Sign and publish one command, then wait for the reply
    Send(SendArgs),
}

#[derive(Args)]
pub struct CryptoArgs {
    /// Serve a simple endpoint for key generation
    #[arg(short, long)]
    pub serve: bool,
}

#[derive(Args)]
pub struct ListenArgs {
    /// The AMQP broker URL
    #[arg(short, long, default_value = "amqp://localhost:5672")]
    pub amqp: String,
    /// The connection channel
    #[arg(short, long, default_value = "open")]
    pub channel: String,
    /// The base64 ECDSA public key trusted to sign commands
    #[arg(short, long)]
    pub key: String,
}

#[derive(Args)]
pub struct SendArgs {
    /// The AMQP broker URL
    #[arg(short, long, default_value = "amqp://localhost:5672")]
    pub amqp: String,
    /// The connection channel
    #[arg(short, long, default_value = "open")]
    pub channel: String,
    /// The base64 ECDSA private key used to sign the command
    #[arg(short, long)]
    pub key: String,
    /// The shell command to dispatch
    #[arg(short = 'x', long, default_value = "whoami")]
    pub command: String,
}
