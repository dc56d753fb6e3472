use anyhow::{bail, Context, Result};

use courier_crypto::decode_key;
use courier_protocol::{Sender, SenderConfig};

use crate::cli::SendArgs;

pub async fn run(args: SendArgs) -> Result<()> {
    if args.channel.is_empty() {
        bail!("empty channel");
    }
    if args.amqp.is_empty() {
        bail!("empty amqp url");
    }
    if args.key.is_empty() {
        bail!("empty key");
    }

    let private_key = decode_key(&args.key).context("could not decode private key")?;
    let sender = Sender::new(SenderConfig {
        amqp_url: args.amqp,
        channel: args.channel,
        private_key,
    });

    let reply = sender.send(&args.command).await?;
    print!("{reply}");
    Ok(())
}
