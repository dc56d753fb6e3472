use anyhow::{bail, Context, Result};

use courier_crypto::{decode_key, SignatureAlgorithm};
use courier_protocol::{Dispatcher, ListenerConfig};

use crate::cli::ListenArgs;

pub async fn run(args: ListenArgs) -> Result<()> {
    if args.channel.is_empty() {
        bail!("empty channel");
    }
    if args.amqp.is_empty() {
        bail!("empty amqp url");
    }
    if args.key.is_empty() {
        bail!("empty key");
    }

    let public_key = decode_key(&args.key).context("could not decode public key")?;
    let hostname = gethostname::gethostname().to_string_lossy().into_owned();

    let config = ListenerConfig {
        amqp_url: args.amqp,
        channel: args.channel,
        public_key,
        algorithm: SignatureAlgorithm::default(),
        hostname,
    };

    tracing::info!(channel = %config.channel, "listener starting");
    Dispatcher::new(config).run().await?;
    Ok(())
}
