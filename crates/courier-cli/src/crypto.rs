use anyhow::Result;

use courier_crypto::KeyPair;

use crate::cli::CryptoArgs;

pub async fn run(args: CryptoArgs) -> Result<()> {
    if args.serve {
        return crate::keyserve::serve().await;
    }

    let pair = KeyPair::generate()?;
    let encoded = pair.encode();
    println!("private key: {}", encoded.private_key);
    println!("public key: {}", encoded.public_key);
    Ok(())
}
