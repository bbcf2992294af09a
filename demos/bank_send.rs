use cosmtx::prelude::*;
use eyre::Result;
use tracing_subscriber::EnvFilter;

const KEY_NAME: &str = "myv50key";
const MNEMONIC: &str = "decorate bright ozone fork gallery riot bus exhaust worth way bone indoor calm squirrel merry zero scheme cotton until shop any excess stage laundry";
const PASSWORD: &str = "1234567890";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = SignerConfig {
        key_name: KEY_NAME.to_string(),
        gas_limit: 100_000,
        fee: Coin::new(750, "utest")?,
        poll_attempts: 10,
        poll_interval_ms: 1_000,
        ..Default::default()
    };
    config.validate()?;

    // load our key from its mnemonic
    let keyring = LocalKeyring::new();
    keyring.import_mnemonic(KEY_NAME, MNEMONIC, Some(PASSWORD))?;

    // connect the key to the node
    let client = SignerMiddleware::from_config(config.provider(), keyring, &config).await?;
    println!("Sending from {}", client.address());

    // some random account
    let recipient = Wallet::new(&mut rand::thread_rng()).address(&config.address_prefix)?;

    // craft the transaction
    let send = MsgSend::new(client.address(), &recipient, vec![Coin::new(1, "utest")?]);
    let mut draft = config.draft_builder(client.address().clone())?;
    draft.set_operations(vec![Operation::from_msg(&send)])?.set_memo("my test memo")?;

    // sign and send it!
    let pending = client.send_document(draft.finalize()?).await?;
    println!("Broadcast tx: {}", pending.tx_hash());

    // wait until it is part of a block
    let confirmation = pending.await?;
    if !confirmation.is_success() {
        eyre::bail!("tx failed with code {}: {}", confirmation.code, confirmation.raw_log);
    }
    println!("Tx result: {}", serde_json::to_string(&confirmation)?);

    Ok(())
}
