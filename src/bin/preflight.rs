use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signer::keypair::read_keypair_file;
use solana_sdk::signer::Signer;
use std::str::FromStr;

use shipledger::domain::model::EntityKind;
use shipledger::hash_key;
use shipledger::infra::config::{AppConfig, LIVE_MODE_GUIDANCE};
use shipledger::infra::ledger::solana::document_pda;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--entity <entityType>/<id>]\n\
         \n\
         Checks the live ledger setup without writing anything.\n\
         Requires DEMO_MODE=false and:\n\
           LEDGER_RPC_URL, LEDGER_KEYPAIR_PATH, LEDGER_PROGRAM_ID\n\
         With --entity, also reports whether that record is anchored.\n"
    );
    std::process::exit(2);
}

fn parse_entity(arg: &str) -> Option<(EntityKind, String)> {
    let (kind, id) = arg.split_once('/')?;
    let kind = kind.parse().ok()?;
    (!id.is_empty()).then(|| (kind, id.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let entity = match args.iter().position(|a| a == "--entity") {
        None => None,
        Some(i) => match args.get(i + 1).and_then(|a| parse_entity(a)) {
            Some(entity) => Some(entity),
            None => usage_and_exit(),
        },
    };

    let config = AppConfig::from_env()?;
    let Some(settings) = config.ledger.as_ref() else {
        eprintln!("> DEMO_MODE is on; there is no live ledger to check.\n\n{}", LIVE_MODE_GUIDANCE);
        std::process::exit(2);
    };

    println!("> Preflight:");
    println!("  LEDGER_RPC_URL={}", settings.rpc_url);
    println!("  LEDGER_PROGRAM_ID={}", settings.program_id);
    println!("  LEDGER_KEYPAIR_PATH={}", settings.keypair_path.display());

    let payer = read_keypair_file(&settings.keypair_path).map_err(|e| {
        anyhow::anyhow!("Failed to read {}: {}", settings.keypair_path.display(), e)
    })?;

    let client = RpcClient::new_with_commitment(settings.rpc_url.clone(), CommitmentConfig::confirmed());

    let version = client.get_version().await?;
    println!("  RPC version: {}", version.solana_core);

    let balance_lamports = client.get_balance(&payer.pubkey()).await?;
    let sol = balance_lamports as f64 / 1_000_000_000_f64;
    println!("  Payer: {}", payer.pubkey());
    println!("  Payer balance: {} lamports (~{:.6} SOL)", balance_lamports, sol);
    if balance_lamports < 10_000_000 {
        eprintln!("  Warning: payer balance looks low; each anchored record pays rent for one account.");
    }

    let program_id = Pubkey::from_str(&settings.program_id)
        .map_err(|e| anyhow::anyhow!("LEDGER_PROGRAM_ID is not a valid pubkey: {}", e))?;
    let program_acct = client
        .get_account(&program_id)
        .await
        .map_err(|e| anyhow::anyhow!("Program account not found on cluster: {} ({})", program_id, e))?;
    if !program_acct.executable {
        return Err(anyhow::anyhow!(
            "program account {} exists but is not executable",
            program_id
        ));
    }
    println!("  Program account is deployed + executable.");

    if let Some((kind, id)) = entity {
        let (pda, _bump) = document_pda(&program_id, &hash_key(kind.as_str(), &id));
        println!("  Record PDA for {}/{}: {}", kind, id, pda);
        match client.get_account(&pda).await {
            Ok(acct) => println!("  Anchored ({} bytes of account data).", acct.data.len()),
            Err(_) => println!("  Not anchored yet."),
        }
    }

    println!("> Preflight OK.");
    Ok(())
}
