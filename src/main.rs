// Main entry point for the miner CLI
use clap::Parser;
use log::{error, LevelFilter};
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tapgrind::{
    compute_change, current_unix_time, derive_commit_output, parse_internal_key, Command,
    FeeCalculations, FeePolicy, JobSpec, MinerPool, Opt, Payload, ProtocolParams,
};

fn main() {
    // Progress telemetry arrives through the log facade, so Info is the
    // useful default here
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        // Full distributed search: partition the nonce space across workers
        // and grind until the target address falls out
        Command::Mine {
            target,
            pubkey,
            payload,
            op_type,
            workers,
            nonce_space,
            time_delta,
            time_start,
            network,
            job_id,
        } => {
            let internal_key = parse_internal_key(&pubkey)?;
            let payload = Payload::from_json(&payload)?;
            let time_start = match time_start {
                Some(t) => t,
                None => current_unix_time()?,
            };

            let params = ProtocolParams::new(network.0);
            let pool = MinerPool::new(workers, nonce_space, params)?;
            let spec = JobSpec {
                payload,
                target_address: target,
                internal_key,
                op_type,
                // The fee totals are settled later, when the commit
                // transaction is built around the matched payload
                fees: FeeCalculations {
                    commit_fee_only: 0,
                    reveal_fee_plus_outputs: 0,
                },
                network: network.0,
                time_start,
                time_delta,
                job_id,
            };

            println!("Mining with {workers} workers over a nonce space of {nonce_space}...");
            match pool.mine(spec, Arc::new(AtomicBool::new(false)))? {
                Some(candidate) => {
                    let nonce = candidate.payload.get_nonce().unwrap_or_default();
                    let time = candidate.payload.get_time().unwrap_or_default();
                    println!("Target address matched!");
                    println!("Address:       {}", candidate.output.address);
                    println!("Nonce:         {nonce}");
                    println!("Time:          {time}");
                    println!("Reveal script: {}", hex::encode(candidate.output.script.as_bytes()));
                    println!("Control block: {}", hex::encode(&candidate.output.control_block));
                }
                None => println!("Search stopped without a match."),
            }
        }
        // One-shot derivation of the per-candidate pipeline, useful for
        // checking a payload against another implementation
        Command::Derive {
            pubkey,
            payload,
            op_type,
            nonce,
            time,
            network,
        } => {
            let internal_key = parse_internal_key(&pubkey)?;
            let mut payload = Payload::from_json(&payload)?;
            payload.set_nonce(nonce);
            payload.set_time(time);

            let params = ProtocolParams::new(network.0);
            let encoded = payload.encode()?;
            let script = tapgrind::build_reveal_script(op_type, &internal_key, &encoded, &params)?;
            let output = derive_commit_output(&internal_key, &script, network.0)?;

            println!("Address:       {}", output.address);
            println!("Payload CBOR:  {}", hex::encode(&encoded));
            println!("Reveal script: {}", hex::encode(output.script.as_bytes()));
            println!("Control block: {}", hex::encode(&output.control_block));
        }
        Command::Change {
            input_value,
            commit_fee,
            reveal_total,
            satsbyte,
            address,
        } => {
            let fees = FeeCalculations {
                commit_fee_only: commit_fee,
                reveal_fee_plus_outputs: reveal_total,
            };
            match compute_change(input_value, &fees, satsbyte, &address, &FeePolicy::default()) {
                Some(change) => {
                    println!("Change output required: {} sats to {}", change.value, change.address)
                }
                None => println!("No change output; any excess is absorbed into fees."),
            }
        }
    }
    Ok(())
}
