use clap::{Arg, ArgAction, ArgMatches, Command};
use ratatoskr::client::{QueryClient, QueryService};
use ratatoskr::config::WalkerConfig;
use ratatoskr::dns::enums::DNSResourceType;
use ratatoskr::error::WalkError;
use ratatoskr::walk::align;
use ratatoskr::walk::artifacts::MapArtifact;
use ratatoskr::walk::nsec::ChainWalker;
use ratatoskr::walk::nsec3::RangeProber;
use ratatoskr::walk::CancelToken;
use std::net::SocketAddr;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let matches = Command::new("ratatoskr")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Recovers DNS zone contents from NSEC/NSEC3 denial-of-existence records")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("walk")
                .about("Enumerate a zone (NSEC / NSEC3 auto-detected)")
                .arg(Arg::new("zone").value_name("ZONE").required(true))
                .arg(
                    Arg::new("nameserver")
                        .short('n')
                        .long("nameserver")
                        .value_name("ADDRESS:PORT")
                        .help("Query this server instead of discovering the zone's own")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("max-attempts")
                        .long("max-attempts")
                        .value_name("NUMBER")
                        .help("Probe query cap for NSEC3 zones"),
                )
                .arg(
                    Arg::new("hashes")
                        .long("hashes")
                        .value_name("PATH")
                        .help("NSEC3 hash export file (hashcat -m 8300 input)"),
                )
                .arg(
                    Arg::new("map")
                        .long("map")
                        .value_name("PATH")
                        .help("NSEC3 hash-to-record-types map file"),
                ),
        )
        .subcommand(
            Command::new("align")
                .about("Resolve records for hashes an external cracker recovered")
                .arg(Arg::new("zone").value_name("ZONE").required(true))
                .arg(Arg::new("map").value_name("MAP_FILE").required(true))
                .arg(Arg::new("cracked").value_name("CRACKED_FILE").required(true)),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("walk", sub)) => walk(sub).await,
        Some(("align", sub)) => align_cmd(sub).await,
        _ => unreachable!("subcommand is required"),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(matches: &ArgMatches) -> Result<WalkerConfig, Box<dyn std::error::Error>> {
    let mut config = WalkerConfig::from_env()?;

    if let Some(attempts) = matches.try_get_one::<String>("max-attempts").ok().flatten() {
        config.nsec3.max_attempts = attempts.parse()?;
    }
    if let Some(path) = matches.try_get_one::<String>("hashes").ok().flatten() {
        config.nsec3.hashes_path = path.clone();
    }
    if let Some(path) = matches.try_get_one::<String>("map").ok().flatten() {
        config.nsec3.map_path = path.clone();
    }

    Ok(config)
}

/// Listen for Ctrl-C and trip the shared token; the engines notice
/// between queries and flush what they have
fn spawn_cancel_listener(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Caught Ctrl-C, finishing up");
            cancel.cancel();
        }
    });
}

async fn walk(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let zone = matches
        .get_one::<String>("zone")
        .expect("zone is required")
        .trim_end_matches('.')
        .to_lowercase();
    let mut config = load_config(matches)?;

    // Walk against the zone's own authoritative servers unless the user
    // pinned a server explicitly
    if let Some(servers) = matches.get_many::<String>("nameserver") {
        let servers: Result<Vec<SocketAddr>, _> = servers.map(|s| s.parse()).collect();
        config.nameservers = servers?;
    } else {
        let bootstrap = QueryClient::from_config(&config);
        match bootstrap.discover_nameservers(&zone).await {
            Ok(servers) => config.nameservers = servers,
            Err(e) => warn!("Nameserver discovery failed ({}), using defaults", e),
        }
    }

    let client = QueryClient::from_config(&config);
    info!(
        "Crawling {} using NS(s): {:?}",
        zone,
        client.nameservers()
    );

    let cancel = CancelToken::new();
    spawn_cancel_listener(cancel.clone());

    // One probe for a name that cannot exist tells us which denial
    // flavor the zone publishes
    let probe_name = format!("ratatoskr-says-hi.{}", zone);
    let probe = client.query(&probe_name, DNSResourceType::A).await?;

    if probe.denial_records(DNSResourceType::NSEC).next().is_some() {
        let mut walker = ChainWalker::new(&client, &zone, cancel);
        let summary = walker.run(&mut |owner| println!("{}", owner)).await?;
        info!("Visited {} owners", summary.visited);
    } else if probe.denial_records(DNSResourceType::NSEC3).next().is_some() {
        let params = RangeProber::fetch_params(&client, &zone).await?;
        info!(
            "NSEC3 zone: {} iterations, salt {}",
            params.iterations, params.salt
        );

        let mut prober = RangeProber::new(&client, &zone, &params, config.nsec3.clone(), cancel);
        let summary = prober.run().await?;
        info!(
            "{} ranges covering {:.1}% of the keyspace",
            summary.ranges,
            summary.coverage * 100.0
        );
        println!("Hashes written to {}", config.nsec3.hashes_path);
        println!("Record map written to {}", config.nsec3.map_path);
        println!(
            "Crack with: hashcat -m 8300 {} -o nsec3.cracked <wordlist>",
            config.nsec3.hashes_path
        );
    } else {
        return Err(Box::new(WalkError::Parse(format!(
            "{} returned neither NSEC nor NSEC3; is the zone signed?",
            zone
        ))));
    }

    Ok(())
}

async fn align_cmd(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let zone = matches
        .get_one::<String>("zone")
        .expect("zone is required")
        .trim_end_matches('.')
        .to_lowercase();
    let map_path = matches.get_one::<String>("map").expect("map is required");
    let cracked_path = matches
        .get_one::<String>("cracked")
        .expect("cracked is required");

    let config = WalkerConfig::from_env()?;
    let client = QueryClient::from_config(&config);

    let map = MapArtifact::load(map_path)?;
    let cracked = align::load_cracked(cracked_path)?;
    info!(
        "Loaded {} mappings and {} cracked hashes",
        map.len(),
        cracked.len()
    );

    let aligned = align::run(&client, &map, &cracked, &zone, &mut |owner| {
        println!("{}", owner)
    })
    .await?;
    info!("Resolved {} cracked owners", aligned);

    Ok(())
}
