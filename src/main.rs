use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

use clap::Parser;

use valley_sim::cli::Cli;
use valley_sim::io::{output, rov, seeds, topology};
use valley_sim::Policy;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        log::error!("[{}] run failed: {}", cli.test_name, err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("[{}] loading topology from {:?}", cli.test_name, cli.topology);
    let topo_file = File::open(&cli.topology).map_err(|source| valley_sim::LoadError::Io {
        path: cli.topology.display().to_string(),
        source,
    })?;
    let mut graph = topology::load(BufReader::new(topo_file))?;

    log::info!("[{}] checking for provider-customer cycles", cli.test_name);
    graph.finalize()?;
    log::info!(
        "[{}] graph has {} ASes across {} propagation ranks",
        cli.test_name,
        graph.len(),
        graph.ranks.len()
    );

    let rov_asns = match &cli.rov {
        Some(path) => {
            let file = File::open(path).map_err(|source| valley_sim::LoadError::Io {
                path: path.display().to_string(),
                source,
            })?;
            rov::load(BufReader::new(file))?
        }
        None => Default::default(),
    };
    log::info!("[{}] {} ASes run the ROV policy", cli.test_name, rov_asns.len());

    let mut policies: HashMap<_, _> = graph
        .iter()
        .map(|node| {
            let policy = if rov_asns.contains(&node.asn) {
                Policy::rov()
            } else {
                Policy::bgp()
            };
            (node.asn, policy)
        })
        .collect();

    let seeds_file = File::open(&cli.seeds).map_err(|source| valley_sim::LoadError::Io {
        path: cli.seeds.display().to_string(),
        source,
    })?;
    let known = |asn| policies.contains_key(&asn);
    let seed_rows = seeds::load(seeds_file, &known)?;
    log::info!("[{}] seeding {} origin announcements", cli.test_name, seed_rows.len());

    for seed in seed_rows {
        if let Some(policy) = policies.get_mut(&seed.origin_asn) {
            policy.add_origin(seed.announcement);
        }
    }

    let engine = valley_sim::PropagationEngine::new(&graph, policies);
    engine.run();
    let policies = engine.into_policies();

    log::info!("[{}] writing RIB snapshot to {:?}", cli.test_name, cli.out);
    let out_file = File::create(&cli.out).map_err(|source| valley_sim::LoadError::Io {
        path: cli.out.display().to_string(),
        source,
    })?;
    output::write(out_file, &policies)?;

    Ok(())
}
