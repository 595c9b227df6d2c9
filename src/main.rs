use std::process;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use log::{error, info};

mod config;
mod coordinator;
mod demand;
mod error;
mod generator;
mod planner;
mod supply;
mod trace;
mod types;

use config::SimConfig;
use coordinator::WaitCoordinator;
use error::SimError;
use generator::OrderGenerator;
use trace::{FileSink, TraceSink};
use types::inventory::Inventory;
use types::stats::Stats;

fn main() {
    env_logger::init();
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(&path),
        None => Ok(SimConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(cause) => {
            error!("{}", cause);
            process::exit(1);
        }
    };
    let sink: Arc<dyn TraceSink> = match FileSink::create(&config.trace_path) {
        Ok(sink) => Arc::new(sink),
        Err(cause) => {
            error!("no se pudo abrir la traza {}: {}", config.trace_path, cause);
            process::exit(1);
        }
    };
    match run_simulation(Arc::new(config), sink, None) {
        Ok((stats, buffer)) => {
            info!("simulacion terminada");
            println!("{}", stats);
            println!("buffer final: {:?}", buffer);
        }
        Err(cause) => {
            error!("simulacion abortada: {}", cause);
            process::exit(1);
        }
    }
}

///Arma el coordinador y lanza los trabajadores de ambos roles contra el
/// mismo buffer. Con una semilla fija cada actor recibe un generador
/// reproducible. Devuelve la contabilidad y el estado final del buffer.
pub fn run_simulation(
    config: Arc<SimConfig>,
    sink: Arc<dyn TraceSink>,
    seed: Option<u64>,
) -> Result<(Stats, Vec<i32>), SimError> {
    config.validate()?;
    let num_types = config.num_types();
    let coordinator = Arc::new(WaitCoordinator::new(
        Inventory::new(config.capacities.clone()),
        config.move_times.clone(),
        Duration::from_micros(config.max_wait_supply),
        Duration::from_micros(config.max_wait_demand),
    ));
    let stats = Arc::new(RwLock::new(Stats::new(num_types)));

    let supply_threads: Vec<_> = (0..config.supply_actors)
        .map(|index| {
            let config_clone = config.clone();
            let coordinator_clone = coordinator.clone();
            let sink_clone = sink.clone();
            let stats_clone = stats.clone();
            let generator = match seed {
                Some(seed) => OrderGenerator::new(seed.wrapping_add(index as u64)),
                None => OrderGenerator::from_entropy(),
            };
            thread::spawn(move || {
                supply::supply_actor(
                    index + 1,
                    config_clone,
                    coordinator_clone,
                    generator,
                    sink_clone,
                    stats_clone,
                )
            })
        })
        .collect();

    let demand_threads: Vec<_> = (0..config.demand_actors)
        .map(|index| {
            let config_clone = config.clone();
            let coordinator_clone = coordinator.clone();
            let sink_clone = sink.clone();
            let stats_clone = stats.clone();
            let generator = match seed {
                Some(seed) => OrderGenerator::new(seed.wrapping_add(1000 + index as u64)),
                None => OrderGenerator::from_entropy(),
            };
            thread::spawn(move || {
                demand::demand_actor(
                    index + 1,
                    config_clone,
                    coordinator_clone,
                    generator,
                    sink_clone,
                    stats_clone,
                )
            })
        })
        .collect();

    for handle in supply_threads.into_iter().chain(demand_threads) {
        handle.join().expect("no se pudo joinear un trabajador")?;
    }

    let final_buffer = coordinator.snapshot();
    let stats = Arc::try_unwrap(stats)
        .ok()
        .expect("quedaron referencias vivas a los stats")
        .into_inner()
        .expect("no se pudo extraer los stats");
    Ok((stats, final_buffer))
}
