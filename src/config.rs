use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fs;

///Configuracion fija de la corrida. Los tiempos unitarios estan en
/// microsegundos por unidad movida/producida/ensamblada.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub capacities: Vec<i32>,
    pub production_times: Vec<u64>,
    pub move_times: Vec<u64>,
    pub assembly_times: Vec<u64>,
    pub batch_size: i32,
    ///Espera maxima de un trabajador de partes, en microsegundos.
    pub max_wait_supply: u64,
    ///Espera maxima de un trabajador de productos, en microsegundos.
    pub max_wait_demand: u64,
    pub supply_actors: usize,
    pub demand_actors: usize,
    pub iterations: usize,
    pub trace_path: String,
}

impl Default for SimConfig {
    ///Escenario de referencia: 5 tipos de parte.
    fn default() -> SimConfig {
        SimConfig {
            capacities: vec![5, 5, 4, 3, 3],
            production_times: vec![50, 50, 60, 60, 70],
            move_times: vec![20, 20, 30, 30, 40],
            assembly_times: vec![60, 60, 70, 70, 80],
            batch_size: 5,
            max_wait_supply: 1800,
            max_wait_demand: 8000,
            supply_actors: 1,
            demand_actors: 1,
            iterations: 5,
            trace_path: "log.txt".to_string(),
        }
    }
}

impl SimConfig {
    ///Lee la configuracion de un archivo toml. Las claves ausentes
    /// toman el valor del escenario de referencia.
    pub fn load(path: &str) -> Result<SimConfig, SimError> {
        let text = fs::read_to_string(path)?;
        let config: SimConfig = toml::from_str(&text)?;
        Ok(config)
    }

    pub fn num_types(&self) -> usize {
        self.capacities.len()
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let num_types = self.num_types();
        if num_types == 0 {
            return Err(SimError::BadConfig("no hay tipos de parte".to_string()));
        }
        if self.production_times.len() != num_types
            || self.move_times.len() != num_types
            || self.assembly_times.len() != num_types
        {
            return Err(SimError::BadConfig(
                "las tablas de tiempos no coinciden con la cantidad de tipos".to_string(),
            ));
        }
        if self.capacities.iter().any(|&capacity| capacity < 0) {
            return Err(SimError::BadConfig("capacidad negativa".to_string()));
        }
        if self.batch_size < 2 {
            // una orden de retiro tiene que poder tocar 2 tipos
            return Err(SimError::BadConfig(
                "el lote tiene que ser de al menos 2 unidades".to_string(),
            ));
        }
        // sin esto el generador no puede completar una orden de carga
        if self.capacities.iter().sum::<i32>() < self.batch_size {
            return Err(SimError::BadConfig(
                "la capacidad total es menor que el lote".to_string(),
            ));
        }
        if self.max_wait_supply == 0 || self.max_wait_demand == 0 {
            return Err(SimError::BadConfig("espera maxima nula".to_string()));
        }
        Ok(())
    }
}
