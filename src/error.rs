use thiserror::Error;

///Errores fatales de la simulacion.
/// Los timeouts de espera no aparecen aca: son un resultado esperado del protocolo.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("orden invalida: la suma {got} no coincide con el lote de {expected}")]
    BadOrderSum { got: i32, expected: i32 },
    #[error("orden invalida: el tipo {part} pide {amount} y su limite es {bound}")]
    BoundExceeded { part: usize, amount: i32, bound: i32 },
    #[error("orden invalida: cantidad negativa {amount} para el tipo {part}")]
    NegativeAmount { part: usize, amount: i32 },
    #[error("orden invalida: {nonzero} tipos no nulos, se esperaban entre 2 y 3")]
    BadSpread { nonzero: usize },
    #[error("configuracion invalida: {0}")]
    BadConfig(String),
    #[error("no se pudo leer la configuracion: {0}")]
    Io(#[from] std::io::Error),
    #[error("no se pudo parsear la configuracion: {0}")]
    Toml(#[from] toml::de::Error),
}
