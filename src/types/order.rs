use crate::error::SimError;
use std::fmt::{self, Display, Formatter};

///Pedido de unidades por tipo de parte. El mismo vector representa
/// una orden nueva o el resto pendiente arrastrado de una espera vencida.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub amounts: Vec<i32>,
}

impl Order {
    pub fn empty(num_types: usize) -> Order {
        Order {
            amounts: vec![0; num_types],
        }
    }

    pub fn from_amounts(amounts: Vec<i32>) -> Order {
        Order { amounts }
    }

    pub fn sum(&self) -> i32 {
        self.amounts.iter().sum()
    }

    pub fn is_zero(&self) -> bool {
        self.amounts.iter().all(|&qty| qty == 0)
    }

    pub fn nonzero_types(&self) -> usize {
        self.amounts.iter().filter(|&&qty| qty != 0).count()
    }

    ///Validacion de frontera para ordenes de carga: el generador es un
    /// colaborador externo y su salida no se confia.
    pub fn validate_supply(&self, batch_size: i32, capacities: &[i32]) -> Result<(), SimError> {
        self.validate_amounts()?;
        if self.sum() != batch_size {
            return Err(SimError::BadOrderSum {
                got: self.sum(),
                expected: batch_size,
            });
        }
        for (part, (&amount, &bound)) in self.amounts.iter().zip(capacities.iter()).enumerate() {
            if amount > bound {
                return Err(SimError::BoundExceeded {
                    part,
                    amount,
                    bound,
                });
            }
        }
        Ok(())
    }

    ///Validacion de frontera para ordenes de retiro: suma exacta y
    /// entre 2 y 3 tipos no nulos. No se acota por capacidad: un pedido
    /// mayor al limite de su tipo se satisface de a tramos entre recargas.
    pub fn validate_demand(&self, batch_size: i32) -> Result<(), SimError> {
        self.validate_amounts()?;
        if self.sum() != batch_size {
            return Err(SimError::BadOrderSum {
                got: self.sum(),
                expected: batch_size,
            });
        }
        let nonzero = self.nonzero_types();
        if !(2..=3).contains(&nonzero) {
            return Err(SimError::BadSpread { nonzero });
        }
        Ok(())
    }

    fn validate_amounts(&self) -> Result<(), SimError> {
        for (part, &amount) in self.amounts.iter().enumerate() {
            if amount < 0 {
                return Err(SimError::NegativeAmount { part, amount });
            }
        }
        Ok(())
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:?}", self.amounts)
    }
}
