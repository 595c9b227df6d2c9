use crate::types::order::Order;
use std::fmt::{self, Display, Formatter};

///Sentido de una transferencia contra el buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    ///Carga de partes al buffer, limitada por la capacidad restante.
    IntoBuffer,
    ///Retiro de partes del buffer, limitado por el stock actual.
    OutOfBuffer,
}

///Buffer compartido de partes, con un contador y una capacidad fija por tipo.
/// Toda lectura o mutacion se hace con el mutex del coordinador tomado.
pub struct Inventory {
    counts: Vec<i32>,
    capacities: Vec<i32>,
}

impl Inventory {
    pub fn new(capacities: Vec<i32>) -> Inventory {
        let counts = vec![0; capacities.len()];
        Inventory { counts, capacities }
    }

    ///Construye un buffer con stock inicial, para armar escenarios en los tests.
    #[cfg(test)]
    pub fn with_counts(capacities: Vec<i32>, counts: Vec<i32>) -> Inventory {
        assert_eq!(
            capacities.len(),
            counts.len(),
            "el stock inicial no coincide con la cantidad de tipos"
        );
        for (part, (&count, &capacity)) in counts.iter().zip(capacities.iter()).enumerate() {
            assert!(
                count >= 0 && count <= capacity,
                "stock inicial invalido para el tipo {}: {} con capacidad {}",
                part,
                count,
                capacity
            );
        }
        Inventory { counts, capacities }
    }

    pub fn num_types(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[i32] {
        &self.counts
    }

    ///Cuanto se puede mover del tipo `part` en el sentido dado:
    /// espacio libre para cargar, stock para retirar.
    pub fn available(&self, direction: Direction, part: usize) -> i32 {
        match direction {
            Direction::IntoBuffer => self.capacities[part] - self.counts[part],
            Direction::OutOfBuffer => self.counts[part],
        }
    }

    ///Mueve `qty` unidades del tipo `part` en el sentido dado.
    /// Exceder los limites es un bug del que llama, no una condicion recuperable.
    pub fn apply(&mut self, direction: Direction, part: usize, qty: i32) {
        assert!(
            qty >= 0 && qty <= self.available(direction, part),
            "movimiento invalido de {} unidades del tipo {}",
            qty,
            part
        );
        match direction {
            Direction::IntoBuffer => self.counts[part] += qty,
            Direction::OutOfBuffer => self.counts[part] -= qty,
        }
    }

    ///Parte una orden de carga en lo aceptable ya y el desborde por tipo.
    pub fn try_reserve_space(&self, order: &Order) -> (Order, Order) {
        self.reserve(Direction::IntoBuffer, order)
    }

    ///Parte una orden de retiro en lo disponible ya y el faltante por tipo.
    pub fn try_reserve_goods(&self, order: &Order) -> (Order, Order) {
        self.reserve(Direction::OutOfBuffer, order)
    }

    fn reserve(&self, direction: Direction, order: &Order) -> (Order, Order) {
        let mut accepted = vec![0; self.num_types()];
        let mut unmet = vec![0; self.num_types()];
        for part in 0..self.num_types() {
            accepted[part] = order.amounts[part].min(self.available(direction, part));
            unmet[part] = order.amounts[part] - accepted[part];
        }
        (Order::from_amounts(accepted), Order::from_amounts(unmet))
    }

    ///Suma el vector aceptado al buffer. Valida el vector completo antes
    /// de tocar un solo contador.
    pub fn commit_add(&mut self, amounts: &[i32]) {
        for (part, &qty) in amounts.iter().enumerate() {
            assert!(
                qty >= 0 && self.counts[part] + qty <= self.capacities[part],
                "la carga de {} unidades excede la capacidad del tipo {}",
                qty,
                part
            );
        }
        for (part, &qty) in amounts.iter().enumerate() {
            self.counts[part] += qty;
        }
    }

    ///Resta el vector aceptado del buffer. Valida el vector completo antes
    /// de tocar un solo contador.
    pub fn commit_remove(&mut self, amounts: &[i32]) {
        for (part, &qty) in amounts.iter().enumerate() {
            assert!(
                qty >= 0 && qty <= self.counts[part],
                "el retiro de {} unidades deja en negativo el tipo {}",
                qty,
                part
            );
        }
        for (part, &qty) in amounts.iter().enumerate() {
            self.counts[part] -= qty;
        }
    }
}

impl Display for Inventory {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "buffer: {{stock:{:?}, capacidad:{:?}}}", self.counts, self.capacities)
    }
}
