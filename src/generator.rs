use crate::types::order::Order;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

///Generador de ordenes con su propia fuente de azar sembrable.
/// Es un colaborador inyectado: cada actor recibe el suyo y una misma
/// semilla reproduce la misma secuencia de ordenes.
pub struct OrderGenerator {
    rng: StdRng,
}

impl OrderGenerator {
    pub fn new(seed: u64) -> OrderGenerator {
        OrderGenerator {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> OrderGenerator {
        OrderGenerator {
            rng: StdRng::from_entropy(),
        }
    }

    ///Completa una orden de carga hasta sumar el lote, repartiendo al azar
    /// entre todos los tipos sin pasar la capacidad de ninguno. El resto
    /// arrastrado de una espera vencida viene en `opening` y se conserva.
    pub fn supply_order(&mut self, opening: &[i32], capacities: &[i32], batch_size: i32) -> Order {
        let mut amounts = opening.to_vec();
        let mut remaining = batch_size - amounts.iter().sum::<i32>();
        for part in 0..amounts.len() {
            if remaining <= 0 {
                break;
            }
            let headroom = capacities[part] - amounts[part];
            if headroom <= 0 {
                continue;
            }
            let qty = self.rng.gen_range(0..=headroom).min(remaining);
            amounts[part] += qty;
            remaining -= qty;
        }
        // lo que el azar dejo corto se completa en orden de tipo
        for part in 0..amounts.len() {
            if remaining <= 0 {
                break;
            }
            let qty = (capacities[part] - amounts[part]).min(remaining);
            amounts[part] += qty;
            remaining -= qty;
        }
        Order::from_amounts(amounts)
    }

    ///Extiende un resto pendiente hasta una orden de retiro que suma el
    /// lote y toca 2 o 3 tipos no nulos en total.
    pub fn demand_order(&mut self, opening: &[i32], batch_size: i32) -> Order {
        let mut amounts = opening.to_vec();
        let mut remaining = batch_size - amounts.iter().sum::<i32>();
        let mut nonzero = amounts.iter().filter(|&&qty| qty != 0).count();
        // no se pueden abrir mas tipos que unidades restantes
        let target = self
            .rng
            .gen_range(2..=3)
            .max(nonzero)
            .min(nonzero + remaining as usize);
        while remaining > 0 && nonzero < target {
            let free_slots: Vec<usize> = (0..amounts.len())
                .filter(|&part| amounts[part] == 0)
                .collect();
            if free_slots.is_empty() {
                break;
            }
            let part = free_slots[self.rng.gen_range(0..free_slots.len())];
            let qty = if nonzero + 1 == target {
                remaining
            } else {
                // se reserva una unidad por cada tipo que falta abrir
                let reserved = (target - nonzero - 1) as i32;
                self.rng.gen_range(1..=remaining - reserved)
            };
            amounts[part] += qty;
            remaining -= qty;
            nonzero += 1;
        }
        if remaining > 0 {
            // ya se toco el maximo de tipos: el resto se apila sobre el primero pedido
            let part = (0..amounts.len())
                .find(|&part| amounts[part] > 0)
                .expect("no quedo ningun tipo pedido para completar el lote");
            amounts[part] += remaining;
        }
        Order::from_amounts(amounts)
    }
}
