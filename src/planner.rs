use crate::types::inventory::{Direction, Inventory};
use crate::types::order::Order;
use std::time::Duration;

///Resultado de partir una orden contra el estado actual del buffer.
pub struct SplitPlan {
    pub immediate: Order,
    pub deferred: Order,
    pub move_time: Duration,
}

///Parte una orden en lo transferible ya y lo diferido, con la estimacion
/// de tiempo de movimiento de la parte inmediata. No tiene efectos: el
/// resultado solo vale si se aplica sin soltar el lock con el que se leyo.
pub fn split(
    order: &Order,
    inventory: &Inventory,
    direction: Direction,
    move_times: &[u64],
) -> SplitPlan {
    let (immediate, deferred) = match direction {
        Direction::IntoBuffer => inventory.try_reserve_space(order),
        Direction::OutOfBuffer => inventory.try_reserve_goods(order),
    };
    let move_time = weighted_time(&immediate.amounts, move_times);
    SplitPlan {
        immediate,
        deferred,
        move_time,
    }
}

///Suma de costo unitario por cantidad. La misma formula vale para
/// produccion, movimiento, ensamblado y reubicacion tras un timeout.
pub fn weighted_time(amounts: &[i32], unit_times: &[u64]) -> Duration {
    let total: u64 = amounts
        .iter()
        .zip(unit_times.iter())
        .map(|(&qty, &unit)| unit * qty as u64)
        .sum();
    Duration::from_micros(total)
}
