use crate::config::SimConfig;
use crate::coordinator::{TransferOutcome, WaitCoordinator};
use crate::error::SimError;
use crate::generator::OrderGenerator;
use crate::planner;
use crate::trace::{ActorCtx, Role, Status, TraceSink};
use crate::types::order::Order;
use crate::types::stats::Stats;
use std::sync::{Arc, RwLock};
use std::thread;

use log::{debug, info};

///Unidades nuevas de esta vuelta: la orden menos el resto arrastrado,
/// que ya se produjo en una vuelta anterior.
fn produced_delta(order: &Order, carried: &Order) -> Vec<i32> {
    order
        .amounts
        .iter()
        .zip(carried.amounts.iter())
        .map(|(&ordered, &carried)| ordered - carried)
        .collect()
}

fn register_produced(stats: &Arc<RwLock<Stats>>, produced: &[i32]) {
    let mut stats = stats.write().expect("no se pudo escribir en los stats");
    stats.add_produced(produced);
}

///Trabajador de partes: produce un lote, lo carga al buffer y, si la
/// espera vence, arrastra el resto como orden inicial de la proxima vuelta.
pub fn supply_actor(
    id: usize,
    config: Arc<SimConfig>,
    coordinator: Arc<WaitCoordinator>,
    mut generator: OrderGenerator,
    sink: Arc<dyn TraceSink>,
    stats: Arc<RwLock<Stats>>,
) -> Result<(), SimError> {
    let num_types = config.num_types();
    let mut carried = Order::empty(num_types);
    for iteration in 0..config.iterations {
        let order = generator.supply_order(&carried.amounts, &config.capacities, config.batch_size);
        order.validate_supply(config.batch_size, &config.capacities)?;

        // la produccion pasa fuera de la seccion critica
        let produced = produced_delta(&order, &carried);
        thread::sleep(planner::weighted_time(&produced, &config.production_times));
        register_produced(&stats, &produced);
        carried = Order::empty(num_types);

        let ctx = ActorCtx {
            id,
            role: Role::Supply,
            iteration,
            sink: sink.as_ref(),
        };
        match coordinator.transfer(&ctx, &order) {
            TransferOutcome::Immediate { move_time, .. }
            | TransferOutcome::Resolved { move_time, .. } => {
                thread::sleep(move_time);
            }
            TransferOutcome::TimedOut {
                move_time,
                relocation,
                rolled,
                ..
            } => {
                thread::sleep(move_time + relocation);
                carried = rolled;
                let mut stats = stats.write().expect("no se pudo escribir en los stats");
                stats.timeouts += 1;
            }
        }
        ctx.record(
            Status::IterationComplete,
            &coordinator.snapshot(),
            &vec![0; num_types],
            &carried.amounts,
        );
        debug!(
            "trabajador de partes {} completo la iteracion {}",
            id,
            iteration + 1
        );
    }
    // lo producido que nunca entro al buffer queda contabilizado como pendiente
    {
        let mut stats = stats.write().expect("no se pudo escribir en los stats");
        stats.add_pending(&carried.amounts);
    }
    info!("fin del trabajador de partes {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::produced_delta;
    use crate::types::order::Order;

    #[test]
    fn test_produced_delta_discounts_carried() {
        let order = Order::from_amounts(vec![3, 0, 0, 0, 2]);
        let carried = Order::from_amounts(vec![0, 0, 0, 0, 2]);
        assert_eq!(vec![3, 0, 0, 0, 0], produced_delta(&order, &carried));
    }

    #[test]
    fn test_produced_delta_fresh_order() {
        let order = Order::from_amounts(vec![2, 1, 1, 1, 0]);
        let carried = Order::empty(5);
        assert_eq!(order.amounts, produced_delta(&order, &carried));
    }
}
