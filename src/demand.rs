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

fn register_assembled(stats: &Arc<RwLock<Stats>>, cart: &[i32]) {
    let mut stats = stats.write().expect("no se pudo escribir en los stats");
    stats.add_assembled(cart);
}

///Trabajador de productos: retira un pedido del buffer hacia su carro y
/// ensambla lo acumulado. Si la espera vence, lo ya retirado queda en el
/// carro (nunca se revierte) y el resto rueda a la proxima vuelta.
pub fn demand_actor(
    id: usize,
    config: Arc<SimConfig>,
    coordinator: Arc<WaitCoordinator>,
    mut generator: OrderGenerator,
    sink: Arc<dyn TraceSink>,
    stats: Arc<RwLock<Stats>>,
) -> Result<(), SimError> {
    let num_types = config.num_types();
    let mut carried = Order::empty(num_types);
    let mut cart = vec![0; num_types];
    for iteration in 0..config.iterations {
        let order = generator.demand_order(&carried.amounts, config.batch_size);
        order.validate_demand(config.batch_size)?;
        carried = Order::empty(num_types);

        let ctx = ActorCtx {
            id,
            role: Role::Demand,
            iteration,
            sink: sink.as_ref(),
        };
        match coordinator.transfer(&ctx, &order) {
            TransferOutcome::Immediate { move_time, moved }
            | TransferOutcome::Resolved { move_time, moved } => {
                thread::sleep(move_time);
                for (slot, qty) in cart.iter_mut().zip(moved.iter()) {
                    *slot += qty;
                }
                // se ensambla todo el carro, incluido lo retirado en vueltas vencidas
                thread::sleep(planner::weighted_time(&cart, &config.assembly_times));
                register_assembled(&stats, &cart);
                cart = vec![0; num_types];
            }
            TransferOutcome::TimedOut {
                move_time,
                relocation,
                rolled,
                moved,
            } => {
                thread::sleep(move_time + relocation);
                for (slot, qty) in cart.iter_mut().zip(moved.iter()) {
                    *slot += qty;
                }
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
            "trabajador de productos {} completo la iteracion {}",
            id,
            iteration + 1
        );
    }
    // lo retirado sin ensamblar queda contabilizado como pendiente
    {
        let mut stats = stats.write().expect("no se pudo escribir en los stats");
        stats.add_pending(&cart);
    }
    info!("fin del trabajador de productos {}", id);
    Ok(())
}
