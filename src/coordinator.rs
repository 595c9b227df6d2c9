use crate::planner;
use crate::trace::{ActorCtx, Role, Status};
use crate::types::inventory::{Direction, Inventory};
use crate::types::order::Order;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use log::debug;

///Resultado de un intento de transferencia. El timeout es un resultado
/// de rutina del protocolo, no un error: el resto vuelve al actor como
/// orden inicial de la vuelta siguiente.
#[derive(Debug)]
pub enum TransferOutcome {
    ///La orden entera se transfirio sin esperar.
    Immediate { move_time: Duration, moved: Vec<i32> },
    ///El resto diferido se absorbio de a tramos durante la espera.
    Resolved { move_time: Duration, moved: Vec<i32> },
    ///La espera vencio con resto sin transferir; `rolled` arrastra ese
    /// resto y `relocation` es el costo de devolverlo a la orden local.
    TimedOut {
        move_time: Duration,
        relocation: Duration,
        rolled: Order,
        moved: Vec<i32>,
    },
}

///Nucleo de sincronizacion: el buffer bajo un unico mutex y las dos
/// señales direccionales. Los trabajadores de partes esperan espacio
/// liberado por los de productos, y al reves.
pub struct WaitCoordinator {
    inventory: Mutex<Inventory>,
    space_freed: Condvar,
    goods_freed: Condvar,
    move_times: Vec<u64>,
    supply_cap: Duration,
    demand_cap: Duration,
}

impl WaitCoordinator {
    pub fn new(
        inventory: Inventory,
        move_times: Vec<u64>,
        supply_cap: Duration,
        demand_cap: Duration,
    ) -> WaitCoordinator {
        WaitCoordinator {
            inventory: Mutex::new(inventory),
            space_freed: Condvar::new(),
            goods_freed: Condvar::new(),
            move_times,
            supply_cap,
            demand_cap,
        }
    }

    pub fn snapshot(&self) -> Vec<i32> {
        self.inventory
            .lock()
            .expect("no se pudo lockear el buffer")
            .counts()
            .to_vec()
    }

    ///La condvar que espera el propio rol.
    fn own_signal(&self, direction: Direction) -> &Condvar {
        match direction {
            Direction::IntoBuffer => &self.space_freed,
            Direction::OutOfBuffer => &self.goods_freed,
        }
    }

    ///La condvar del rol opuesto: un commit en un sentido libera
    /// capacidad complementaria en el otro.
    fn opposite_signal(&self, direction: Direction) -> &Condvar {
        match direction {
            Direction::IntoBuffer => &self.goods_freed,
            Direction::OutOfBuffer => &self.space_freed,
        }
    }

    ///Protocolo de entrada de una transferencia: commit inmediato de lo
    /// transferible y espera acotada por el resto. La parte inmediata se
    /// commitea siempre, nunca queda pendiente. Devuelve los costos
    /// simulados para que el actor los duerma fuera de la seccion critica.
    pub fn transfer(&self, ctx: &ActorCtx, order: &Order) -> TransferOutcome {
        let (direction, wait_cap) = match ctx.role {
            Role::Supply => (Direction::IntoBuffer, self.supply_cap),
            Role::Demand => (Direction::OutOfBuffer, self.demand_cap),
        };
        let mut inventory = self.inventory.lock().expect("no se pudo lockear el buffer");
        let num_types = inventory.num_types();
        ctx.record(
            Status::NewOrderPre,
            inventory.counts(),
            &order.amounts,
            &vec![0; num_types],
        );

        let plan = planner::split(order, &inventory, direction, &self.move_times);
        match direction {
            Direction::IntoBuffer => inventory.commit_add(&plan.immediate.amounts),
            Direction::OutOfBuffer => inventory.commit_remove(&plan.immediate.amounts),
        }
        if !plan.immediate.is_zero() {
            self.opposite_signal(direction).notify_all();
        }
        let mut moved = plan.immediate.amounts.clone();
        let mut remainder = plan.deferred.amounts.clone();
        let mut total_moved_time = plan.move_time;
        ctx.record(
            Status::NewOrderPost,
            inventory.counts(),
            &plan.immediate.amounts,
            &remainder,
        );
        if remainder.iter().all(|&qty| qty == 0) {
            return TransferOutcome::Immediate {
                move_time: total_moved_time,
                moved,
            };
        }

        debug!(
            "{} {} espera por el resto {:?}",
            ctx.role, ctx.id, remainder
        );
        let mut deadline = Instant::now() + wait_cap;
        loop {
            // autoservicio: cada evaluacion intenta avanzar el resto, y cada
            // micro-transferencia corre el vencimiento por su costo simulado
            let (progressed, cost) =
                advance_remainder(&mut inventory, &mut remainder, &mut moved, direction, &self.move_times);
            if progressed {
                deadline += cost;
                total_moved_time += cost;
                self.opposite_signal(direction).notify_all();
            }
            if remainder.iter().all(|&qty| qty == 0) {
                ctx.record(Status::Resolved, inventory.counts(), &moved, &remainder);
                return TransferOutcome::Resolved {
                    move_time: total_moved_time,
                    moved,
                };
            }
            let now = Instant::now();
            if now >= deadline {
                let relocation = planner::weighted_time(&remainder, &self.move_times);
                ctx.record(Status::TimedOut, inventory.counts(), &moved, &remainder);
                return TransferOutcome::TimedOut {
                    move_time: total_moved_time,
                    relocation,
                    rolled: Order::from_amounts(remainder),
                    moved,
                };
            }
            let (guard, _timeout) = self
                .own_signal(direction)
                .wait_timeout(inventory, deadline - now)
                .expect("fallo la espera sobre el buffer");
            inventory = guard;
        }
    }
}

///Un paso de avance del resto pendiente contra el buffer, con el lock
/// tomado. Recorre los tipos en orden ascendente fijo, para que dos
/// corridas con las mismas entradas tomen las mismas decisiones por tipo.
/// Devuelve si hubo avance y el costo simulado acumulado del paso.
pub fn advance_remainder(
    inventory: &mut Inventory,
    remainder: &mut [i32],
    moved: &mut [i32],
    direction: Direction,
    move_times: &[u64],
) -> (bool, Duration) {
    let mut progressed = false;
    let mut cost = Duration::ZERO;
    for part in 0..inventory.num_types() {
        if remainder[part] == 0 {
            continue;
        }
        let available = inventory.available(direction, part);
        if available == 0 {
            continue;
        }
        let qty = remainder[part].min(available);
        inventory.apply(direction, part, qty);
        remainder[part] -= qty;
        moved[part] += qty;
        cost += Duration::from_micros(move_times[part] * qty as u64);
        progressed = true;
    }
    (progressed, cost)
}

#[cfg(test)]
mod tests {
    use super::{advance_remainder, TransferOutcome, WaitCoordinator};
    use crate::trace::{ActorCtx, MemorySink, Role, Status};
    use crate::types::inventory::{Direction, Inventory};
    use crate::types::order::Order;
    use serial_test::serial;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use std::thread;

    const CAPACITIES: [i32; 5] = [5, 5, 4, 3, 3];
    const MOVE_TIMES: [u64; 5] = [20, 20, 30, 30, 40];

    fn coordinator(counts: Vec<i32>, supply_cap: Duration, demand_cap: Duration) -> WaitCoordinator {
        WaitCoordinator::new(
            Inventory::with_counts(CAPACITIES.to_vec(), counts),
            MOVE_TIMES.to_vec(),
            supply_cap,
            demand_cap,
        )
    }

    //Escenario: buffer vacio y una carga que entra entera, sin espera.
    #[test]
    fn test_immediate_full_load() {
        let coordinator = coordinator(vec![0; 5], Duration::from_millis(100), Duration::from_millis(100));
        let sink = MemorySink::new();
        let ctx = ActorCtx {
            id: 1,
            role: Role::Supply,
            iteration: 0,
            sink: &sink,
        };
        let outcome = coordinator.transfer(&ctx, &Order::from_amounts(vec![5, 0, 0, 0, 0]));
        match outcome {
            TransferOutcome::Immediate { move_time, moved } => {
                assert_eq!(Duration::from_micros(100), move_time);
                assert_eq!(vec![5, 0, 0, 0, 0], moved);
            }
            other => panic!("se esperaba un commit inmediato, hubo {:?}", other),
        }
        assert_eq!(vec![5, 0, 0, 0, 0], coordinator.snapshot());
        let statuses: Vec<Status> = sink.events().iter().map(|event| event.status).collect();
        assert_eq!(vec![Status::NewOrderPre, Status::NewOrderPost], statuses);
    }

    //Escenario: retiro parcial que espera, y una carga concurrente del tipo
    // faltante lo resuelve antes del vencimiento.
    #[test]
    #[serial]
    fn test_wait_resolved_by_concurrent_supply() {
        let coordinator = Arc::new(coordinator(
            vec![5, 0, 0, 0, 0],
            Duration::from_secs(1),
            Duration::from_secs(1),
        ));
        let coordinator_clone = coordinator.clone();
        let demand_thread = thread::spawn(move || {
            let sink = MemorySink::new();
            let ctx = ActorCtx {
                id: 1,
                role: Role::Demand,
                iteration: 0,
                sink: &sink,
            };
            coordinator_clone.transfer(&ctx, &Order::from_amounts(vec![3, 0, 0, 0, 2]))
        });

        thread::sleep(Duration::from_millis(50));
        let sink = MemorySink::new();
        let ctx = ActorCtx {
            id: 1,
            role: Role::Supply,
            iteration: 0,
            sink: &sink,
        };
        coordinator.transfer(&ctx, &Order::from_amounts(vec![0, 0, 0, 0, 2]));

        let outcome = demand_thread.join().expect("no se pudo joinear el retiro");
        match outcome {
            TransferOutcome::Resolved { moved, .. } => {
                assert_eq!(vec![3, 0, 0, 0, 2], moved);
            }
            other => panic!("se esperaba una espera resuelta, hubo {:?}", other),
        }
        assert_eq!(vec![2, 0, 0, 0, 0], coordinator.snapshot());
    }

    //Escenario: durante la espera llega una reposicion parcial que no
    // alcanza; la micro-transferencia corre el vencimiento por su costo
    // simulado y el resto reducido rueda a la vuelta siguiente.
    #[test]
    #[serial]
    fn test_partial_progress_extends_deadline() {
        // el tipo 4 cuesta 100 ms por unidad: la extension queda medible
        let slow_moves = vec![20, 20, 30, 30, 100_000];
        let cap = Duration::from_millis(60);
        let coordinator = Arc::new(WaitCoordinator::new(
            Inventory::with_counts(CAPACITIES.to_vec(), vec![5, 0, 0, 0, 0]),
            slow_moves,
            cap,
            cap,
        ));
        let coordinator_clone = coordinator.clone();
        let demand_thread = thread::spawn(move || {
            let sink = MemorySink::new();
            let ctx = ActorCtx {
                id: 1,
                role: Role::Demand,
                iteration: 0,
                sink: &sink,
            };
            let start = Instant::now();
            let outcome =
                coordinator_clone.transfer(&ctx, &Order::from_amounts(vec![3, 0, 0, 0, 2]));
            (outcome, start.elapsed())
        });

        thread::sleep(Duration::from_millis(30));
        let sink = MemorySink::new();
        let ctx = ActorCtx {
            id: 1,
            role: Role::Supply,
            iteration: 0,
            sink: &sink,
        };
        coordinator.transfer(&ctx, &Order::from_amounts(vec![0, 0, 0, 0, 1]));

        let (outcome, elapsed) = demand_thread.join().expect("no se pudo joinear el retiro");
        match outcome {
            TransferOutcome::TimedOut {
                move_time,
                relocation,
                rolled,
                moved,
            } => {
                assert_eq!(vec![0, 0, 0, 0, 1], rolled.amounts);
                assert_eq!(vec![3, 0, 0, 0, 1], moved);
                // 60 us inmediatos mas la micro-transferencia de 100 ms
                assert_eq!(
                    Duration::from_micros(60) + Duration::from_millis(100),
                    move_time
                );
                assert_eq!(Duration::from_millis(100), relocation);
            }
            other => panic!("se esperaba una espera vencida, hubo {:?}", other),
        }
        // el avance parcial corrio el vencimiento mas alla del tope original
        assert!(
            elapsed >= cap + Duration::from_millis(80),
            "no se corrio el vencimiento: {:?}",
            elapsed
        );
        assert!(elapsed < cap + Duration::from_secs(2));
        // la unidad absorbida durante la espera no se revierte al vencer
        assert_eq!(vec![2, 0, 0, 0, 0], coordinator.snapshot());
    }

    //Escenario: retiro parcial sin reposicion; vence al tope y el resto
    // rueda a la vuelta siguiente sin revertir lo ya transferido.
    #[test]
    #[serial]
    fn test_wait_timed_out_rolls_remainder() {
        let cap = Duration::from_millis(30);
        let coordinator = coordinator(vec![5, 0, 0, 0, 0], cap, cap);
        let sink = MemorySink::new();
        let ctx = ActorCtx {
            id: 1,
            role: Role::Demand,
            iteration: 0,
            sink: &sink,
        };
        let start = Instant::now();
        let outcome = coordinator.transfer(&ctx, &Order::from_amounts(vec![3, 0, 0, 0, 2]));
        let elapsed = start.elapsed();
        match outcome {
            TransferOutcome::TimedOut {
                rolled,
                moved,
                relocation,
                ..
            } => {
                assert_eq!(vec![0, 0, 0, 0, 2], rolled.amounts);
                assert_eq!(vec![3, 0, 0, 0, 0], moved);
                assert_eq!(Duration::from_micros(80), relocation);
            }
            other => panic!("se esperaba una espera vencida, hubo {:?}", other),
        }
        // acotada: vencio al tope, con margen de scheduler pero nunca infinita
        assert!(elapsed >= cap, "vencio antes del tope: {:?}", elapsed);
        assert!(elapsed < cap + Duration::from_secs(1));
        assert_eq!(vec![2, 0, 0, 0, 0], coordinator.snapshot());
        let statuses: Vec<Status> = sink.events().iter().map(|event| event.status).collect();
        assert_eq!(
            vec![Status::NewOrderPre, Status::NewOrderPost, Status::TimedOut],
            statuses
        );
    }

    //Dos corridas con entradas identicas hacen las mismas micro-transferencias,
    // en el mismo orden de tipos.
    #[test]
    fn test_advance_remainder_deterministic() {
        let run = || {
            let mut inventory =
                Inventory::with_counts(CAPACITIES.to_vec(), vec![2, 0, 1, 0, 3]);
            let mut remainder = [3, 0, 2, 0, 1];
            let mut moved = [0; 5];
            let (progressed, cost) = advance_remainder(
                &mut inventory,
                &mut remainder,
                &mut moved,
                Direction::OutOfBuffer,
                &MOVE_TIMES,
            );
            (progressed, cost, remainder, moved, inventory.counts().to_vec())
        };
        let first = run();
        let second = run();
        assert_eq!(first, second);
        let (progressed, cost, remainder, moved, counts) = first;
        assert!(progressed);
        assert_eq!([1, 0, 1, 0, 0], remainder);
        assert_eq!([2, 0, 1, 0, 1], moved);
        assert_eq!(vec![0, 0, 0, 0, 2], counts);
        assert_eq!(Duration::from_micros(20 * 2 + 30 + 40), cost);
    }

    //El avance parcial no debe tocar tipos sin disponibilidad.
    #[test]
    fn test_advance_remainder_skips_unavailable() {
        let mut inventory = Inventory::with_counts(CAPACITIES.to_vec(), vec![0, 5, 0, 0, 0]);
        let mut remainder = [2, 0, 0, 0, 1];
        let mut moved = [0; 5];
        let (progressed, cost) = advance_remainder(
            &mut inventory,
            &mut remainder,
            &mut moved,
            Direction::OutOfBuffer,
            &MOVE_TIMES,
        );
        assert!(!progressed);
        assert_eq!(Duration::ZERO, cost);
        assert_eq!([2, 0, 0, 0, 1], remainder);
    }
}
