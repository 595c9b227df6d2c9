use std::fmt::{self, Display, Formatter};

///Contabilidad de la corrida, por tipo de parte.
/// Al cierre tiene que valer: producidas = stock final + ensambladas + pendientes.
pub struct Stats {
    pub produced: Vec<i32>,
    pub assembled: Vec<i32>,
    pub pending: Vec<i32>,
    pub products: u32,
    pub timeouts: u32,
}

impl Stats {
    pub fn new(num_types: usize) -> Stats {
        Stats {
            produced: vec![0; num_types],
            assembled: vec![0; num_types],
            pending: vec![0; num_types],
            products: 0,
            timeouts: 0,
        }
    }

    pub fn add_produced(&mut self, amounts: &[i32]) {
        for (total, &qty) in self.produced.iter_mut().zip(amounts.iter()) {
            *total += qty;
        }
    }

    ///Registra un carro completo ensamblado como un producto terminado.
    pub fn add_assembled(&mut self, amounts: &[i32]) {
        for (total, &qty) in self.assembled.iter_mut().zip(amounts.iter()) {
            *total += qty;
        }
        self.products += 1;
    }

    ///Material producido o retirado que quedo en manos de un actor al cierre.
    pub fn add_pending(&mut self, amounts: &[i32]) {
        for (total, &qty) in self.pending.iter_mut().zip(amounts.iter()) {
            *total += qty;
        }
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "stats: {{producidas:{:?}, ensambladas:{:?}, pendientes:{:?}, productos:{}, esperas vencidas:{}}}",
            self.produced, self.assembled, self.pending, self.products, self.timeouts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Stats;

    #[test]
    fn test_accumulates_per_type() {
        let mut stats = Stats::new(5);
        stats.add_produced(&[5, 0, 0, 0, 0]);
        stats.add_produced(&[0, 2, 0, 0, 1]);
        stats.add_assembled(&[3, 0, 0, 0, 0]);
        stats.add_pending(&[0, 0, 0, 0, 1]);
        assert_eq!(vec![5, 2, 0, 0, 1], stats.produced);
        assert_eq!(vec![3, 0, 0, 0, 0], stats.assembled);
        assert_eq!(vec![0, 0, 0, 0, 1], stats.pending);
        assert_eq!(1, stats.products);
    }
}
