use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use log::error;

///Rol de un actor frente al buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Supply,
    Demand,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Role::Supply => write!(f, "trabajador de partes"),
            Role::Demand => write!(f, "trabajador de productos"),
        }
    }
}

///Hito del protocolo que dispara un evento de traza.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    NewOrderPre,
    NewOrderPost,
    TimedOut,
    Resolved,
    IterationComplete,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let text = match self {
            Status::NewOrderPre => "nueva orden - antes de la transferencia",
            Status::NewOrderPost => "nueva orden - despues de la transferencia",
            Status::TimedOut => "espera vencida",
            Status::Resolved => "espera resuelta",
            Status::IterationComplete => "iteracion completada",
        };
        write!(f, "{}", text)
    }
}

///Foto del estado en un hito: buffer, orden en curso y resto pendiente.
#[derive(Clone, Debug)]
pub struct TraceEvent {
    pub timestamp_us: u128,
    pub iteration: usize,
    pub actor: usize,
    pub role: Role,
    pub status: Status,
    pub buffer: Vec<i32>,
    pub order: Vec<i32>,
    pub remainder: Vec<i32>,
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "tiempo actual: {} us", self.timestamp_us)?;
        writeln!(f, "iteracion: {}", self.iteration + 1)?;
        writeln!(f, "{} {}", self.role, self.actor)?;
        writeln!(f, "estado: {}", self.status)?;
        writeln!(f, "buffer: {:?}", self.buffer)?;
        writeln!(f, "orden: {:?}", self.order)?;
        writeln!(f, "resto: {:?}", self.remainder)
    }
}

///Destino ordenado de los eventos de traza. Tiene que soportar llamadas
/// concurrentes desde cualquier actor; el orden entre actores distintos
/// es el de llegada.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: TraceEvent);
}

///Traza a archivo, como el log de la planta. Usa su propio lock,
/// que nunca se retiene esperando sobre el buffer.
pub struct FileSink {
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn create(path: &str) -> std::io::Result<FileSink> {
        let file = File::create(path)?;
        Ok(FileSink {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl TraceSink for FileSink {
    fn record(&self, event: TraceEvent) {
        let mut writer = self
            .writer
            .lock()
            .expect("no se pudo lockear la traza a archivo");
        if let Err(cause) = writeln!(writer, "{}", event) {
            error!("no se pudo escribir la traza: {}", cause);
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

///Traza en memoria para inspeccionar la corrida desde los tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<TraceEvent>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events
            .lock()
            .expect("no se pudo lockear la traza en memoria")
            .clone()
    }
}

#[cfg(test)]
impl TraceSink for MemorySink {
    fn record(&self, event: TraceEvent) {
        self.events
            .lock()
            .expect("no se pudo lockear la traza en memoria")
            .push(event);
    }
}

pub fn now_micros() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("el reloj quedo antes de epoch")
        .as_micros()
}

///Identidad de un actor durante una iteracion, con su salida de traza.
pub struct ActorCtx<'a> {
    pub id: usize,
    pub role: Role,
    pub iteration: usize,
    pub sink: &'a dyn TraceSink,
}

impl ActorCtx<'_> {
    pub fn record(&self, status: Status, buffer: &[i32], order: &[i32], remainder: &[i32]) {
        self.sink.record(TraceEvent {
            timestamp_us: now_micros(),
            iteration: self.iteration,
            actor: self.id,
            role: self.role,
            status,
            buffer: buffer.to_vec(),
            order: order.to_vec(),
            remainder: remainder.to_vec(),
        });
    }
}
