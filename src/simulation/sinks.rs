//! Raw output sinks for traces and transmitted events

use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

use crate::core::time::Instant;
use crate::core::types::EntityId;
use crate::events::Event;
use crate::script::Value;

/// One executed `Trace` action
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraceRecord {
    pub at: Instant,
    pub entity: EntityId,
    pub value: Value,
}

/// Receives each traced value with the entity that traced it
pub type ValueSink = Box<dyn FnMut(EntityId, Value)>;

/// Receives each trace with its simulated time
pub type TraceSink = Box<dyn FnMut(&TraceRecord)>;

/// Receives each transmitted event and the entities it woke, in id order
pub type EventSink = Box<dyn FnMut(&Event, &[EntityId])>;

/// Shared in-memory trace buffer
///
/// Clone the recorder, hand `sink()` to the simulation and read the records
/// back afterwards.
#[derive(Clone, Debug, Default)]
pub struct TraceRecorder {
    records: Rc<RefCell<Vec<TraceRecord>>>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> impl FnMut(&TraceRecord) + 'static {
        let records = Rc::clone(&self.records);
        move |record: &TraceRecord| records.borrow_mut().push(record.clone())
    }

    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.borrow().clone()
    }

    /// Traced values only, in execution order
    pub fn values(&self) -> Vec<Value> {
        self.records.borrow().iter().map(|r| r.value.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}
