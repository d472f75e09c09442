use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::device::DeviceInfo;
use crate::event::{Event, EventFactory};

pub const MIN_EVENTS: usize = 1;
pub const MAX_EVENTS: usize = 5;

/// One delivery unit: a fresh device identity with its events, device fields
/// flattened beside `event_list` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
    #[serde(flatten)]
    pub device_info: DeviceInfo,
    pub event_list: Vec<Event>,
}

/// Assembles batches from a factory. The device identity is owned by the
/// batch that generated it and never reused.
pub struct BatchBuilder {
    factory: EventFactory,
}

impl BatchBuilder {
    pub fn new(factory: EventFactory) -> BatchBuilder {
        BatchBuilder { factory }
    }

    pub fn build(&self, rng: &mut impl Rng) -> EventBatch {
        let device_info = DeviceInfo::generate(rng);
        let count = rng.gen_range(MIN_EVENTS..=MAX_EVENTS);
        let event_list: Vec<Event> = (0..count).map(|_| self.factory.generate(rng)).collect();

        EventBatch {
            device_info,
            event_list,
        }
    }
}
