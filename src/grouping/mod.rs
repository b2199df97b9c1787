mod accumulator;
mod engine;
mod pacer;

pub use accumulator::{PassAccumulator, Registration};
pub use engine::{EnrichmentSettings, GroupingEngine, PassReport};
pub use pacer::LookupPacer;
