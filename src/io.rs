pub mod hdf5;

use crate::{error::Error, event::EventHits};

/// Destination of finalized events
pub trait HitSink {
    fn write_event(&mut self, event: &EventHits) -> Result<(), Error>;

    /// Flush anything still buffered. No events may be written afterwards.
    fn finish(&mut self) -> Result<(), Error> { Ok(()) }
}

/// Keeps every event it is given
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<EventHits>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self { Self::default() }

    pub fn is_finished(&self) -> bool { self.finished }
}

impl HitSink for MemorySink {
    fn write_event(&mut self, event: &EventHits) -> Result<(), Error> {
        self.events.push(event.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{config, event::{EventProcessor, McEvent}};
    use geometry::DetectorLayout;

    #[test]
    fn memory_sink_keeps_events_in_order() -> Result<(), Error> {
        let mut processor = EventProcessor::with_layout(&DetectorLayout::default(), &config::Readout::default());
        let mut sink = MemorySink::new();
        for event_id in [3, 1, 2] {
            let hits = processor.process_event(&McEvent { event_id, ..McEvent::default() })?;
            sink.write_event(&hits)?;
        }
        sink.finish()?;
        assert!(sink.is_finished());
        let ids: Vec<_> = sink.events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        Ok(())
    }
}
