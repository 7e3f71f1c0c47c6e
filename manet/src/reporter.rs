use crate::{output::Console, tracker::Counters};
use manet_core::{SimTime, network::Network, scheduler::Simulator};
use std::{cell::RefCell, fmt, rc::Rc, time::Duration};

/// The cumulative counters at one tick of the [`StatsReporter`].
///
/// ```
/// # use manet::reporter::TickReport;
/// # use manet_core::SimTime;
/// let tick = TickReport { time: SimTime::from_secs(1), packets: 0, bytes: 0 };
/// assert_eq!(tick.to_string(), "Time [1] Packets: 0 Bytes: 0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub time: SimTime,
    pub packets: u64,
    pub bytes: u64,
}

/// Prints the counters at a fixed interval, forever.
///
/// Every tick schedules the next one. The tick pending when the simulation
/// is torn down is simply discarded.
#[derive(Debug, Clone)]
pub struct StatsReporter {
    counters: Rc<Counters>,
    console: Console,
    interval: Duration,
    ticks: Rc<RefCell<Vec<TickReport>>>,
}

impl StatsReporter {
    pub fn new(counters: Rc<Counters>, console: Console, interval: Duration) -> Self {
        Self {
            counters,
            console,
            interval,
            ticks: Rc::default(),
        }
    }

    /// every tick so far
    pub fn ticks(&self) -> Vec<TickReport> {
        self.ticks.borrow().clone()
    }

    /// Schedule the first tick, one interval from now.
    pub fn start(&self, sim: &mut Simulator<Network>) {
        let reporter = self.clone();
        sim.schedule_in(self.interval, move |sim| reporter.tick(sim));
    }

    fn tick(self, sim: &mut Simulator<Network>) -> anyhow::Result<()> {
        let report = TickReport {
            time: sim.now(),
            packets: self.counters.packets(),
            bytes: self.counters.bytes(),
        };
        self.console.line(format_args!("{report}"))?;
        self.ticks.borrow_mut().push(report);

        let interval = self.interval;
        sim.schedule_in(interval, move |sim| self.tick(sim));
        Ok(())
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Time [{time}] Packets: {packets} Bytes: {bytes}",
            time = self.time,
            packets = self.packets,
            bytes = self.bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_every_second() {
        let (console, captured) = Console::captured();
        let reporter = StatsReporter::new(Rc::default(), console, Duration::from_secs(1));

        let mut sim = Simulator::new(Network::new());
        reporter.start(&mut sim);
        sim.stop_at(SimTime::from_secs(5));
        sim.run().unwrap();

        assert_eq!(
            captured.lines(),
            [
                "Time [1] Packets: 0 Bytes: 0",
                "Time [2] Packets: 0 Bytes: 0",
                "Time [3] Packets: 0 Bytes: 0",
                "Time [4] Packets: 0 Bytes: 0",
                "Time [5] Packets: 0 Bytes: 0",
            ]
        );
        assert_eq!(reporter.ticks().len(), 5);
        // the tick at 6s never runs
        assert_eq!(sim.pending(), 1);
    }
}
