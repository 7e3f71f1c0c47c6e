//! Node movement.
//!
//! Positions are evaluated lazily: a [`MobilityModel`] is only asked where
//! the node is when something (the wireless medium, the routing protocol,
//! a trace) needs to know. Models must therefore be queried with
//! non-decreasing simulated times.

use crate::{
    network::Network,
    position::{Position, Rectangle},
    random::{RandomStream, Uniform},
    time::SimTime,
};
use std::time::Duration;

/// Shortest leg a node can travel, so that successive legs always move the
/// clock forward.
const MINIMUM_LEG_DURATION: Duration = Duration::from_micros(1);

pub trait MobilityModel {
    /// the position of the node at `now`
    fn position_at(&mut self, now: SimTime) -> Position;
}

/// A node that never moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantPosition(pub Position);

/// Random waypoint movement.
///
/// The node picks a destination uniformly within the area and a speed
/// uniformly within the speed range, travels there in a straight line,
/// pauses, then picks the next waypoint. A node that draws a null speed
/// stays where it is.
pub struct RandomWaypoint {
    area: Rectangle,
    speed: Uniform,
    pause: Duration,
    rng: RandomStream,
    leg: Leg,
}

/// Parameters to install [`RandomWaypoint`] on every node of a network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWaypointConfig {
    /// area the initial positions and the waypoints are drawn from
    pub area: Rectangle,
    /// speed range, in metres per second
    pub speed: Uniform,
    pub pause: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Leg {
    from: Position,
    to: Position,
    departure: SimTime,
    /// `None` when the node never reaches `to`
    arrival: Option<SimTime>,
}

impl MobilityModel for ConstantPosition {
    fn position_at(&mut self, _now: SimTime) -> Position {
        self.0
    }
}

impl RandomWaypoint {
    /// Start walking from `initial` at [`SimTime::ZERO`].
    pub fn new(
        initial: Position,
        area: Rectangle,
        speed: Uniform,
        pause: Duration,
        rng: RandomStream,
    ) -> Self {
        let mut model = Self {
            area,
            speed,
            pause,
            rng,
            leg: Leg {
                from: initial,
                to: initial,
                departure: SimTime::ZERO,
                arrival: None,
            },
        };
        model.leg = model.next_leg(initial, SimTime::ZERO);
        model
    }

    fn next_leg(&mut self, from: Position, departure: SimTime) -> Leg {
        let to = self.area.sample(&mut self.rng);
        let speed = self.rng.sample(self.speed);

        let arrival = travel_time(from.distance(&to), speed)
            .and_then(|travel| departure.checked_add(travel));

        Leg {
            from,
            to,
            departure,
            arrival,
        }
    }
}

impl MobilityModel for RandomWaypoint {
    fn position_at(&mut self, now: SimTime) -> Position {
        while let Some(arrival) = self.leg.arrival {
            let Some(resume) = arrival.checked_add(self.pause) else {
                break;
            };
            if now < resume {
                break;
            }

            let from = self.leg.to;
            self.leg = self.next_leg(from, resume);
        }

        self.leg.position_at(now)
    }
}

impl Leg {
    fn position_at(&self, now: SimTime) -> Position {
        match self.arrival {
            None => self.from,
            Some(arrival) if now >= arrival => self.to,
            Some(arrival) => {
                let total = arrival.saturating_since(self.departure).as_secs_f64();
                let elapsed = now.saturating_since(self.departure).as_secs_f64();
                self.from.lerp(&self.to, elapsed / total)
            }
        }
    }
}

impl RandomWaypointConfig {
    /// Give every node of the network a random initial position within the
    /// area and a [`RandomWaypoint`] movement.
    ///
    /// Node `n` draws from the stream `n` of `seed`.
    pub fn install(&self, network: &mut Network, seed: u64) {
        let nodes: Vec<_> = network.node_ids().collect();
        for node in nodes {
            let mut rng = RandomStream::new(seed, node.index() as u64);
            let initial = self.area.sample(&mut rng);
            let model = RandomWaypoint::new(initial, self.area, self.speed, self.pause, rng);

            network.set_mobility(node, Box::new(model));
        }
    }
}

fn travel_time(distance: f64, speed: f64) -> Option<Duration> {
    if speed <= 0.0 {
        return None;
    }

    Duration::try_from_secs_f64(distance / speed)
        .ok()
        .map(|travel| travel.max(MINIMUM_LEG_DURATION))
}
