//! The movement planner state machine
//!
//! Owns the run: budget, position, previous heading, the unvisited and
//! visited sensor pools, the committed path and the move log. Per
//! iteration: choose a heading, validate the candidate segment, then
//! commit (Case A), deflect along the blocking edge (Case B) or retry on a
//! random heading (Case C). Only Case A consumes budget.
//!
//! There is no fatal error inside the loop. Every infeasible candidate is
//! handled by local retry, and the consecutive-deflection bound keeps the
//! loop from spinning forever against a single obstacle. Running out of
//! budget with sensors left unread is a normal outcome, not an error.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geometry::{NoFlyZone, blocking_deflection, quantized_bearing};
use super::state::{Heading, MoveRecord, Phase, Sensor, nearest_sensor};
use crate::config::PlanConfig;

/// Source of escape headings for deadlock recovery.
///
/// Production runs use [`SeededHeadings`]; test suites can inject a fixed
/// sequence and assert exact recovery paths.
pub trait HeadingSource {
    fn random_heading(&mut self) -> Heading;
}

/// Pcg32-backed heading source; the same seed replays the same run
#[derive(Debug, Clone)]
pub struct SeededHeadings(Pcg32);

impl SeededHeadings {
    pub fn new(seed: u64) -> Self {
        Self(Pcg32::seed_from_u64(seed))
    }
}

impl HeadingSource for SeededHeadings {
    fn random_heading(&mut self) -> Heading {
        Heading::from_index(self.0.random_range(0..Heading::COUNT))
    }
}

/// Everything a finished run exposes
#[derive(Debug, Clone)]
pub struct PlanResult {
    /// Every committed waypoint including the start, in order
    pub path: Vec<DVec2>,
    /// One record per committed move
    pub log: Vec<MoveRecord>,
    /// Sensors read during the run, in visit order
    pub visited: Vec<Sensor>,
    /// Sensors still unread when the run ended
    pub remaining: Vec<Sensor>,
    /// Budget left when the run ended
    pub moves_left: u32,
    /// Phase the run ended in
    pub phase: Phase,
}

/// Movement planner for one survey run
pub struct Planner<H: HeadingSource> {
    config: PlanConfig,
    zones: Vec<NoFlyZone>,
    headings: H,
    start: DVec2,
    position: DVec2,
    prev_heading: Option<Heading>,
    phase: Phase,
    moves_left: u32,
    to_visit: Vec<Sensor>,
    visited: Vec<Sensor>,
    path: Vec<DVec2>,
    log: Vec<MoveRecord>,
}

impl Planner<SeededHeadings> {
    /// Planner with the production seeded heading source
    pub fn seeded(
        config: PlanConfig,
        zones: Vec<NoFlyZone>,
        sensors: Vec<Sensor>,
        start: DVec2,
        seed: u64,
    ) -> Self {
        Self::new(config, zones, sensors, start, SeededHeadings::new(seed))
    }
}

impl<H: HeadingSource> Planner<H> {
    pub fn new(
        config: PlanConfig,
        zones: Vec<NoFlyZone>,
        sensors: Vec<Sensor>,
        start: DVec2,
        headings: H,
    ) -> Self {
        let moves_left = config.budget;
        Self {
            config,
            zones,
            headings,
            start,
            position: start,
            prev_heading: None,
            phase: Phase::Seeking,
            moves_left,
            to_visit: sensors,
            visited: Vec::new(),
            path: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Run the planning loop to completion.
    ///
    /// Blocks until the return leg finishes or the budget runs out; the
    /// result carries whatever was achieved either way.
    pub fn run(mut self) -> PlanResult {
        self.path.push(self.position);
        let mut deflections = 0u32;
        // None means the aim must be (re)computed from the tracked target
        let mut heading: Option<Heading> = None;

        while self.moves_left > 0 && self.phase != Phase::Done {
            if self.phase == Phase::Seeking && self.to_visit.is_empty() {
                // All sensors read: install the synthetic start waypoint
                // and drive the return leg through the same machinery
                self.phase = Phase::Returning;
                heading = None;
                log::debug!("All sensors read, returning to start");
            }
            let current = match heading {
                Some(h) => h,
                None => {
                    let aimed = self.aim();
                    heading = Some(aimed);
                    aimed
                }
            };

            let candidate = self.position + self.config.step_distance * current.unit();

            if !self.config.bounds.contains(candidate) {
                // Case C: out of bounds; retry on a random heading,
                // budget untouched
                heading = Some(self.headings.random_heading());
                continue;
            }

            if let Some(edge) = blocking_deflection(self.position, candidate, &self.zones) {
                // Case B: a zone edge blocks the move. Steer along the
                // edge unless the suggestion cannot make progress, would
                // reverse the last committed move, or deflections have
                // gone on too long - then escape randomly.
                if edge == current
                    || self.prev_heading == Some(edge.opposite())
                    || deflections >= self.config.max_deflections
                {
                    heading = Some(self.headings.random_heading());
                    deflections = 0;
                } else {
                    heading = Some(edge);
                    deflections += 1;
                }
                continue;
            }

            // Case A: commit the move
            let from = self.position;
            self.position = candidate;
            let read = self.check_visit();
            self.prev_heading = Some(current);
            self.path.push(self.position);
            self.log.push(MoveRecord {
                index: self.log.len() as u32 + 1,
                from,
                heading: current,
                to: self.position,
                read,
            });
            self.moves_left -= 1;
            heading = None;
        }

        if self.phase == Phase::Done {
            log::info!(
                "Survey complete: {} sensors read in {} moves",
                self.visited.len(),
                self.log.len()
            );
        } else {
            log::info!(
                "Budget exhausted in phase {:?}: {} read, {} remaining",
                self.phase,
                self.visited.len(),
                self.to_visit.len()
            );
        }

        PlanResult {
            path: self.path,
            log: self.log,
            visited: self.visited,
            remaining: self.to_visit,
            moves_left: self.moves_left,
            phase: self.phase,
        }
    }

    /// Heading toward the tracked target: the nearest unread sensor, or
    /// the start point on the return leg. Breaks two-direction ping-pong
    /// by substituting a random heading when the aim would exactly reverse
    /// the previous committed move.
    fn aim(&mut self) -> Heading {
        let target = match self.phase {
            Phase::Returning => self.start,
            _ => self.to_visit[nearest_sensor(&self.to_visit, self.position)].coord,
        };
        let mut heading = quantized_bearing(self.position, target);
        if self.prev_heading == Some(heading.opposite()) {
            heading = self.headings.random_heading();
        }
        heading
    }

    /// Visit rule, evaluated after every committed move.
    ///
    /// A real sensor is read within `sensor_visit_radius` of it; the
    /// return leg ends within `return_visit_radius` of the start. Returns
    /// the location code to record in the move log, if a sensor was read.
    fn check_visit(&mut self) -> Option<String> {
        match self.phase {
            Phase::Seeking => {
                let idx = nearest_sensor(&self.to_visit, self.position);
                if self.position.distance(self.to_visit[idx].coord)
                    < self.config.sensor_visit_radius
                {
                    let mut sensor = self.to_visit.remove(idx);
                    sensor.visited = true;
                    let read = sensor.location.clone();
                    log::debug!(
                        "Read sensor {:?} with {} moves left",
                        read,
                        self.moves_left
                    );
                    self.visited.push(sensor);
                    read
                } else {
                    None
                }
            }
            Phase::Returning => {
                if self.position.distance(self.start) < self.config.return_visit_radius {
                    self.phase = Phase::Done;
                }
                None
            }
            Phase::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bounds;
    use crate::plan::geometry::segments_intersect;

    /// Heading source replaying a fixed sequence
    struct ScriptedHeadings {
        sequence: Vec<u16>,
        next: usize,
    }

    impl ScriptedHeadings {
        fn new(degrees: &[u16]) -> Self {
            Self {
                sequence: degrees.to_vec(),
                next: 0,
            }
        }
    }

    impl HeadingSource for ScriptedHeadings {
        fn random_heading(&mut self) -> Heading {
            let degrees = self.sequence[self.next];
            self.next += 1;
            Heading::from_index(degrees / 10)
        }
    }

    fn open_bounds() -> Bounds {
        Bounds {
            north_lat: 0.01,
            south_lat: -0.01,
            east_lng: 0.01,
            west_lng: -0.01,
        }
    }

    fn test_config() -> PlanConfig {
        PlanConfig {
            bounds: open_bounds(),
            ..PlanConfig::default()
        }
    }

    fn sensor(code: &str, x: f64, y: f64) -> Sensor {
        Sensor::new(
            Some(code.into()),
            100.0,
            Some("42.0".into()),
            DVec2::new(x, y),
        )
    }

    fn rect_zone(x0: f64, x1: f64, y0: f64, y1: f64) -> NoFlyZone {
        NoFlyZone::new(vec![
            DVec2::new(x0, y0),
            DVec2::new(x1, y0),
            DVec2::new(x1, y1),
            DVec2::new(x0, y1),
        ])
        .unwrap()
    }

    #[test]
    fn test_detour_around_blocking_zone() {
        // One rectangular zone directly between start and a sensor three
        // step-lengths north; the planner must deflect around it and still
        // read the sensor well within budget.
        let mut config = test_config();
        config.budget = 20;
        let zone = rect_zone(-0.0001, 0.0001, 0.0002, 0.0004);
        let target = sensor("dent.shins.cycle", 0.0, 0.0009);

        let result = Planner::seeded(
            config.clone(),
            vec![zone.clone()],
            vec![target],
            DVec2::ZERO,
            1,
        )
        .run();

        assert_eq!(result.visited.len(), 1);
        assert!(result.remaining.is_empty());
        assert_eq!(result.visited[0].location.as_deref(), Some("dent.shins.cycle"));
        assert!(result.visited[0].visited);
        assert!(result.moves_left > 0, "should finish under budget");
        assert_eq!(result.phase, Phase::Done);

        // At least one committed heading deviated from due north
        assert!(result.log.iter().any(|m| m.heading.degrees() != 90));

        // Budget decreases only on commits
        assert_eq!(
            result.log.len(),
            (config.budget - result.moves_left) as usize
        );
        assert_eq!(result.path.len(), result.log.len() + 1);

        // No committed segment crosses any zone edge
        for pair in result.path.windows(2) {
            for (a, b) in zone.edges() {
                assert!(!segments_intersect(pair[0], pair[1], a, b));
            }
        }
    }

    #[test]
    fn test_unreachable_sensor_exhausts_budget() {
        // Sensor farther away than step_distance * budget: the run ends at
        // budget zero with the sensor still unread, no panic
        let mut config = test_config();
        config.budget = 10;
        let target = sensor("far.away.spot", 0.009, 0.0);

        let result = Planner::seeded(config, Vec::new(), vec![target], DVec2::ZERO, 1).run();

        assert_eq!(result.moves_left, 0);
        assert!(result.visited.is_empty());
        assert_eq!(result.remaining.len(), 1);
        assert!(!result.remaining[0].visited);
        assert_eq!(result.phase, Phase::Seeking);
        assert_eq!(result.log.len(), 10);
        assert_eq!(result.path.len(), 11);
        // Straight shot east the whole way
        assert!(result.log.iter().all(|m| m.heading.degrees() == 0));
    }

    #[test]
    fn test_oscillation_guard_breaks_ping_pong() {
        // Two sensors nearly symmetric about the start. After reading the
        // first, the direct aim at the second exactly reverses the
        // previous heading, so the guard must substitute the scripted
        // escape heading.
        let sensors = vec![
            sensor("east.side.one", 0.00024, 0.0),
            sensor("west.side.two", -0.00025, 0.0),
        ];
        let scripted = ScriptedHeadings::new(&[90]);

        let result = Planner::new(test_config(), Vec::new(), sensors, DVec2::ZERO, scripted).run();

        assert_eq!(result.phase, Phase::Done);
        assert_eq!(result.visited.len(), 2);
        assert!(result.remaining.is_empty());
        // Move 1 reads the east sensor; move 2 was the guard's escape
        // heading, not the direct 180-degree bearing to the west sensor
        assert_eq!(result.log[0].read.as_deref(), Some("east.side.one"));
        assert_eq!(result.log[1].heading.degrees(), 90);
        assert_eq!(result.log[1].read, None);
    }

    #[test]
    fn test_deflection_equal_to_heading_is_discarded() {
        // A near-vertical zone edge across a northward move quantizes to
        // the same 90-degree heading; adopting it could never clear the
        // edge, so the planner must fall back to the scripted heading.
        let zone = NoFlyZone::new(vec![
            DVec2::new(0.00001, 0.00005),
            DVec2::new(-0.00001, 0.00035),
            DVec2::new(-0.00003, 0.00005),
        ])
        .unwrap();
        let sensors = vec![sensor("up.north.far", 0.0, 0.0008)];
        let scripted = ScriptedHeadings::new(&[0, 0, 0, 0]);

        let result = Planner::new(test_config(), vec![zone], sensors, DVec2::ZERO, scripted).run();

        // First commit went east on the scripted escape, not north
        assert_eq!(result.log[0].heading.degrees(), 0);
        // The detour still reads the sensor and gets home
        assert_eq!(result.visited.len(), 1);
        assert_eq!(result.phase, Phase::Done);
    }

    #[test]
    fn test_out_of_bounds_recovery_is_non_consuming() {
        // Sensor beyond the western boundary: every westward candidate
        // past the edge is rejected without consuming budget, and the
        // scripted recovery keeps the drone inside the rectangle.
        let config = PlanConfig {
            budget: 6,
            bounds: Bounds {
                north_lat: 0.01,
                south_lat: -0.01,
                east_lng: 0.01,
                west_lng: -0.0005,
            },
            ..PlanConfig::default()
        };
        let sensors = vec![sensor("past.the.fence", -0.005, 0.0)];
        let scripted = ScriptedHeadings::new(&[90; 8]);

        let result = Planner::new(config.clone(), Vec::new(), sensors, DVec2::ZERO, scripted).run();

        assert_eq!(result.moves_left, 0);
        assert_eq!(result.log.len(), config.budget as usize);
        assert_eq!(result.remaining.len(), 1);
        for point in &result.path {
            // The start itself plus every commit stays inside
            assert!(config.bounds.contains(*point) || *point == DVec2::ZERO);
        }
    }

    #[test]
    fn test_identical_seeds_replay_identical_runs() {
        let mut config = test_config();
        config.budget = 60;
        let zones = vec![
            rect_zone(-0.0001, 0.0001, 0.0002, 0.0004),
            rect_zone(0.0003, 0.0006, -0.0002, 0.0003),
        ];
        let sensors = vec![
            sensor("one.two.three", 0.0, 0.0009),
            sensor("four.five.six", 0.0008, 0.0001),
        ];

        let run = |seed| {
            Planner::seeded(
                config.clone(),
                zones.clone(),
                sensors.clone(),
                DVec2::ZERO,
                seed,
            )
            .run()
        };
        let first = run(99);
        let second = run(99);

        assert_eq!(first.path, second.path);
        assert_eq!(first.log, second.log);
        assert_eq!(first.visited, second.visited);
        assert_eq!(first.remaining, second.remaining);
        assert_eq!(first.moves_left, second.moves_left);
    }

    #[test]
    fn test_visited_and_remaining_partition_the_input() {
        let mut config = test_config();
        config.budget = 40;
        let sensors = vec![
            sensor("aaa.bbb.ccc", 0.0005, 0.0),
            sensor("ddd.eee.fff", 0.0, 0.0005),
            sensor("ggg.hhh.iii", 0.008, 0.008),
        ];
        let codes: Vec<_> = sensors.iter().map(|s| s.location.clone()).collect();

        let result = Planner::seeded(config, Vec::new(), sensors, DVec2::ZERO, 3).run();

        let mut out: Vec<_> = result
            .visited
            .iter()
            .chain(result.remaining.iter())
            .map(|s| s.location.clone())
            .collect();
        out.sort();
        let mut expected = codes;
        expected.sort();
        assert_eq!(out, expected);
        assert!(result.visited.iter().all(|s| s.visited));
        assert!(result.remaining.iter().all(|s| !s.visited));
    }

    #[test]
    fn test_no_sensors_run_terminates() {
        // Degenerate survey: nothing to visit. The planner goes straight
        // to the return leg and the budget bounds the run either way.
        let mut config = test_config();
        config.budget = 25;

        let result = Planner::seeded(config, Vec::new(), Vec::new(), DVec2::ZERO, 11).run();

        assert!(result.visited.is_empty());
        assert!(result.remaining.is_empty());
        assert!(result.log.len() <= 25);
        assert!(matches!(result.phase, Phase::Returning | Phase::Done));
    }
}
