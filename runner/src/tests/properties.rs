use std::collections::HashMap;

use processor::{simulate, Interval, Simulation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scheduler::{Pid, Policy, ProcessSpec, Ticks};

const SEEDS: u64 = 200;

fn workload(seed: u64) -> Vec<ProcessSpec> {
    let mut rng = StdRng::seed_from_u64(seed);
    let count = rng.random_range(1..=8);
    (0..count)
        .map(|pid| {
            let arrival = rng.random_range(0..15);
            let burst = rng.random_range(1..=8);
            ProcessSpec::new(pid + 1, arrival, burst)
        })
        .collect()
}

fn policies() -> Vec<Policy> {
    vec![
        Policy::Fcfs,
        Policy::Sjf,
        Policy::Srtf,
        Policy::round_robin(1).unwrap(),
        Policy::round_robin(3).unwrap(),
        Policy::mlfq(&[1, 2, 4]).unwrap(),
        Policy::mlfq(&[2, 4, 8]).unwrap(),
    ]
}

fn for_each_run(check: impl Fn(&Policy, &[ProcessSpec], &Simulation)) {
    for seed in 0..SEEDS {
        let processes = workload(seed);
        for policy in policies() {
            let simulation = simulate(&policy, &processes)
                .unwrap_or_else(|err| panic!("{policy} on seed {seed}: {err}"));
            check(&policy, &processes, &simulation);
        }
    }
}

fn runs_of(simulation: &Simulation, pid: Pid) -> Vec<Interval> {
    simulation
        .intervals
        .iter()
        .filter(|interval| interval.pid == pid)
        .copied()
        .collect()
}

#[test]
pub fn trace_conserves_work() {
    for_each_run(|policy, processes, simulation| {
        let work: Ticks = simulation.intervals.iter().map(Interval::duration).sum();
        let bursts: Ticks = processes.iter().map(|spec| spec.burst).sum();
        assert_eq!(work, bursts, "{policy}");

        for process in &simulation.processes {
            let served: Ticks = runs_of(simulation, process.pid())
                .iter()
                .map(Interval::duration)
                .sum();
            assert_eq!(served, process.burst(), "{policy}: process {}", process.pid());
            assert_eq!(process.remaining(), 0);
        }
    });
}

#[test]
pub fn intervals_are_ordered_and_disjoint() {
    for_each_run(|policy, _, simulation| {
        for interval in &simulation.intervals {
            assert!(interval.end > interval.start, "{policy}: {interval:?}");
        }
        for pair in simulation.intervals.windows(2) {
            assert!(pair[0].end <= pair[1].start, "{policy}: {pair:?}");
        }
    });
}

#[test]
pub fn process_timings_are_consistent() {
    for_each_run(|policy, _, simulation| {
        for process in &simulation.processes {
            let start = process.start().unwrap();
            let completion = process.completion().unwrap();
            let runs = runs_of(simulation, process.pid());

            assert!(start >= process.arrival(), "{policy}: {process:?}");
            assert!(completion >= start + process.burst(), "{policy}: {process:?}");
            assert_eq!(runs.first().map(|run| run.start), Some(start));
            assert_eq!(runs.last().map(|run| run.end), Some(completion));
            assert_eq!(
                process.waiting(),
                Some(process.turnaround().unwrap() - process.burst())
            );
            assert_eq!(process.response(), Some(start - process.arrival()));
        }

        let count = simulation.processes.len() as f64;
        let waiting: f64 = simulation
            .processes
            .iter()
            .map(|process| process.waiting().unwrap() as f64)
            .sum();
        assert!((simulation.metrics.waiting - waiting / count).abs() < 1e-9);
    });
}

#[test]
pub fn cpu_never_idles_with_work_pending() {
    for_each_run(|policy, _, simulation| {
        let mut clock = 0;
        for interval in &simulation.intervals {
            let (gap_start, gap_end) = (clock, interval.start);
            if gap_end > gap_start {
                for process in &simulation.processes {
                    let done_before = process.completion().unwrap() <= gap_start;
                    let arrives_after = process.arrival() >= gap_end;
                    assert!(
                        done_before || arrives_after,
                        "{policy}: idle [{gap_start}, {gap_end}) while {process:?} waits"
                    );
                }
            }
            clock = interval.end;
        }
    });
}

#[test]
pub fn reruns_are_identical() {
    for_each_run(|policy, processes, simulation| {
        let again = simulate(policy, processes).unwrap();
        assert_eq!(&again, simulation);
    });
}

#[test]
pub fn fcfs_serves_in_arrival_order() {
    for seed in 0..SEEDS {
        let processes = workload(seed);
        let simulation = simulate(&Policy::Fcfs, &processes).unwrap();

        let mut expected: Vec<(Ticks, Pid)> = processes
            .iter()
            .map(|spec| (spec.arrival, spec.pid))
            .collect();
        expected.sort();
        let served: Vec<Pid> = simulation.intervals.iter().map(|i| i.pid).collect();
        let expected: Vec<Pid> = expected.into_iter().map(|(_, pid)| pid).collect();
        assert_eq!(served, expected, "seed {seed}");
    }
}

#[test]
pub fn sjf_picks_the_shortest_arrived_job() {
    for seed in 0..SEEDS {
        let processes = workload(seed);
        let simulation = simulate(&Policy::Sjf, &processes).unwrap();

        let mut started: Vec<Pid> = vec![];
        for interval in &simulation.intervals {
            let best = processes
                .iter()
                .filter(|spec| spec.arrival <= interval.start && !started.contains(&spec.pid))
                .map(|spec| (spec.burst, spec.arrival, spec.pid))
                .min()
                .map(|(_, _, pid)| pid);
            assert_eq!(best, Some(interval.pid), "seed {seed} at t={}", interval.start);
            started.push(interval.pid);
        }
    }
}

#[test]
pub fn srtf_runs_the_least_remaining_work_every_tick() {
    for seed in 0..SEEDS {
        let processes = workload(seed);
        let simulation = simulate(&Policy::Srtf, &processes).unwrap();

        let mut remaining: HashMap<Pid, Ticks> =
            processes.iter().map(|spec| (spec.pid, spec.burst)).collect();
        for interval in &simulation.intervals {
            for tick in interval.start..interval.end {
                let best = processes
                    .iter()
                    .filter(|spec| spec.arrival <= tick && remaining[&spec.pid] > 0)
                    .map(|spec| (remaining[&spec.pid], spec.arrival, spec.pid))
                    .min()
                    .map(|(_, _, pid)| pid);
                assert_eq!(best, Some(interval.pid), "seed {seed} at t={tick}");
                if let Some(left) = remaining.get_mut(&interval.pid) {
                    *left -= 1;
                }
            }
        }
        assert!(remaining.values().all(|&left| left == 0));
    }
}

#[test]
pub fn round_robin_is_fair() {
    for quantum in [1, 2, 3] {
        let policy = Policy::round_robin(quantum).unwrap();
        for seed in 0..SEEDS {
            let processes = workload(seed);
            let simulation = simulate(&policy, &processes).unwrap();

            for interval in &simulation.intervals {
                assert!(interval.duration() <= quantum);
            }
            for process in &simulation.processes {
                for pair in runs_of(&simulation, process.pid()).windows(2) {
                    let (previous, next) = (pair[0], pair[1]);
                    let active = simulation
                        .processes
                        .iter()
                        .filter(|other| {
                            other.arrival() < next.start
                                && other.completion().unwrap() > previous.end
                        })
                        .count() as Ticks;
                    assert!(
                        next.start - previous.end <= (active - 1) * quantum,
                        "seed {seed}: process {} waited from {} to {} with {active} active",
                        process.pid(),
                        previous.end,
                        next.start
                    );
                }
            }
        }
    }
}

#[test]
pub fn mlfq_demotes_one_level_at_a_time() {
    let quanta: [Ticks; 3] = [1, 2, 4];
    let policy = Policy::mlfq(&quanta).unwrap();
    let lowest = quanta.len() - 1;

    for seed in 0..SEEDS {
        let processes = workload(seed);
        let simulation = simulate(&policy, &processes).unwrap();

        for interval in &simulation.intervals {
            assert!(interval.level <= lowest);
            assert!(interval.duration() <= quanta[interval.level]);
        }
        for process in &simulation.processes {
            let levels: Vec<usize> = runs_of(&simulation, process.pid())
                .iter()
                .map(|run| run.level)
                .collect();
            assert_eq!(levels.first(), Some(&0), "seed {seed}");
            for pair in levels.windows(2) {
                assert_eq!(pair[1], (pair[0] + 1).min(lowest), "seed {seed}: {levels:?}");
            }
        }
    }
}

#[test]
pub fn policies_do_not_share_state() {
    let processes = workload(7);
    let first: Vec<Simulation> = policies()
        .iter()
        .map(|policy| simulate(policy, &processes).unwrap())
        .collect();
    // Same list, opposite order
    let second: Vec<Simulation> = policies()
        .iter()
        .rev()
        .map(|policy| simulate(policy, &processes).unwrap())
        .collect();

    for (a, b) in first.iter().zip(second.iter().rev()) {
        assert_eq!(a, b);
    }
}
