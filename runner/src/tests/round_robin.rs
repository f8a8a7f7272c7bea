use core::module_path;
use function_name::named;
use processor::simulate;
use scheduler::{Pid, Policy};

use super::{idle_gaps, processes, round_robin, run, three_jobs};

#[test]
#[named]
pub fn three_jobs_trace() {
    let simulation = simulate(&round_robin(), &three_jobs()).unwrap();

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &simulation,
    );
}

#[test]
#[named]
pub fn idle_gaps_trace() {
    let simulation = simulate(&round_robin(), &idle_gaps()).unwrap();

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &simulation,
    );
}

#[test]
pub fn arrivals_go_ahead_of_the_preempted_process() {
    let policy = Policy::round_robin(3).unwrap();
    let simulation = simulate(&policy, &processes(&[(1, 0, 6), (2, 1, 3), (3, 3, 3)])).unwrap();

    // At t=3 process 2 and 3 are both queued before process 1 comes back
    let order: Vec<Pid> = simulation.intervals.iter().map(|i| i.pid).collect();
    assert_eq!(order, vec![Pid::new(1), Pid::new(2), Pid::new(3), Pid::new(1)]);
}

#[test]
pub fn lone_process_gets_one_interval_per_quantum() {
    let policy = Policy::round_robin(2).unwrap();
    let simulation = simulate(&policy, &processes(&[(7, 0, 5)])).unwrap();

    let trace: Vec<(u64, u64)> = simulation
        .intervals
        .iter()
        .map(|i| (i.start, i.end))
        .collect();
    assert_eq!(trace, vec![(0, 2), (2, 4), (4, 5)]);
}

#[test]
pub fn waits_for_late_arrivals() {
    let policy = Policy::round_robin(4).unwrap();
    let simulation = simulate(&policy, &processes(&[(1, 0, 1), (2, 10, 1)])).unwrap();

    assert_eq!(simulation.makespan(), 11);
    assert!(simulation.processes.iter().all(|p| p.is_finished()));
}
