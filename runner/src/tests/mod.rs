use processor::{format_logs, Simulation};
use scheduler::{Policy, ProcessSpec, Ticks};

use std::env;
use std::fs;

mod properties;
mod round_robin;

fn output_path(folder: &str, name: &str) -> String {
    let (quantum, quanta) = arguments();
    let quanta = quanta
        .iter()
        .map(|quantum| quantum.to_string())
        .collect::<Vec<_>>()
        .join("-");
    format!("../outputs/{folder}/{name}___{quantum}_{quanta}.log")
}

fn write_logs(folder: &str, name: &str, logs: &str) {
    fs::create_dir_all(format!("../outputs/{folder}")).unwrap();
    fs::write(output_path(folder, name), logs).unwrap();
}

fn read_logs(folder: &str, name: &str) -> String {
    fs::read_to_string(output_path(folder, name)).unwrap()
}

fn run(folder: &str, name: &str, simulation: &Simulation) {
    let output = format_logs(simulation);

    if env::var("WRITE_OUTPUT").is_ok() {
        write_logs(folder, name, &output);
    } else {
        let reference = read_logs(folder, name);

        println!("\nleft = Correct Output\nright = Your Output\n");
        use pretty_assertions::assert_eq;
        assert_eq!(reference, output);
    }
}

fn arguments() -> (Ticks, Vec<Ticks>) {
    let quantum = env::var("QUANTUM")
        .unwrap_or("2".to_string())
        .parse::<Ticks>()
        .unwrap();
    let quanta = env::var("QUANTA")
        .unwrap_or("2,4,8".to_string())
        .split(',')
        .map(|quantum| quantum.trim().parse::<Ticks>().unwrap())
        .collect();
    (quantum, quanta)
}

fn round_robin() -> Policy {
    let (quantum, _) = arguments();
    Policy::round_robin(quantum).unwrap()
}

fn mlfq() -> Policy {
    let (_, quanta) = arguments();
    Policy::mlfq(&quanta).unwrap()
}

/// Builds a process list from `(pid, arrival, burst)` triples.
fn processes(specs: &[(usize, Ticks, Ticks)]) -> Vec<ProcessSpec> {
    specs
        .iter()
        .map(|&(pid, arrival, burst)| ProcessSpec::new(pid, arrival, burst))
        .collect()
}

/// Three processes, the third arriving while the second waits.
fn three_jobs() -> Vec<ProcessSpec> {
    processes(&[(1, 0, 5), (2, 2, 3), (3, 4, 1)])
}

/// The CPU idles before the first arrival and between two bursts.
fn idle_gaps() -> Vec<ProcessSpec> {
    processes(&[(1, 1, 2), (2, 6, 3), (3, 6, 1), (4, 7, 2)])
}
