use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use processor::{format_logs, simulate};
use scheduler::{Policy, ProcessSpec, Ticks};

mod logger;

/// Scheduling policy options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
enum PolicyKind {
    /// First come, first served
    Fcfs,
    /// Shortest job first, non-preemptive
    Sjf,
    /// Shortest remaining time first
    Srtf,
    /// Round Robin with a fixed quantum
    Rr,
    /// Multi-level feedback queue
    Mlfq,
    /// Run every policy on the same processes
    All,
}

/// CPU scheduling simulation
#[derive(Parser, Debug)]
#[command(name = "runner")]
#[command(about = "Simulate classical CPU scheduling policies", long_about = None)]
struct Args {
    /// Scheduling policy to use
    #[arg(short, long, value_enum, default_value_t = PolicyKind::All)]
    policy: PolicyKind,

    /// Round Robin quantum
    #[arg(short, long, default_value_t = 2)]
    quantum: Ticks,

    /// MLFQ quanta, highest priority level first
    #[arg(long, value_delimiter = ',', default_values_t = [2, 4, 8])]
    quanta: Vec<Ticks>,

    /// A process as ID:ARRIVAL:BURST, may be repeated
    #[arg(short = 'P', long = "process", value_parser = parse_process)]
    processes: Vec<ProcessSpec>,

    /// Print the simulations as JSON instead of the trace
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_process(value: &str) -> Result<ProcessSpec, String> {
    let fields: Vec<&str> = value.split(':').collect();
    let [pid, arrival, burst] = fields.as_slice() else {
        return Err(format!("expected ID:ARRIVAL:BURST, got `{value}`"));
    };
    let pid = pid
        .parse::<usize>()
        .map_err(|_| format!("invalid process id `{pid}`"))?;
    let arrival = arrival
        .parse::<Ticks>()
        .map_err(|_| format!("arrival must be a non-negative integer, got `{arrival}`"))?;
    let burst = burst
        .parse::<Ticks>()
        .map_err(|_| format!("burst must be a positive integer, got `{burst}`"))?;
    Ok(ProcessSpec::new(pid, arrival, burst))
}

fn policies(args: &Args) -> Result<Vec<Policy>> {
    let round_robin = || Policy::round_robin(args.quantum).context("invalid --quantum");
    let mlfq = || Policy::mlfq(&args.quanta).context("invalid --quanta");

    Ok(match args.policy {
        PolicyKind::Fcfs => vec![Policy::Fcfs],
        PolicyKind::Sjf => vec![Policy::Sjf],
        PolicyKind::Srtf => vec![Policy::Srtf],
        PolicyKind::Rr => vec![round_robin()?],
        PolicyKind::Mlfq => vec![mlfq()?],
        PolicyKind::All => vec![
            Policy::Fcfs,
            Policy::Sjf,
            Policy::Srtf,
            round_robin()?,
            mlfq()?,
        ],
    })
}

fn main() -> Result<()> {
    logger::init().context("failed to install the logger")?;
    let args = Args::parse();

    let processes = if args.processes.is_empty() {
        vec![
            ProcessSpec::new(1, 0, 5),
            ProcessSpec::new(2, 2, 3),
            ProcessSpec::new(3, 4, 1),
        ]
    } else {
        args.processes.clone()
    };

    let mut simulations = vec![];
    for policy in policies(&args)? {
        info!("running {}", policy);
        let simulation =
            simulate(&policy, &processes).with_context(|| format!("{} failed", policy))?;
        simulations.push(simulation);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&simulations)?);
    } else {
        for simulation in &simulations {
            println!("{}", format_logs(simulation));
        }
    }
    Ok(())
}

// Do not delete this line
#[cfg(test)]
mod tests;
