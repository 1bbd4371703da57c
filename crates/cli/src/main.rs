use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::path::PathBuf;

use medpulse_core::{
    severity, wait_time, AdmissionRequest, Age, MemoryStore, SeverityBand, TriageQueue,
};

#[derive(Parser)]
#[command(name = "medpulse")]
#[command(about = "MedPulse triage queue CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a walk-in presentation
    Score {
        /// Symptom description
        symptoms: String,
        /// Patient age in years
        age: i64,
        /// Free-text vitals, e.g. "bp: 150/95, hr: 110"
        #[arg(long)]
        vitals: Option<String>,
        /// Fixed jitter seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Estimate the wait for a queue position
    Estimate {
        /// Queue position, 1 is the front
        position: u32,
        /// Severity score in 5..=100
        severity: u8,
        /// Fixed jitter seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run a walk-in batch through a fresh queue
    Simulate {
        /// JSON file holding an array of {name, age, symptoms, vitals?}
        file: PathBuf,
        /// Fixed jitter seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// One intake record in a simulation batch.
#[derive(Debug, Deserialize)]
struct WalkIn {
    name: String,
    age: i64,
    symptoms: String,
    vitals: Option<String>,
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Score {
            symptoms,
            age,
            vitals,
            seed,
        }) => match Age::new(age) {
            Ok(age) => {
                let mut rng = rng_from_seed(seed);
                let score = severity::score(&symptoms, age, vitals.as_deref(), &mut rng);
                let band = SeverityBand::from_score(score);
                println!("Severity score: {} ({})", score, band);
            }
            Err(e) => eprintln!("Error scoring presentation: {}", e),
        },
        Some(Commands::Estimate {
            position,
            severity,
            seed,
        }) => {
            let mut rng = rng_from_seed(seed);
            let minutes = wait_time::estimate(position, severity, &mut rng);
            let band = SeverityBand::from_score(severity);
            println!(
                "Estimated wait: {} minutes (position {}, {})",
                minutes, position, band
            );
        }
        Some(Commands::Simulate { file, seed }) => {
            let raw = std::fs::read_to_string(&file)?;
            let walk_ins: Vec<WalkIn> = serde_json::from_str(&raw)?;

            let queue = match seed {
                Some(seed) => TriageQueue::with_seed(MemoryStore::new(), seed),
                None => TriageQueue::new(MemoryStore::new()),
            };

            for walk_in in walk_ins {
                match AdmissionRequest::new(
                    &walk_in.name,
                    walk_in.age,
                    &walk_in.symptoms,
                    walk_in.vitals,
                ) {
                    Ok(request) => match queue.admit(request) {
                        Ok(admission) => println!(
                            "Admitted {} with ticket {} (score {})",
                            walk_in.name, admission.queue_number, admission.patient.severity_score
                        ),
                        Err(e) => eprintln!("Error admitting {}: {}", walk_in.name, e),
                    },
                    Err(e) => eprintln!("Skipping {}: {}", walk_in.name, e),
                }
            }

            let waiting = queue.waiting()?;
            println!();
            println!("Waiting queue:");
            for patient in &waiting {
                println!(
                    "{:>3}. {:<20} score {:>3} ({:<8}) wait ~{} min",
                    patient.queue_position.unwrap_or(0),
                    patient.name,
                    patient.severity_score,
                    patient.severity_band(),
                    patient.estimated_wait_time.unwrap_or(0)
                );
            }

            let stats = queue.stats()?;
            println!();
            println!(
                "{} waiting: {} critical, {} moderate, {} mild",
                stats.waiting, stats.critical, stats.moderate, stats.mild
            );
            if let Some(average) = stats.average_wait_minutes {
                println!("Average estimated wait: {} minutes", average);
            }
        }
        None => {
            println!("Use 'medpulse --help' for commands");
        }
    }

    Ok(())
}
