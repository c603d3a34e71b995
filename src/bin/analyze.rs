use biolife_data::SimulationRecord;
use clap::Parser;
use std::collections::BTreeMap;

#[derive(Parser, Debug)]
#[command(author, version, about = "Summarise a Biolife snapshot", long_about = None)]
struct Args {
    /// Snapshot file, plain or gzip
    #[arg(short, long, default_value = "saves/world.json.gz")]
    input: String,

    #[arg(short, long, default_value = "report.md")]
    output: String,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn render(record: &SimulationRecord) -> String {
    let cells = &record.cells;
    let max_gen = cells.iter().map(|c| c.generation).max().unwrap_or(0);
    let mean_energy = mean(cells.iter().map(|c| f64::from(c.energy)));
    let mean_age = mean(cells.iter().map(|c| f64::from(c.age)));
    let mean_speed = mean(cells.iter().map(|c| f64::from(c.genome.max_speed)));

    let mut generations: BTreeMap<u32, usize> = BTreeMap::new();
    for c in cells {
        *generations.entry(c.generation).or_default() += 1;
    }

    let mut markers: BTreeMap<i32, usize> = BTreeMap::new();
    for p in &record.plants {
        *markers.entry(p.species_marker.floor() as i32).or_default() += 1;
    }

    let mut top: Vec<_> = cells.iter().collect();
    top.sort_by(|a, b| b.offspring.cmp(&a.offspring));

    format!(
        "# Biolife Snapshot Report\n\n\
        ## Summary\n\
        - **Run**: {}\n\
        - **Saved**: {}\n\
        - **Ticks**: {} ({} since last extinction)\n\
        - **Extinctions**: {}\n\
        - **Cells**: {}\n\
        - **Plants**: {}\n\
        - **Max Generation**: {}\n\
        - **Mean Energy**: {:.2}\n\
        - **Mean Age**: {:.1} ticks\n\
        - **Mean Max Speed**: {:.3}\n\n\
        ## Cells per Generation\n{}\n\
        ## Plants per Species Marker\n{}\n\
        ## Most Prolific Cells\n{}",
        record.run_id,
        record.saved_at,
        record.total_ticks,
        record.relative_ticks,
        record.total_extinctions,
        cells.len(),
        record.plants.len(),
        max_gen,
        mean_energy,
        mean_age,
        mean_speed,
        generations
            .iter()
            .map(|(g, n)| format!("- gen {}: {}\n", g, n))
            .collect::<String>(),
        markers
            .iter()
            .map(|(m, n)| format!("- [{}, {}): {}\n", m, m + 1, n))
            .collect::<String>(),
        top.iter()
            .take(10)
            .enumerate()
            .map(|(i, c)| {
                format!(
                    "{}. Gen: {}, Age: {}, Offspring: {}, Energy: {:.1}\n",
                    i + 1,
                    c.generation,
                    c.age,
                    c.offspring,
                    c.energy
                )
            })
            .collect::<String>()
    )
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let record = biolife_io::load_snapshot(&args.input)?;
    std::fs::write(&args.output, render(&record))?;
    println!("Report generated: {}", args.output);

    Ok(())
}
