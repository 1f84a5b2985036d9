use std::sync::Arc;

use anyhow::Context;
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Rating, base DM in bps, relative frequency.
const LADDER: [(&str, f64, u32); 10] = [
    ("Baa3", 190.0, 2),
    ("Ba1", 230.0, 4),
    ("Ba2", 270.0, 6),
    ("Ba3", 320.0, 9),
    ("B1", 380.0, 12),
    ("B2", 440.0, 14),
    ("B3", 540.0, 10),
    ("Caa1", 700.0, 5),
    ("Caa2", 850.0, 2),
    ("NR", 480.0, 3),
];

const SECTORS: [(&str, &[&str]); 4] = [
    ("Healthcare", &["Services", "Pharma", "Devices"]),
    ("Technology", &["Software", "Hardware"]),
    ("Industrials", &["Aerospace", "Machinery", "Transport"]),
    ("Consumer", &["Retail", "Food & Beverage"]),
];

const NAMES: [&str; 12] = [
    "Apex", "Beacon", "Cobalt", "Delta", "Evergreen", "Fulcrum", "Granite", "Harbor", "Ion", "Juniper",
    "Keystone", "Lumen",
];

const SUFFIXES: [&str; 4] = ["Holdings", "Group", "Corp", "Partners"];

fn pick_rating(rng: &mut SimpleRng) -> (&'static str, f64) {
    let total: u32 = LADDER.iter().map(|(_, _, w)| w).sum();
    let mut roll = (rng.next_u64() % total as u64) as u32;
    for &(code, base, weight) in &LADDER {
        if roll < weight {
            return (code, base);
        }
        roll -= weight;
    }
    (LADDER[0].0, LADDER[0].1)
}

fn main() -> anyhow::Result<()> {
    let output_path = std::env::args().nth(1).unwrap_or_else(|| "sample_comps.parquet".to_string());
    let mut rng = SimpleRng::new(42);

    let mut issuer = Vec::new();
    let mut industry = Vec::new();
    let mut segment = Vec::new();
    let mut moodys = Vec::new();
    let mut ytm = Vec::new();
    let mut ask = Vec::new();
    let mut dm = Vec::new();

    for i in 0..261 {
        let (sector, segments) = SECTORS[i % SECTORS.len()];
        let (rating, base_dm) = pick_rating(&mut rng);

        // A handful of distressed and tight prints so trimming has work to do.
        let spread = match i % 37 {
            0 => base_dm * 3.5,
            18 => base_dm * 0.3,
            _ => rng.gauss(base_dm, base_dm * 0.15).max(50.0),
        };
        let price = (100.5 - (spread - 300.0) / 45.0 + rng.gauss(0.0, 1.2)).clamp(55.0, 102.0);
        let yield_pct = 4.3 + spread / 100.0 + rng.gauss(0.0, 0.35);

        issuer.push(format!("{} {} {}", rng.pick(&NAMES), rng.pick(&SUFFIXES), i + 1));
        industry.push(sector.to_string());
        segment.push(rng.pick(segments).to_string());
        moodys.push(rating.to_string());
        ytm.push((yield_pct * 100.0).round() / 100.0);
        ask.push((price * 8.0).round() / 8.0);
        dm.push(spread.round());
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("Issuer", DataType::Utf8, false),
        Field::new("Industry", DataType::Utf8, false),
        Field::new("Segment", DataType::Utf8, false),
        Field::new("Moodys", DataType::Utf8, false),
        Field::new("YTM", DataType::Float64, false),
        Field::new("Ask", DataType::Float64, false),
        Field::new("DM", DataType::Float64, false),
    ]));

    let rows = issuer.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(issuer)),
            Arc::new(StringArray::from(industry)),
            Arc::new(StringArray::from(segment)),
            Arc::new(StringArray::from(moodys)),
            Arc::new(Float64Array::from(ytm)),
            Arc::new(Float64Array::from(ask)),
            Arc::new(Float64Array::from(dm)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(&output_path).with_context(|| format!("creating {output_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!("Wrote {rows} comps to {output_path}");
    Ok(())
}
