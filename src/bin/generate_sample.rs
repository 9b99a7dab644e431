use std::fmt::Write as _;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Diurnal CO₂ cycle around a baseline: higher at night, dip at midday.
fn co2_value(ts: NaiveDateTime, baseline: f64, rng: &mut SimpleRng) -> f64 {
    use chrono::Timelike;
    let hour = ts.hour() as f64 + ts.minute() as f64 / 60.0;
    let diurnal = 15.0 * ((hour - 4.0) / 24.0 * std::f64::consts::TAU).cos();
    baseline + diurnal + rng.gauss(0.0, 2.5)
}

/// Write one logger-style CSV: preamble, header, then 30-minute rows.
fn write_csv(
    path: &Path,
    ring: &str,
    start: NaiveDate,
    end_exclusive: NaiveDate,
    baseline: f64,
    rng: &mut SimpleRng,
) {
    let mut out = String::new();
    writeln!(out, "TOA5,{ring},CR1000,sample").unwrap();
    writeln!(out, "TIMESTAMP,CO2_Avg,CO2_dry").unwrap();

    let mut ts = start.and_hms_opt(0, 0, 0).unwrap();
    let end = end_exclusive.and_hms_opt(0, 0, 0).unwrap();
    while ts < end {
        let avg = co2_value(ts, baseline, rng);
        // occasional dropout in the dry channel, so the viewer shows gaps
        let dry = if rng.next_f64() < 0.02 {
            "NAN".to_string()
        } else {
            format!("{:.2}", avg - rng.gauss(2.0, 0.5))
        };
        writeln!(out, "{},{:.2},{}", ts.format("%Y-%m-%d %H:%M:%S"), avg, dry).unwrap();
        ts += Duration::minutes(30);
    }

    std::fs::write(path, out).expect("failed to write sample CSV");
}

fn main() {
    let cache_dir = Path::new("ringwatch_cache");
    std::fs::create_dir_all(cache_dir).expect("failed to create cache dir");

    let mut rng = SimpleRng::new(42);
    let mut manifest = serde_json::Map::new();

    let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();

    for ring_num in 1..=6u32 {
        let ring = format!("Ring_{ring_num}");
        // elevated rings (2, 4, 5) run ~150 ppm above ambient
        let baseline = if matches!(ring_num, 2 | 4 | 5) { 560.0 } else { 415.0 };

        // two historical parts overlapping on Jan 10, recent overlapping on Jan 19
        write_csv(
            &cache_dir.join(format!("{ring}_historical_0.csv")),
            &ring,
            d(1),
            d(11),
            baseline,
            &mut rng,
        );
        write_csv(
            &cache_dir.join(format!("{ring}_historical_1.csv")),
            &ring,
            d(10),
            d(20),
            baseline,
            &mut rng,
        );
        write_csv(
            &cache_dir.join(format!("{ring}_recent.csv")),
            &ring,
            d(19),
            d(31),
            baseline,
            &mut rng,
        );

        // placeholder links: the fetcher reuses the files written above
        manifest.insert(
            ring.clone(),
            serde_json::json!({
                "historical": [
                    format!("https://example.invalid/{ring}/historical_0.csv"),
                    format!("https://example.invalid/{ring}/historical_1.csv"),
                ],
                "recent": format!("https://example.invalid/{ring}/recent.csv"),
            }),
        );
    }

    let manifest = serde_json::json!({ "rings": manifest });
    std::fs::write(
        "ring_sources.json",
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .expect("failed to write manifest");

    println!("Wrote sample CSVs for 6 rings to {} and ring_sources.json", cache_dir.display());
}
