use std::path::Path;

use anyhow::{Context, Result};
use basic_cleaning::{ArtifactRegistry, ArtifactSpec, LocalRegistry};
use chrono::{Duration, NaiveDate};

const OUTPUT: &str = "sample.csv";
const ROWS: usize = 200;

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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

/// Mostly plausible nightly prices with a tail of outliers on both ends.
fn price(rng: &mut SimpleRng) -> String {
    match rng.below(20) {
        0 => "0".to_string(),
        1 => format!("{}", 2000 + rng.below(8000)),
        _ => format!("{}", 30 + (rng.next_f64() * 300.0) as u64),
    }
}

/// ISO dates, a few other layouts, blanks and junk.
fn last_review(rng: &mut SimpleRng) -> String {
    let base = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default();
    let date = base + Duration::days(rng.below(4 * 365) as i64);
    match rng.below(10) {
        0 | 1 => String::new(),
        2 => date.format("%m/%d/%Y").to_string(),
        3 => "unknown".to_string(),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

fn write_sample(path: &Path) -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let groups = ["Manhattan", "Brooklyn", "Queens", "Bronx", "Staten Island"];
    let rooms = ["Entire home/apt", "Private room", "Shared room"];
    let words = ["Cozy", "Sunny", "Spacious", "Quiet", "Charming", "Modern"];
    let kinds = ["loft", "studio", "room", "apartment", "townhouse"];

    let mut writer = csv::Writer::from_path(path).context("creating sample file")?;
    writer.write_record([
        "id",
        "name",
        "neighbourhood_group",
        "room_type",
        "price",
        "minimum_nights",
        "number_of_reviews",
        "last_review",
    ])?;

    for id in 0..ROWS {
        let name = format!("{} {}, {}", rng.pick(&words), rng.pick(&kinds), rng.pick(&groups));
        let reviews = rng.below(300);
        writer.write_record([
            (2539 + id * 7).to_string(),
            name,
            rng.pick(&groups).to_string(),
            rng.pick(&rooms).to_string(),
            price(&mut rng),
            (1 + rng.below(30)).to_string(),
            reviews.to_string(),
            if reviews == 0 { String::new() } else { last_review(&mut rng) },
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let path = Path::new(OUTPUT);
    write_sample(path)?;

    let registry_dir =
        std::env::var("ARTIFACT_REGISTRY_DIR").unwrap_or_else(|_| "artifacts".to_string());
    let registry = LocalRegistry::new(&registry_dir);
    let spec = ArtifactSpec::new(OUTPUT, "raw_data", "Synthetic rental listings");
    let version = registry
        .publish(path, &spec)
        .context("publishing sample artifact")?;
    std::fs::remove_file(path).context("removing local sample file")?;

    println!("Wrote {ROWS} listings and published {version} to {registry_dir}");
    Ok(())
}
