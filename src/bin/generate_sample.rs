use serde::Serialize;

/// One generated Master-GAP row, serialized with the real messy headers so
/// the sample files exercise the column resolver.
#[derive(Serialize)]
struct SampleRow {
    #[serde(rename = "Product\n(PLT short)")]
    product: String,
    #[serde(rename = "Regulatory Zone")]
    regulatory_zone: String,
    #[serde(rename = "Residues region")]
    residues_region: String,
    #[serde(rename = "Crop")]
    crop: String,
    // the misspelling ships in real workbooks, keep it in the sample
    #[serde(rename = "applicationn timing BBCH end")]
    bbch_end: f64,
    #[serde(rename = "Max # of applns.\n(per block)")]
    max_applications: i64,
    #[serde(rename = "Application rate PTZ (g/ha)")]
    rate_ptz: f64,
    #[serde(rename = "Application rate min (g/ha)")]
    rate_min: f64,
    #[serde(rename = "PHI")]
    phi: f64,
    #[serde(rename = "Minimum appl. interval\n(days)")]
    min_interval: f64,
    #[serde(rename = "Maximum appl. interval\n(days)")]
    max_interval: f64,
}

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

    /// Uniform pick from a slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);

    let products = ["FLX-200", "GRV-50", "MZB-Plus"];
    let zones = ["EU-North", "EU-Central", "EU-South"];
    let regions = ["NEU", "CEU", "SEU"];
    // variants that must fold into crop groups, plus the excluded cereals
    let crops = [
        "Barley spring",
        "Barley winter",
        "Wheat, durum",
        "Wheat spring",
        "Head Cabbage",
        "Onion, bulb",
        "Rape seed winter",
        "Sugar beet",
        "Rye winter",
        "Triticale",
        "Oat",
    ];

    let mut rows = Vec::new();
    for product in &products {
        for zone in zones.iter().zip(&regions) {
            for crop in &crops {
                let max_applications = 1 + (rng.next_u64() % 3) as i64;
                let base_rate = 80.0 + (rng.next_f64() * 80.0).round();
                rows.push(SampleRow {
                    product: product.to_string(),
                    regulatory_zone: zone.0.to_string(),
                    residues_region: zone.1.to_string(),
                    crop: crop.to_string(),
                    bbch_end: *rng.pick(&[39.0, 49.0, 61.0, 69.0, 71.0]),
                    max_applications,
                    rate_ptz: base_rate,
                    rate_min: (base_rate * 0.6).round(),
                    phi: *rng.pick(&[7.0, 14.0, 21.0, 28.0, 35.0]),
                    min_interval: *rng.pick(&[5.0, 7.0, 10.0, 14.0]),
                    max_interval: *rng.pick(&[14.0, 21.0, 28.0]),
                });
            }
        }
    }

    let csv_path = "sample_gap.csv";
    let mut writer = csv::Writer::from_path(csv_path)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let json_path = "sample_gap.json";
    std::fs::write(json_path, serde_json::to_string_pretty(&rows)?)?;

    println!(
        "Wrote {} GAP rows to {csv_path} and {json_path}",
        rows.len()
    );
    Ok(())
}
