use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
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

    fn index(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Reverse the `'-'`-separated atoms of a label: "O6-N3" → "N3-O6".
fn swap(label: &str) -> String {
    let mut parts: Vec<&str> = label.split('-').collect();
    parts.reverse();
    parts.join("-")
}

fn weighted_index(rng: &mut SimpleRng, weights: &[usize]) -> usize {
    let total: usize = weights.iter().sum();
    let mut roll = rng.index(total);
    for (i, &w) in weights.iter().enumerate() {
        if roll < w {
            return i;
        }
        roll -= w;
    }
    weights.len() - 1
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let n_rows = 500;

    // Pair catalogue: hydrogen bonds with reference donor-acceptor
    // distances in Å, first base's atom named first.
    let catalogue: Vec<(&str, Vec<(&str, f64)>)> = vec![
        ("G-C", vec![("O6-N4", 2.91), ("N1-N3", 2.95), ("N2-O2", 2.86)]),
        ("A-U", vec![("N6-O4", 2.95), ("N1-N3", 2.82)]),
        ("G-U", vec![("O6-N3", 2.83), ("N1-O2", 2.79)]),
        ("G-A", vec![("N3-N6", 3.05), ("N2-N7", 2.98)]),
        ("A-A", vec![("N6-N1", 3.02)]),
        ("U-U", vec![("N3-O2", 2.88), ("O4-N3", 2.93)]),
    ];
    let weights = [30, 25, 18, 10, 9, 8];

    let pdb_ids = ["1EHZ", "4V9F", "1FFK", "3J79", "6XRZ", "7K00", "1S72", "5TBW"];
    let chains = ["A", "B", "0", "AA"];

    // Collect all rows as parallel columns
    let mut all_pdb: Vec<String> = Vec::new();
    let mut all_chain: Vec<String> = Vec::new();
    let mut all_res: Vec<f64> = Vec::new();
    let mut all_nt1: Vec<i64> = Vec::new();
    let mut all_nt2: Vec<i64> = Vec::new();
    let mut all_pair: Vec<String> = Vec::new();
    let mut all_atoms: [Vec<Option<String>>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut all_dist: [Vec<Option<f64>>; 3] = [Vec::new(), Vec::new(), Vec::new()];

    for _ in 0..n_rows {
        let (pair, bonds) = &catalogue[weighted_index(&mut rng, &weights)];

        // Half the rows are recorded from the partner strand's side.
        let flipped = rng.chance(0.5);
        let base_pair = if flipped {
            swap(pair)
        } else {
            (*pair).to_string()
        };

        let nt1 = 1 + rng.index(2400) as i64;
        let nt2 = nt1 + 1 + rng.index(200) as i64;

        all_pdb.push(pdb_ids[rng.index(pdb_ids.len())].to_string());
        all_chain.push(chains[rng.index(chains.len())].to_string());
        all_res.push(round2(rng.gauss(2.6, 0.6).clamp(1.2, 4.5)));
        all_nt1.push(nt1);
        all_nt2.push(nt2);
        all_pair.push(base_pair);

        for slot in 0..3 {
            let (mut atoms, mut dist) = (None, None);
            if let Some(&(bond, ref_len)) = bonds.get(slot) {
                // A few bonds are not resolved at all in a given structure,
                // and a few are recorded without a refined distance.
                if !rng.chance(0.04) {
                    atoms = Some(if flipped { swap(bond) } else { bond.to_string() });
                    if !rng.chance(0.03) {
                        dist = Some(round2(rng.gauss(ref_len, 0.12)));
                    }
                }
            }
            all_atoms[slot].push(atoms);
            all_dist[slot].push(dist);
        }
    }

    let columns = [
        "pdb_id",
        "chain",
        "resolution",
        "nt1_index",
        "nt2_index",
        "base_pair",
        "atoms_hbond_1",
        "dist_hbond_1",
        "atoms_hbond_2",
        "dist_hbond_2",
        "atoms_hbond_3",
        "dist_hbond_3",
    ];

    // Write CSV
    let csv_path = "sample_data.csv";
    let mut wtr = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    wtr.write_record(columns).expect("Failed to write CSV header");
    for i in 0..n_rows {
        let mut record: Vec<String> = vec![
            all_pdb[i].clone(),
            all_chain[i].clone(),
            all_res[i].to_string(),
            all_nt1[i].to_string(),
            all_nt2[i].to_string(),
            all_pair[i].clone(),
        ];
        for slot in 0..3 {
            record.push(all_atoms[slot][i].clone().unwrap_or_default());
            record.push(
                all_dist[slot][i]
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&record).expect("Failed to write CSV row");
    }
    wtr.flush().expect("Failed to flush CSV");

    // Build Arrow arrays (slot columns are nullable)
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(all_pdb.clone())),
        Arc::new(StringArray::from(all_chain.clone())),
        Arc::new(Float64Array::from(all_res.clone())),
        Arc::new(Int64Array::from(all_nt1.clone())),
        Arc::new(Int64Array::from(all_nt2.clone())),
        Arc::new(StringArray::from(all_pair.clone())),
    ];
    for slot in 0..3 {
        arrays.push(Arc::new(StringArray::from(all_atoms[slot].clone())));
        arrays.push(Arc::new(Float64Array::from(all_dist[slot].clone())));
    }

    let mut fields = vec![
        Field::new("pdb_id", DataType::Utf8, false),
        Field::new("chain", DataType::Utf8, false),
        Field::new("resolution", DataType::Float64, false),
        Field::new("nt1_index", DataType::Int64, false),
        Field::new("nt2_index", DataType::Int64, false),
        Field::new("base_pair", DataType::Utf8, false),
    ];
    for slot in 1..=3 {
        fields.push(Field::new(format!("atoms_hbond_{slot}"), DataType::Utf8, true));
        fields.push(Field::new(
            format!("dist_hbond_{slot}"),
            DataType::Float64,
            true,
        ));
    }
    let schema = Arc::new(Schema::new(fields));

    let batch =
        RecordBatch::try_new(schema.clone(), arrays).expect("Failed to create RecordBatch");

    // Write Parquet
    let parquet_path = "sample_data.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    let distinct: BTreeSet<&String> = all_pair.iter().collect();
    println!(
        "Wrote {n_rows} observations over {} base-pair labels to {csv_path} and {parquet_path}",
        distinct.len()
    );
}
