use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Days, NaiveDate};
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

use trademe_dashboard::config::{DEFAULT_DATA_PATH, DEFAULT_SHEET};
use trademe_dashboard::data::model::columns;

const EXTRA_COLUMNS: [&str; 3] = ["Property Type", "Furnished", "Pets OK"];

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct SampleListing {
    region: &'static str,
    suburb: &'static str,
    bedrooms: i64,
    bathrooms: i64,
    listed: NaiveDate,
    rent: f64,
    days: i64,
    property_type: &'static str,
    furnished: &'static str,
    pets: &'static str,
}

fn generate(rng: &mut SimpleRng, count: usize) -> Vec<SampleListing> {
    // (region, weekly base rent, suburbs)
    let regions: [(&str, f64, &[&str]); 5] = [
        ("Auckland", 560.0, &["Ponsonby", "Mount Eden", "Henderson", "Manukau"]),
        ("Wellington", 520.0, &["Te Aro", "Karori", "Johnsonville"]),
        ("Canterbury", 450.0, &["Riccarton", "Sydenham", "Rolleston"]),
        ("Waikato", 430.0, &["Hamilton East", "Frankton"]),
        ("Otago", 440.0, &["North Dunedin", "Queenstown Hill"]),
    ];
    let types = ["Apartment", "House", "Townhouse", "Unit"];
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();

    (0..count)
        .map(|_| {
            let (region, base, suburbs) = *rng.pick(&regions);
            let bedrooms = 1 + rng.below(5) as i64;
            let bathrooms = (1 + rng.below(3) as i64).min(bedrooms);
            let rent = (base + 90.0 * (bedrooms - 1) as f64 + rng.gauss(0.0, 60.0)).max(150.0);
            SampleListing {
                region,
                suburb: *rng.pick(suburbs),
                bedrooms,
                bathrooms,
                listed: start + Days::new(rng.below(181) as u64),
                rent: (rent / 5.0).round() * 5.0,
                days: rng.gauss(21.0, 9.0).round().max(1.0) as i64,
                property_type: *rng.pick(&types),
                furnished: *rng.pick(&["Yes", "No"]),
                pets: *rng.pick(&["Yes", "No", "Negotiable"]),
            }
        })
        .collect()
}

fn headers() -> Vec<&'static str> {
    columns::REQUIRED.iter().chain(EXTRA_COLUMNS.iter()).copied().collect()
}

fn write_xlsx(listings: &[SampleListing], path: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(DEFAULT_SHEET)?;
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for (col, header) in headers().iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    for (i, l) in listings.iter().enumerate() {
        let r = (i + 1) as u32;
        let listed = ExcelDateTime::from_ymd(
            l.listed.year() as u16,
            l.listed.month() as u8,
            l.listed.day() as u8,
        )?;
        sheet.write_string(r, 0, l.region)?;
        sheet.write_string(r, 1, l.suburb)?;
        sheet.write_number(r, 2, l.bedrooms as f64)?;
        sheet.write_number(r, 3, l.bathrooms as f64)?;
        sheet.write_datetime_with_format(r, 4, &listed, &date_format)?;
        sheet.write_number(r, 5, l.rent)?;
        sheet.write_number(r, 6, l.days as f64)?;
        sheet.write_string(r, 7, l.property_type)?;
        sheet.write_string(r, 8, l.furnished)?;
        sheet.write_string(r, 9, l.pets)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn write_parquet(listings: &[SampleListing], path: &str) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let text = |f: fn(&SampleListing) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(listings.iter().map(f).collect::<Vec<_>>()))
    };

    let arrays: Vec<ArrayRef> = vec![
        text(|l| l.region),
        text(|l| l.suburb),
        Arc::new(Int64Array::from_iter_values(listings.iter().map(|l| l.bedrooms))),
        Arc::new(Int64Array::from_iter_values(listings.iter().map(|l| l.bathrooms))),
        Arc::new(Date32Array::from_iter_values(
            listings
                .iter()
                .map(|l| (l.listed - epoch).num_days() as i32),
        )),
        Arc::new(Float64Array::from_iter_values(listings.iter().map(|l| l.rent))),
        Arc::new(Int64Array::from_iter_values(listings.iter().map(|l| l.days))),
        text(|l| l.property_type),
        text(|l| l.furnished),
        text(|l| l.pets),
    ];

    let types = [
        DataType::Utf8,
        DataType::Utf8,
        DataType::Int64,
        DataType::Int64,
        DataType::Date32,
        DataType::Float64,
        DataType::Int64,
        DataType::Utf8,
        DataType::Utf8,
        DataType::Utf8,
    ];
    let schema = Arc::new(Schema::new(
        headers()
            .into_iter()
            .zip(types)
            .map(|(name, ty)| Field::new(name, ty, false))
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let count: usize = match std::env::args().nth(1) {
        Some(n) => n.parse().context("row count must be a positive integer")?,
        None => 5_000,
    };

    let mut rng = SimpleRng::new(42);
    let listings = generate(&mut rng, count);

    write_xlsx(&listings, DEFAULT_DATA_PATH)?;
    let parquet_path = DEFAULT_DATA_PATH.replace(".xlsx", ".parquet");
    write_parquet(&listings, &parquet_path)?;

    println!("Wrote {count} listings to {DEFAULT_DATA_PATH} (sheet '{DEFAULT_SHEET}') and {parquet_path}");
    Ok(())
}
