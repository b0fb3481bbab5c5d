//! Writes two synthetic HWiNFO-style sessions for trying the dashboard:
//!
//! * `sample_eco.csv` – Latin-1, canonical `°` headers, trailing delimiter
//! * `sample_alt.csv` – UTF-8 with double-encoded `Â°` headers, quoted
//!   thousands in the fan column, a few broken rows and the repeated
//!   header footer HWiNFO appends

use anyhow::{Context, Result};
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

/// How hard the machine works during a session.
struct Profile {
    label: &'static str,
    start: NaiveDateTime,
    rows: usize,
    /// Package power around which the load oscillates.
    base_power: f64,
    degree: &'static str,
}

fn headers(degree: &str) -> Vec<String> {
    vec![
        "Date".to_string(),
        "Time".to_string(),
        format!("CPU (Tctl/Tdie) [{degree}C]"),
        "CPU Package Power [W]".to_string(),
        "Core 0 Power [W]".to_string(),
        "Core 1 Power [W]".to_string(),
        "Core 2 Power [W]".to_string(),
        "Core 3 Power [W]".to_string(),
        "CPU SoC Power (SVI2 TFN) [W]".to_string(),
        "Core VIDs (avg) [V]".to_string(),
        "SoC Voltage (SVI2 TFN) [V]".to_string(),
        "CPU1 [RPM]".to_string(),
        format!("GPU Temperature [{degree}C]"),
        String::new(),
    ]
}

fn sample_row(profile: &Profile, i: usize, rng: &mut SimpleRng) -> Vec<String> {
    let ts = profile.start + Duration::milliseconds(2000 * i as i64);
    let load = 0.5 + 0.5 * (i as f64 / 40.0).sin();
    let power = profile.base_power * (0.6 + 0.8 * load) + rng.gauss(0.0, 0.4);
    let cores: Vec<f64> = (0..4).map(|_| (power * 0.17 + rng.gauss(0.0, 0.1)).max(0.05)).collect();
    let soc = (power - cores.iter().sum::<f64>()).max(0.5);
    let temp = 42.0 + power * 1.6 + rng.gauss(0.0, 0.8);
    let rpm = (1800.0 + temp * 28.0 + rng.gauss(0.0, 40.0)).round();

    vec![
        ts.format("%d.%m.%Y").to_string(),
        ts.format("%H:%M:%S%.3f").to_string(),
        format!("{temp:.1}"),
        format!("{power:.3}"),
        format!("{:.3}", cores[0]),
        format!("{:.3}", cores[1]),
        format!("{:.3}", cores[2]),
        format!("{:.3}", cores[3]),
        format!("{soc:.3}"),
        format!("{:.3}", 0.9 + 0.35 * load + rng.gauss(0.0, 0.01)),
        format!("{:.3}", 0.95 + rng.gauss(0.0, 0.005)),
        if rpm >= 1000.0 {
            format!("{},{:03}", rpm as i64 / 1000, rpm as i64 % 1000)
        } else {
            format!("{rpm}")
        },
        format!("{:.1}", temp - 6.0 + rng.gauss(0.0, 0.5)),
        String::new(),
    ]
}

fn build_session(profile: &Profile, rng: &mut SimpleRng, broken_rows: bool) -> Vec<Vec<String>> {
    let mut rows = vec![headers(profile.degree)];
    for i in 0..profile.rows {
        let mut row = sample_row(profile, i, rng);
        if broken_rows && i % 97 == 13 {
            row[1] = "garbage".to_string();
        }
        if broken_rows && i % 89 == 21 {
            row[11] = "n/a".to_string();
        }
        rows.push(row);
    }
    if broken_rows {
        // HWiNFO repeats the header row at the bottom of the log.
        rows.push(headers(profile.degree));
    }
    rows
}

fn write_session(path: &str, rows: &[Vec<String>], latin1: bool) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in rows {
        if latin1 {
            let encoded: Vec<Vec<u8>> = row
                .iter()
                .map(|cell| cell.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')).collect())
                .collect();
            writer.write_record(&encoded)?;
        } else {
            writer.write_record(row)?;
        }
    }
    writer.flush()?;
    println!("Wrote {} lines to {path}", rows.len());
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let day = |d: u32| {
        NaiveDate::from_ymd_opt(2025, 11, d)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
            .context("invalid start date")
    };

    let eco = Profile {
        label: "eco",
        start: day(7)?,
        rows: 900,
        base_power: 6.0,
        degree: "°",
    };
    let alt = Profile {
        label: "alt",
        start: day(3)?,
        rows: 600,
        base_power: 14.0,
        degree: "Â°",
    };

    for (profile, latin1, broken) in [(&eco, true, false), (&alt, false, true)] {
        let rows = build_session(profile, &mut rng, broken);
        write_session(&format!("sample_{}.csv", profile.label), &rows, latin1)?;
    }
    Ok(())
}
