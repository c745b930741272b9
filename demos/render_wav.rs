//! Renders a gated sine tone shaped by the RC envelope into a WAV file.
//!
//! Writes `envelope.wav` to the current directory: one second of tone with
//! the gate held, then one second of release tail.

use anyhow::Result;
use farad::{RcAdsr, Signal};
use std::f64::consts::TAU;

const SAMPLE_RATE: u32 = 44100;
const NOTE_FREQ: f64 = 220.0; // A3

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create("envelope.wav", spec)?;

    let mut env = RcAdsr::new(3.0, 4.0, 0.3, 10.0, 22.0, 1.0 / SAMPLE_RATE as f64);
    let mut phase = 0.0_f64;
    let phase_increment = NOTE_FREQ / SAMPLE_RATE as f64;

    env.gate_on();
    for i in 0..(2 * SAMPLE_RATE) {
        if i == SAMPLE_RATE {
            env.gate_off();
        }

        let tone = (phase * TAU).sin();
        phase += phase_increment;
        if phase >= 1.0 {
            phase -= 1.0;
        }

        let sample = tone * env.next_sample() * 0.8;
        writer.write_sample((sample * i16::MAX as f64) as i16)?;
    }

    writer.finalize()?;
    println!("Wrote envelope.wav");
    Ok(())
}
