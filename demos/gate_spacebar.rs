//! Interactive RC envelope example.
//!
//! Press and hold SPACE to gate the envelope on; the tone charges through
//! Attack into Decay and parks at the sustain level while held. Release
//! SPACE to gate off and hear the release tail. Press Q or ESC to quit.
//!
//! Requires a terminal that reports key release events (kitty protocol).

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, StreamConfig};
use crossterm::{
    ExecutableCommand,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use farad::{RcAdsr, Signal, Stage};
use std::f64::consts::TAU;
use std::io::{Write, stdout};
use std::panic;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;
const NOTE_FREQ: f64 = 220.0; // A3

struct GateDemo {
    envelope: RcAdsr,
    phase: f64,
    phase_increment: f64,
    gate_held: bool,
}

impl GateDemo {
    fn new() -> Self {
        Self {
            envelope: RcAdsr::new(3.0, 4.0, 0.3, 10.0, 22.0, 1.0 / SAMPLE_RATE as f64),
            phase: 0.0,
            phase_increment: NOTE_FREQ / SAMPLE_RATE as f64,
            gate_held: false,
        }
    }

    fn next_sample(&mut self) -> f64 {
        let tone = (self.phase * TAU).sin();
        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        tone * self.envelope.next_sample() * 0.3
    }

    fn handle_space(&mut self, kind: KeyEventKind) {
        if matches!(kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            if !self.gate_held {
                self.gate_held = true;
                self.envelope.gate_on();
            }
        } else if matches!(kind, KeyEventKind::Release) {
            self.gate_held = false;
            self.envelope.gate_off();
        }
    }

    fn stage(&self) -> Stage {
        self.envelope.stage()
    }
}

enum KeyAction {
    Continue,
    Exit,
}

fn main() -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No output device available"))?;
    let config = device.default_output_config()?;
    let state = Arc::new(Mutex::new(GateDemo::new()));

    let _stream = match config.sample_format() {
        SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), state.clone())?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), state.clone())?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), state.clone())?,
        sample_format => {
            return Err(anyhow::anyhow!(
                "Unsupported sample format: {}",
                sample_format
            ));
        }
    };

    // Keyboard enhancements MUST come before the alternate screen
    stdout().execute(PushKeyboardEnhancementFlags(
        KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
    ))?;
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(crossterm::cursor::Hide)?;

    // Restore the terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal();
        original_hook(panic_info);
    }));

    draw_ui(Stage::Idle)?;

    loop {
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key_event) = event::read()?
        {
            match handle_key(&state, &key_event)? {
                KeyAction::Continue => {}
                KeyAction::Exit => break,
            }
        }
    }

    cleanup_terminal();
    println!("\nGoodbye!");
    Ok(())
}

fn handle_key(state: &Arc<Mutex<GateDemo>>, key: &KeyEvent) -> Result<KeyAction> {
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        && matches!(key.kind, KeyEventKind::Press)
    {
        return Ok(KeyAction::Exit);
    }

    if let KeyCode::Char(' ') = key.code {
        let mut demo = state.lock().unwrap();
        demo.handle_space(key.kind);
        let stage = demo.stage();
        drop(demo);
        draw_ui(stage)?;
    }

    Ok(KeyAction::Continue)
}

fn draw_ui(stage: Stage) -> Result<()> {
    let mut stdout = stdout();
    stdout.execute(crossterm::terminal::Clear(
        crossterm::terminal::ClearType::All,
    ))?;
    stdout.execute(crossterm::cursor::MoveTo(0, 0))?;
    write!(
        stdout,
        "RC envelope: {:?} | HOLD SPACE=gate on  RELEASE=gate off  Q=quit",
        stage
    )?;
    stdout.flush()?;
    Ok(())
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    state: Arc<Mutex<GateDemo>>,
) -> Result<cpal::Stream>
where
    T: Sample + FromSample<f64> + cpal::SizedSample,
{
    let channels = config.channels as usize;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let mut demo = state.lock().unwrap();
            for frame in data.chunks_mut(channels) {
                let value: T = T::from_sample(demo.next_sample());
                for s in frame.iter_mut() {
                    *s = value;
                }
            }
        },
        |err| eprintln!("Audio stream error: {}", err),
        None,
    )?;

    stream.play()?;
    Ok(stream)
}

fn cleanup_terminal() {
    let _ = stdout().execute(PopKeyboardEnhancementFlags);
    let _ = stdout().execute(crossterm::cursor::Show);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = disable_raw_mode();
}
