//! Prints two full gate cycles of the RC envelope to stdout.
//!
//! Runs the classic bring-up loop: gate on, hold for half the cycle, gate
//! off, let the release tail run out, then repeat. Pipe the output into a
//! plotting tool to see the curve shapes.

use farad::RcAdsr;

const CYCLES: usize = 2;
const CYCLE_LENGTH: usize = 1000;
const GATE_LENGTH: usize = 500;
const SAMPLING_PERIOD: f64 = 0.001;

fn main() {
    tracing_subscriber::fmt::init();

    let mut env = RcAdsr::new(3.0, 4.0, 0.3, 10.0, 22.0, SAMPLING_PERIOD);

    for _ in 0..CYCLES {
        env.gate_on();
        for i in 0..CYCLE_LENGTH {
            if i == GATE_LENGTH {
                env.gate_off();
            }
            println!("{:.6}", env.advance());
        }
    }
}
