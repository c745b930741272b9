use farad::{RcAdsr, Signal, Stage};

fn bringup_patch() -> RcAdsr {
    RcAdsr::new(3.0, 4.0, 0.3, 10.0, 22.0, 0.001)
}

#[test]
fn full_gate_cycle_has_the_expected_shape() {
    let mut env = bringup_patch();
    env.gate_on();

    let mut decay_entered_at = None;
    let mut samples = Vec::with_capacity(1000);
    for i in 0..1000 {
        if i == 500 {
            env.gate_off();
        }
        samples.push(env.advance());
        if decay_entered_at.is_none() && env.stage() == Stage::Decay {
            decay_entered_at = Some(i);
        }
    }

    let crossed = decay_entered_at.expect("attack never handed over to decay");
    assert!(crossed < 70, "decay entered at sample {crossed}");

    // The release tail must end below the gate-off level
    assert!(samples[999] < samples[500]);

    // Gate-off lands near the sustain level after half a second of decay
    assert!((samples[499] - 0.3).abs() < 0.01);
}

#[test]
fn identically_driven_envelopes_match_bit_for_bit() {
    let mut a = bringup_patch();
    let mut b = bringup_patch();

    for _ in 0..2 {
        a.gate_on();
        b.gate_on();
        for i in 0..1000 {
            if i == 500 {
                a.gate_off();
                b.gate_off();
            }
            assert_eq!(a.advance(), b.advance());
        }
    }
}

#[test]
fn reset_restores_the_cold_start_cycle() {
    let run = |env: &mut RcAdsr| -> Vec<f64> {
        env.gate_on();
        (0..1000)
            .map(|i| {
                if i == 500 {
                    env.gate_off();
                }
                env.advance()
            })
            .collect()
    };

    let mut env = bringup_patch();
    let cold = run(&mut env);
    env.reset();
    let after_reset = run(&mut env);
    assert_eq!(cold, after_reset);
}

#[test]
fn envelope_drives_a_buffer_through_the_signal_trait() {
    let mut env = bringup_patch();
    env.gate_on();

    let mut buffer = vec![0.0; 64];
    env.process(&mut buffer);

    // Early attack: the charge curve rises sample over sample
    for window in buffer.windows(2) {
        assert!(window[1] > window[0]);
    }
}

#[test]
fn component_setters_take_effect_between_notes() {
    let mut slow = bringup_patch();
    slow.set_attack_resistance(30.0);

    let mut fast = bringup_patch();

    slow.gate_on();
    fast.gate_on();
    for _ in 0..100 {
        slow.advance();
        fast.advance();
    }

    // Ten times the resistance means ten times the time constant, so the
    // slow envelope is still far below the fast one
    assert!(slow.amplitude() < fast.amplitude());
    assert_eq!(slow.stage(), Stage::Attack);
    assert_eq!(fast.stage(), Stage::Decay);
}
