//! Backend assembly and the two things the binary does with a rover: run
//! the behavior loop, or take one reading.

use std::sync::Arc;
#[cfg(all(feature = "hardware", target_os = "linux"))]
use std::time::Duration;

use eyre::WrapErr;
use rover_config::Config;
use rover_core::{BehaviorCfg, InputBindings, Rover, RunStats};
use rover_hardware::{BuzzerSounder, KillSwitch};

use crate::cli::JSON_MODE;
use crate::rt::setup_rt_once;

/// A built rover plus what has to outlive it.
pub struct Assembled {
    pub rover: Rover,
    pub kill: KillSwitch,
    pub backend: &'static str,
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn assemble(cfg: &Config) -> eyre::Result<Assembled> {
    use rover_hardware::{LogIndicator, LogTone, SimInputs, SimWorld, WorldCfg};
    use rover_traits::{Clock, MonotonicClock, SimClock};

    let clock: Arc<dyn Clock + Send + Sync> = if cfg.sim.realtime {
        Arc::new(MonotonicClock::new())
    } else {
        Arc::new(SimClock::new())
    };
    let world = SimWorld::new(
        WorldCfg {
            arena_cm: cfg.sim.arena_cm,
            hole: cfg.sim.hole,
            start: cfg.sim.start,
            cm_per_s_per_speed: cfg.sim.cm_per_s_per_speed,
            wheel_base_cm: cfg.sim.wheel_base_cm,
        },
        Arc::clone(&clock),
    );
    let inputs = SimInputs::default();
    let sounder = BuzzerSounder::spawn(LogTone, cfg.sound.tempo_bpm).wrap_err("start buzzer")?;

    let rover = Rover::builder()
        .with_range(world.range())
        .with_edges(world.edges())
        .with_motors(world.motors())
        .with_indicator(LogIndicator)
        .with_sounder(sounder)
        .with_inputs(inputs.clone(), InputBindings::from(&cfg.inputs))
        .with_clock(clock)
        .with_config(BehaviorCfg::from(cfg))
        .build()?;

    // Handlers are bound now, so lines typed from here on reach the queue.
    inputs
        .spawn_stdin_reader()
        .wrap_err("start stdin reader")?;
    tracing::info!(
        realtime = cfg.sim.realtime,
        "simulator ready; type a, b or s + Enter for button A, button B, shake"
    );

    Ok(Assembled {
        rover,
        kill: Box::new(|| tracing::warn!("sim: motors stopped")),
        backend: "sim",
    })
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn assemble(cfg: &Config) -> eyre::Result<Assembled> {
    use rover_hardware::gpio::{self, GpioPins};
    use rover_traits::{InputId, MonotonicClock};

    let p = &cfg.pins;
    let mut buttons = vec![(InputId::ButtonA, p.button_a), (InputId::ButtonB, p.button_b)];
    if let Some(pin) = p.button_shake {
        buttons.push((InputId::Shake, pin));
    }
    let pins = GpioPins {
        trig: p.trig,
        echo: p.echo,
        edge_left: p.edge_left,
        edge_right: p.edge_right,
        motor_left: (p.motor_left_fwd, p.motor_left_rev),
        motor_right: (p.motor_right_fwd, p.motor_right_rev),
        buttons,
        buzzer: p.buzzer,
        echo_timeout: Duration::from_millis(cfg.range.echo_timeout_ms),
    };
    let rig = gpio::open(&pins).wrap_err("open gpio")?;
    let kill = rig.motors.kill_switch();

    let mut builder = Rover::builder()
        .with_range(rig.range)
        .with_edges(rig.edges)
        .with_motors(rig.motors)
        .with_inputs(rig.buttons, InputBindings::from(&cfg.inputs))
        .with_clock(Arc::new(MonotonicClock::new()))
        .with_config(BehaviorCfg::from(cfg));
    if let Some(tone) = rig.buzzer {
        let sounder = BuzzerSounder::spawn(tone, cfg.sound.tempo_bpm).wrap_err("start buzzer")?;
        builder = builder.with_sounder(sounder);
    }
    let rover = builder.build()?;

    Ok(Assembled {
        rover,
        kill,
        backend: "gpio",
    })
}

/// Ctrl-C: stop the motors from the signal thread, then leave with 130.
fn install_ctrlc(kill: KillSwitch) -> eyre::Result<()> {
    ctrlc::set_handler(move || {
        tracing::warn!("interrupted; stopping motors");
        kill();
        std::process::exit(130);
    })
    .wrap_err("install Ctrl-C handler")
}

fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

fn stats_json(stats: &RunStats) -> serde_json::Value {
    serde_json::json!({
        "cycles": stats.cycles,
        "scans": stats.scans,
        "retreats": stats.retreats,
        "sweeps": stats.sweeps,
        "calibrations": stats.calibrations,
        "samples": stats.samples,
        "sensor_faults": stats.sensor_faults,
        "motor_faults": stats.motor_faults,
    })
}

pub fn run(cfg: &Config, cycles: Option<u64>, rt: bool, rt_prio: Option<i32>) -> eyre::Result<()> {
    if rt {
        setup_rt_once(rt_prio);
    }
    let Assembled {
        mut rover,
        kill,
        backend,
    } = assemble(cfg)?;
    install_ctrlc(kill)?;
    tracing::info!(backend, "rover ready");

    let Some(n) = cycles else {
        rover.run_forever();
    };
    let stats = rover.run_cycles(n);
    let trim = rover.trim();
    if json_mode() {
        let out = serde_json::json!({
            "status": "complete",
            "backend": backend,
            "stats": stats_json(&stats),
            "trim": { "left": trim.left, "right": trim.right },
        });
        println!("{out}");
    } else {
        println!(
            "run complete: {} cycles, {} scans ({} sweeps), {} retreats, {} calibrations",
            stats.cycles, stats.scans, stats.sweeps, stats.retreats, stats.calibrations
        );
        println!(
            "samples {}, sensor faults {}, motor faults {}, trim left {} right {}",
            stats.samples, stats.sensor_faults, stats.motor_faults, trim.left, trim.right
        );
    }
    Ok(())
}

pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let Assembled {
        mut rover, backend, ..
    } = assemble(cfg)?;
    let reading = rover.probe();
    rover.halt();
    let (distance_cm, edges) = reading?;
    if json_mode() {
        let out = serde_json::json!({
            "status": "ok",
            "backend": backend,
            "distance_cm": distance_cm,
            "edges": { "left": edges.left, "right": edges.right },
        });
        println!("{out}");
    } else {
        println!(
            "self-check ok ({backend}): distance {distance_cm:.1} cm, edges left {} right {}",
            edges.left, edges.right
        );
    }
    Ok(())
}
