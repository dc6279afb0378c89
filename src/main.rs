//! Procanim headless preview
//!
//! Spawns a small scene, applies one animation mode to a subject entity and runs
//! the fixed-step loop, logging the subject's transform as it goes.
//!
//! Usage:
//!     procanim [OPTIONS]
//!
//! Options:
//!     -m, --mode <MODE>        Animation mode (default: hover, or the preset's mode)
//!     -p, --preset <FILE>      Load parameters from a preset JSON file
//!     -s, --seconds <SECS>     Simulated run length (default: 5.0)
//!     --dt <SECS>              Fixed tick length (default: 1/60)
//!     --realtime               Pace ticks against the wall clock
//!     --save-preset <FILE>     Save the effective parameters as a preset
//!     --log-every <N>          Log the subject transform every N ticks (default: 30)
//!     --snap-rotation          Also match rotation in snap-to-object mode
//!     --seed <SEED>            Fixed shake seed
//!     -h, --help               Show this help message

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use glam::{Quat, Vec3};

use procanim::animation::{
    AnimationMode, AnimationPreset, AnimationSystem, IndependentMode,
    RelationalMode, RelationalRequest, TickReport,
};
use procanim::core::{
    logging,
    time::{FixedTimestep, FrameTimer},
};
use procanim::scene::{SceneWorld, Transform};

fn print_help() {
    eprintln!("procanim - Procedural animation preview");
    eprintln!();
    eprintln!("Usage: procanim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -m, --mode <MODE>        hover, wobble, spin, shake, bounce, scale,");
    eprintln!("                             orbit, look-at, follow, path, snap (default: hover)");
    eprintln!("    -p, --preset <FILE>      Load parameters from a preset JSON file");
    eprintln!("    -s, --seconds <SECS>     Simulated run length (default: 5.0)");
    eprintln!("    --dt <SECS>              Fixed tick length (default: 1/60)");
    eprintln!("    --realtime               Pace ticks against the wall clock");
    eprintln!("    --save-preset <FILE>     Save the effective parameters as a preset");
    eprintln!("    --log-every <N>          Log the subject transform every N ticks (default: 30)");
    eprintln!("    --snap-rotation          Also match rotation in snap-to-object mode");
    eprintln!("    --seed <SEED>            Fixed shake seed");
    eprintln!("    -h, --help               Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    procanim --mode shake --seed 7 --seconds 1");
    eprintln!("    RUST_LOG=procanim=debug procanim -m path -s 12");
}

#[derive(Debug)]
struct Args {
    mode: Option<AnimationMode>,
    preset: Option<PathBuf>,
    seconds: f32,
    dt: f32,
    realtime: bool,
    save_preset: Option<PathBuf>,
    log_every: u64,
    snap_rotation: bool,
    seed: Option<u64>,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut parsed = Args {
        mode: None,
        preset: None,
        seconds: 5.0,
        dt: 1.0 / 60.0,
        realtime: false,
        save_preset: None,
        log_every: 30,
        snap_rotation: false,
        seed: None,
    };

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("Missing value for {}", flag))
        };
        match flag {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-m" | "--mode" => {
                let v = value()?;
                parsed.mode = Some(v.parse().map_err(|e| format!("{}", e))?);
            }
            "-p" | "--preset" => parsed.preset = Some(PathBuf::from(value()?)),
            "-s" | "--seconds" => {
                let v = value()?;
                parsed.seconds = v.parse().map_err(|_| format!("Invalid seconds: {}", v))?;
            }
            "--dt" => {
                let v = value()?;
                parsed.dt = v.parse().map_err(|_| format!("Invalid dt: {}", v))?;
                if parsed.dt.is_nan() || parsed.dt <= 0.0 {
                    return Err(format!("dt must be positive: {}", v));
                }
            }
            "--realtime" => parsed.realtime = true,
            "--save-preset" => parsed.save_preset = Some(PathBuf::from(value()?)),
            "--log-every" => {
                let v = value()?;
                parsed.log_every = v.parse().map_err(|_| format!("Invalid log-every: {}", v))?;
            }
            "--snap-rotation" => parsed.snap_rotation = true,
            "--seed" => {
                let v = value()?;
                parsed.seed = Some(v.parse().map_err(|_| format!("Invalid seed: {}", v))?);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    Ok(parsed)
}

/// Entities of the preview scene.
struct Stage {
    scene: SceneWorld,
    subject: hecs::Entity,
    anchor: hecs::Entity,
    waypoints: Vec<hecs::Entity>,
}

fn build_stage() -> Stage {
    let mut scene = SceneWorld::new();
    let anchor = scene.spawn(
        "anchor",
        Transform::new(Vec3::new(0.0, 0.0, 5.0), Quat::from_rotation_y(0.75), Vec3::ONE),
    );
    let waypoints: Vec<_> = [
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(3.0, 0.0, 3.0),
        Vec3::new(-3.0, 0.0, 3.0),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, p)| scene.spawn(format!("waypoint-{}", i), Transform::from_position(p)))
    .collect();
    let subject = scene.spawn("subject", Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));

    Stage {
        scene,
        subject,
        anchor,
        waypoints,
    }
}

fn run(args: Args) -> procanim::core::Result<()> {
    let preset = args.preset.as_deref().map(AnimationPreset::load).transpose()?;
    let mode = args
        .mode
        .or_else(|| preset.as_ref().map(|p| AnimationMode::Independent(p.mode)))
        .unwrap_or(AnimationMode::Independent(IndependentMode::Hover));

    let mut params = preset.as_ref().map(|p| p.parameters).unwrap_or_default();
    params.snap_rotation |= args.snap_rotation;
    if args.seed.is_some() {
        params.shake_seed = args.seed;
    }
    params.validate()?;

    if let Some(path) = &args.save_preset {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "preset".to_string());
        let independent = match mode {
            AnimationMode::Independent(m) => m,
            AnimationMode::Relational(_) => IndependentMode::None,
        };
        AnimationPreset::new(name, independent, params).save(path)?;
        log::info!("Saved preset to {}", path.display());
    }

    let mut stage = build_stage();
    let mut system = AnimationSystem::new();
    let baseline = stage
        .scene
        .transform(stage.subject)
        .unwrap_or_default();

    let applied = match mode {
        AnimationMode::Independent(m) => {
            system.apply_independent(&mut stage.scene, &[stage.subject], m, &params, true)
        }
        AnimationMode::Relational(m) => match relational_request(m, &stage) {
            Some(request) => {
                system.apply_relational(&mut stage.scene, &[stage.subject], &request, &params, true)
            }
            None => 0,
        },
    };
    if applied == 0 {
        log::warn!("Mode {} did not start", mode);
    }

    log::info!(
        "Previewing {} for {:.2}s at dt={:.4}s{}",
        mode,
        args.seconds,
        args.dt,
        if args.realtime { " (realtime)" } else { "" }
    );

    let total_ticks = (args.seconds / args.dt).ceil().max(0.0) as u64;
    let mut fixed = FixedTimestep::new(args.dt);
    let mut timer = FrameTimer::new();
    let mut ticks = 0u64;
    let mut completed = 0usize;

    while ticks < total_ticks {
        let steps = if args.realtime {
            std::thread::sleep(Duration::from_secs_f32(args.dt));
            timer.tick();
            fixed.accumulate(timer.delta_secs()) as u64
        } else {
            1
        };

        for _ in 0..steps.min(total_ticks - ticks) {
            let report: TickReport = system.tick(&mut stage.scene, args.dt);
            ticks += 1;
            completed += report.completed;

            if args.log_every > 0 && ticks % args.log_every == 0 {
                log_subject(&stage, ticks);
            }
            if report.completed > 0 {
                log::info!("Run completed after {} ticks", ticks);
            }
        }
    }

    let final_pose = stage.scene.transform(stage.subject).unwrap_or_default();
    log::info!(
        "Finished {} ticks ({} completions); state {:?}",
        ticks,
        completed,
        system.state(&stage.scene, stage.subject)
    );

    system.stop(&mut stage.scene, stage.subject)?;
    let stopped = stage.scene.transform(stage.subject).unwrap_or_default();
    log::info!(
        "Final pose {} baseline; after stop {} baseline",
        if final_pose == baseline { "equals" } else { "differs from" },
        if stopped == baseline { "equals" } else { "differs from" },
    );
    Ok(())
}

fn relational_request(mode: RelationalMode, stage: &Stage) -> Option<RelationalRequest> {
    let target = stage.anchor;
    match mode {
        RelationalMode::None => None,
        RelationalMode::Orbit => Some(RelationalRequest::Orbit { target }),
        RelationalMode::LookAt => Some(RelationalRequest::LookAt { target }),
        RelationalMode::Follow => Some(RelationalRequest::Follow { target }),
        RelationalMode::MoveAlongPath => Some(RelationalRequest::MoveAlongPath {
            waypoints: stage.waypoints.clone(),
        }),
        RelationalMode::SnapToObject => Some(RelationalRequest::SnapToObject { target }),
    }
}

fn log_subject(stage: &Stage, tick: u64) {
    if let Some(t) = stage.scene.transform(stage.subject) {
        let (yaw, pitch, roll) = t.rotation.to_euler(glam::EulerRot::YXZ);
        log::info!(
            "tick {:5}: pos ({:7.3}, {:7.3}, {:7.3}) ypr ({:6.1}, {:6.1}, {:6.1}) scale ({:5.3}, {:5.3}, {:5.3})",
            tick,
            t.position.x,
            t.position.y,
            t.position.z,
            yaw.to_degrees(),
            pitch.to_degrees(),
            roll.to_degrees(),
            t.scale.x,
            t.scale.y,
            t.scale.z,
        );
    }
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
