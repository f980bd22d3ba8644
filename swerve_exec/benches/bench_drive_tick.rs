//! # Drive Tick Benchmark
//!
//! Times one full control cycle: sensor acquisition, input shaping and drive
//! control of all four modules.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use swerve_lib::{
    drive_ctrl::{self, DriveCtrl},
    hal::{IdealGyro, IdealModuleHw},
    input_shaper::{self, AxisSample, InputData, InputShaper},
    module_ctrl,
};
use util::module::State;

fn drive_tick_benchmark(c: &mut Criterion) {
    // ---- Build an idealised drive ----

    let params = drive_ctrl::Params::default();
    let module_params = module_ctrl::Params::default();
    let period_s = params.cycle_period_s;
    let o = params.abs_offsets_rad;

    let mut drive = DriveCtrl::new(
        [
            IdealModuleHw::new(period_s, o[0]),
            IdealModuleHw::new(period_s, o[1]),
            IdealModuleHw::new(period_s, o[2]),
            IdealModuleHw::new(period_s, o[3]),
        ],
        IdealGyro::default(),
        &params,
        &module_params,
    )
    .unwrap();

    let mut shaper = InputShaper::new(input_shaper::Params::default());
    shaper.init(()).unwrap();

    let lease = drive.acquire().unwrap();

    // Sweep the sticks so the modules keep steering
    let mut cycle = 0u64;

    c.bench_function("drive tick", |b| {
        b.iter(|| {
            cycle += 1;
            let phase = (cycle % 200) as f64 * std::f64::consts::PI / 100.0;
            let input = InputData {
                axes: AxisSample {
                    x: phase.sin(),
                    y: phase.cos(),
                    rot: 0.3,
                },
                target_heading_rad: None,
            };

            drive.sample().unwrap();
            let (demand, _) = shaper.proc(black_box(&input)).unwrap();
            black_box(drive.execute(&lease, &demand).unwrap());
        })
    });
}

criterion_group!(benches, drive_tick_benchmark);
criterion_main!(benches);
