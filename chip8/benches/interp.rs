use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chip8::prelude::*;

/// Counts V0 up to 255 in a loop, drawing a glyph every iteration.
#[rustfmt::skip]
const COUNTER: &[u8] = &[
    0x00, 0xE0, // CLS
    0x70, 0x01, // ADD V0, 1
    0xF0, 0x29, // LD F, V0
    0xD1, 0x25, // DRW V1, V2, 5
    0x30, 0xFF, // SE V0, FF
    0x12, 0x02, // JP 202
    0x12, 0x00, // JP 200
];

fn criterion_benchmark(c: &mut Criterion) {
    let mut vm = Chip8Vm::new(Chip8Conf {
        seed: Some(0),
        ..Default::default()
    });
    vm.load_rom(COUNTER).unwrap();

    c.bench_function("counter bytecode", |b| {
        b.iter(|| {
            let step_count = black_box(1000_usize);
            black_box(vm.run_steps(step_count))
        })
    });

    c.bench_function("counter frame", |b| b.iter(|| black_box(vm.run_frame())));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
