use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
use unipad_device::hid::{decode, HidDevice};
use unipad_device::{channel, InputSource};

const NEUTRAL: [u8; 12] = [0x30, 0, 0, 0x00, 0x00, 0x08, 128, 128, 0, 128, 128, 0];
const PRESSED: [u8; 12] = [0x30, 0, 0, 0x08, 0x40, 0x01, 200, 40, 0, 128, 255, 0];

pub fn bench_decode(c: &mut Criterion) {
    c.bench_function("hid_decode_standard", |b| {
        b.iter(|| {
            black_box(decode(black_box(&PRESSED)));
        });
    });

    let mut full = [0u8; 49];
    full[..12].copy_from_slice(&PRESSED);
    full[0] = 0x21;
    c.bench_function("hid_decode_full", |b| {
        b.iter(|| {
            black_box(decode(black_box(&full)));
        });
    });
}

pub fn bench_report_path(c: &mut Criterion) {
    let (tx, rx) = channel(1024);
    let device = HidDevice::pro_controller(1);
    device.attach(&tx);

    c.bench_function("hid_report_diff_forward", |b| {
        b.iter(|| {
            device.on_report(black_box(&PRESSED), &tx);
            device.on_report(black_box(&NEUTRAL), &tx);
            while rx.try_recv().is_ok() {}
        });
    });
}

criterion_group!(benches, bench_decode, bench_report_path);
criterion_main!(benches);
