use bytes::{Bytes, BytesMut};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::io::Cursor;

use ttlpaste_protocol::{Command, Frame, SetOptions};

fn paste_payload() -> Bytes {
    let code = "fn main() {\n    println!(\"hello\");\n}\n".repeat(64);
    Bytes::from(format!(
        r#"{{"title":"bench","code":{code:?},"language":"rust","expiry_time":"2026-01-01 00:00:00 UTC"}}"#
    ))
}

fn bench_encode_set_paste(c: &mut Criterion) {
    let cmd = Command::Set {
        key: "file:rust-0f8fad5bd9cb469fa16570867728950e:data".into(),
        value: paste_payload(),
        options: SetOptions::create_with_ttl(600),
    };

    c.bench_function("encode_set_paste", |b| {
        b.iter(|| {
            let mut buf = BytesMut::with_capacity(4096);
            black_box(&cmd).to_frame().encode(&mut buf);
            buf
        })
    });
}

fn bench_parse_bulk_paste(c: &mut Criterion) {
    let mut buf = BytesMut::new();
    Frame::Bulk(paste_payload()).encode(&mut buf);
    let encoded = buf.freeze();

    c.bench_function("check_parse_bulk_paste", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(encoded.as_ref()));
            Frame::check(&mut cursor).unwrap();
            cursor.set_position(0);
            Frame::parse(&mut cursor).unwrap()
        })
    });
}

fn bench_parse_ttl_reply(c: &mut Criterion) {
    let data = b":599\r\n";

    c.bench_function("parse_ttl_reply", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(&data[..]));
            Frame::parse(&mut cursor).unwrap()
        })
    });
}

fn bench_command_from_frame(c: &mut Criterion) {
    let frame = Frame::array_from_strs(&["SET", "file:go-1:data", "{}", "EX", "600", "NX"]);

    c.bench_function("command_from_frame_set", |b| {
        b.iter(|| Command::from_frame(black_box(frame.clone())).unwrap())
    });
}

criterion_group!(
    benches,
    bench_encode_set_paste,
    bench_parse_bulk_paste,
    bench_parse_ttl_reply,
    bench_command_from_frame,
);
criterion_main!(benches);
