use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fastfile::codec::inflate_raw;
use fastfile::crypto::{apply_keystream, section_digest};
use fastfile::header::SECTIONS_OFFSET;
use fastfile::platform::MAGIC_SIGNED;
use fastfile::{DecodeOptions, FastFileDecoder, IvTable, KeyRegistry, Platform};
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Cursor, Write};

const KEY: [u8; 32] = [0x5Au8; 32];

fn identifier() -> [u8; 32] {
    let mut id = [0u8; 32];
    id[..8].copy_from_slice(b"patch_mp");
    id
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

fn build_archive(sections: usize, section_len: usize) -> Vec<u8> {
    let id = identifier();
    let mut out = vec![0u8; SECTIONS_OFFSET as usize];
    out[0..8].copy_from_slice(&MAGIC_SIGNED.to_be_bytes());
    out[8..12].copy_from_slice(&Platform::WiiU.version().to_be_bytes());
    out[0x18..0x38].copy_from_slice(&id);

    let mut table = IvTable::new(&id);
    for i in 0..sections {
        let plain: Vec<u8> = (0..section_len).map(|b| ((b * 31 + i) % 251) as u8).collect();
        let mut data = deflate(&plain);
        apply_keystream(&KEY, &table.seed_for(i % 4), &mut data);
        table.fold(i % 4, &section_digest(&data));
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(&data);
    }
    out.extend_from_slice(&0u32.to_be_bytes());
    out
}

fn bench_iv_table(c: &mut Criterion) {
    let id = identifier();
    c.bench_function("iv_table_build", |b| b.iter(|| IvTable::new(black_box(&id))));
    c.bench_function("iv_table_fold_1k", |b| {
        b.iter(|| {
            let mut t = IvTable::new(&id);
            for i in 0..1024 {
                t.fold(i % 4, black_box(&[i as u8; 20]));
            }
            t.seed_for(0)
        })
    });
}

fn bench_inflate(c: &mut Criterion) {
    let packed = deflate(&vec![7u8; 1024 * 1024]);
    c.bench_function("inflate_1mb", |b| b.iter(|| inflate_raw(black_box(&packed)).unwrap()));
}

fn bench_decode_archive(c: &mut Criterion) {
    let archive = build_archive(64, 64 * 1024);
    let keys = KeyRegistry::empty().with_key(Platform::WiiU, KEY);

    c.bench_function("decode_64x64k", |b| {
        b.iter(|| {
            let mut dec = FastFileDecoder::new(Cursor::new(black_box(&archive[..])), DecodeOptions::default(), &keys).unwrap();
            let mut out = Vec::with_capacity(64 * 64 * 1024);
            dec.decode(&mut out).unwrap()
        })
    });
}

criterion_group!(benches, bench_iv_table, bench_inflate, bench_decode_archive);
criterion_main!(benches);
