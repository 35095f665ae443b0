use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use clms_stac::{
    components::deconstruct,
    products::{clc, vpp},
    stac::{collection::epsg_summary, year_interval, Collection, Extent, Item, Properties},
    CrsBounds,
};

const LAEA_BBOX: [f64; 4] = [4320000., 3210000., 4330000., 3220000.];

fn bench_deconstruct(c: &mut Criterion) {
    c.bench_function("deconstruct_clc", |b| {
        b.iter(|| {
            deconstruct(
                black_box("DATA/French_DOMs/U2018_CLC2012_V2020_20u1_FR_GLP.tif.aux.xml"),
                &clc::GRAMMAR,
            )
        })
    });
    c.bench_function("deconstruct_vpp", |b| {
        b.iter(|| {
            deconstruct(
                black_box("CLMS/VPP_2017_S2_T32TNS-010m_V101_s1_AMPL.tif"),
                &vpp::GRAMMAR,
            )
        })
    });
}

fn bench_reproject(c: &mut Criterion) {
    let bounds = CrsBounds::from_bbox(3035, LAEA_BBOX);
    c.bench_function("to_wgs84", |b| b.iter(|| black_box(&bounds).to_wgs84()));
}

fn bench_collection_summary(c: &mut Criterion) {
    let (start, end) = year_interval(2018).unwrap();
    let footprint = CrsBounds::from_bbox(3035, LAEA_BBOX).to_wgs84().unwrap();
    let items: Vec<Item> = (0..500)
        .map(|n| {
            let mut item = Item::new(
                format!("item_{n}"),
                &footprint,
                Properties::new(start, end),
                "bench",
            );
            item.properties.projection.epsg = Some(32600 + n % 60);
            item
        })
        .collect();
    c.bench_function("collection_from_500_items", |b| {
        b.iter(|| {
            let mut collection = Collection::new("bench", "bench", Extent::open(start));
            collection.update_extent_from_items(black_box(&items));
            collection.set_epsg_summary(epsg_summary(&items));
            collection
        })
    });
}

criterion_group!(benches, bench_deconstruct, bench_reproject, bench_collection_summary);
criterion_main!(benches);
