//! # Active-Section Highlight Benchmark
//!
//! Measures the per-scroll-tick hot path: probing the section list and
//! diffing the active link.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vitrine_ui::{MemoryDom, NavConfig, NavController, PatchBuffer, Rect};

const SECTION_COUNT: usize = 200;
const SECTION_HEIGHT: f64 = 800.0;

fn build_page() -> MemoryDom {
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let nav = dom.element(body, "nav").id("main-nav").build();
    let menu = dom.element(nav, "ul").class("nav-links").build();

    for i in 0..SECTION_COUNT {
        let id = format!("section-{i}");
        dom.element(menu, "a")
            .class("nav-link")
            .attr("href", &format!("#{id}"))
            .build();
        dom.element(body, "section")
            .id(&id)
            .rect(Rect::band(i as f64 * SECTION_HEIGHT, SECTION_HEIGHT))
            .build();
    }
    dom
}

fn bench_highlight_steady(c: &mut Criterion) {
    let dom = build_page();
    let mut nav = NavController::mount(&dom, NavConfig::default())
        .expect("valid selectors")
        .expect("nav present");
    let mut patches = PatchBuffer::new();
    let offset = (SECTION_COUNT as f64 - 1.5) * SECTION_HEIGHT;

    c.bench_function("highlight_same_section_200", |b| {
        b.iter(|| {
            let active = nav.highlight_active_section(black_box(offset), &mut patches).is_some();
            patches.drain();
            black_box(active)
        });
    });
}

fn bench_highlight_sweep(c: &mut Criterion) {
    let dom = build_page();
    let mut nav = NavController::mount(&dom, NavConfig::default())
        .expect("valid selectors")
        .expect("nav present");
    let mut patches = PatchBuffer::new();
    let max = SECTION_COUNT as f64 * SECTION_HEIGHT;
    let mut offset = 0.0;

    c.bench_function("highlight_sweep_200", |b| {
        b.iter(|| {
            offset = (offset + 373.0) % max;
            nav.highlight_active_section(black_box(offset), &mut patches);
            black_box(patches.drain().len())
        });
    });
}

criterion_group!(benches, bench_highlight_steady, bench_highlight_sweep);
criterion_main!(benches);
