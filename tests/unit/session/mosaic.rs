use std::io::Cursor;

use image::RgbaImage;

use super::*;
use crate::foundation::error::MosaicError;
use crate::quality::Quality;
use crate::render::frame::ManualFrameClock;
use crate::render::select::RenderMode;
use crate::sampling::cache::SampleCache;
use crate::sampling::loader::MemoryImageLoader;
use crate::shape::ShapeKind;

fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, image::Rgba(rgba)))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn loader() -> MemoryImageLoader {
    let mut l = MemoryImageLoader::new();
    l.insert("red.png", solid_png(32, 32, [255, 0, 0, 255]));
    l.insert("blue.png", solid_png(32, 32, [0, 0, 255, 255]));
    l
}

fn options(src: Option<&str>, grid: i64) -> MosaicOptions {
    MosaicOptions {
        src: src.map(str::to_owned),
        grid_size: Some(grid),
        quality: Some(Quality::High),
        ..MosaicOptions::default()
    }
}

fn session(opts: MosaicOptions) -> MosaicSession<MemoryImageLoader> {
    MosaicSession::new(loader(), SampleCache::shared(), opts, HostEnvironment::default()).unwrap()
}

#[test]
fn busy_until_first_load_completes() {
    let s = session(options(Some("red.png"), 8));
    assert!(s.busy());
    assert!(s.compose().dots.is_empty());

    let out = pollster::block_on(s.load()).unwrap();
    assert!(!out.loading);
    assert!(!s.busy());

    let composed = s.compose();
    assert_eq!(composed.dots.len(), 64);
    assert!(composed.dots.iter().all(|d| d.color == "#ff0000"));
    assert_eq!(composed.renderer, RendererKind::Svg);
    assert!(!composed.errored);
}

#[test]
fn fallback_grid_without_source() {
    let s = session(options(None, 5));
    pollster::block_on(s.load()).unwrap();
    let composed = s.compose();
    assert_eq!(composed.dots.len(), 25);
    assert!(composed.dots.iter().all(|d| d.color == "#1a1a1a"));
    assert!(!composed.errored);
}

#[test]
fn missing_image_is_errored_but_renderable() {
    let s = session(options(Some("nope.png"), 6));
    pollster::block_on(s.load()).unwrap();
    let composed = s.compose();
    assert_eq!(composed.dots.len(), 36);
    assert!(composed.errored);
}

#[test]
fn oversized_grid_is_refused_up_front() {
    let opts = options(None, 3_000_000);
    let err = MosaicSession::new(loader(), SampleCache::shared(), opts, HostEnvironment::default())
        .err()
        .unwrap();
    assert!(matches!(err, MosaicError::Validation(_)));

    let s = session(options(None, 4));
    assert!(s.update(options(None, 3_000_000), HostEnvironment::default()).is_err());
    pollster::block_on(s.load()).unwrap();
    assert_eq!(s.compose().dots.len(), 16);
}

#[test]
fn update_reports_sampling_changes() {
    let s = session(options(Some("red.png"), 8));
    pollster::block_on(s.load()).unwrap();

    let mut same_request = options(Some("red.png"), 8);
    same_request.shape = Some(ShapeKind::Circle);
    assert!(!s.update(same_request, HostEnvironment::default()).unwrap());
    assert!(s.compose().dots.len() < 64);

    assert!(s.update(options(Some("blue.png"), 8), HostEnvironment::default()).unwrap());
}

#[test]
fn invalid_update_keeps_previous_options() {
    let s = session(options(Some("red.png"), 8));
    let bad = MosaicOptions {
        min_opacity: Some(-1.0),
        ..MosaicOptions::default()
    };
    assert!(s.update(bad, HostEnvironment::default()).is_err());
    assert_eq!(s.resolved().grid_size, 8);
    assert_eq!(s.options().src.as_deref(), Some("red.png"));
}

#[test]
fn newer_load_supersedes_older() {
    let s = session(options(Some("red.png"), 4));
    let stale = s.load();

    s.update(options(Some("blue.png"), 4), HostEnvironment::default())
        .unwrap();
    let fresh = pollster::block_on(s.load()).unwrap();
    assert!(fresh.samples.iter().all(|x| x.color == "#0000ff"));

    assert_eq!(pollster::block_on(stale), None);
    assert!(s.compose().dots.iter().all(|d| d.color == "#0000ff"));
}

#[test]
fn cache_is_shared_between_sessions() {
    let cache = SampleCache::shared();
    let a = MosaicSession::new(
        loader(),
        cache.clone(),
        options(Some("red.png"), 8),
        HostEnvironment::default(),
    )
    .unwrap();
    pollster::block_on(a.load()).unwrap();

    let b = MosaicSession::new(
        loader(),
        cache.clone(),
        options(Some("red.png"), 8),
        HostEnvironment::default(),
    )
    .unwrap();
    let issued = b.load();
    // Cache hits apply synchronously.
    assert!(!b.busy());
    pollster::block_on(issued).unwrap();
    assert_eq!(b.sampler.loader().load_count(), 0);
    assert_eq!(cache.borrow().len(), 1);
}

#[test]
fn mount_picks_the_renderer() {
    let s = session(options(None, 4));
    pollster::block_on(s.load()).unwrap();
    let drawable = s.mount(ManualFrameClock::default()).unwrap();
    assert_eq!(drawable.kind(), RendererKind::Svg);
    let Drawable::Svg(scene) = drawable else {
        panic!("expected svg");
    };
    assert_eq!(scene.dots().len(), 16);

    // 24x24 = 576 dots is past the auto threshold.
    let big = session(options(None, 24));
    pollster::block_on(big.load()).unwrap();
    let drawable = big.mount(ManualFrameClock::default()).unwrap();
    assert_eq!(drawable.kind(), RendererKind::Canvas);
    let Drawable::Canvas(mut driver) = drawable else {
        panic!("expected canvas");
    };
    driver.start(0.0).unwrap();
    assert!(driver.is_running());
    assert_eq!(driver.surface_size(), Some((320, 320)));
}

#[test]
fn explicit_render_mode_wins() {
    let mut opts = options(None, 4);
    opts.render_mode = Some(RenderMode::Canvas);
    let s = session(opts);
    pollster::block_on(s.load()).unwrap();
    assert_eq!(s.compose().renderer, RendererKind::Canvas);
}

#[test]
fn mounting_while_loading_dims_the_scene() {
    let s = session(options(Some("red.png"), 4));
    let _pending = s.load();
    assert!(s.busy());
    let Drawable::Svg(scene) = s.mount(ManualFrameClock::default()).unwrap() else {
        panic!("expected svg");
    };
    assert!(scene.dots().is_empty());
    assert!(scene.to_svg_string().starts_with("<svg"));
}
