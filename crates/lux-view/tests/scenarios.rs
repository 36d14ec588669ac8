//! End-to-end interaction scenarios driven through the public API.

use std::path::PathBuf;

use lux_pipeline::testing::FakePipeline;
use lux_pipeline::{CurveKind, ImageData, Primaries, Profile};
use lux_view::{BlitKind, Frame, SliderId, Viewer, LOAD_ANNOUNCE_FRAMES};

fn sdr_image(width: u32, height: u32) -> ImageData {
    ImageData::solid(width, height, 8, Profile::sdr(80), [20000; 4])
}

fn viewer_with(files: &[(&str, ImageData)]) -> Viewer<FakePipeline> {
    let pipeline = FakePipeline::new();
    for (path, image) in files {
        pipeline.add_image(*path, image.clone());
    }
    let mut viewer = Viewer::new(pipeline);
    viewer.set_platform_size(1920.0, 1080.0);
    viewer.set_file_list(files.iter().map(|(p, _)| PathBuf::from(p)).collect());
    viewer
}

fn pump(viewer: &mut Viewer<FakePipeline>) -> Frame {
    let mut frame = Frame::default();
    for _ in 0..=LOAD_ANNOUNCE_FRAMES {
        frame = viewer.render();
    }
    frame
}

fn has_text(frame: &Frame) -> bool {
    frame
        .blits
        .iter()
        .any(|b| matches!(b.kind, BlitKind::Text { .. }))
}

#[test]
fn announce_frames_show_loading_text_without_an_image() {
    let mut viewer = viewer_with(&[("/shot.exr", sdr_image(64, 64))]);
    viewer.load_image(0);

    let frame = viewer.render();
    assert!(has_text(&frame));
    assert!(!frame
        .blits
        .iter()
        .any(|b| matches!(b.kind, BlitKind::Image { .. })));
    assert!(frame.controls.is_empty());
}

#[test]
fn loaded_frame_draws_the_image_first() {
    let mut viewer = viewer_with(&[("/shot.exr", sdr_image(64, 64))]);
    viewer.load_image(0);
    let frame = pump(&mut viewer);

    assert!(matches!(frame.blits[0].kind, BlitKind::Image { .. }));
    // Overlay text (the load message and status line) follows.
    assert!(has_text(&frame));
    assert!(viewer.overlay_lines()[0].contains("Loaded"));
}

#[test]
fn forced_tonemap_registers_sliders_and_dragging_changes_white() {
    let mut viewer = viewer_with(&[("/shot.exr", sdr_image(64, 64))]);
    viewer.load_image(0);
    pump(&mut viewer);

    viewer.toggle_tonemap();
    let frame = viewer.render();
    let luminance = frame
        .controls
        .iter()
        .find(|c| c.id == SliderId::TonemapLuminance)
        .copied()
        .expect("tonemap sliders registered");

    // Press the middle of the track: the value snaps to the step grid
    // and the image is re-prepared at the new white level.
    let x = luminance.rect.x + luminance.rect.w * 0.5;
    let y = luminance.rect.y + luminance.rect.h * 0.5;
    viewer.mouse_left_down(x, y);
    viewer.mouse_left_up(x, y);

    let white = viewer.slider(SliderId::TonemapLuminance).value.as_i32();
    assert_eq!(white % 10, 0);
    assert!((900..=1100).contains(&white));
    let profile = *viewer.prepared_image().unwrap().profile();
    assert_eq!(profile.max_luminance, white as u32);
    assert_eq!(profile.primaries, Primaries::Bt709);
}

#[test]
fn video_slider_release_requests_a_frame_load() {
    let pipeline = FakePipeline::new();
    pipeline.add_stream("/clip.y4m", sdr_image(64, 64), 10);
    let mut viewer = Viewer::new(pipeline);
    viewer.set_platform_size(1920.0, 1080.0);
    viewer.set_file_list(vec![PathBuf::from("/clip.y4m")]);
    viewer.load_image(0);
    pump(&mut viewer);

    let frame = viewer.render();
    let scrubber = frame
        .controls
        .iter()
        .find(|c| c.id == SliderId::VideoFrame)
        .copied()
        .expect("video slider registered");

    let x = scrubber.rect.x + scrubber.rect.w - 0.5;
    let y = scrubber.rect.y + scrubber.rect.h * 0.5;
    viewer.mouse_left_down(x, y);
    let decodes = viewer.pipeline().decode_count();
    viewer.mouse_left_up(x, y);
    // The reload is deferred like any other load.
    assert_eq!(viewer.pipeline().decode_count(), decodes);
    pump(&mut viewer);
    assert_eq!(viewer.frame_index(), 9);
    assert_eq!(viewer.pipeline().decode_count(), decodes + 1);
}

#[test]
fn drag_pans_and_double_click_zooms() {
    let mut viewer = viewer_with(&[("/shot.exr", sdr_image(64, 64))]);
    viewer.load_image(0);
    pump(&mut viewer);

    let start = *viewer.transform();
    viewer.mouse_left_down(900.0, 500.0);
    viewer.mouse_move(940.0, 530.0);
    viewer.mouse_left_up(940.0, 530.0);
    let panned = *viewer.transform();
    assert_eq!(panned.x, start.x + 40.0);
    assert_eq!(panned.y, start.y + 30.0);

    viewer.mouse_double_click(960.0, 540.0);
    assert_eq!(viewer.transform().scale, 2.0);
    for _ in 0..5 {
        viewer.mouse_double_click(960.0, 540.0);
    }
    // Tier cycle wraps back to fit.
    assert_eq!(viewer.transform().scale, 1.0);
}

#[test]
fn resize_resets_zoom_and_recenters() {
    let mut viewer = viewer_with(&[("/shot.exr", sdr_image(64, 64))]);
    viewer.load_image(0);
    pump(&mut viewer);

    viewer.mouse_wheel(960.0, 540.0, 3.0);
    viewer.mouse_left_down(900.0, 500.0);
    viewer.mouse_move(700.0, 300.0);
    viewer.mouse_left_up(700.0, 300.0);
    assert_eq!(viewer.transform().scale, 4.0);

    viewer.set_platform_size(1280.0, 720.0);
    let t = *viewer.transform();
    assert_eq!(t.scale, 1.0);
    // The square image fits the 1280x720 viewport at 720x720, centered.
    assert_eq!(t.h, 720.0);
    assert_eq!(t.w, 720.0);
    assert_eq!(t.x, (1280.0 - 720.0) / 2.0);
    assert_eq!(t.y, 0.0);
}

#[test]
fn hlg_source_reports_a_peak_in_the_status() {
    let pipeline = FakePipeline::new();
    let hlg = ImageData::solid(
        32,
        32,
        10,
        Profile::stock(Primaries::Bt2020, CurveKind::Hlg, 1000),
        [30000; 4],
    );
    pipeline.add_image("/hlg.avif", hlg);
    let mut viewer = Viewer::new(pipeline);
    viewer.set_platform_size(1280.0, 720.0);
    viewer.set_file_list(vec![PathBuf::from("/hlg.avif")]);
    viewer.load_image(0);
    pump(&mut viewer);

    // At an 80 nit diffuse white, HLG peaks just under 400 nits.
    let peak = viewer.hlg_peak().expect("hlg source detected");
    assert!((380..=410).contains(&peak), "peak={peak}");
}

#[test]
fn diff_session_reports_stats_in_the_info_pane() {
    let first = ImageData::solid(16, 16, 8, Profile::sdr(80), [20000; 4]);
    let second = ImageData::solid(16, 16, 8, Profile::sdr(80), [20015; 4]);
    let mut viewer = viewer_with(&[("/v1/a.png", first), ("/v2/a.png", second)]);
    viewer.load_diff("/v1/a.png", "/v2/a.png");
    pump(&mut viewer);
    viewer.adjust_diff_threshold(100);
    let _ = viewer.render();

    let info = viewer.info_lines().join("\n");
    assert!(info.contains("Showing: Diff"));
    assert!(info.contains("Diff threshold: 100"));
    // Every pixel differs by 15, under the threshold of 100.
    assert!(info.contains("Under: 256 (100.0%)"));
    assert!(info.contains("Largest diff: 15"));

    let overlay = viewer.overlay_lines();
    assert!(overlay[0].contains("Diff threshold"));

    // Diff display samples unfiltered texels.
    assert!(!viewer.uses_linear_sampling());
}

#[test]
fn info_pane_reports_the_on_disk_file_size() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0u8; 2048]).unwrap();
    let path = file.path().to_path_buf();

    let pipeline = FakePipeline::new();
    pipeline.add_image(path.clone(), sdr_image(32, 32));
    let mut viewer = Viewer::new(pipeline);
    viewer.set_platform_size(1280.0, 720.0);
    viewer.set_file_list(vec![path]);
    viewer.load_image(0);
    pump(&mut viewer);
    let _ = viewer.render();

    let info = viewer.info_lines().join("\n");
    assert!(info.contains("Size: 2.00 KB"), "info was: {info}");
}

#[test]
fn secondary_with_other_profile_is_normalized_before_diffing() {
    let first = ImageData::solid(16, 16, 8, Profile::sdr(80), [20000; 4]);
    let second = ImageData::solid(
        16,
        16,
        10,
        Profile::stock(Primaries::Bt2020, CurveKind::Pq, 10000),
        [20000; 4],
    );
    let mut viewer = viewer_with(&[("/a.png", first), ("/b.avif", second)]);
    viewer.load_diff("/a.png", "/b.avif");
    pump(&mut viewer);

    // One normalization convert plus the display preparation.
    assert_eq!(viewer.selection(), lux_view::Selection::Diff);
    assert!(viewer.diff_result().is_some());
    assert_eq!(viewer.pipeline().diff_count(), 1);
}
