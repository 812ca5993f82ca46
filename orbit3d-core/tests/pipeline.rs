use nalgebra::Point2;
use orbit3d_core::{output, pipeline, MaterialAlias, RenderConfig, RenderError, Scene};

const BACK_GREEN: [u8; 4] = [50, 229, 50, 255];
const FRONT_RED: [u8; 4] = [229, 50, 50, 255];

fn pixel_under_origin(frame: &pipeline::Frame) -> [u8; 4] {
    let p = frame.transform.apply(Point2::origin());
    frame
        .framebuffer
        .get(p.x.floor() as usize, p.y.floor() as usize)
        .expect("origin projects inside the raster")
}

#[test]
fn renders_cube_from_first_sample() {
    let scene = Scene::cube(2.0);
    let frame = pipeline::render(&scene, &RenderConfig::default()).unwrap();

    assert_eq!(frame.sample.angle_degrees, 0);
    assert_eq!(frame.framebuffer.width(), 800);
    assert_eq!(frame.framebuffer.height(), 600);
    assert_eq!(frame.stats.drawn, 12);
    assert!(frame.framebuffer.painted_pixels() > 1000);

    // Front and back faces overlap on screen; the back pair is drawn later
    assert_eq!(pixel_under_origin(&frame), BACK_GREEN);
}

#[test]
fn large_unit_cube_renders_like_unit_cube() {
    let small = pipeline::render(&Scene::cube(2.0), &RenderConfig::default()).unwrap();
    let large = pipeline::render(&Scene::cube(10000.0), &RenderConfig::default()).unwrap();

    assert_eq!(large.stats.drawn, 12);
    assert_eq!(pixel_under_origin(&large), BACK_GREEN);
    let (a, b) = (
        large.framebuffer.painted_pixels(),
        small.framebuffer.painted_pixels(),
    );
    assert!(a.abs_diff(b) * 100 < b, "{a} vs {b} painted pixels");
}

#[test]
fn oversized_raster_is_rejected_before_allocation() {
    let mut config = RenderConfig::default();
    config.raster.width = 100_000;
    config.raster.height = 100_000;
    assert!(matches!(
        pipeline::render(&Scene::cube(2.0), &config),
        Err(RenderError::Config(_))
    ));
}

#[test]
fn material_alias_changes_fill() {
    let scene = Scene::cube(2.0);
    let config = RenderConfig {
        material_aliases: vec![MaterialAlias { source: 1, target: 0 }],
        ..RenderConfig::default()
    };
    let frame = pipeline::render(&scene, &config).unwrap();
    assert_eq!(pixel_under_origin(&frame), FRONT_RED);
}

#[test]
fn oblique_sample_renders() {
    let scene = Scene::cube(2.0);
    let config = RenderConfig {
        sample_index: 3,
        ..RenderConfig::default()
    };
    let frame = pipeline::render(&scene, &config).unwrap();
    assert_eq!(frame.sample.angle_degrees, 45);
    assert!(frame.framebuffer.painted_pixels() > 0);
}

#[test]
fn pipeline_errors() {
    let cube = Scene::cube(2.0);

    let past_end = RenderConfig {
        sample_index: 26,
        ..RenderConfig::default()
    };
    assert!(matches!(
        pipeline::render(&cube, &past_end),
        Err(RenderError::SampleOutOfRange { index: 26, len: 26 })
    ));

    let side_on = RenderConfig {
        sample_index: 6,
        ..RenderConfig::default()
    };
    assert!(matches!(
        pipeline::render(&cube, &side_on),
        Err(RenderError::DegenerateProjection(_))
    ));

    assert!(matches!(
        pipeline::render(&Scene::default(), &RenderConfig::default()),
        Err(RenderError::EmptyGeometry)
    ));
}

#[test]
fn orbit_table_matches_render_sample() {
    let scene = Scene::cube(2.0);
    let config = RenderConfig::default();
    let (bounds, path) = pipeline::orbit_table(&scene, &config).unwrap();
    let frame = pipeline::render(&scene, &config).unwrap();

    assert_eq!(bounds, frame.bounds);
    assert_eq!(path.samples[0], frame.sample);
}

#[test]
fn writes_rendered_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.png");
    let frame = pipeline::render(&Scene::cube(2.0), &RenderConfig::default()).unwrap();

    output::save_framebuffer(&frame.framebuffer, &path).unwrap();
    let image = output::to_image(&frame.framebuffer).unwrap();
    assert_eq!(image.dimensions(), (800, 600));
    assert!(path.metadata().unwrap().len() > 0);
}
