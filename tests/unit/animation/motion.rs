use super::*;
use crate::animation::track::{ActorStart, Keyframe};
use crate::foundation::core::Point;

const CANVAS: Canvas = Canvas {
    width: 512,
    height: 512,
};

fn centered() -> ActorCommon {
    ActorCommon {
        start: ActorStart {
            x: Some(0.5),
            y: Some(0.5),
            scale: None,
            rotate: None,
        },
        ..Default::default()
    }
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn fade_alpha_ramps_over_300ms() {
    assert_eq!(fade_alpha(0.0), 0.0);
    assert_eq!(fade_alpha(150.0), 0.5);
    assert_eq!(fade_alpha(300.0), 1.0);
    assert_eq!(fade_alpha(5_000.0), 1.0);
    let mut last = -1.0;
    for t in (0..=300).step_by(10) {
        let a = fade_alpha(f64::from(t));
        assert!(a >= last);
        last = a;
    }
}

#[test]
fn bounce_and_float_offsets() {
    assert_eq!(bounce_offset(0.0, 512.0), 0.0);
    assert!((bounce_offset(100.0, 512.0) - 25.6).abs() < 1e-9);
    assert!(bounce_offset(200.0, 512.0).abs() < 1e-9);
    assert!(bounce_offset(300.0, 512.0) > 0.0);

    assert!((float_offset(250.0, 512.0) - 10.24).abs() < 1e-9);
    assert!((float_offset(750.0, 512.0) + 10.24).abs() < 1e-9);
}

#[test]
fn plain_actor_translates_to_sampled_position() {
    let pose = ActorPose::resolve(&centered(), 0.0, CANVAS);
    assert_eq!(pose.transform, Affine::translate(Vec2::new(256.0, 256.0)));
    assert_eq!(pose.fade_alpha, None);
}

#[test]
fn rotate_then_mirror_then_scale_nest_inside_translation() {
    let mut common = centered();
    common.start.rotate = Some(90.0);
    common.start.scale = Some(2.0);
    common.flip_x = true;

    let pose = ActorPose::resolve(&common, 0.0, CANVAS);
    // (1,0) -> scale (2,0) -> mirror (-2,0) -> rotate 90° (0,-2) -> translate.
    let p = pose.transform * Point::new(1.0, 0.0);
    assert!(close(p, Point::new(256.0, 254.0)), "{p:?}");
    // (0,1) -> scale (0,2) -> mirror (0,2) -> rotate 90° (-2,0) -> translate.
    let p = pose.transform * Point::new(0.0, 1.0);
    assert!(close(p, Point::new(254.0, 256.0)), "{p:?}");
}

#[test]
fn bounce_lifts_and_float_sways() {
    let mut bouncing = centered();
    bouncing.effects.push(Effect::Bounce);
    let pose = ActorPose::resolve(&bouncing, 100.0, CANVAS);
    let origin = pose.transform * Point::ORIGIN;
    assert!(close(origin, Point::new(256.0, 256.0 - 25.6)), "{origin:?}");

    let mut floating = centered();
    floating.loop_mode = LoopMode::Float;
    let pose = ActorPose::resolve(&floating, 250.0, CANVAS);
    let origin = pose.transform * Point::ORIGIN;
    assert!(close(origin, Point::new(256.0, 256.0 + 10.24)), "{origin:?}");
}

#[test]
fn fade_in_reports_layer_alpha() {
    let mut common = centered();
    common.effects.push(Effect::FadeIn);
    assert_eq!(ActorPose::resolve(&common, 0.0, CANVAS).fade_alpha, Some(0.0));
    assert_eq!(
        ActorPose::resolve(&common, 150.0, CANVAS).fade_alpha,
        Some(0.5)
    );
    assert_eq!(
        ActorPose::resolve(&common, 900.0, CANVAS).fade_alpha,
        Some(1.0)
    );
}

#[test]
fn tracks_drive_position_over_time() {
    let mut common = centered();
    common.tracks = vec![
        Keyframe {
            t: 0.0,
            x: Some(0.0),
            ..Default::default()
        },
        Keyframe {
            t: 1000.0,
            x: Some(1.0),
            ..Default::default()
        },
    ];
    let pose = ActorPose::resolve(&common, 500.0, CANVAS);
    assert_eq!(pose.sampled.x, 0.5);
    let origin = pose.transform * Point::ORIGIN;
    assert!(close(origin, Point::new(256.0, 256.0)));
}
