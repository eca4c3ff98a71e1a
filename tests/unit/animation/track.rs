use super::*;

fn key(t: f64) -> Keyframe {
    Keyframe {
        t,
        ..Default::default()
    }
}

fn key_x(t: f64, x: f64) -> Keyframe {
    Keyframe {
        x: Some(x),
        ..key(t)
    }
}

#[test]
fn empty_track_holds_start_or_defaults() {
    let start = ActorStart {
        x: Some(0.3),
        y: None,
        scale: Some(2.0),
        rotate: None,
    };
    for t in [0.0, 10.0, 5_000.0] {
        let s = sample(&[], t, &start);
        assert_eq!(s.x, 0.3);
        assert_eq!(s.y, 0.0);
        assert_eq!(s.scale, 2.0);
        assert_eq!(s.rotate, 0.0);
    }

    let s = sample(&[], 42.0, &ActorStart::default());
    assert_eq!(s.scale, 1.0);
}

#[test]
fn single_key_at_origin_holds_everywhere() {
    let tracks = [Keyframe {
        scale: Some(3.0),
        ..key_x(0.0, 0.7)
    }];
    for t in [0.0, 1.0, 250.0, 10_000.0] {
        let s = sample(&tracks, t, &ActorStart::default());
        assert_eq!(s.x, 0.7);
        assert_eq!(s.scale, 3.0);
    }
}

#[test]
fn single_key_holds_after_its_time() {
    let tracks = [key_x(100.0, 0.9)];
    assert_eq!(sample_property(&tracks, 100.0, &ActorStart::default(), Property::X), 0.9);
    assert_eq!(sample_property(&tracks, 500.0, &ActorStart::default(), Property::X), 0.9);
}

#[test]
fn start_state_leads_into_first_key() {
    let start = ActorStart {
        x: Some(0.2),
        ..Default::default()
    };
    let tracks = [key_x(100.0, 0.6)];
    let x = sample_property(&tracks, 50.0, &start, Property::X);
    assert!((x - 0.4).abs() < 1e-12);
}

#[test]
fn linear_segment_interpolates_and_holds_last() {
    let tracks = [
        Keyframe {
            ease: Some(Ease::Linear),
            ..key_x(0.0, 0.0)
        },
        key_x(100.0, 1.0),
    ];
    let start = ActorStart::default();
    assert_eq!(sample_property(&tracks, 50.0, &start, Property::X), 0.5);
    assert_eq!(sample_property(&tracks, 100.0, &start, Property::X), 1.0);
    assert_eq!(sample_property(&tracks, 200.0, &start, Property::X), 1.0);
}

#[test]
fn zero_length_segment_returns_key_value() {
    let tracks = [key_x(0.0, 0.25)];
    let start = ActorStart {
        x: Some(0.9),
        ..Default::default()
    };
    assert_eq!(sample_property(&tracks, 0.0, &start, Property::X), 0.25);

    let dup = [key_x(40.0, 0.1), key_x(40.0, 0.8)];
    let origin = ActorStart::default();
    // The first key already closes the segment at t = 40.
    assert_eq!(sample_property(&dup, 40.0, &origin, Property::X), 0.1);
    assert_eq!(sample_property(&dup, 41.0, &origin, Property::X), 0.8);
}

#[test]
fn opening_point_ease_shapes_the_segment() {
    let eased = [
        Keyframe {
            ease: Some(Ease::EaseIn),
            ..key_x(0.0, 0.0)
        },
        key_x(100.0, 1.0),
    ];
    assert_eq!(
        sample_property(&eased, 50.0, &ActorStart::default(), Property::X),
        0.25
    );

    let closing_only = [
        key_x(0.0, 0.0),
        Keyframe {
            ease: Some(Ease::EaseIn),
            ..key_x(100.0, 1.0)
        },
    ];
    assert_eq!(
        sample_property(&closing_only, 50.0, &ActorStart::default(), Property::X),
        0.5
    );
}

#[test]
fn missing_properties_keep_previous_value() {
    let tracks = [
        Keyframe {
            y: Some(0.2),
            rotate: Some(90.0),
            ..key_x(0.0, 0.0)
        },
        key_x(100.0, 1.0),
    ];
    let s = sample(&tracks, 50.0, &ActorStart::default());
    assert_eq!(s.x, 0.5);
    assert_eq!(s.y, 0.2);
    assert_eq!(s.rotate, 90.0);
    assert_eq!(s.scale, 1.0);
}

#[test]
fn unsorted_tracks_stop_at_first_key_not_earlier_than_t() {
    let tracks = [key_x(100.0, 1.0), key_x(50.0, 0.0)];
    let x = sample_property(&tracks, 75.0, &ActorStart::default(), Property::X);
    assert_eq!(x, 0.75);
}

#[test]
fn resampling_is_bit_identical() {
    let tracks = [
        Keyframe {
            ease: Some(Ease::EaseInOut),
            scale: Some(0.5),
            rotate: Some(-30.0),
            ..key_x(0.0, 0.1)
        },
        Keyframe {
            y: Some(0.9),
            scale: Some(1.7),
            ease: Some(Ease::EaseOut),
            ..key_x(333.0, 0.8)
        },
        key_x(1_000.0, 0.3),
    ];
    let start = ActorStart {
        y: Some(0.4),
        ..Default::default()
    };
    for t in [0.0, 17.3, 333.0, 512.25, 999.9, 1_500.0] {
        let a = sample(&tracks, t, &start);
        let b = sample(&tracks, t, &start);
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
        assert_eq!(a.scale.to_bits(), b.scale.to_bits());
        assert_eq!(a.rotate.to_bits(), b.rotate.to_bits());
    }
    // Out-of-order queries see the same values.
    let late = sample(&tracks, 900.0, &start);
    let _ = sample(&tracks, 10.0, &start);
    assert_eq!(sample(&tracks, 900.0, &start), late);
}
