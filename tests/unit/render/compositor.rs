use super::*;
use crate::animation::track::ActorStart;
use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::KinemojiError;
use crate::scene::model::ActorCommon;
use crate::text::shaper::{FontFace, TextBlock};
use std::path::PathBuf;

const CANVAS: Canvas = Canvas {
    width: 512,
    height: 512,
};

#[derive(Clone, Debug, PartialEq)]
enum Op {
    Save,
    Restore,
    Fill(Rect, Rgba8, Affine),
    Text(String, Affine),
    PushLayer(f32),
    PopLayer,
}

#[derive(Default)]
struct RecordingSurface {
    ops: Vec<Op>,
    transform: Affine,
    saved: Vec<Affine>,
}

impl RecordingSurface {
    fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text(s, _) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    fn text_transform(&self, text: &str) -> Affine {
        self.ops
            .iter()
            .find_map(|op| match op {
                Op::Text(s, tr) if s == text => Some(*tr),
                _ => None,
            })
            .unwrap()
    }

    fn assert_balanced(&self) {
        let count = |want: &Op| self.ops.iter().filter(|op| *op == want).count();
        assert_eq!(count(&Op::Save), count(&Op::Restore));
        let pushes = self
            .ops
            .iter()
            .filter(|op| matches!(op, Op::PushLayer(_)))
            .count();
        assert_eq!(pushes, count(&Op::PopLayer));
        assert!(self.saved.is_empty());
    }
}

impl DrawSurface for RecordingSurface {
    fn canvas(&self) -> Canvas {
        CANVAS
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
        self.ops.push(Op::Save);
    }

    fn restore(&mut self) -> KinemojiResult<()> {
        self.transform = self
            .saved
            .pop()
            .ok_or_else(|| KinemojiError::render("unbalanced restore"))?;
        self.ops.push(Op::Restore);
        Ok(())
    }

    fn concat(&mut self, transform: Affine) {
        self.transform = self.transform * transform;
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.ops.push(Op::Fill(rect, color, self.transform));
    }

    fn draw_text(&mut self, block: &TextBlock) -> KinemojiResult<()> {
        self.ops.push(Op::Text(block.text.clone(), self.transform));
        Ok(())
    }

    fn push_layer(&mut self, alpha: f32) {
        self.ops.push(Op::PushLayer(alpha));
    }

    fn pop_layer(&mut self) -> KinemojiResult<()> {
        self.ops.push(Op::PopLayer);
        Ok(())
    }
}

/// Shaper that knows a fixed set of families, treats "bad" as unshapeable and measures every
/// character as 10px wide.
#[derive(Default)]
struct StubShaper {
    layouts: Vec<(String, f32, Rgba8)>,
}

const FAMILIES: [&str; 2] = ["Noto Color Emoji", "Noto Sans"];

impl TextShaper for StubShaper {
    fn resolve_font(&mut self, family: &str) -> KinemojiResult<FontFace> {
        if !FAMILIES.contains(&family) {
            return Err(KinemojiError::font(format!("no family '{family}'")));
        }
        Ok(FontFace {
            family: family.to_owned(),
            path: PathBuf::from(format!("/fonts/{family}.ttf")),
        })
    }

    fn check_shaping(&mut self, text: &str, _face: &FontFace) -> KinemojiResult<()> {
        if text == "bad" {
            return Err(KinemojiError::shaping("cannot shape 'bad'"));
        }
        Ok(())
    }

    fn layout(
        &mut self,
        text: &str,
        _face: &FontFace,
        size_px: f32,
        color: Rgba8,
    ) -> KinemojiResult<TextBlock> {
        self.layouts.push((text.to_owned(), size_px, color));
        Ok(TextBlock {
            text: text.to_owned(),
            width: 10.0 * text.chars().count() as f64,
            height: f64::from(size_px),
            runs: Vec::new(),
        })
    }
}

fn text_actor(text: &str, z: i64) -> Actor {
    Actor {
        common: ActorCommon {
            z,
            ..Default::default()
        },
        kind: ActorKind::Text {
            text: text.to_owned(),
            color: None,
            font_size: None,
        },
    }
}

fn emoji_actor(emoji: &str) -> Actor {
    Actor {
        common: ActorCommon::default(),
        kind: ActorKind::Emoji {
            emoji: emoji.to_owned(),
        },
    }
}

fn scene(actors: Vec<Actor>) -> Scene {
    Scene {
        id: "s".to_owned(),
        duration_ms: 1000.0,
        background_color: None,
        caption: None,
        effects: Vec::new(),
        background_actors: Vec::new(),
        actors,
    }
}

fn render(scene: &Scene, t: f64) -> (RecordingSurface, StubShaper) {
    let mut surface = RecordingSurface::default();
    let mut shaper = StubShaper::default();
    let opts = CompositorOpts::default();
    render_scene(
        &mut surface,
        &mut shaper,
        scene,
        t,
        "Noto Color Emoji",
        &opts,
    )
    .unwrap();
    surface.assert_balanced();
    (surface, shaper)
}

#[test]
fn equal_z_keeps_listed_order() {
    let (s, _) = render(&scene(vec![text_actor("a", 0), text_actor("b", 0)]), 0.0);
    assert_eq!(s.texts(), ["a", "b"]);

    let (s, _) = render(&scene(vec![text_actor("b", 0), text_actor("a", 0)]), 0.0);
    assert_eq!(s.texts(), ["b", "a"]);
}

#[test]
fn ascending_z_and_background_collection_first() {
    let mut sc = scene(vec![
        text_actor("fg-high", 5),
        text_actor("fg-low", -1),
        text_actor("fg-mid", 2),
    ]);
    sc.background_actors = vec![text_actor("bg", 100)];
    let (s, _) = render(&sc, 0.0);
    assert_eq!(s.texts(), ["bg", "fg-low", "fg-mid", "fg-high"]);
}

#[test]
fn background_fill_precedes_actors_and_covers_canvas() {
    let mut sc = scene(vec![text_actor("a", 0)]);
    sc.background_color = Some(ColorDef::rgba(1.0, 0.0, 0.0, 1.0));
    let (s, _) = render(&sc, 0.0);
    let first_draw = s
        .ops
        .iter()
        .find(|op| matches!(op, Op::Fill(..) | Op::Text(..)))
        .unwrap();
    assert_eq!(
        *first_draw,
        Op::Fill(CANVAS.rect(), Rgba8::rgb(255, 0, 0), Affine::IDENTITY)
    );
}

#[test]
fn scene_fade_wraps_everything_in_one_layer() {
    let mut sc = scene(vec![text_actor("a", 0)]);
    sc.effects.push(Effect::FadeIn);
    sc.caption = Some("cap".to_owned());

    let (s, _) = render(&sc, 150.0);
    assert_eq!(s.ops.first(), Some(&Op::PushLayer(0.5)));
    assert_eq!(s.ops.last(), Some(&Op::PopLayer));

    let (s, _) = render(&sc, 0.0);
    assert_eq!(s.ops.first(), Some(&Op::PushLayer(0.0)));
    let (s, _) = render(&sc, 450.0);
    assert_eq!(s.ops.first(), Some(&Op::PushLayer(1.0)));
}

#[test]
fn nested_actor_fades_use_nested_layers() {
    let mut child = text_actor("child", 0);
    child.common.effects.push(Effect::FadeIn);
    let mut parent = Actor {
        common: ActorCommon::default(),
        kind: ActorKind::Composite { parts: vec![child] },
    };
    parent.common.effects.push(Effect::FadeIn);

    let (s, _) = render(&scene(vec![parent]), 75.0);
    let layer_ops: Vec<&Op> = s
        .ops
        .iter()
        .filter(|op| matches!(op, Op::PushLayer(_) | Op::PopLayer | Op::Text(..)))
        .collect();
    assert_eq!(layer_ops.len(), 5);
    assert_eq!(*layer_ops[0], Op::PushLayer(0.25));
    assert_eq!(*layer_ops[1], Op::PushLayer(0.25));
    assert!(matches!(layer_ops[2], Op::Text(t, _) if t == "child"));
    assert_eq!(*layer_ops[3], Op::PopLayer);
    assert_eq!(*layer_ops[4], Op::PopLayer);
}

#[test]
fn composite_children_nest_inside_parent_transform() {
    let mut child = text_actor("child", 0);
    child.common.start = ActorStart {
        x: Some(0.1),
        y: Some(0.2),
        ..Default::default()
    };
    let parent = Actor {
        common: ActorCommon {
            start: ActorStart {
                x: Some(0.5),
                y: Some(0.5),
                ..Default::default()
            },
            ..Default::default()
        },
        kind: ActorKind::Composite { parts: vec![child] },
    };

    let (s, _) = render(&scene(vec![parent]), 0.0);
    let expected = Affine::translate(Vec2::new(256.0, 256.0))
        * Affine::translate(Vec2::new(0.1 * 512.0, 0.2 * 512.0));
    assert_eq!(s.text_transform("child"), expected);
}

#[test]
fn scene_bounce_lifts_background_and_actors() {
    let mut sc = scene(vec![text_actor("a", 0)]);
    sc.background_color = Some(ColorDef::rgba(0.0, 0.0, 0.0, 1.0));
    sc.effects.push(Effect::Bounce);
    let (s, _) = render(&sc, 100.0);

    let lift = Affine::translate(Vec2::new(0.0, -bounce_offset(100.0, 512.0)));
    assert!(matches!(&s.ops[1], Op::Fill(_, _, tr) if *tr == lift));
    assert_eq!(s.text_transform("a"), lift);
}

#[test]
fn caption_is_centered_above_bottom_margin() {
    let mut sc = scene(Vec::new());
    sc.caption = Some("hello".to_owned());
    let (s, shaper) = render(&sc, 0.0);

    let size = pt_to_px(32.0);
    assert_eq!(shaper.layouts, vec![("hello".to_owned(), size, Rgba8::BLACK)]);
    let x = (512.0 - 50.0) / 2.0;
    let y = 512.0 - f64::from(size) - 20.0;
    assert_eq!(
        s.text_transform("hello"),
        Affine::translate(Vec2::new(x, y))
    );
}

#[test]
fn empty_caption_is_not_drawn() {
    let mut sc = scene(Vec::new());
    sc.caption = Some(String::new());
    let (s, _) = render(&sc, 0.0);
    assert!(s.texts().is_empty());
}

#[test]
fn text_defaults_and_overrides() {
    let mut styled = text_actor("styled", 1);
    if let ActorKind::Text {
        color, font_size, ..
    } = &mut styled.kind
    {
        *color = Some(ColorDef::rgba(0.0, 0.0, 1.0, 1.0));
        *font_size = Some(24.0);
    }
    let (_, shaper) = render(&scene(vec![text_actor("plain", 0), styled]), 0.0);
    assert_eq!(
        shaper.layouts,
        vec![
            ("plain".to_owned(), 64.0, Rgba8::BLACK),
            ("styled".to_owned(), 32.0, Rgba8::rgb(0, 0, 255)),
        ]
    );
}

#[test]
fn emoji_is_laid_out_at_emoji_size() {
    let (s, shaper) = render(&scene(vec![emoji_actor("🎉")]), 0.0);
    assert_eq!(s.texts(), ["🎉"]);
    assert_eq!(shaper.layouts[0].1, 96.0);
}

#[test]
fn shaping_failure_does_not_abort_the_frame() {
    let (s, _) = render(&scene(vec![emoji_actor("bad"), text_actor("after", 1)]), 0.0);
    assert_eq!(s.texts(), ["bad", "after"]);
}

#[test]
fn unresolvable_emoji_font_is_fatal() {
    let mut surface = RecordingSurface::default();
    let mut shaper = StubShaper::default();
    let opts = CompositorOpts::default();
    let mut fading = emoji_actor("🙂");
    fading.common.effects.push(Effect::FadeIn);
    let sc = scene(vec![fading]);

    let err = render_scene(&mut surface, &mut shaper, &sc, 10.0, "Missing Font", &opts)
        .unwrap_err();
    assert!(matches!(err, KinemojiError::Font(_)));
    surface.assert_balanced();
}

#[test]
fn rendering_is_repeatable() {
    let mut moving = emoji_actor("🚀");
    moving.common.tracks = vec![
        crate::animation::track::Keyframe {
            t: 0.0,
            x: Some(0.0),
            ..Default::default()
        },
        crate::animation::track::Keyframe {
            t: 1000.0,
            x: Some(1.0),
            rotate: Some(180.0),
            ..Default::default()
        },
    ];
    moving.common.loop_mode = crate::scene::model::LoopMode::Float;
    let sc = scene(vec![moving]);
    let (a, _) = render(&sc, 420.0);
    let (b, _) = render(&sc, 420.0);
    assert_eq!(a.ops, b.ops);
}
