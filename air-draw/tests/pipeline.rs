use air_draw::tracking::{Detector, HsvDetector};
use air_draw::{Point, ProfileRegistry, StrokeRenderer, StrokeStyle, Whiteboard};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const BACKGROUND: Rgb<u8> = Rgb([120, 120, 120]);
const RED_OBJECT: Rgb<u8> = Rgb([220, 30, 30]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const RED_INK: Rgb<u8> = Rgb([255, 0, 0]);

fn frame_with_rect(x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) -> RgbImage {
    let mut frame = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            frame.put_pixel(x, y, color);
        }
    }
    frame
}

fn near(point: Point, x: i32, y: i32) -> bool {
    (point.x - x).abs() <= 1 && (point.y - y).abs() <= 1
}

fn ink_pixels(canvas: &RgbImage) -> Vec<(u32, u32)> {
    canvas
        .enumerate_pixels()
        .filter(|(_, _, p)| **p != WHITE)
        .map(|(x, y, _)| (x, y))
        .collect()
}

fn whiteboard() -> Whiteboard {
    Whiteboard::new(
        ProfileRegistry::builtin(),
        "red",
        Box::new(HsvDetector::default()),
        StrokeStyle::default(),
        (WIDTH, HEIGHT),
    )
    .unwrap()
}

#[test]
fn detects_centroid_of_filled_shape() {
    let registry = ProfileRegistry::builtin();
    let mut detector = HsvDetector::default();

    // 60x36 block spanning x 200..259, y 150..185: centroid (229.5, 167.5)
    let frame = frame_with_rect(200, 150, 60, 36, Rgb([230, 220, 20]));
    let point = detector.detect(&frame, registry.lookup("yellow").unwrap()).unwrap();

    assert!((point.x as f64 - 229.5).abs() <= 2.0, "{point:?}");
    assert!((point.y as f64 - 167.5).abs() <= 2.0, "{point:?}");
}

#[test]
fn detects_centroid_of_disk() {
    let registry = ProfileRegistry::builtin();
    let mut detector = HsvDetector::default();

    let mut frame = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    draw_filled_circle_mut(&mut frame, (150, 120), 15, RED_OBJECT);

    assert_eq!(
        detector.detect(&frame, registry.lookup("red").unwrap()),
        Some(Point::new(150, 120))
    );
}

#[test]
fn detects_blobs_touching_each_edge() {
    let registry = ProfileRegistry::builtin();
    let red = registry.lookup("red").unwrap();
    let mut detector = HsvDetector::default();

    let cases = [
        ("left", (0, 100), (19, 119)),
        ("right", (280, 100), (299, 119)),
        ("top", (140, 0), (159, 19)),
        ("bottom", (140, 200), (159, 219)),
        ("top-left", (0, 0), (19, 19)),
    ];
    for (edge, (x0, y0), (x, y)) in cases {
        let frame = frame_with_rect(x0, y0, 40, 40, RED_OBJECT);
        let point = detector.detect(&frame, red);
        assert!(point.is_some_and(|p| near(p, x, y)), "{edge}: {point:?}");
    }

    let full = RgbImage::from_pixel(WIDTH, HEIGHT, RED_OBJECT);
    assert_eq!(detector.detect(&full, red), Some(Point::new(159, 119)));
}

#[test]
fn object_leaving_the_frame_ends_the_stroke() {
    let mut board = whiteboard();

    // Slides right until only a sliver is left in view
    let inside = board.tick(&frame_with_rect(250, 100, 40, 40, RED_OBJECT)).unwrap();
    assert!(near(inside, 269, 119), "{inside:?}");

    let half_out = board.tick(&frame_with_rect(300, 100, 20, 40, RED_OBJECT)).unwrap();
    assert!(near(half_out, 309, 119), "{half_out:?}");
    assert!(board.renderer().pen().is_down());
    assert_eq!(*board.renderer().canvas().get_pixel(290, half_out.y as u32), RED_INK);

    // 10x40 visible: under the area threshold
    assert_eq!(board.tick(&frame_with_rect(310, 100, 10, 40, RED_OBJECT)), None);
    assert!(!board.renderer().pen().is_down());

    // Re-entering from the left starts a new stroke
    let back = board.tick(&frame_with_rect(0, 100, 30, 40, RED_OBJECT)).unwrap();
    assert!(near(back, 14, 119), "{back:?}");
    assert_eq!(*board.renderer().canvas().get_pixel(160, 119), WHITE);
}

#[test]
fn rejects_blob_below_area_threshold() {
    let registry = ProfileRegistry::builtin();
    let mut detector = HsvDetector::default();

    // 22x22 = 484 px², under the 500 px² threshold
    let frame = frame_with_rect(50, 50, 22, 22, RED_OBJECT);
    assert_eq!(detector.detect(&frame, registry.lookup("red").unwrap()), None);
}

#[test]
fn no_match_lifts_pen_and_leaves_canvas() {
    let mut board = whiteboard();
    let red_square = frame_with_rect(100, 100, 30, 30, RED_OBJECT);
    board.tick(&red_square);
    assert!(board.renderer().pen().is_down());
    let before = board.renderer().canvas().clone();

    let empty = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    assert_eq!(board.tick(&empty), None);

    assert_eq!(board.renderer().canvas(), &before);
    assert_eq!(board.renderer().pen().last_point, None);
}

#[test]
fn gap_splits_strokes() {
    let mut renderer = StrokeRenderer::new(80, 80, StrokeStyle::default());
    renderer.feed(Some(Point::new(10, 10)), RED_INK);
    renderer.feed(Some(Point::new(20, 10)), RED_INK);
    renderer.feed(None, RED_INK);
    renderer.feed(Some(Point::new(50, 50)), RED_INK);

    let canvas = renderer.canvas();
    for x in 10..=20 {
        assert_eq!(*canvas.get_pixel(x, 10), RED_INK, "segment gap at x={x}");
    }
    assert_eq!(*canvas.get_pixel(50, 50), RED_INK);

    // Nothing along the would-be connector from (20, 10) to (50, 50)
    for t in 1..10 {
        let x = 20 + 3 * t;
        let y = 10 + 4 * t;
        assert_eq!(*canvas.get_pixel(x, y), WHITE, "connector at ({x}, {y})");
    }

    // Exactly two marks: the segment's bounding box and the dot's
    for (x, y) in ink_pixels(canvas) {
        let in_segment = (7..=23).contains(&x) && (7..=13).contains(&y);
        let in_dot = (47..=53).contains(&x) && (47..=53).contains(&y);
        assert!(in_segment ^ in_dot, "stray ink at ({x}, {y})");
    }
}

#[test]
fn clear_twice_equals_clear_once() {
    let mut renderer = StrokeRenderer::new(40, 40, StrokeStyle::default());
    renderer.feed(Some(Point::new(5, 5)), RED_INK);
    renderer.feed(Some(Point::new(30, 30)), RED_INK);

    renderer.clear();
    let once = renderer.canvas().clone();
    assert!(ink_pixels(&once).is_empty());
    assert_eq!(renderer.pen().last_point, None);

    renderer.clear();
    assert_eq!(renderer.canvas(), &once);
    assert_eq!(renderer.pen().last_point, None);
}

#[test]
fn profile_switch_clears_before_next_feed() {
    let mut board = whiteboard();
    board.tick(&frame_with_rect(100, 100, 30, 30, RED_OBJECT));
    board.tick(&frame_with_rect(140, 100, 30, 30, RED_OBJECT));
    assert!(board.renderer().pen().is_down());

    board.set_profile("blue").unwrap();
    assert!(ink_pixels(board.renderer().canvas()).is_empty());
    assert_eq!(board.renderer().pen().last_point, None);

    // Red objects no longer draw; a blue one starts a fresh blue dot
    assert_eq!(board.tick(&frame_with_rect(100, 100, 30, 30, RED_OBJECT)), None);
    let point = board
        .tick(&frame_with_rect(200, 60, 30, 30, Rgb([20, 40, 230])))
        .unwrap();
    let ink = ink_pixels(board.renderer().canvas());
    assert!(!ink.is_empty());
    assert!(ink
        .iter()
        .all(|&(x, y)| (x as i32 - point.x).abs() <= 2 && (y as i32 - point.y).abs() <= 2));
    assert_eq!(*board.renderer().canvas().get_pixel(point.x as u32, point.y as u32), Rgb([0, 0, 255]));
}

#[test]
fn red_square_scenario() {
    let mut board = whiteboard();
    let frame = frame_with_rect(100, 100, 30, 30, RED_OBJECT);

    let point = board.tick(&frame).unwrap();
    assert!((point.x - 115).abs() <= 2 && (point.y - 115).abs() <= 2, "{point:?}");

    // Pen was up: a dot, not a line
    let ink = ink_pixels(board.renderer().canvas());
    assert!(!ink.is_empty() && ink.len() <= 25);
    assert!(ink
        .iter()
        .all(|&(x, y)| (x as i32 - point.x).abs() <= 2 && (y as i32 - point.y).abs() <= 2));
}

#[test]
fn tracks_a_moving_object_into_one_stroke() {
    let mut board = whiteboard();
    let mut points = Vec::new();
    for step in 0..5 {
        let frame = frame_with_rect(40 + step * 40, 100, 30, 30, RED_OBJECT);
        points.push(board.tick(&frame).unwrap());
    }

    let canvas = board.renderer().canvas();
    let first = points[0];
    let last = points[4];
    for x in first.x..=last.x {
        assert_eq!(*canvas.get_pixel(x as u32, first.y as u32), RED_INK, "gap at x={x}");
    }

    let overlay = board
        .compose(RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND), air_draw::compose::View::Overlay)
        .unwrap();
    assert_eq!(*overlay.get_pixel(last.x as u32, last.y as u32), RED_INK);
    assert_eq!(*overlay.get_pixel(5, 5), BACKGROUND);
}
