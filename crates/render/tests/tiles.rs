use glam::Vec2;
use puzzle::{Command, Direction, Level, Pos};
use render::tiles::{self, Vertex};
use render::command_for_key;
use winit::keyboard::KeyCode;

const WINDOW: (u32, u32) = (tiles::WINDOW_WIDTH, tiles::WINDOW_HEIGHT);

fn level() -> Level {
    Level::parse(
        "......
         .@$.*.
         ......
         ...+..
         ......
         ......",
    )
    .unwrap()
}

fn bounds(vertices: &[Vertex]) -> (Vec2, Vec2) {
    vertices.iter().fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), v| {
        let p = Vec2::from(v.position);
        (lo.min(p), hi.max(p))
    })
}

#[test]
fn board_is_centred() {
    let origin = tiles::board_origin(&level(), WINDOW);
    assert_eq!(origin, Vec2::new(220.0, 120.0));
    assert_eq!(tiles::cell_origin(origin, Pos::new(2, 1)), Vec2::new(340.0, 180.0));
}

#[test]
fn geometry_stays_inside_the_frame() {
    let level = level();
    let vertices = tiles::build(&level, WINDOW);
    assert_eq!(vertices.len(), tiles::vertex_count(&level));
    assert_eq!(vertices.len() % 3, 0);

    let (lo, hi) = bounds(&vertices);
    assert_eq!(lo, Vec2::new(210.0, 110.0));
    assert_eq!(hi, Vec2::new(590.0, 490.0));
}

#[test]
fn pieces_use_their_palette_colours() {
    let level = level();
    let vertices = tiles::build(&level, WINDOW);
    let count = |color: [u8; 3]| vertices.iter().filter(|v| v.color == tiles::rgb(color)).count();
    assert_eq!(count(tiles::WALL), 24);
    assert_eq!(count(tiles::TARGET), 12);
    assert_eq!(count(tiles::BOX), 6);
    assert_eq!(count(tiles::BOX_ON_TARGET), 6);
    assert!(count(tiles::PLAYER) > 0);

    let (lo, hi) = bounds(&vertices.iter().copied().filter(|v| v.color == tiles::rgb(tiles::PLAYER)).collect::<Vec<_>>());
    let centre = (lo + hi) / 2.0;
    assert!((centre - Vec2::new(310.0, 210.0)).length() < 0.5);
    assert!(hi.x - lo.x <= tiles::TILE_SIZE - 10.0 + 1e-3);
}

#[test]
fn background_turns_green_when_solved() {
    let normal = tiles::background(false);
    let clear = tiles::background(true);
    assert!(clear.g > clear.r && clear.g > clear.b);
    assert!(normal.r > normal.b);
}

#[test]
fn projection_maps_window_corners_to_clip_space() {
    let m = tiles::projection(800, 600);
    let top_left = m.project_point3(glam::Vec3::new(0.0, 0.0, 0.0));
    let bottom_right = m.project_point3(glam::Vec3::new(800.0, 600.0, 0.0));
    assert!((top_left.x + 1.0).abs() < 1e-6 && (top_left.y - 1.0).abs() < 1e-6);
    assert!((bottom_right.x - 1.0).abs() < 1e-6 && (bottom_right.y + 1.0).abs() < 1e-6);
}

#[test]
fn keys_map_to_commands() {
    assert_eq!(command_for_key(KeyCode::ArrowUp), Some(Command::Move(Direction::Up)));
    assert_eq!(command_for_key(KeyCode::ArrowLeft), Some(Command::Move(Direction::Left)));
    assert_eq!(command_for_key(KeyCode::KeyR), Some(Command::Reset));
    assert_eq!(command_for_key(KeyCode::Escape), Some(Command::Quit));
    assert_eq!(command_for_key(KeyCode::Space), None);
}
