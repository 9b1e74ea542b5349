//! Board geometry: every level is drawn as flat-coloured triangles in window
//! pixel coordinates, origin at the top-left corner.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use puzzle::{Level, Pos};

pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;
pub const TILE_SIZE: f32 = 60.0;
pub const WALL_THICKNESS: f32 = 10.0;
const PLAYER_SEGMENTS: usize = 24;

pub const BACKGROUND: [u8; 3] = [240, 235, 220];
pub const BACKGROUND_CLEAR: [u8; 3] = [200, 235, 195];
pub const WALL: [u8; 3] = [60, 70, 80];
pub const PLAYER: [u8; 3] = [230, 80, 80];
pub const BOX: [u8; 3] = [20, 140, 200];
pub const TARGET: [u8; 3] = [220, 170, 20];
pub const BOX_ON_TARGET: [u8; 3] = [60, 200, 100];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x3];

    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[must_use]
pub fn rgb(color: [u8; 3]) -> [f32; 3] {
    color.map(|c| f32::from(c) / 255.0)
}

/// Clear colour of the window, tinted green once the level is solved.
#[must_use]
pub fn background(won: bool) -> wgpu::Color {
    let [r, g, b] = rgb(if won { BACKGROUND_CLEAR } else { BACKGROUND });
    wgpu::Color { r: f64::from(r), g: f64::from(g), b: f64::from(b), a: 1.0 }
}

/// Maps window pixels to clip space with `y` pointing down.
#[must_use]
pub fn projection(width: u32, height: u32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width as f32, height as f32, 0.0, -1.0, 1.0)
}

/// Top-left pixel of the board when centred in a `window`-sized frame.
#[must_use]
pub fn board_origin(level: &Level, window: (u32, u32)) -> Vec2 {
    let board = Vec2::new(level.width() as f32, level.height() as f32) * TILE_SIZE;
    ((Vec2::new(window.0 as f32, window.1 as f32) - board) / 2.0).floor()
}

#[must_use]
pub fn cell_origin(origin: Vec2, pos: Pos) -> Vec2 {
    origin + Vec2::new(pos.x as f32, pos.y as f32) * TILE_SIZE
}

fn quad(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, color: [u8; 3]) {
    let color = rgb(color);
    let max = min + size;
    let corners = [[min.x, min.y], [max.x, min.y], [max.x, max.y], [min.x, max.y]];
    for i in [0, 1, 2, 0, 2, 3] {
        out.push(Vertex { position: corners[i], color });
    }
}

fn disc(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [u8; 3]) {
    let color = rgb(color);
    let rim = |i: usize| {
        let a = TAU * i as f32 / PLAYER_SEGMENTS as f32;
        (center + Vec2::new(a.cos(), a.sin()) * radius).to_array()
    };
    for i in 0..PLAYER_SEGMENTS {
        out.push(Vertex { position: center.to_array(), color });
        out.push(Vertex { position: rim(i), color });
        out.push(Vertex { position: rim(i + 1), color });
    }
}

/// Triangles for a frame around the board, the targets, the boxes and the
/// player, back to front.
#[must_use]
pub fn build(level: &Level, window: (u32, u32)) -> Vec<Vertex> {
    let origin = board_origin(level, window);
    let board = Vec2::new(level.width() as f32, level.height() as f32) * TILE_SIZE;
    let mut out = Vec::new();

    let t = WALL_THICKNESS;
    let outer = origin - Vec2::splat(t);
    let span = board + Vec2::splat(2.0 * t);
    quad(&mut out, outer, Vec2::new(span.x, t), WALL);
    quad(&mut out, Vec2::new(outer.x, origin.y + board.y), Vec2::new(span.x, t), WALL);
    quad(&mut out, Vec2::new(outer.x, origin.y), Vec2::new(t, board.y), WALL);
    quad(&mut out, Vec2::new(origin.x + board.x, origin.y), Vec2::new(t, board.y), WALL);

    let tile = Vec2::splat(TILE_SIZE);
    for &target in level.targets() {
        quad(&mut out, cell_origin(origin, target), tile, TARGET);
    }
    for &b in level.boxes() {
        let color = if level.targets().contains(&b) { BOX_ON_TARGET } else { BOX };
        quad(&mut out, cell_origin(origin, b), tile, color);
    }
    let center = cell_origin(origin, level.player()) + tile / 2.0;
    disc(&mut out, center, TILE_SIZE / 2.0 - 5.0, PLAYER);
    out
}

/// Number of vertices [`build`] emits for `level`.
#[must_use]
pub fn vertex_count(level: &Level) -> usize {
    4 * 6 + (level.targets().len() + level.boxes().len()) * 6 + PLAYER_SEGMENTS * 3
}
