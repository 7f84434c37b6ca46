//! Shared record fixtures for the integration tests.

#![allow(dead_code)]

use tessera::{Record, RowView};

#[derive(Clone, Copy, Debug, Default, PartialEq, Record)]
#[repr(C)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Record)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Record)]
#[repr(C)]
pub struct Physics {
    pub position: Vec3,
    pub speed: Vec3,
    pub acceleration: Vec3,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Record)]
#[repr(C)]
pub struct Render {
    pub color: Color,
}

/// Thirteen `f32` leaves, handed out as a nested view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Record)]
#[repr(C)]
#[record(view = EntityView)]
pub struct Entity {
    pub physics: Physics,
    pub render: Render,
}

#[derive(RowView)]
pub struct Vec3View<'a> {
    pub x: &'a mut f32,
    pub y: &'a mut f32,
    pub z: &'a mut f32,
}

#[derive(RowView)]
pub struct ColorView<'a> {
    pub r: &'a mut f32,
    pub g: &'a mut f32,
    pub b: &'a mut f32,
    pub a: &'a mut f32,
}

#[derive(RowView)]
pub struct PhysicsView<'a> {
    pub position: Vec3View<'a>,
    pub speed: Vec3View<'a>,
    pub acceleration: Vec3View<'a>,
}

#[derive(RowView)]
pub struct RenderView<'a> {
    pub color: ColorView<'a>,
}

#[derive(RowView)]
pub struct EntityView<'a> {
    pub physics: PhysicsView<'a>,
    pub render: RenderView<'a>,
}

/// Entity whose leaves are `base + 0` through `base + 12` in flat order.
pub fn numbered_entity(base: f32) -> Entity {
    let v = |offset: f32| base + offset;
    Entity {
        physics: Physics {
            position: Vec3 { x: v(0.0), y: v(1.0), z: v(2.0) },
            speed: Vec3 { x: v(3.0), y: v(4.0), z: v(5.0) },
            acceleration: Vec3 { x: v(6.0), y: v(7.0), z: v(8.0) },
        },
        render: Render {
            color: Color { r: v(9.0), g: v(10.0), b: v(11.0), a: v(12.0) },
        },
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Team {
    #[default]
    Neutral,
    Red,
    Blue,
}

tessera::leaf!(Team);

/// Mixed leaf types with padding between them; rows come out as a `FlatRow`.
#[derive(Clone, Debug, Default, PartialEq, Record)]
#[repr(C)]
pub struct Unit {
    pub id: u64,
    pub alive: bool,
    pub team: Team,
    pub hp: i32,
    pub name: String,
}
