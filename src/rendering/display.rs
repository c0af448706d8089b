//! # Display Management
//!
//! Draws a map scene with macroquad. Tiles and actors are drawn as tinted
//! quads from a single white texture; an animation key picks the tint and
//! a facing notch stands in for directional frames. The camera keeps the
//! focused actor centered.

use macroquad::prelude::*;

use crate::game::actor::Actor;
use crate::input::{InputEvent, Key};
use crate::map::scene::{MapScene, TileLayer};
use crate::map::states::ConcreteState;
use crate::GreenwoodResult;

/// Macroquad display shell for the engine.
pub struct Display {
    /// Tile edge length in pixels.
    pub tile_size: f32,
    /// Camera offset in pixels: world position of the top-left corner.
    pub camera: Vec2,
    white: Texture2D,
}

impl Display {
    pub fn new(tile_size: f32) -> Self {
        let white = Texture2D::from_rgba8(1, 1, &[255, 255, 255, 255]);
        Self {
            tile_size,
            camera: vec2(0.0, 0.0),
            white,
        }
    }

    /// Renders one frame of the scene.
    pub fn render(&mut self, scene: &MapScene) -> GreenwoodResult<()> {
        if let Some(focus) = scene.focus_position() {
            self.camera = vec2(
                focus.x - screen_width() / 2.0,
                focus.y - screen_height() / 2.0,
            );
        }

        clear_background(BLACK);
        self.render_layer(&scene.ground);
        self.render_layer(&scene.fringe);
        self.render_actors(scene);
        self.render_layer(&scene.over);
        self.render_dialog(scene);
        Ok(())
    }

    fn render_layer(&self, layer: &TileLayer) {
        let first_col = (self.camera.x / self.tile_size).floor().max(0.0) as usize;
        let first_row = (self.camera.y / self.tile_size).floor().max(0.0) as usize;
        let cols_on_screen = (screen_width() / self.tile_size) as usize + 2;
        let rows_on_screen = (screen_height() / self.tile_size) as usize + 2;

        for row in first_row..(first_row + rows_on_screen).min(layer.rows()) {
            for col in first_col..(first_col + cols_on_screen).min(layer.cols()) {
                let tile = layer.get(col, row);
                if tile == 0 {
                    continue;
                }
                let x = col as f32 * self.tile_size - self.camera.x;
                let y = row as f32 * self.tile_size - self.camera.y;
                self.draw_quad(x, y, self.tile_size, self.tile_size, tile_color(tile));
            }
        }
    }

    fn render_actors(&self, scene: &MapScene) {
        for id in scene.actors.draw_order() {
            if let Some(actor) = scene.actors.get_by_id(id) {
                self.render_actor(actor);
            }
        }
    }

    fn render_actor(&self, actor: &Actor) {
        let sprite = match actor.sprite() {
            Ok(sprite) => sprite,
            // No graphics component: invisible (portals, regions)
            Err(_) => return,
        };
        let position = sprite.draw_position();
        let x = position.x - self.camera.x;
        let y = position.y - self.camera.y;
        let color = animset_color(&sprite.animset);
        self.draw_quad(x, y, actor.width, actor.height, color);

        // Facing notch on the faced edge
        let notch = 4.0;
        let (nx, ny, nw, nh) = match actor.facing() {
            crate::game::Direction::North => (x + actor.width / 2.0 - notch / 2.0, y, notch, notch),
            crate::game::Direction::South => (
                x + actor.width / 2.0 - notch / 2.0,
                y + actor.height - notch,
                notch,
                notch,
            ),
            crate::game::Direction::West => {
                (x, y + actor.height / 2.0 - notch / 2.0, notch, notch)
            }
            crate::game::Direction::East => (
                x + actor.width - notch,
                y + actor.height / 2.0 - notch / 2.0,
                notch,
                notch,
            ),
        };
        self.draw_quad(nx, ny, nw, nh, WHITE);
    }

    /// Draws the dialog panel when a dialog state is on top.
    fn render_dialog(&self, scene: &MapScene) {
        let page = match scene.current_state() {
            Some(ConcreteState::Dialog(dialog)) => dialog.current_page(),
            _ => None,
        };
        let page = match page {
            Some(page) => page,
            None => return,
        };

        let panel_height = 100.0;
        let panel_y = screen_height() - panel_height - 10.0;
        draw_rectangle(
            10.0,
            panel_y,
            screen_width() - 20.0,
            panel_height,
            Color::new(0.0, 0.0, 0.0, 0.85),
        );
        draw_rectangle_lines(
            10.0,
            panel_y,
            screen_width() - 20.0,
            panel_height,
            2.0,
            WHITE,
        );
        draw_text(page, 24.0, panel_y + 36.0, 20.0, WHITE);
        draw_text(
            "[space] continue",
            24.0,
            panel_y + panel_height - 16.0,
            14.0,
            GRAY,
        );
    }

    fn draw_quad(&self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        draw_texture_ex(
            &self.white,
            x,
            y,
            color,
            DrawTextureParams {
                dest_size: Some(vec2(width, height)),
                ..Default::default()
            },
        );
    }

    /// Drains this frame's key transitions as engine input events.
    pub fn poll_input_events(&self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        for (code, key) in KEY_MAP {
            if is_key_pressed(code) {
                events.push(InputEvent::KeyDown(key));
            }
            if is_key_released(code) {
                events.push(InputEvent::KeyUp(key));
            }
        }
        events
    }
}

/// Window key codes the shell understands, with their engine keys.
const KEY_MAP: [(KeyCode, Key); 10] = [
    (KeyCode::Up, Key::Up),
    (KeyCode::W, Key::Up),
    (KeyCode::Down, Key::Down),
    (KeyCode::S, Key::Down),
    (KeyCode::Left, Key::Left),
    (KeyCode::A, Key::Left),
    (KeyCode::Right, Key::Right),
    (KeyCode::D, Key::Right),
    (KeyCode::Space, Key::Interact),
    (KeyCode::Escape, Key::Cancel),
];

/// Tint for a visual tile id.
fn tile_color(tile: u32) -> Color {
    match tile {
        1 => DARKGREEN, // grass
        2 => DARKGRAY,  // stone
        3 => BROWN,     // path
        4 => BLUE,      // water
        5 => GREEN,     // foliage
        _ => PURPLE,    // unknown id, loud on purpose
    }
}

/// Tint for an actor's animation set.
fn animset_color(animset: &str) -> Color {
    match animset {
        "player" => YELLOW,
        "npc" => SKYBLUE,
        "sign" => BEIGE,
        _ => PINK,
    }
}
