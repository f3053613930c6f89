//! The seam between the game loop and a window system.

use std::collections::VecDeque;

use ember_assets::AssetId;
use ember_core::event::Event;
use ember_core::geometry::IntRect;
use ember_core::math::Vec2;
use ember_entity::{DrawTarget, EntityId, SpriteDraw};

use crate::error::GameResult;
use crate::settings::Settings;

/// A window, its event pump and its renderer.
pub trait Platform {
    /// Opens the window described by `settings`.
    fn init(&mut self, settings: &Settings) -> GameResult<()>;

    fn is_open(&self) -> bool;

    /// Events that arrived since the last call.
    fn poll_events(&mut self) -> Vec<Event>;

    /// Renderer for the frame being built.
    fn draw_target(&mut self) -> &mut dyn DrawTarget;

    /// Shows the finished frame.
    fn present(&mut self);

    fn close(&mut self);
}

/// An owned copy of a [`SpriteDraw`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnSprite {
    pub entity: EntityId,
    pub texture: Option<AssetId>,
    pub rect: IntRect,
    pub position: Vec2,
}

#[derive(Debug, Default)]
struct FrameRecorder {
    sprites: Vec<DrawnSprite>,
}

impl DrawTarget for FrameRecorder {
    fn draw_sprite(&mut self, sprite: &SpriteDraw<'_>) {
        self.sprites.push(DrawnSprite {
            entity: sprite.entity,
            texture: sprite.texture.cloned(),
            rect: sprite.rect,
            position: sprite.position,
        });
    }
}

/// A window-less platform that replays scripted events and records what
/// was drawn.
///
/// Events queued with [`HeadlessPlatform::push_frame`] are delivered one
/// frame at a time. The platform closes itself after `frame_limit` presented
/// frames, if set.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    open: bool,
    settings: Option<Settings>,
    pending: VecDeque<Vec<Event>>,
    current: FrameRecorder,
    frames: Vec<Vec<DrawnSprite>>,
    frame_limit: Option<usize>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame_limit(frames: usize) -> Self {
        Self {
            frame_limit: Some(frames),
            ..Self::default()
        }
    }

    /// Queues the events delivered on one future frame.
    pub fn push_frame(&mut self, events: impl IntoIterator<Item = Event>) {
        self.pending.push_back(events.into_iter().collect());
    }

    /// Sprites drawn in each presented frame.
    pub fn frames(&self) -> &[Vec<DrawnSprite>] {
        &self.frames
    }

    pub fn frames_presented(&self) -> usize {
        self.frames.len()
    }

    /// Settings passed to [`Platform::init`].
    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }
}

impl Platform for HeadlessPlatform {
    fn init(&mut self, settings: &Settings) -> GameResult<()> {
        tracing::debug!("headless platform {}x{}", settings.width, settings.height);
        self.settings = Some(settings.clone());
        self.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn poll_events(&mut self) -> Vec<Event> {
        self.pending.pop_front().unwrap_or_default()
    }

    fn draw_target(&mut self) -> &mut dyn DrawTarget {
        &mut self.current
    }

    fn present(&mut self) {
        self.frames.push(std::mem::take(&mut self.current.sprites));
        if self
            .frame_limit
            .is_some_and(|limit| self.frames.len() >= limit)
        {
            self.close();
        }
    }

    fn close(&mut self) {
        self.open = false;
    }
}
