use ember_assets::{AssetId, AssetPolicy, Handle};
use ember_core::geometry::IntRect;
use ember_core::math::Vec2;
use ember_entity::{DrawTarget, EntityId, SpriteDraw};

use crate::game::GameContext;
use crate::state::{State, StateBase, StateCommand};

/// Shows one image for a fixed time, then removes itself from the stack.
///
/// The image bytes are held resident while the state is initialized so the
/// platform renderer can resolve the texture id.
pub struct SplashState {
    base: StateBase,
    texture: AssetId,
    delay: f32,
    image: Option<Handle<Vec<u8>>>,
}

impl SplashState {
    pub const ID: &'static str = "Splash";

    /// `delay` is in seconds of unpaused game time.
    pub fn new(texture: impl Into<AssetId>, delay: f32) -> Self {
        Self {
            base: StateBase::new(Self::ID),
            texture: texture.into(),
            delay,
            image: None,
        }
    }

    pub fn texture(&self) -> &AssetId {
        &self.texture
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }
}

impl State for SplashState {
    fn base(&self) -> &StateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut StateBase {
        &mut self.base
    }

    fn do_init(&mut self, ctx: &mut GameContext) {
        match ctx
            .assets
            .handle_with_policy::<Vec<u8>>(self.texture.clone(), AssetPolicy::eager())
        {
            Ok(handle) => self.image = Some(handle),
            Err(e) => tracing::warn!("splash image '{}' unavailable: {}", self.texture, e),
        }
    }

    fn update_fixed(&mut self, ctx: &mut GameContext) {
        if !self.base.is_paused() && self.base.elapsed_time() > self.delay {
            ctx.request(StateCommand::RemoveActive);
        }
    }

    fn update_variable(&mut self, _ctx: &mut GameContext, _elapsed: f32) {}

    fn draw(&mut self, _ctx: &mut GameContext, target: &mut dyn DrawTarget) {
        // An empty rect asks for the whole texture.
        target.draw_sprite(&SpriteDraw {
            entity: EntityId::NONE,
            texture: Some(&self.texture),
            rect: IntRect::default(),
            position: Vec2::ZERO,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        });
    }

    fn handle_cleanup(&mut self, _ctx: &mut GameContext) {
        self.image = None;
    }
}
