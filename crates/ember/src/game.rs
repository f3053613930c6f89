//! The game object and its fixed-timestep loop.

use std::fmt;
use std::path::PathBuf;

use ember_assets::AssetManager;
use ember_core::event::{Event, Key};
use ember_core::profiling::{self, profile_function, profile_scope};

use crate::platform::Platform;
use crate::plugin::{CoreAssetsPlugin, Plugin};
use crate::settings::Settings;
use crate::state::{State, StateCommand, StateManager};
use crate::stats::FrameStats;
use crate::time::Time;

/// How a game run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExitCode {
    #[default]
    Ok,
    /// Ended through [`GameContext::fatal`] without a more specific code.
    Error,
    MissingAsset,
    /// A state operation needed an active state and there was none.
    StackEmpty,
    /// Startup failed, or no state was added before [`Game::run`].
    InitFailed,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Ok => 0,
            ExitCode::Error => -1,
            ExitCode::MissingAsset => 1,
            ExitCode::StackEmpty => 2,
            ExitCode::InitFailed => 3,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Ok
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}

/// Everything a state or plugin may touch while the game runs.
pub struct GameContext {
    pub assets: AssetManager,
    pub time: Time,
    pub stats: FrameStats,
    pub settings: Settings,
    running: bool,
    exit_code: ExitCode,
    commands: Vec<StateCommand>,
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new(AssetManager::new())
    }
}

impl GameContext {
    pub fn new(assets: AssetManager) -> Self {
        Self {
            assets,
            time: Time::new(),
            stats: FrameStats::new(),
            settings: Settings::default(),
            running: true,
            exit_code: ExitCode::Ok,
            commands: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    /// Stops the loop after the current frame.
    pub fn quit(&mut self, code: ExitCode) {
        tracing::info!("quit requested: {}", code);
        self.exit_code = code;
        self.running = false;
    }

    /// Logs `message` and stops the loop with `code`.
    pub fn fatal(&mut self, code: ExitCode, message: impl fmt::Display) {
        tracing::error!("fatal: {}", message);
        self.quit(code);
    }

    /// Queues a state stack change, applied once the current hook returns.
    pub fn request(&mut self, command: StateCommand) {
        tracing::trace!("state command queued: {:?}", command);
        self.commands.push(command);
    }

    pub(crate) fn take_commands(&mut self) -> Vec<StateCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl fmt::Debug for GameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameContext")
            .field("running", &self.running)
            .field("exit_code", &self.exit_code)
            .field("frame", &self.time.frame_count())
            .field("pending_commands", &self.commands.len())
            .finish()
    }
}

/// A game: plugins, a state stack and the loop that drives them.
///
/// ```
/// use std::time::Duration;
/// use ember::{ExitCode, Game, HeadlessPlatform, SplashState, Time};
///
/// let mut game = Game::new("Demo")
///     .with_args(Vec::<String>::new())
///     .with_time(Time::with_manual_step(Duration::from_millis(50)))
///     .with_state(SplashState::new("splash.png", 0.2));
/// let code = game.run(&mut HeadlessPlatform::with_frame_limit(100));
/// assert_eq!(code, ExitCode::Ok);
/// ```
pub struct Game {
    title: String,
    args: Vec<String>,
    ctx: GameContext,
    states: StateManager,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Game {
    /// A game with the core asset handlers rooted at the working directory.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            args: std::env::args().collect(),
            ctx: GameContext::default(),
            states: StateManager::new(),
            plugins: vec![Box::new(CoreAssetsPlugin::default())],
        }
    }

    /// Roots the core asset handlers at `root`.
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.plugins[0] = Box::new(CoreAssetsPlugin::new(root));
        self
    }

    /// Command-line arguments, logged at startup.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_time(mut self, time: Time) -> Self {
        self.ctx.time = time;
        self
    }

    pub fn add_plugin(mut self, plugin: impl Plugin) -> Self {
        tracing::debug!("plugin added: {}", plugin.name());
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Pushes `state` as the active state when the game starts.
    pub fn with_state(mut self, state: impl State) -> Self {
        self.ctx.request(StateCommand::AddActive(Box::new(state)));
        self
    }

    /// Slides `state` under the stack when the game starts.
    pub fn with_inactive_state(mut self, state: impl State) -> Self {
        self.ctx.request(StateCommand::AddInactive(Box::new(state)));
        self
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    pub fn states(&self) -> &StateManager {
        &self.states
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn process_arguments(&self) {
        let mut args = self.args.iter();
        let program = args.next().map(String::as_str).unwrap_or("");
        if args.len() == 0 {
            tracing::info!("{} command line: (none)", program);
        } else {
            tracing::info!("{} command line:", program);
            for (index, arg) in args.enumerate() {
                tracing::info!("  argument {} = ({})", index + 1, arg);
            }
        }
    }

    /// Starts the game and blocks until it ends.
    ///
    /// The loop runs while the game is running, the platform is open and
    /// the state stack has a state.
    pub fn run(&mut self, platform: &mut dyn Platform) -> ExitCode {
        profile_function!();
        tracing::info!("running '{}'", self.title);
        self.process_arguments();
        self.ctx.running = true;
        self.ctx.exit_code = ExitCode::Ok;

        self.init(platform);
        if self.ctx.is_running() {
            self.game_loop(platform);
        }

        self.states.shutdown(&mut self.ctx);
        for plugin in self.plugins.iter().rev() {
            plugin.cleanup(&mut self.ctx);
        }
        self.ctx.assets.shutdown();
        platform.close();

        let code = self.ctx.exit_code();
        if code.is_success() {
            tracing::info!("exit code {}", code);
        } else {
            tracing::error!("exit code {}", code);
        }
        code
    }

    fn init(&mut self, platform: &mut dyn Platform) {
        for plugin in &self.plugins {
            if let Err(e) = plugin.build(&mut self.ctx) {
                self.ctx
                    .fatal(ExitCode::InitFailed, format!("plugin {}: {}", plugin.name(), e));
                return;
            }
        }

        let mut settings = Settings::load(&self.ctx.assets);
        settings.title = self.title.clone();
        self.ctx.time.set_fixed_timestep(settings.fixed_timestep());
        if let Err(e) = platform.init(&settings) {
            self.ctx.fatal(ExitCode::InitFailed, e);
            return;
        }
        self.ctx.settings = settings;

        for plugin in &self.plugins {
            plugin.finish(&mut self.ctx);
        }

        self.states.apply_commands(&mut self.ctx);
        if self.ctx.is_running() && self.states.is_empty() {
            self.ctx
                .fatal(ExitCode::InitFailed, "no state was added before the game started");
            return;
        }

        let now = self.ctx.time.elapsed();
        self.ctx.stats.reset(now);
        self.ctx.time.restart();
    }

    fn game_loop(&mut self, platform: &mut dyn Platform) {
        while self.ctx.is_running() && platform.is_open() && !self.states.is_empty() {
            profiling::new_frame();
            self.ctx.time.update();
            let dt = self.ctx.time.delta_seconds();
            self.states.tick(dt);

            {
                profile_scope!("events");
                for event in platform.poll_events() {
                    self.process_event(event);
                }
            }

            let steps = self.ctx.time.fixed_update_count();
            for _ in 0..steps {
                if !self.ctx.is_running() || self.states.is_empty() {
                    break;
                }
                profile_scope!("update_fixed");
                self.ctx.time.consume_fixed_timestep();
                self.states.update_fixed(&mut self.ctx);
                self.ctx.stats.record_update(self.ctx.time.elapsed());
            }

            if !self.states.is_empty() {
                self.states.update_variable(&mut self.ctx, dt);
                self.states.draw(&mut self.ctx, platform.draw_target());
                self.ctx.stats.record_frame(self.ctx.time.elapsed());
            }
            platform.present();
            self.states.cleanup(&mut self.ctx);

            for event in self.ctx.assets.drain_events() {
                tracing::trace!("asset event: {:?}", event);
            }
        }
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Closed => self.ctx.quit(ExitCode::Ok),
            Event::GainedFocus => self.states.resume_active(&mut self.ctx),
            Event::LostFocus => self.states.pause_active(&mut self.ctx),
            Event::KeyReleased(Key::Escape) => self.ctx.quit(ExitCode::Ok),
            event => self.states.handle_event(&mut self.ctx, &event),
        }
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("title", &self.title)
            .field("states", &self.states)
            .field("plugins", &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("ctx", &self.ctx)
            .finish()
    }
}
