//! The game state stack.
//!
//! The top of the stack is the active state: it receives events, updates
//! and draw calls. States below it are paused or were never initialized.
//! Removed states wait in a dead list until [`StateManager::cleanup`] runs
//! their cleanup hook at the end of the frame.
//!
//! States cannot reach the manager while one of their hooks is running.
//! They queue a [`StateCommand`] on the [`GameContext`] instead, and the
//! game loop applies queued commands after every dispatch.

use std::any::Any;
use std::fmt;

use ember_core::event::Event;
use ember_entity::DrawTarget;

use crate::game::{ExitCode, GameContext};

/// Stable name of a state, e.g. `"Splash"`.
pub type StateId = &'static str;

/// Lifecycle flags and timers of one state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateStatus {
    init: bool,
    paused: bool,
    cleanup: bool,
    elapsed: f32,
    paused_time: f32,
}

impl StateStatus {
    fn begin(&mut self) {
        self.init = true;
        self.paused = false;
        self.elapsed = 0.0;
        self.paused_time = 0.0;
    }

    fn end(&mut self) {
        self.cleanup = true;
        self.init = false;
    }

    fn tick(&mut self, dt: f32) {
        if self.init {
            self.elapsed += dt;
            if self.paused {
                self.paused_time += dt;
            }
        }
    }
}

/// Bookkeeping every [`State`] embeds.
#[derive(Debug, Clone)]
pub struct StateBase {
    id: StateId,
    status: StateStatus,
}

impl StateBase {
    pub fn new(id: StateId) -> Self {
        tracing::debug!("state '{}' created", id);
        Self {
            id,
            status: StateStatus::default(),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn status(&self) -> &StateStatus {
        &self.status
    }

    pub fn is_init_complete(&self) -> bool {
        self.status.init
    }

    pub fn is_paused(&self) -> bool {
        self.status.paused
    }

    /// Seconds since the last init, paused time included.
    pub fn elapsed_time(&self) -> f32 {
        self.status.elapsed
    }

    pub fn paused_time(&self) -> f32 {
        self.status.paused_time
    }
}

/// One screen of the game: a menu, a level, a splash.
///
/// The manager keeps [`StateBase`] up to date and then calls the matching
/// hook, so implementations only add their own behavior.
pub trait State: Any {
    fn base(&self) -> &StateBase;

    fn base_mut(&mut self) -> &mut StateBase;

    fn id(&self) -> StateId {
        self.base().id()
    }

    /// Called when the state becomes active for the first time, or again
    /// after a de-init.
    #[allow(unused_variables)]
    fn do_init(&mut self, ctx: &mut GameContext) {}

    /// Called by [`StateManager::reset_active_state`].
    #[allow(unused_variables)]
    fn re_init(&mut self, ctx: &mut GameContext) {}

    #[allow(unused_variables)]
    fn de_init(&mut self, ctx: &mut GameContext) {}

    #[allow(unused_variables)]
    fn pause(&mut self, ctx: &mut GameContext) {}

    #[allow(unused_variables)]
    fn resume(&mut self, ctx: &mut GameContext) {}

    #[allow(unused_variables)]
    fn handle_event(&mut self, ctx: &mut GameContext, event: &Event) {}

    fn update_fixed(&mut self, ctx: &mut GameContext);

    fn update_variable(&mut self, ctx: &mut GameContext, elapsed: f32);

    fn draw(&mut self, ctx: &mut GameContext, target: &mut dyn DrawTarget);

    /// Releases what `do_init` acquired. Runs once per de-init, either
    /// before the next init or when the state is disposed.
    #[allow(unused_variables)]
    fn handle_cleanup(&mut self, ctx: &mut GameContext) {}
}

/// A stack change requested from inside a state hook.
pub enum StateCommand {
    AddActive(Box<dyn State>),
    AddInactive(Box<dyn State>),
    InactivateActive,
    DropActive,
    ResetActive,
    RemoveActive,
    SetActive(StateId),
}

impl fmt::Debug for StateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateCommand::AddActive(state) => write!(f, "AddActive({})", state.id()),
            StateCommand::AddInactive(state) => write!(f, "AddInactive({})", state.id()),
            StateCommand::InactivateActive => write!(f, "InactivateActive"),
            StateCommand::DropActive => write!(f, "DropActive"),
            StateCommand::ResetActive => write!(f, "ResetActive"),
            StateCommand::RemoveActive => write!(f, "RemoveActive"),
            StateCommand::SetActive(id) => write!(f, "SetActive({})", id),
        }
    }
}

fn init(state: &mut dyn State, ctx: &mut GameContext) {
    if state.base().status.cleanup {
        state.handle_cleanup(ctx);
        state.base_mut().status.cleanup = false;
    }
    if !state.base().status.init {
        tracing::info!("state '{}' init", state.id());
        state.base_mut().status.begin();
        state.do_init(ctx);
    }
}

fn de_init(state: &mut dyn State, ctx: &mut GameContext) {
    if state.base().status.init {
        tracing::info!("state '{}' de-init", state.id());
        state.base_mut().status.end();
        state.de_init(ctx);
    }
}

fn pause(state: &mut dyn State, ctx: &mut GameContext) {
    if !state.base().status.paused {
        tracing::debug!("state '{}' paused", state.id());
        state.base_mut().status.paused = true;
        state.pause(ctx);
    }
}

fn resume(state: &mut dyn State, ctx: &mut GameContext) {
    if state.base().status.paused {
        tracing::debug!("state '{}' resumed", state.id());
        state.base_mut().status.paused = false;
        state.resume(ctx);
    }
}

fn cleanup(state: &mut dyn State, ctx: &mut GameContext) {
    if state.base().status.cleanup {
        state.handle_cleanup(ctx);
        state.base_mut().status.cleanup = false;
    }
}

/// Stack of game states. The last element is the active state.
#[derive(Default)]
pub struct StateManager {
    stack: Vec<Box<dyn State>>,
    dead: Vec<Box<dyn State>>,
}

impl StateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// States removed but not yet disposed.
    pub fn dead_len(&self) -> usize {
        self.dead.len()
    }

    /// Ids from the bottom of the stack to the active state.
    pub fn ids(&self) -> Vec<StateId> {
        self.stack.iter().map(|state| state.id()).collect()
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.stack.iter().any(|state| state.id() == id)
    }

    pub fn active_state(&self) -> Option<&dyn State> {
        self.stack.last().map(|state| state.as_ref())
    }

    pub fn active_state_mut(&mut self) -> Option<&mut (dyn State + 'static)> {
        self.stack.last_mut().map(|state| state.as_mut())
    }

    /// Pauses the current top and pushes `state` as the new active state.
    pub fn add_active_state(&mut self, mut state: Box<dyn State>, ctx: &mut GameContext) {
        tracing::info!("add active state '{}'", state.id());
        if let Some(top) = self.stack.last_mut() {
            pause(top.as_mut(), ctx);
        }
        init(state.as_mut(), ctx);
        self.stack.push(state);
    }

    /// Slides `state` under the stack; it initializes when it surfaces.
    pub fn add_inactive_state(&mut self, state: Box<dyn State>) {
        tracing::info!("add inactive state '{}'", state.id());
        self.stack.insert(0, state);
    }

    /// Makes the new top active: resumes it, or initializes it if it never
    /// ran. An empty stack ends the game normally.
    fn activate_top(&mut self, ctx: &mut GameContext) {
        match self.stack.last_mut() {
            Some(top) if top.base().is_init_complete() => resume(top.as_mut(), ctx),
            Some(top) => init(top.as_mut(), ctx),
            None => ctx.quit(ExitCode::Ok),
        }
    }

    fn pop_active(&mut self, operation: &str, ctx: &mut GameContext) -> Option<Box<dyn State>> {
        match self.stack.pop() {
            Some(state) => {
                tracing::info!("{} '{}'", operation, state.id());
                Some(state)
            }
            None => {
                tracing::error!("{}: the state stack is empty", operation);
                ctx.quit(ExitCode::StackEmpty);
                None
            }
        }
    }

    /// Pauses the active state and rotates it to the bottom of the stack.
    pub fn inactivate_active_state(&mut self, ctx: &mut GameContext) {
        let Some(mut state) = self.pop_active("inactivate active state", ctx) else {
            return;
        };
        pause(state.as_mut(), ctx);
        self.stack.insert(0, state);
        self.activate_top(ctx);
    }

    /// De-initializes the active state and rotates it to the bottom. It is
    /// initialized again if it ever returns to the top.
    pub fn drop_active_state(&mut self, ctx: &mut GameContext) {
        let Some(mut state) = self.pop_active("drop active state", ctx) else {
            return;
        };
        pause(state.as_mut(), ctx);
        de_init(state.as_mut(), ctx);
        self.stack.insert(0, state);
        self.activate_top(ctx);
    }

    /// Restarts the active state in place.
    pub fn reset_active_state(&mut self, ctx: &mut GameContext) {
        let Some(top) = self.stack.last_mut() else {
            tracing::error!("reset active state: the state stack is empty");
            ctx.quit(ExitCode::StackEmpty);
            return;
        };
        tracing::info!("reset active state '{}'", top.id());
        pause(top.as_mut(), ctx);
        top.re_init(ctx);
        resume(top.as_mut(), ctx);
    }

    /// De-initializes the active state and moves it to the dead list.
    pub fn remove_active_state(&mut self, ctx: &mut GameContext) {
        let Some(mut state) = self.pop_active("remove active state", ctx) else {
            return;
        };
        pause(state.as_mut(), ctx);
        de_init(state.as_mut(), ctx);
        self.dead.push(state);
        self.activate_top(ctx);
    }

    /// Brings the state named `id` to the top. Returns `false` if no state
    /// on the stack has that id.
    pub fn set_active_state(&mut self, id: StateId, ctx: &mut GameContext) -> bool {
        let Some(index) = self.stack.iter().position(|state| state.id() == id) else {
            tracing::warn!("set active state: no state '{}' on the stack", id);
            return false;
        };
        tracing::info!("set active state '{}'", id);
        let state = self.stack.remove(index);
        if let Some(top) = self.stack.last_mut() {
            pause(top.as_mut(), ctx);
        }
        self.stack.push(state);
        self.activate_top(ctx);
        true
    }

    /// Disposes removed states. Called once per frame.
    pub fn cleanup(&mut self, ctx: &mut GameContext) {
        while let Some(mut state) = self.dead.pop() {
            de_init(state.as_mut(), ctx);
            cleanup(state.as_mut(), ctx);
            tracing::debug!("state '{}' disposed", state.id());
        }
        if self.stack.is_empty() && ctx.is_running() {
            ctx.quit(ExitCode::Ok);
        }
    }

    /// Runs one queued command.
    pub fn execute(&mut self, command: StateCommand, ctx: &mut GameContext) {
        match command {
            StateCommand::AddActive(state) => self.add_active_state(state, ctx),
            StateCommand::AddInactive(state) => self.add_inactive_state(state),
            StateCommand::InactivateActive => self.inactivate_active_state(ctx),
            StateCommand::DropActive => self.drop_active_state(ctx),
            StateCommand::ResetActive => self.reset_active_state(ctx),
            StateCommand::RemoveActive => self.remove_active_state(ctx),
            StateCommand::SetActive(id) => {
                self.set_active_state(id, ctx);
            }
        }
    }

    /// Runs queued commands, including any queued by the hooks they call.
    pub fn apply_commands(&mut self, ctx: &mut GameContext) {
        loop {
            let commands = ctx.take_commands();
            if commands.is_empty() {
                break;
            }
            for command in commands {
                self.execute(command, ctx);
            }
        }
    }

    /// Advances the timers of every initialized state.
    pub fn tick(&mut self, dt: f32) {
        for state in &mut self.stack {
            state.base_mut().status.tick(dt);
        }
    }

    pub fn pause_active(&mut self, ctx: &mut GameContext) {
        if let Some(top) = self.stack.last_mut() {
            pause(top.as_mut(), ctx);
        }
    }

    pub fn resume_active(&mut self, ctx: &mut GameContext) {
        if let Some(top) = self.stack.last_mut() {
            resume(top.as_mut(), ctx);
        }
    }

    pub fn handle_event(&mut self, ctx: &mut GameContext, event: &Event) {
        if let Some(top) = self.stack.last_mut() {
            top.handle_event(ctx, event);
        }
        self.apply_commands(ctx);
    }

    pub fn update_fixed(&mut self, ctx: &mut GameContext) {
        if let Some(top) = self.stack.last_mut() {
            top.update_fixed(ctx);
        }
        self.apply_commands(ctx);
    }

    pub fn update_variable(&mut self, ctx: &mut GameContext, elapsed: f32) {
        if let Some(top) = self.stack.last_mut() {
            top.update_variable(ctx, elapsed);
        }
        self.apply_commands(ctx);
    }

    pub fn draw(&mut self, ctx: &mut GameContext, target: &mut dyn DrawTarget) {
        if let Some(top) = self.stack.last_mut() {
            top.draw(ctx, target);
        }
        self.apply_commands(ctx);
    }

    /// De-initializes and disposes every state, active ones first.
    pub fn shutdown(&mut self, ctx: &mut GameContext) {
        while let Some(mut state) = self.stack.pop() {
            pause(state.as_mut(), ctx);
            de_init(state.as_mut(), ctx);
            cleanup(state.as_mut(), ctx);
        }
        self.cleanup(ctx);
        ctx.take_commands();
    }
}

impl fmt::Debug for StateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateManager")
            .field("stack", &self.ids())
            .field("dead", &self.dead.len())
            .finish()
    }
}

impl Drop for StateManager {
    fn drop(&mut self) {
        if !self.stack.is_empty() || !self.dead.is_empty() {
            tracing::debug!(
                "state manager dropped with {} live and {} dead states",
                self.stack.len(),
                self.dead.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        base: StateBase,
        log: Log,
    }

    impl Recorder {
        fn boxed(id: StateId, log: &Log) -> Box<dyn State> {
            Box::new(Recorder {
                base: StateBase::new(id),
                log: Rc::clone(log),
            })
        }

        fn note(&self, hook: &str) {
            self.log.borrow_mut().push(format!("{} {}", self.base.id(), hook));
        }
    }

    impl State for Recorder {
        fn base(&self) -> &StateBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut StateBase {
            &mut self.base
        }

        fn do_init(&mut self, _ctx: &mut GameContext) {
            self.note("init");
        }

        fn re_init(&mut self, _ctx: &mut GameContext) {
            self.note("reinit");
        }

        fn de_init(&mut self, _ctx: &mut GameContext) {
            self.note("deinit");
        }

        fn pause(&mut self, _ctx: &mut GameContext) {
            self.note("pause");
        }

        fn resume(&mut self, _ctx: &mut GameContext) {
            self.note("resume");
        }

        fn update_fixed(&mut self, ctx: &mut GameContext) {
            self.note("fixed");
            if self.base.elapsed_time() > 1.0 {
                ctx.request(StateCommand::RemoveActive);
            }
        }

        fn update_variable(&mut self, _ctx: &mut GameContext, _elapsed: f32) {}

        fn draw(&mut self, _ctx: &mut GameContext, _target: &mut dyn DrawTarget) {}

        fn handle_cleanup(&mut self, _ctx: &mut GameContext) {
            self.note("cleanup");
        }
    }

    fn setup() -> (StateManager, GameContext, Log) {
        (StateManager::new(), GameContext::default(), Log::default())
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn add_active_pauses_previous_top() {
        let (mut states, mut ctx, log) = setup();
        states.add_active_state(Recorder::boxed("menu", &log), &mut ctx);
        states.add_active_state(Recorder::boxed("level", &log), &mut ctx);

        assert_eq!(take(&log), ["menu init", "menu pause", "level init"]);
        assert_eq!(states.active_state().map(|s| s.id()), Some("level"));
        assert!(states.stack[0].base().is_paused());
    }

    #[test]
    fn inactive_state_initializes_when_it_surfaces() {
        let (mut states, mut ctx, log) = setup();
        states.add_active_state(Recorder::boxed("menu", &log), &mut ctx);
        states.add_inactive_state(Recorder::boxed("credits", &log));
        take(&log);

        states.inactivate_active_state(&mut ctx);

        assert_eq!(take(&log), ["menu pause", "credits init"]);
        assert_eq!(states.ids(), ["menu", "credits"]);
        assert!(ctx.is_running());
    }

    #[test]
    fn drop_then_return_runs_cleanup_before_init() {
        let (mut states, mut ctx, log) = setup();
        states.add_active_state(Recorder::boxed("a", &log), &mut ctx);
        states.add_inactive_state(Recorder::boxed("b", &log));
        take(&log);

        states.drop_active_state(&mut ctx);
        assert_eq!(take(&log), ["a pause", "a deinit", "b init"]);

        states.set_active_state("a", &mut ctx);
        assert_eq!(take(&log), ["b pause", "a cleanup", "a init"]);
    }

    #[test]
    fn removing_the_last_state_quits_ok() {
        let (mut states, mut ctx, log) = setup();
        states.add_active_state(Recorder::boxed("only", &log), &mut ctx);
        take(&log);

        states.remove_active_state(&mut ctx);
        assert_eq!(states.dead_len(), 1);
        assert!(!ctx.is_running());
        assert_eq!(ctx.exit_code(), ExitCode::Ok);

        states.cleanup(&mut ctx);
        assert_eq!(take(&log), ["only pause", "only deinit", "only cleanup"]);
        assert_eq!(states.dead_len(), 0);
    }

    #[test]
    fn operations_on_an_empty_stack_quit_with_stack_empty() {
        let (mut states, mut ctx, _) = setup();
        states.drop_active_state(&mut ctx);
        assert_eq!(ctx.exit_code(), ExitCode::StackEmpty);
        assert!(!ctx.is_running());
    }

    #[test]
    fn reset_reinitializes_in_place() {
        let (mut states, mut ctx, log) = setup();
        states.add_active_state(Recorder::boxed("level", &log), &mut ctx);
        take(&log);

        states.reset_active_state(&mut ctx);
        assert_eq!(take(&log), ["level pause", "level reinit", "level resume"]);
    }

    #[test]
    fn set_active_state_with_unknown_id_changes_nothing() {
        let (mut states, mut ctx, log) = setup();
        states.add_active_state(Recorder::boxed("level", &log), &mut ctx);
        assert!(!states.set_active_state("missing", &mut ctx));
        assert_eq!(states.ids(), ["level"]);
    }

    #[test]
    fn commands_queued_by_hooks_run_after_dispatch() {
        let (mut states, mut ctx, log) = setup();
        states.add_active_state(Recorder::boxed("menu", &log), &mut ctx);
        states.add_active_state(Recorder::boxed("splash", &log), &mut ctx);
        take(&log);

        states.tick(0.5);
        states.update_fixed(&mut ctx);
        assert_eq!(states.len(), 2);

        states.tick(0.6);
        states.update_fixed(&mut ctx);
        assert_eq!(states.ids(), ["menu"]);
        assert_eq!(
            take(&log),
            [
                "splash fixed",
                "splash fixed",
                "splash pause",
                "splash deinit",
                "menu resume"
            ]
        );
    }

    #[test]
    fn paused_time_only_grows_while_paused() {
        let (mut states, mut ctx, log) = setup();
        states.add_active_state(Recorder::boxed("level", &log), &mut ctx);
        states.tick(1.0);
        states.pause_active(&mut ctx);
        states.tick(0.5);
        states.resume_active(&mut ctx);
        states.tick(0.25);

        let base = states.active_state().unwrap().base();
        assert_eq!(base.elapsed_time(), 1.75);
        assert_eq!(base.paused_time(), 0.5);
    }

    #[test]
    fn shutdown_disposes_everything() {
        let (mut states, mut ctx, log) = setup();
        states.add_active_state(Recorder::boxed("a", &log), &mut ctx);
        states.add_active_state(Recorder::boxed("b", &log), &mut ctx);
        take(&log);

        states.shutdown(&mut ctx);

        assert!(states.is_empty());
        assert_eq!(
            take(&log),
            ["b pause", "b deinit", "b cleanup", "a deinit", "a cleanup"]
        );
    }
}
