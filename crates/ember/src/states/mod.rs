//! Ready-made states.

mod splash;

pub use splash::SplashState;
