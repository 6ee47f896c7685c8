mod delay;
mod gesture;
mod keys;
mod led;
mod print;
mod string;

pub use delay::{DefaultDelay, Delay};
pub use gesture::{Swipe, Tap};
pub use keys::KeyCombo;
pub use led::Led;
pub use print::Print;
pub use string::TypeString;
