// Event-driven plumbing
//
// Game transitions return the events they produce; the game service publishes them
// on the bus and subscribers (bots, statistics, a broadcast layer) react to them.

pub use bus::EventBus;
pub use events::GameEvent;
pub use handler::{GameEventError, GameEventHandler};
pub use subscription::EventSubscription;

mod bus;
mod events;
mod handler;
mod subscription;
