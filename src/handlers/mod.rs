pub mod health;
pub mod invoke;
pub mod item;

pub use health::health_handler;
pub use invoke::invoke_handler;
pub use item::item_handler;
