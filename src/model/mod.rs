mod event;
mod matches;
mod news;
mod player;
mod rankings;
mod search;
mod standings;
mod team;

pub use event::*;
pub use matches::*;
pub use news::*;
pub use player::*;
pub use rankings::*;
pub use search::*;
pub use standings::*;
pub use team::*;
