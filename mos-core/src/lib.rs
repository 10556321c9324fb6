//! Rules behind the margin-of-safety dashboard.
//!
//! Nothing in this crate touches a browser global: storage, page targets and
//! clocks are passed in, so every rule runs and is tested natively. The
//! `mos-shell` crate binds them to the live page.

pub mod binder;
pub mod config;
pub mod error;
pub mod favourites;
pub mod format;
pub mod legacy;
pub mod notification;
pub mod search;
pub mod storage;
pub mod theme;
pub mod ticker;
pub mod tickers;
pub mod widgets;

pub use binder::{load_values, BindReport, BindTarget, Binding, Content, Renderer, Schema};
pub use config::{DashboardConfig, ElementIds};
pub use error::{Error, Result};
pub use favourites::Favourites;
pub use format::{format_number, format_value};
pub use notification::{NotificationConfig, NotificationQueue, QueueEvent};
pub use search::{FetchFailure, HistoryState, SearchController, SearchEffect};
pub use storage::{MemoryStorage, Storage};
pub use theme::ColorScheme;
pub use ticker::Ticker;
pub use tickers::TickerList;
pub use widgets::{Effect, FavouriteCard, Widget, WidgetEvent};
