//! # Navigation
//!
//! 路线导航模块。
//!
//! 负责：
//! - 解析 JSON/TOML 目的地文件
//! - 校验路线合法性
//! - 航点推进与大圆距离/方位角计算
//!
//! # Example
//!
//! ```no_run
//! use navigation::{RouteLoader, RouteNavigator};
//! use std::path::Path;
//!
//! let destination = RouteLoader::load_from_path(Path::new("route.json")).unwrap();
//! let mut navigator = RouteNavigator::new(Default::default());
//! navigator.load_destination(destination).unwrap();
//! ```

pub mod geo;
mod loader;
mod navigator;
mod validator;

pub use loader::{RouteFormat, RouteLoader};
pub use navigator::{RouteEvent, RouteNavigator};
pub use validator::validate;

// Re-export contracts types commonly used together with this crate
pub use contracts::{Destination, NavigatorConfig, TransportMode, Waypoint, WaypointKind};
