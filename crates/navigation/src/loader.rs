//! 目的地文件加载
//!
//! 解析 + 规范化 + 校验，产出不可变的 `Destination`。

use std::path::Path;

use contracts::{CoreError, Destination, WaypointKind};

use crate::validator;

/// 目的地文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFormat {
    Json,
    Toml,
}

impl RouteFormat {
    /// 根据扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// 目的地加载器
///
/// 提供从文件或字符串加载目的地的静态方法。
pub struct RouteLoader;

impl RouteLoader {
    /// 从文件路径加载目的地
    ///
    /// 根据文件扩展名自动检测格式 (.json / .toml)。
    ///
    /// # Errors
    /// - 文件读取失败
    /// - 格式不支持
    /// - 解析失败
    /// - 校验失败
    pub fn load_from_path(path: &Path) -> Result<Destination, CoreError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// 从字符串加载目的地
    ///
    /// # Errors
    /// - 解析失败
    /// - 校验失败
    pub fn load_from_str(content: &str, format: RouteFormat) -> Result<Destination, CoreError> {
        let mut destination = Self::parse(content, format)?;
        Self::normalize(&mut destination);
        validator::validate(&destination)?;
        Ok(destination)
    }

    /// 将 Destination 序列化为 JSON 字符串
    pub fn to_json(destination: &Destination) -> Result<String, CoreError> {
        serde_json::to_string_pretty(destination)
            .map_err(|e| CoreError::route_parse(format!("JSON serialize error: {e}")))
    }

    /// 根据文件扩展名推断格式
    fn detect_format(path: &Path) -> Result<RouteFormat, CoreError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| CoreError::route_parse("cannot determine file format from extension"))?;

        RouteFormat::from_extension(ext)
            .ok_or_else(|| CoreError::route_parse(format!("unsupported route format: .{ext}")))
    }

    /// 解析目的地内容
    fn parse(content: &str, format: RouteFormat) -> Result<Destination, CoreError> {
        match format {
            RouteFormat::Json => serde_json::from_str(content).map_err(|e| CoreError::RouteParse {
                message: format!("JSON parse error: {e}"),
                source: Some(Box::new(e)),
            }),
            RouteFormat::Toml => toml::from_str(content).map_err(|e| CoreError::RouteParse {
                message: format!("TOML parse error: {e}"),
                source: Some(Box::new(e)),
            }),
        }
    }

    /// 规范化航点角色：首尾未标注时隐式为 start / destination
    fn normalize(destination: &mut Destination) {
        let len = destination.waypoints.len();
        if len == 0 {
            return;
        }

        if destination.waypoints[0].kind == WaypointKind::Intermediate {
            destination.waypoints[0].kind = WaypointKind::Start;
        }
        if destination.waypoints[len - 1].kind == WaypointKind::Intermediate {
            destination.waypoints[len - 1].kind = WaypointKind::Destination;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_JSON: &str = r#"{
        "name": "corner shop",
        "transportMode": "walking",
        "waypoints": [
            { "latitude": 4.0500, "longitude": 9.7679 },
            { "latitude": 4.0505, "longitude": 9.7681 },
            { "latitude": 4.0510, "longitude": 9.7685 }
        ]
    }"#;

    const MINIMAL_TOML: &str = r#"
name = "corner shop"
transportMode = "walking"

[[waypoints]]
latitude = 4.0500
longitude = 9.7679

[[waypoints]]
latitude = 4.0510
longitude = 9.7685
"#;

    #[test]
    fn test_load_from_str_json() {
        let destination = RouteLoader::load_from_str(MINIMAL_JSON, RouteFormat::Json).unwrap();
        assert_eq!(destination.name, "corner shop");
        assert_eq!(destination.waypoints.len(), 3);
    }

    #[test]
    fn test_load_from_str_toml() {
        let destination = RouteLoader::load_from_str(MINIMAL_TOML, RouteFormat::Toml).unwrap();
        assert_eq!(destination.waypoints.len(), 2);
    }

    #[test]
    fn test_normalize_implicit_endpoints() {
        let destination = RouteLoader::load_from_str(MINIMAL_JSON, RouteFormat::Json).unwrap();
        assert_eq!(destination.waypoints[0].kind, WaypointKind::Start);
        assert_eq!(destination.waypoints[1].kind, WaypointKind::Intermediate);
        assert_eq!(destination.waypoints[2].kind, WaypointKind::Destination);
    }

    #[test]
    fn test_explicit_kinds_kept() {
        let json = r#"{
            "name": "loop",
            "waypoints": [
                { "latitude": 0.0, "longitude": 0.0, "type": "destination" },
                { "latitude": 0.001, "longitude": 0.0, "type": "start" }
            ]
        }"#;
        let destination = RouteLoader::load_from_str(json, RouteFormat::Json).unwrap();
        assert_eq!(destination.waypoints[0].kind, WaypointKind::Destination);
        assert_eq!(destination.waypoints[1].kind, WaypointKind::Start);
    }

    #[test]
    fn test_round_trip_json() {
        let destination = RouteLoader::load_from_str(MINIMAL_JSON, RouteFormat::Json).unwrap();
        let serialized = RouteLoader::to_json(&destination).unwrap();
        let reparsed = RouteLoader::load_from_str(&serialized, RouteFormat::Json).unwrap();
        assert_eq!(reparsed, destination);
    }

    #[test]
    fn test_parse_error_surfaces() {
        let result = RouteLoader::load_from_str("{ broken", RouteFormat::Json);
        assert!(matches!(result, Err(CoreError::RouteParse { .. })));
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let json = r#"{
            "name": "too short",
            "waypoints": [ { "latitude": 0.0, "longitude": 0.0 } ]
        }"#;
        let result = RouteLoader::load_from_str(json, RouteFormat::Json);
        assert!(matches!(result, Err(CoreError::Navigation { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = RouteLoader::load_from_path(Path::new("route.yaml"));
        assert!(matches!(result, Err(CoreError::RouteParse { .. })));
    }
}
