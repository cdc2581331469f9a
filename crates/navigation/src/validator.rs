//! 目的地校验模块
//!
//! 校验规则：
//! - name 非空
//! - 至少两个航点
//! - 航点坐标有限且在经纬度范围内
//! - 可选的总距离 / 预计时间非负

use contracts::{CoreError, Destination};

/// 校验 Destination
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(destination: &Destination) -> Result<(), CoreError> {
    validate_name(destination)?;
    validate_waypoint_count(destination)?;
    validate_waypoint_coordinates(destination)?;
    validate_totals(destination)?;
    Ok(())
}

/// 校验名称非空
fn validate_name(destination: &Destination) -> Result<(), CoreError> {
    if destination.name.trim().is_empty() {
        return Err(CoreError::navigation("name", "destination name cannot be empty"));
    }
    Ok(())
}

/// 校验航点数量
fn validate_waypoint_count(destination: &Destination) -> Result<(), CoreError> {
    if destination.waypoints.len() < 2 {
        return Err(CoreError::navigation(
            "waypoints",
            format!(
                "route needs at least 2 waypoints, got {}",
                destination.waypoints.len()
            ),
        ));
    }
    Ok(())
}

/// 校验航点坐标
fn validate_waypoint_coordinates(destination: &Destination) -> Result<(), CoreError> {
    for (idx, waypoint) in destination.waypoints.iter().enumerate() {
        if !waypoint.latitude.is_finite() || !waypoint.longitude.is_finite() {
            return Err(CoreError::navigation(
                format!("waypoints[{idx}]"),
                "coordinate is not finite",
            ));
        }
        if !(-90.0..=90.0).contains(&waypoint.latitude) {
            return Err(CoreError::navigation(
                format!("waypoints[{idx}].latitude"),
                format!("latitude {} out of range", waypoint.latitude),
            ));
        }
        if !(-180.0..=180.0).contains(&waypoint.longitude) {
            return Err(CoreError::navigation(
                format!("waypoints[{idx}].longitude"),
                format!("longitude {} out of range", waypoint.longitude),
            ));
        }
    }
    Ok(())
}

/// 校验可选的路线总量字段
fn validate_totals(destination: &Destination) -> Result<(), CoreError> {
    if let Some(total) = destination.total_distance_meters {
        if !total.is_finite() || total < 0.0 {
            return Err(CoreError::navigation(
                "totalDistanceMeters",
                format!("must be non-negative, got {total}"),
            ));
        }
    }
    Ok(())
}
