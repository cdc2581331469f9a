//! ObstaclePair - 障碍物距离数据
//!
//! 固定头高超声波 + 舵机扫描地面超声波的成对读数。

use serde::{Deserialize, Serialize};

/// 头高传感器危险距离（米）
pub const UPPER_DANGER_M: f64 = 0.6;
/// 地面传感器危险距离（米）
pub const LOWER_DANGER_M: f64 = 0.4;
/// 预警距离（米）
pub const WARNING_M: f64 = 1.0;
/// 安全距离（米）
pub const CLEAR_M: f64 = 2.5;
/// 超声波最大有效量程（米）
pub const MAX_RANGE_M: f64 = 10.0;

/// 舵机扫描区域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepZone {
    Left,
    Center,
    Right,
}

/// 障碍物距离读数
///
/// `upper` 为固定头高传感器，`lower` 为舵机上的地面扫描传感器。
/// 读数缺失（超时/超量程）以 `None` 表示。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstaclePair {
    /// 头高距离（米），(0, 10]
    pub upper: Option<f64>,

    /// 地面距离（米），(0, 10]
    pub lower: Option<f64>,

    /// 舵机角度（度），[-90, 90]，0 为正前方
    #[serde(rename = "servoAngle")]
    pub servo_angle: f64,
}

impl ObstaclePair {
    /// 创建新的读数
    pub fn new(upper: Option<f64>, lower: Option<f64>, servo_angle: f64) -> Self {
        Self {
            upper,
            lower,
            servo_angle,
        }
    }

    /// 当前扫描区域：|angle| <= 30 为中央，负为左，正为右
    pub fn zone(&self) -> SweepZone {
        if self.servo_angle < -30.0 {
            SweepZone::Left
        } else if self.servo_angle > 30.0 {
            SweepZone::Right
        } else {
            SweepZone::Center
        }
    }

    /// 距离是否在标称范围内（缺失视为合法）
    pub fn in_range(&self) -> bool {
        let dist_ok = |d: Option<f64>| d.map_or(true, |v| v > 0.0 && v <= MAX_RANGE_M);
        dist_ok(self.upper) && dist_ok(self.lower) && (-90.0..=90.0).contains(&self.servo_angle)
    }

    /// 综合危险评分，[0, 1]
    ///
    /// 头高障碍权重 1.5，地面障碍权重 1.0；地面传感器正对前方
    /// 且距离小于 1 米时额外 +0.3。
    pub fn danger_score(&self) -> f64 {
        let upper_term = 1.5 * proximity(self.upper, UPPER_DANGER_M);
        let lower_term = 1.0 * proximity(self.lower, LOWER_DANGER_M);
        let mut score = (upper_term + lower_term) / 2.5;

        if self.zone() == SweepZone::Center {
            if let Some(lower) = self.lower {
                if lower < WARNING_M {
                    score += 0.3;
                }
            }
        }

        score.clamp(0.0, 1.0)
    }
}

/// 归一化接近度：危险距离内为 1，安全距离外为 0，线性过渡
fn proximity(distance: Option<f64>, danger_m: f64) -> f64 {
    match distance {
        None => 0.0,
        Some(d) if d <= danger_m => 1.0,
        Some(d) if d >= CLEAR_M => 0.0,
        Some(d) => (CLEAR_M - d) / (CLEAR_M - danger_m),
    }
}
