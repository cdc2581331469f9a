//! ImuReading - 姿态数据
//!
//! 手杖 MPU 输出的三轴欧拉角。

use serde::{Deserialize, Serialize};

/// 倾斜告警阈值（度）
pub const DANGEROUS_PITCH_DEG: f64 = 60.0;
/// 横滚告警阈值（度）
pub const DANGEROUS_ROLL_DEG: f64 = 45.0;

/// 姿态读数
///
/// 三轴欧拉角，单位：度。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuReading {
    /// 偏航角，[-180, 180]
    pub yaw: f64,

    /// 俯仰角，[-90, 90]
    pub pitch: f64,

    /// 横滚角，[-180, 180]
    pub roll: f64,
}

impl ImuReading {
    /// 创建新的姿态读数
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    /// 综合倾斜量 sqrt(pitch² + roll²)
    pub fn tilt_magnitude(&self) -> f64 {
        (self.pitch.powi(2) + self.roll.powi(2)).sqrt()
    }

    /// 是否处于危险倾斜（手杖可能脱手或跌倒）
    pub fn is_dangerous_tilt(&self) -> bool {
        self.pitch.abs() > DANGEROUS_PITCH_DEG || self.roll.abs() > DANGEROUS_ROLL_DEG
    }

    /// 三轴是否均为有限值（NaN/Inf 守卫）
    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }

    /// 三轴是否在标称范围内
    pub fn in_range(&self) -> bool {
        (-180.0..=180.0).contains(&self.yaw)
            && (-90.0..=90.0).contains(&self.pitch)
            && (-180.0..=180.0).contains(&self.roll)
    }
}
