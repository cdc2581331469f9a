//! WaterReading - 水渍检测数据

use serde::{Deserialize, Serialize};

/// 预警湿度阈值（百分比）
pub const WATER_WARNING: f64 = 30.0;
/// 危险湿度阈值（百分比）
pub const WATER_DANGER: f64 = 60.0;
/// 浸没湿度阈值（百分比）
pub const WATER_CRITICAL: f64 = 85.0;

/// ADC 原始读数上限
pub const WATER_RAW_MAX: u16 = 4095;

/// 水渍传感器读数
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterReading {
    /// 归一化湿度，[0, 100]
    #[serde(rename = "humidityLevel")]
    pub humidity: f64,

    /// ADC 原始值，[0, 4095]，固件可能不上报
    #[serde(rename = "rawValue", default)]
    pub raw: Option<u16>,
}

impl WaterReading {
    /// 创建新的读数
    pub fn new(humidity: f64, raw: Option<u16>) -> Self {
        Self { humidity, raw }
    }

    /// 湿度是否在标称范围内
    pub fn in_range(&self) -> bool {
        (0.0..=100.0).contains(&self.humidity)
            && self.raw.map_or(true, |r| r <= WATER_RAW_MAX)
    }

    /// 达到预警水平
    pub fn is_warning(&self) -> bool {
        self.humidity >= WATER_WARNING
    }

    /// 达到危险水平（地面明显积水）
    pub fn is_danger(&self) -> bool {
        self.humidity >= WATER_DANGER
    }

    /// 杖尖浸没在积水中
    pub fn is_submerged(&self) -> bool {
        self.humidity >= WATER_CRITICAL
    }
}
