//! CanePacket - BLE notify 载荷
//!
//! 手杖每个上报周期打包一次的同步传感器读数。
//! 字段名与固件 JSON 载荷严格一致。

use serde::{Deserialize, Serialize};

use crate::{CoreError, GpsFix, ImuReading, ObstaclePair, WaterReading};

/// 新鲜窗口（毫秒）：age < 1000 视为新鲜
pub const FRESH_MS: u64 = 1000;
/// 过期窗口（毫秒）：age > 2000 视为过期
pub const STALE_MS: u64 = 2000;
/// 校验拒收窗口（毫秒）：age > 5000 直接丢弃
pub const MAX_AGE_MS: u64 = 5000;
/// 允许的最大时钟回溯（毫秒）
pub const MAX_PAST_MS: u64 = 3_600_000;
/// 允许的最大时钟超前（毫秒）
pub const MAX_FUTURE_MS: u64 = 5000;

/// 手杖数据包
///
/// 由 BLE 传输层解析字节流后产出，核心侧只读。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanePacket {
    /// 采样时间戳（毫秒，epoch）
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,

    /// 姿态读数
    pub imu: ImuReading,

    /// 障碍物距离读数
    pub obstacles: ObstaclePair,

    /// 水渍读数
    #[serde(rename = "waterSensor")]
    pub water: WaterReading,

    /// 定位读数
    pub gps: GpsFix,
}

impl CanePacket {
    /// 数据包年龄（毫秒），时钟超前时饱和为 0
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp_ms)
    }

    /// 是否新鲜（可用于决策）
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        self.age_ms(now_ms) < FRESH_MS
    }

    /// 是否过期（计入危险评分）
    pub fn is_stale(&self, now_ms: u64) -> bool {
        self.age_ms(now_ms) > STALE_MS
    }

    /// 校验数据包不变量
    ///
    /// 时间戳窗口 + 各传感器字段范围。任何一项失败返回带字段路径的错误。
    pub fn validate(&self, now_ms: u64) -> Result<(), CoreError> {
        if self.timestamp_ms + MAX_PAST_MS < now_ms {
            return Err(CoreError::StalePacket {
                age_ms: self.age_ms(now_ms),
                max_age_ms: MAX_PAST_MS,
            });
        }
        if self.timestamp_ms > now_ms + MAX_FUTURE_MS {
            return Err(CoreError::invalid_packet(
                "timestamp",
                format!("timestamp {}ms ahead of clock", self.timestamp_ms - now_ms),
            ));
        }
        if self.age_ms(now_ms) > MAX_AGE_MS {
            return Err(CoreError::StalePacket {
                age_ms: self.age_ms(now_ms),
                max_age_ms: MAX_AGE_MS,
            });
        }
        if !self.imu.is_finite() {
            return Err(CoreError::invalid_packet("imu", "non-finite component"));
        }
        if !self.imu.in_range() {
            return Err(CoreError::invalid_packet("imu", "angle out of range"));
        }
        if !self.obstacles.in_range() {
            return Err(CoreError::invalid_packet(
                "obstacles",
                "distance or servo angle out of range",
            ));
        }
        if !self.water.in_range() {
            return Err(CoreError::invalid_packet(
                "waterSensor",
                "humidity out of range",
            ));
        }
        if !self.gps.in_range() {
            return Err(CoreError::invalid_packet("gps", "field out of range"));
        }
        Ok(())
    }
}
