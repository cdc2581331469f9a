//! GpsFix - 定位数据
//!
//! 手杖 GPS 模块的定位读数，字段均可缺失（无定位时固件发 null）。

use serde::{Deserialize, Serialize};

/// 良好定位所需最少卫星数
pub const GOOD_FIX_MIN_SATELLITES: u32 = 6;
/// 良好定位的 HDOP 上限
pub const GOOD_FIX_MAX_HDOP: f64 = 5.0;

/// 定位类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixKind {
    /// 无定位
    #[default]
    None,
    /// 2D 定位
    #[serde(rename = "2d")]
    TwoD,
    /// 3D 定位
    #[serde(rename = "3d")]
    ThreeD,
    /// 差分定位
    Dgps,
}

/// GPS 定位读数
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// 纬度（度），[-90, 90]
    #[serde(default)]
    pub latitude: Option<f64>,

    /// 经度（度），[-180, 180]
    #[serde(default)]
    pub longitude: Option<f64>,

    /// 海拔（米），<= 9000
    #[serde(default)]
    pub altitude: Option<f64>,

    /// 对地速度（km/h），[0, 300]
    #[serde(default)]
    pub speed: Option<f64>,

    /// 航向（度），[0, 360)
    #[serde(default)]
    pub heading: Option<f64>,

    /// 可见卫星数
    #[serde(rename = "satellitesCount", default)]
    pub satellites: Option<u32>,

    /// 水平精度因子
    #[serde(default)]
    pub hdop: Option<f64>,

    /// GPS 模块自身时间戳（毫秒）
    #[serde(rename = "gpsTimestamp", default)]
    pub gps_timestamp: Option<u64>,

    /// 定位类型
    #[serde(rename = "fixType", default)]
    pub fix_kind: FixKind,
}

impl GpsFix {
    /// 是否为有效定位
    pub fn is_valid(&self) -> bool {
        self.fix_kind != FixKind::None && self.latitude.is_some() && self.longitude.is_some()
    }

    /// 是否为高质量定位（可用于导航决策）
    pub fn is_good_quality(&self) -> bool {
        self.is_valid()
            && self.satellites.map_or(false, |s| s >= GOOD_FIX_MIN_SATELLITES)
            && self.hdop.map_or(false, |h| h < GOOD_FIX_MAX_HDOP)
    }

    /// 坐标对（有效时）
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if self.fix_kind != FixKind::None => Some((lat, lon)),
            _ => None,
        }
    }

    /// 各字段是否在标称范围内（缺失视为合法）
    pub fn in_range(&self) -> bool {
        self.latitude.map_or(true, |v| (-90.0..=90.0).contains(&v))
            && self.longitude.map_or(true, |v| (-180.0..=180.0).contains(&v))
            && self.altitude.map_or(true, |v| v <= 9000.0)
            && self.speed.map_or(true, |v| (0.0..=300.0).contains(&v))
            && self.heading.map_or(true, |v| (0.0..360.0).contains(&v))
            && self.hdop.map_or(true, |v| v >= 0.0)
    }
}
