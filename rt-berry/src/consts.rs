//! 通用常量.

/// 标注哨兵像素值.
pub mod mark {
    /// 均匀性标注图中, 最大值区域掩膜的哨兵像素值.
    pub const UNIFORMITY_MAX: f32 = 5000.0;

    /// 均匀性标注图中, 最小值区域掩膜的哨兵像素值.
    pub const UNIFORMITY_MIN: f32 = 2500.0;

    /// 剖线标注图中, 两条采样带覆盖区域共用的哨兵像素值.
    pub const PROFILE_BAND: f32 = 10.0;

    /// 像素是否是最大值区域标注?
    #[inline]
    pub fn is_uniformity_max(p: f32) -> bool {
        p == UNIFORMITY_MAX
    }

    /// 像素是否是最小值区域标注?
    #[inline]
    pub fn is_uniformity_min(p: f32) -> bool {
        p == UNIFORMITY_MIN
    }

    /// 像素是否是采样带标注?
    #[inline]
    pub fn is_profile_band(p: f32) -> bool {
        p == PROFILE_BAND
    }
}

/// 中心 ROI 半径的经验除数: 半径取 `min(高, 宽) / 5.5`.
///
/// 5.5 是针对常见射野尺寸的经验截断值, 不针对具体设备做过标定.
pub const ROI_RADIUS_DIVISOR: f64 = 5.5;

/// 极值点圆盘掩膜的半径 (像素, 按欧氏距离).
pub const EXTREMUM_MASK_RADIUS: f64 = 2.0;

/// 采样带半宽占剖线主轴跨度的比例. 半宽下限为 1 像素.
pub const BAND_SPAN_FRACTION: f64 = 0.01;

/// 剖线线性插值的过采样倍数.
pub const INTERP_FACTOR: usize = 10;

/// 有效射束窗口的半影裁剪除数: 从 FWHM 区间两侧各裁去 `fwhm / 10` 个采样点.
pub const PENUMBRA_TRIM_DIVISOR: usize = 10;
