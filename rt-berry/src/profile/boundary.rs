//! 剖线边界: 由四个屏幕点选坐标推导的采样几何.

use crate::consts::BAND_SPAN_FRACTION;
use num::ToPrimitive;

/// 剖线边界初始化错误.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InitBoundaryError {
    /// 提供的点选少于 4 个.
    TooFewPoints,

    /// 参与推导的某个坐标分量无法转换为有限浮点值.
    NonFinitePoint,

    /// 参与推导的某个坐标分量模长达到 `2^61`,
    /// 截断后无法参与安全的 `i64` 索引运算.
    PointOutOfBound,
}

/// 参与推导的坐标分量截断后的模长上限 (不含).
///
/// 各分量模长都小于 `2^61` 时, 行跨度 `y2 - y`、测量带半宽
/// 以及它们与各分量的和差均在 `i64` 表示范围内.
const COORD_BOUND: f64 = (1_i64 << 61) as f64;

/// 由四个点选确定的剖线边界.
///
/// 四个点有固定的位置约定: 第 0, 1 个点是纵向剖线的上、下端,
/// 第 2, 3 个点是横向剖线的左、右端. 本结构只做坐标截断与数值检查
/// (有限性、模长上限), 不验证点选的语义角色; 推导出的范围与测量带
/// 是否落在图像内, 由剖线分析在拿到图像后检查.
#[derive(Copy, Clone, Debug)]
pub struct FieldBoundary {
    /// 纵向剖线所在列.
    x: i64,
    /// 纵向行范围下端 (含).
    y: i64,
    /// 纵向行范围上端 (不含).
    y2: i64,
    /// 横向列范围下端 (含).
    x3: i64,
    /// 横向剖线所在行.
    y3: i64,
    /// 横向列范围上端 (不含).
    x4: i64,
}

impl FieldBoundary {
    /// 从至少 4 个点选坐标构建剖线边界. 只使用前 4 个点;
    /// 坐标的小数部分被截断 (向零取整), 而不是四舍五入.
    ///
    /// 每个点选以 `(x, y)` 次序给出, `x` 沿宽度方向, `y` 沿高度方向.
    /// 四个点共 8 个分量中只有 6 个参与推导
    /// (第 1 点的 `x` 与第 3 点的 `y` 被忽略), 未参与推导的分量不检查.
    ///
    /// # 返回值
    ///
    /// - 当点选少于 4 个时, 返回 `Err(InitBoundaryError::TooFewPoints)`;
    /// - 当参与推导的分量无法转换为有限浮点值时, 返回
    ///   `Err(InitBoundaryError::NonFinitePoint)`;
    /// - 当参与推导的分量模长达到 `2^61` 时, 返回
    ///   `Err(InitBoundaryError::PointOutOfBound)`;
    /// - 其他情况下成功, 返回 `Ok(FieldBoundary)`.
    pub fn new<T: ToPrimitive>(points: &[(T, T)]) -> Result<Self, InitBoundaryError> {
        if points.len() < 4 {
            return Err(InitBoundaryError::TooFewPoints);
        }
        Ok(Self {
            x: truncated(&points[0].0)?,
            y: truncated(&points[0].1)?,
            y2: truncated(&points[1].1)?,
            x3: truncated(&points[2].0)?,
            y3: truncated(&points[2].1)?,
            x4: truncated(&points[3].0)?,
        })
    }

    /// 纵向剖线所在列.
    #[inline]
    pub fn vertical_column(&self) -> i64 {
        self.x
    }

    /// 纵向剖线的行范围 `[y, y2)`.
    #[inline]
    pub fn vertical_span(&self) -> (i64, i64) {
        (self.y, self.y2)
    }

    /// 横向剖线所在行.
    #[inline]
    pub fn horizontal_row(&self) -> i64 {
        self.y3
    }

    /// 横向剖线的列范围 `[x3, x4)`.
    #[inline]
    pub fn horizontal_span(&self) -> (i64, i64) {
        (self.x3, self.x4)
    }

    /// 测量带半宽: 纵向行跨度的 1% 向下取整, 最小为 1.
    ///
    /// 横向与纵向采样共用该值, 横向列跨度不参与推导.
    /// 这是对既有测量行为的有意保留.
    pub fn band_half_width(&self) -> i64 {
        let w = ((self.y2 - self.y).abs() as f64 * BAND_SPAN_FRACTION) as i64;
        w.max(1)
    }
}

/// 试将一个坐标分量转换为截断后的整数.
#[inline]
fn truncated<T: ToPrimitive>(v: &T) -> Result<i64, InitBoundaryError> {
    let f = v.to_f64().ok_or(InitBoundaryError::NonFinitePoint)?;
    if !f.is_finite() {
        return Err(InitBoundaryError::NonFinitePoint);
    }
    if f.abs() >= COORD_BOUND {
        return Err(InitBoundaryError::PointOutOfBound);
    }
    Ok(f as i64)
}

#[cfg(test)]
mod tests {
    use super::{FieldBoundary, InitBoundaryError};

    /// 测试基本初始化错误问题.
    #[test]
    fn test_boundary_init_err() {
        let e = FieldBoundary::new(&[(0.0, 0.0); 3]).unwrap_err();
        assert_eq!(e, InitBoundaryError::TooFewPoints);

        let pts = [(1.0, f64::NAN), (1.0, 9.0), (2.0, 5.0), (8.0, 5.0)];
        let e = FieldBoundary::new(&pts).unwrap_err();
        assert_eq!(e, InitBoundaryError::NonFinitePoint);
    }

    /// 未参与推导的分量 (第 1 点的 x、第 3 点的 y) 不做检查.
    #[test]
    fn test_boundary_unused_components() {
        let pts = [
            (100.0, 20.0),
            (f64::NAN, 180.0),
            (30.0, 90.0),
            (170.0, f64::INFINITY),
        ];
        let b = FieldBoundary::new(&pts).unwrap();
        assert_eq!(b.vertical_column(), 100);
        assert_eq!(b.vertical_span(), (20, 180));
        assert_eq!(b.horizontal_row(), 90);
        assert_eq!(b.horizontal_span(), (30, 170));
    }

    /// 坐标截断向零取整, 与四舍五入不同.
    #[test]
    fn test_boundary_truncation() {
        let pts = [(3.9, 7.9), (0.0, 12.2), (-0.5, 4.6), (-1.5, 0.0)];
        let b = FieldBoundary::new(&pts).unwrap();
        assert_eq!(b.vertical_column(), 3);
        assert_eq!(b.vertical_span(), (7, 12));
        assert_eq!(b.horizontal_span(), (0, -1));
        assert_eq!(b.horizontal_row(), 4);
    }

    /// 带半宽取纵向跨度的 1% 向下取整, 最小为 1; 倒置跨度取绝对值.
    #[test]
    fn test_boundary_band_half_width() {
        let make = |y: f64, y2: f64| {
            FieldBoundary::new(&[(0.0, y), (0.0, y2), (0.0, 0.0), (0.0, 0.0)]).unwrap()
        };
        assert_eq!(make(0.0, 250.0).band_half_width(), 2);
        assert_eq!(make(0.0, 80.0).band_half_width(), 1);
        assert_eq!(make(10.0, 10.0).band_half_width(), 1);
        assert_eq!(make(250.0, 0.0).band_half_width(), 2);
    }

    /// 整数坐标也可以直接投喂.
    #[test]
    fn test_boundary_generic_input() {
        let b = FieldBoundary::new(&[(5u32, 10), (5, 90), (20, 50), (80, 50)]).unwrap();
        assert_eq!(b.vertical_column(), 5);
        assert_eq!(b.vertical_span(), (10, 90));
        assert_eq!(b.band_half_width(), 1);
    }

    /// 模长过大的有限坐标在构造期被拒绝,
    /// 之后的跨度与带宽推导不会发生 i64 溢出.
    #[test]
    fn test_boundary_point_out_of_bound() {
        // 该量级的 `as i64` 截断会饱和到 i64::MAX.
        let pts = [(9.3e18, 0.0), (0.0, 9.0), (2.0, 5.0), (8.0, 5.0)];
        let e = FieldBoundary::new(&pts).unwrap_err();
        assert_eq!(e, InitBoundaryError::PointOutOfBound);

        // 截断本身不饱和, 但纵向跨度 y2 - y 会超出 i64 表示范围.
        let pts = [(0.0, -4.8e18), (0.0, 4.8e18), (2.0, 5.0), (8.0, 5.0)];
        let e = FieldBoundary::new(&pts).unwrap_err();
        assert_eq!(e, InitBoundaryError::PointOutOfBound);

        // 上限以内的大坐标正常接受.
        let pts = [(0.0, 0.0), (0.0, 2.3e18), (2.0, 5.0), (8.0, 5.0)];
        let b = FieldBoundary::new(&pts).unwrap();
        assert_eq!(b.vertical_span(), (0, 2_300_000_000_000_000_000));
        assert!(b.band_half_width() >= 1);
    }
}
