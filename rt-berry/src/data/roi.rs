//! 射野图像上的圆形感兴趣区 (ROI).
//!
//! 我们一般使用行优先编码存储二维图像. 其中行就是 "Height" (垂直方向),
//! 列就是 "Width" (水平方向). 本模块的所有圆心、半径和距离都在
//! "Height-O-Width" 索引坐标系下用欧氏距离度量, 与图像的物理间距无关.

use crate::consts::{EXTREMUM_MASK_RADIUS, ROI_RADIUS_DIVISOR};
use crate::Idx2d;

type Idx2dF = (f64, f64);

/// 求两点间欧氏距离.
#[inline]
fn euclid((h1, w1): Idx2dF, (h2, w2): Idx2dF) -> f64 {
    let dh = h1 - h2;
    let dw = w1 - w2;
    (dh * dh + dw * dw).sqrt()
}

/// 圆形 ROI 初始化错误.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InitRoiError {
    /// 图像不含任何像素, 无法推导 ROI.
    EmptyField,
    /// 圆心坐标不是有限值.
    BadCenter,
    /// 半径不是正有限值.
    BadRadius,
}

/// 以图像几何中心为圆心的圆形 ROI.
///
/// 圆心允许落在像素之间 (偶数尺寸的图像正是如此),
/// 半径由图像短边按固定比例推导. 该结构不负责检测图像越界.
#[derive(Copy, Clone, Debug)]
pub struct CentralRoi {
    /// 圆心, 以 (高, 宽) 次序存储.
    center: Idx2dF,
    radius: f64,
}

impl CentralRoi {
    /// 以 `center` 为圆心, `radius` 为半径, 创建一个圆形 ROI.
    ///
    /// # 返回值
    ///
    /// - 当 `center` 任一分量不是有限值时, 返回 `Err(InitRoiError::BadCenter)`;
    /// - 当 `radius` 不是正有限值时, 返回 `Err(InitRoiError::BadRadius)`;
    /// - 其他情况下成功, 返回 `Ok(CentralRoi)`.
    pub fn new(center: Idx2dF, radius: f64) -> Result<Self, InitRoiError> {
        if !center.0.is_finite() || !center.1.is_finite() {
            return Err(InitRoiError::BadCenter);
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(InitRoiError::BadRadius);
        }
        Ok(Self { center, radius })
    }

    /// 从图像分辨率推导居中 ROI: 圆心为 `(h / 2, w / 2)`,
    /// 半径为 `min(h, w) / 5.5`.
    ///
    /// 当图像不含任何像素时返回 `Err(InitRoiError::EmptyField)`.
    pub fn from_field_shape((h, w): Idx2d) -> Result<Self, InitRoiError> {
        if h == 0 || w == 0 {
            return Err(InitRoiError::EmptyField);
        }
        Ok(Self {
            center: (h as f64 / 2.0, w as f64 / 2.0),
            radius: h.min(w) as f64 / ROI_RADIUS_DIVISOR,
        })
    }

    /// 获取圆心.
    #[inline]
    pub fn center(&self) -> Idx2dF {
        self.center
    }

    /// 获取半径.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// 判断像素索引 `pos` 是否被包含在 ROI 中 (含边界).
    #[inline]
    pub fn contains(&self, (h, w): Idx2d) -> bool {
        euclid((h as f64, w as f64), self.center) <= self.radius
    }
}

/// 以某个像素为圆心的小圆盘掩膜.
///
/// 与 [`CentralRoi`] 不同, 圆心总是落在整数像素上.
/// 均匀性分析用它在极值像素周围烧录可视标记.
#[derive(Copy, Clone, Debug)]
pub struct PixelDisc {
    center: Idx2d,
    radius: f64,
}

impl PixelDisc {
    /// 以 `center` 为圆心, `radius` 为半径, 创建一个小圆盘.
    ///
    /// 当 `radius` 不是正有限值时返回 `Err(InitRoiError::BadRadius)`.
    pub fn new(center: Idx2d, radius: f64) -> Result<Self, InitRoiError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(InitRoiError::BadRadius);
        }
        Ok(Self { center, radius })
    }

    /// 创建极值标记专用的圆盘, 半径固定为 [`EXTREMUM_MASK_RADIUS`].
    #[inline]
    pub const fn extremum_mask(center: Idx2d) -> PixelDisc {
        Self {
            center,
            radius: EXTREMUM_MASK_RADIUS,
        }
    }

    /// 获取圆心.
    #[inline]
    pub fn center(&self) -> Idx2d {
        self.center
    }

    /// 判断像素索引 `pos` 是否被包含在圆盘中 (含边界).
    #[inline]
    pub fn contains(&self, (h, w): Idx2d) -> bool {
        let (ch, cw) = self.center;
        euclid((h as f64, w as f64), (ch as f64, cw as f64)) <= self.radius
    }

    /// 以行优先次序获取圆盘覆盖的所有像素索引, 裁剪到 `bound` 以内.
    ///
    /// 返回的索引保证都不越界, 可直接用于批量填充.
    pub fn positions(&self, (h_len, w_len): Idx2d) -> Vec<Idx2d> {
        let (ch, cw) = self.center;
        let reach = self.radius.ceil() as usize;

        let h_from = ch.saturating_sub(reach);
        let h_to = ch.saturating_add(reach + 1).min(h_len);
        let w_from = cw.saturating_sub(reach);
        let w_to = cw.saturating_add(reach + 1).min(w_len);

        let mut ans = Vec::new();
        for h in h_from..h_to {
            for w in w_from..w_to {
                if self.contains((h, w)) {
                    ans.push((h, w));
                }
            }
        }
        ans
    }
}

#[cfg(test)]
mod tests {
    use super::{CentralRoi, InitRoiError, PixelDisc};

    /// 测试基本初始化错误问题.
    #[test]
    fn test_roi_init_err() {
        let e = CentralRoi::from_field_shape((0, 10)).unwrap_err();
        assert_eq!(e, InitRoiError::EmptyField);
        let e = CentralRoi::from_field_shape((10, 0)).unwrap_err();
        assert_eq!(e, InitRoiError::EmptyField);

        let e = CentralRoi::new((f64::NAN, 0.0), 1.0).unwrap_err();
        assert_eq!(e, InitRoiError::BadCenter);
        let e = CentralRoi::new((0.0, 0.0), 0.0).unwrap_err();
        assert_eq!(e, InitRoiError::BadRadius);
        let e = PixelDisc::new((0, 0), f64::INFINITY).unwrap_err();
        assert_eq!(e, InitRoiError::BadRadius);
    }

    /// 在偶数尺寸的图像上逐像素验证 ROI 的成员关系.
    #[test]
    fn test_central_roi_contains() {
        let roi = CentralRoi::from_field_shape((100, 100)).unwrap();
        assert_eq!(roi.center(), (50.0, 50.0));

        // (100 / 5.5)^2 = 330.57..., 整数平方和不超过 330 即在圆内.
        for h in 0usize..100 {
            for w in 0usize..100 {
                let dh = h as i64 - 50;
                let dw = w as i64 - 50;
                let inside = dh * dh + dw * dw <= 330;
                assert_eq!(roi.contains((h, w)), inside, "({h}, {w})");
            }
        }
    }

    /// 奇数尺寸下圆心落在像素之间.
    #[test]
    fn test_central_roi_odd_shape() {
        let roi = CentralRoi::from_field_shape((3, 9)).unwrap();
        assert_eq!(roi.center(), (1.5, 4.5));

        // 最近的整数像素距圆心 sqrt(0.5), 而半径 3 / 5.5 更小,
        // 因此没有一个整数像素能进入 ROI.
        assert!(roi.radius() < 0.5f64.sqrt());
        for h in 0usize..3 {
            for w in 0usize..9 {
                assert!(!roi.contains((h, w)));
            }
        }
    }

    /// 半径 2 的标准圆盘覆盖 13 个像素.
    #[test]
    fn test_pixel_disc_full() {
        let disc = PixelDisc::extremum_mask((5, 5));
        let pos = disc.positions((11, 11));
        assert_eq!(pos.len(), 13);
        for &(h, w) in pos.iter() {
            assert!(disc.contains((h, w)));
            assert!(h <= 7 && w <= 7);
            assert!(h >= 3 && w >= 3);
        }
    }

    /// 圆盘超出图像边缘时会被裁剪.
    #[test]
    fn test_pixel_disc_clipped() {
        let disc = PixelDisc::extremum_mask((0, 0));
        let pos = disc.positions((8, 8));
        let mut expect = vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (2, 0)];
        expect.sort_unstable();
        let mut got = pos.clone();
        got.sort_unstable();
        assert_eq!(got, expect);
    }
}
