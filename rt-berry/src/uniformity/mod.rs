//! 射野图像的积分均匀性 (PIU) 分析.

use crate::roi::{CentralRoi, PixelDisc};
use crate::{FieldSlice, Idx2d, OwnedFieldSlice};
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 对射野图像实施积分均匀性 (PIU) 分析.
///
/// 算法流程依次为:
///
/// 1. 以图像几何中心 `(h / 2, w / 2)` 为圆心, 短边的 1/5.5
///    为半径推导圆形 ROI.
/// 2. 生成一份工作拷贝, 将 ROI 以外的像素全部清零.
/// 3. 在工作拷贝上以行优先次序定位最大像素与最小非零像素.
///    同值时取首个出现位置.
/// 4. 以两个极值位置为圆心、半径 2 的圆盘为邻域, 在 **原图**
///    上分别求平均剂量 `d_max` 和 `d_min`.
/// 5. 按 `100 * (1 - (d_max - d_min) / (d_max + d_min))` 计算 PIU.
/// 6. 在原图的一份拷贝上烧录两个极值圆盘标记
///    (先最大后最小, 重叠处以最小标记为准), 随报告一并返回.
///
/// # 注意
///
/// - 当 ROI 不含任何像素, 或其中所有像素都为零时, 返回
///   [`UniformityError::EmptyRegion`];
/// - 算法假定 ROI 内不存在天然为零的像素: 这样的像素在步骤 3
///   中与 ROI 外的清零像素无法区分, 不会成为最小值候选;
/// - PIU 的取值不做截断. 当图像含负剂量像素时, 结果可能超过 100.
pub fn analyze_uniformity(field: FieldSlice) -> UniformityResult<Uniformity> {
    UniformityImp::new(field).analyze()
}

/// 均匀性分析错误.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformityError {
    /// ROI 不含任何像素, 或其中所有像素都为零.
    EmptyRegion,
}

/// 均匀性分析结果.
pub type UniformityResult<T> = Result<T, UniformityError>;

/// 均匀性分析报告.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Uniformity {
    piu: f64,
    max_pos: Idx2d,
    min_pos: Idx2d,
    max_region_mean: f64,
    min_region_mean: f64,
    annotated: OwnedFieldSlice,
}

impl Uniformity {
    /// 获得积分均匀性 (百分数).
    #[inline]
    pub fn piu(&self) -> f64 {
        self.piu
    }

    /// 获得最大像素的首个出现位置.
    #[inline]
    pub fn max_pos(&self) -> Idx2d {
        self.max_pos
    }

    /// 获得最小非零像素的首个出现位置.
    #[inline]
    pub fn min_pos(&self) -> Idx2d {
        self.min_pos
    }

    /// 获得最大值圆盘邻域的平均剂量.
    #[inline]
    pub fn max_region_mean(&self) -> f64 {
        self.max_region_mean
    }

    /// 获得最小值圆盘邻域的平均剂量.
    #[inline]
    pub fn min_region_mean(&self) -> f64 {
        self.min_region_mean
    }

    /// 获得烧录了极值标记的图像拷贝.
    #[inline]
    pub fn annotated(&self) -> FieldSlice<'_> {
        self.annotated.as_immutable()
    }

    /// 直接获得烧录了极值标记的图像拷贝的所有权.
    #[inline]
    pub fn into_annotated(self) -> OwnedFieldSlice {
        self.annotated
    }
}

/// `analyze_uniformity` 函数的实现细节.
struct UniformityImp<'a> {
    field: FieldSlice<'a>,
}

impl<'a> UniformityImp<'a> {
    #[inline]
    pub fn new(field: FieldSlice<'a>) -> Self {
        Self { field }
    }

    /// 运行实际分析.
    pub fn analyze(&self) -> UniformityResult<Uniformity> {
        let shape = self.field.shape();

        // step 1: 推导居中 ROI.
        let Ok(roi) = CentralRoi::from_field_shape(shape) else {
            return Err(UniformityError::EmptyRegion);
        };

        // step 2: 生成工作拷贝并将 ROI 以外清零.
        let mut work = self.field.data().to_owned();
        for (pos, pix) in work.indexed_iter_mut() {
            if !roi.contains(pos) {
                *pix = 0.0;
            }
        }

        // step 3: 行优先扫描最大像素与最小非零像素的首个出现位置.
        let mut max_pos = (0, 0);
        let mut max_val = work[(0, 0)];
        for (pos, &v) in work.indexed_iter() {
            if v > max_val {
                max_val = v;
                max_pos = pos;
            }
        }

        let mut min_slot: Option<(Idx2d, f32)> = None;
        for (pos, &v) in work.indexed_iter() {
            if v == 0.0 {
                continue;
            }
            match min_slot {
                Some((_, cur)) if v >= cur => {}
                _ => min_slot = Some((pos, v)),
            }
        }
        let Some((min_pos, min_val)) = min_slot else {
            return Err(UniformityError::EmptyRegion);
        };
        debug!("均匀性极值: max {max_val} @ {max_pos:?}, min {min_val} @ {min_pos:?}");

        // step 4: 以极值为圆心的圆盘邻域, 在原图上求平均剂量.
        let max_disc = PixelDisc::extremum_mask(max_pos).positions(shape);
        let min_disc = PixelDisc::extremum_mask(min_pos).positions(shape);
        let max_region_mean = self.disc_mean(&max_disc);
        let min_region_mean = self.disc_mean(&min_disc);

        // step 5: PIU 本体.
        let spread = (max_region_mean - min_region_mean) / (max_region_mean + min_region_mean);
        let piu = 100.0 * (1.0 - spread);

        // step 6: 在原图拷贝上烧录极值标记. 先最大后最小,
        // 圆盘重叠处以最小标记为准.
        let mut annotated = self.field.to_owned();
        {
            let mut view = annotated.as_mutable();
            view.fill_batch(max_disc.iter().copied(), crate::consts::mark::UNIFORMITY_MAX);
            view.fill_batch(min_disc.iter().copied(), crate::consts::mark::UNIFORMITY_MIN);
        }

        Ok(Uniformity {
            piu,
            max_pos,
            min_pos,
            max_region_mean,
            min_region_mean,
            annotated,
        })
    }

    /// 求 `positions` 所覆盖的原图像素的平均剂量.
    fn disc_mean(&self, positions: &[Idx2d]) -> f64 {
        debug_assert!(!positions.is_empty());
        let sum: f64 = positions.iter().map(|&pos| self.field[pos] as f64).sum();
        sum / positions.len() as f64
    }
}
