//! 射野图像的剖线提取与 FWHM/平坦度/对称性分析.

mod boundary;
mod process;

pub use boundary::{FieldBoundary, InitBoundaryError};
pub use process::{process_profile, Anomaly, BeamProfile};

use crate::consts::mark;
use crate::{FieldSlice, OwnedFieldSlice};
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 对射野图像实施双轴剖线分析.
///
/// 算法流程依次为:
///
/// 1. 由边界推导纵向剖线 (列 `x`, 行范围 `[y, y2)`) 与横向剖线
///    (行 `y3`, 列范围 `[x3, x4)`), 并检查范围与测量带都落在图像内.
/// 2. 测量带半宽 `w` 取纵向行跨度的 1% (最小 1), 两轴共用
///    (见 [`FieldBoundary::band_half_width`]).
/// 3. 纵向剖线对 `[y, y2)` 的每一行取列向测量带 `[x - w, x + w]`
///    的中位数; 横向剖线对 `[x3, x4)` 的每一列取行向测量带
///    `[y3 - w, y3 + w]` 的中位数. 中位数使坏点等伪影不进入剖线.
/// 4. 对两条剖线分别运行 [`process_profile`].
/// 5. 在原图的一份拷贝上把两条测量带的足迹烧录为带标记值,
///    随报告一并返回.
///
/// # 注意
///
/// - 行/列范围为空或倒置, 以及范围或测量带超出图像时,
///   返回对应的 [`ProfileError`];
/// - 测量带标记值为 10, 与图像中天然等于 10 的像素无法区分;
/// - 剖线本身的退化情形 (空剖线、束窗退化) 不会使本函数失败,
///   而是体现在对应轴的 [`BeamProfile::anomalies`] 中.
pub fn analyze_profiles(field: FieldSlice, boundary: FieldBoundary) -> ProfileResult<Profiles> {
    ProfileImp::new(field, boundary).analyze()
}

/// 剖线分析错误.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ProfileError {
    /// 纵向行范围为空或倒置.
    EmptyVerticalRange,

    /// 横向列范围为空或倒置.
    EmptyHorizontalRange,

    /// 剖线范围或其测量带超出图像.
    BandOutOfField,
}

/// 剖线分析结果.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// 双轴剖线分析报告.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Profiles {
    horizontal: BeamProfile,
    vertical: BeamProfile,
    annotated: OwnedFieldSlice,
}

impl Profiles {
    /// 获得横向剖线的处理报告.
    #[inline]
    pub fn horizontal(&self) -> &BeamProfile {
        &self.horizontal
    }

    /// 获得纵向剖线的处理报告.
    #[inline]
    pub fn vertical(&self) -> &BeamProfile {
        &self.vertical
    }

    /// 获得横向平坦度.
    #[inline]
    pub fn hor_flatness(&self) -> f64 {
        self.horizontal.flatness()
    }

    /// 获得横向对称性.
    #[inline]
    pub fn hor_symmetry(&self) -> f64 {
        self.horizontal.symmetry()
    }

    /// 获得纵向平坦度.
    #[inline]
    pub fn ver_flatness(&self) -> f64 {
        self.vertical.flatness()
    }

    /// 获得纵向对称性.
    #[inline]
    pub fn ver_symmetry(&self) -> f64 {
        self.vertical.symmetry()
    }

    /// 获得烧录了测量带标记的图像拷贝.
    #[inline]
    pub fn annotated(&self) -> FieldSlice<'_> {
        self.annotated.as_immutable()
    }

    /// 直接获得烧录了测量带标记的图像拷贝的所有权.
    #[inline]
    pub fn into_annotated(self) -> OwnedFieldSlice {
        self.annotated
    }
}

/// 校验过的采样几何, 所有量都保证落在图像内.
struct BandGeometry {
    x: usize,
    y: usize,
    y2: usize,
    x3: usize,
    y3: usize,
    x4: usize,
    w: usize,
}

/// `analyze_profiles` 函数的实现细节.
struct ProfileImp<'a> {
    field: FieldSlice<'a>,
    boundary: FieldBoundary,
}

impl<'a> ProfileImp<'a> {
    #[inline]
    pub fn new(field: FieldSlice<'a>, boundary: FieldBoundary) -> Self {
        Self { field, boundary }
    }

    /// 运行实际分析.
    pub fn analyze(&self) -> ProfileResult<Profiles> {
        // step 1: 校验范围与测量带.
        let g = self.validated()?;
        debug!(
            "剖线采样: 纵向 {} 点, 横向 {} 点, 带半宽 {}",
            g.y2 - g.y,
            g.x4 - g.x3,
            g.w
        );

        // step 2/3: 提取两条中位数剖线并分别处理.
        let horizontal = process_profile(&self.horizontal_profile(&g));
        let vertical = process_profile(&self.vertical_profile(&g));

        // step 4: 在原图拷贝上烧录两条测量带的足迹.
        let mut annotated = self.field.to_owned();
        {
            let mut view = annotated.as_mutable();
            let (xa, xb) = (g.x - g.w, g.x + g.w);
            view.fill_batch(
                (g.y..g.y2).flat_map(|r| (xa..=xb).map(move |c| (r, c))),
                mark::PROFILE_BAND,
            );
            let (ya, yb) = (g.y3 - g.w, g.y3 + g.w);
            view.fill_batch(
                (ya..=yb).flat_map(|r| (g.x3..g.x4).map(move |c| (r, c))),
                mark::PROFILE_BAND,
            );
        }

        Ok(Profiles {
            horizontal,
            vertical,
            annotated,
        })
    }

    /// 校验边界推导出的范围与测量带都落在图像内.
    fn validated(&self) -> ProfileResult<BandGeometry> {
        let (h, w_len) = self.field.shape();
        let (h, w_len) = (h as i64, w_len as i64);
        let b = &self.boundary;

        let x = b.vertical_column();
        let (y, y2) = b.vertical_span();
        let y3 = b.horizontal_row();
        let (x3, x4) = b.horizontal_span();
        let w = b.band_half_width();

        if y >= y2 {
            return Err(ProfileError::EmptyVerticalRange);
        }
        if x3 >= x4 {
            return Err(ProfileError::EmptyHorizontalRange);
        }
        // 纵向: 行范围与列向测量带.
        if y < 0 || y2 > h || x - w < 0 || x + w >= w_len {
            return Err(ProfileError::BandOutOfField);
        }
        // 横向: 列范围与行向测量带.
        if x3 < 0 || x4 > w_len || y3 - w < 0 || y3 + w >= h {
            return Err(ProfileError::BandOutOfField);
        }

        Ok(BandGeometry {
            x: x as usize,
            y: y as usize,
            y2: y2 as usize,
            x3: x3 as usize,
            y3: y3 as usize,
            x4: x4 as usize,
            w: w as usize,
        })
    }

    /// 纵向剖线: 对 `[y, y2)` 的每一行, 取列向测量带 `[x - w, x + w]` 的中位数.
    fn vertical_profile(&self, g: &BandGeometry) -> Vec<f64> {
        (g.y..g.y2)
            .map(|r| {
                let mut band: Vec<f64> = (g.x - g.w..=g.x + g.w)
                    .map(|c| self.field[(r, c)] as f64)
                    .collect();
                band_median(&mut band)
            })
            .collect()
    }

    /// 横向剖线: 对 `[x3, x4)` 的每一列, 取行向测量带 `[y3 - w, y3 + w]` 的中位数.
    fn horizontal_profile(&self, g: &BandGeometry) -> Vec<f64> {
        (g.x3..g.x4)
            .map(|c| {
                let mut band: Vec<f64> = (g.y3 - g.w..=g.y3 + g.w)
                    .map(|r| self.field[(r, c)] as f64)
                    .collect();
                band_median(&mut band)
            })
            .collect()
    }
}

/// 求一段测量带采样的中位数. 带宽恒为奇数, 即排序后的中间元素;
/// 偶数长度取中间两数的均值.
fn band_median(values: &mut [f64]) -> f64 {
    debug_assert!(!values.is_empty());
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}
