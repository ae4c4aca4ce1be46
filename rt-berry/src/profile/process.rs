//! 1D 剖线处理: 反转归一化、重采样、半高定位与平坦度/对称性计算.

use crate::consts::{INTERP_FACTOR, PENUMBRA_TRIM_DIVISOR};
use itertools::Itertools;
use log::warn;
use ndarray::Array;
use ordered_float::NotNan;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 对一条 1D 剖线实施处理.
///
/// 算法流程依次为:
///
/// 1. **反转归一化**: 按最大值归一化, 逐点取 `1 - v`, 再按新的最大值
///    归一化一次. 底片式成像中信号与像素值反相关,
///    反转后射野脊变为归一化曲线的高台.
///    任意一次归一化若遇到最大值为零, 则跳过该次除法, 记录
///    [`Anomaly::EmptyProfile`] 并继续.
/// 2. **重采样**: 线性插值到原采样数的 10 倍, 采样点均匀分布在
///    `[0, n - 1]` 索引区间, 使半高定位获得亚像素精度.
/// 3. **半高定位**: 在重采样曲线的前半段与后半段分别寻找与
///    `max / 2` 最接近的采样位置 (同距离时取首个), 两者之差即 FWHM.
/// 4. **束窗**: 从半高区间两端各去掉 FWHM 的 10% 以排除半影,
///    得到有用射束区段.
/// 5. **平坦度**: `100 * (max - min) / (max + min)`, 在束窗上计算.
/// 6. **奇偶修剪**: 束窗长度为奇数时, 删除中点偏后一位的采样,
///    使折半比较的两半等长.
/// 7. **对称性**: `100 * (sum(前半) - sum(后半)) / (sum(前半) + sum(后半))`,
///    在修剪后的束窗上计算. 注意结果带符号.
/// 8. 返回的 FWHM 区段与束窗区段都在前部补齐 NaN 占位,
///    使其与重采样曲线的索引轴对齐, 可直接叠加绘制.
///
/// # 注意
///
/// - 空剖线 (不含任何采样) 直接返回空报告, 平坦度与对称性记为 0,
///   并记录 [`Anomaly::EmptyProfile`];
/// - 束窗退化 (平坦度或对称性分母为零) 时, 对应指标记为 NaN 并记录
///   [`Anomaly::DegenerateBeam`], 不会触发算术崩溃;
/// - 所有异常同时通过 `log` 门面以 `warn` 级别报告,
///   本函数自身不持有任何全局状态.
pub fn process_profile(profile: &[f64]) -> BeamProfile {
    ProcessImp::new(profile).process()
}

/// 剖线处理过程中检测到的异常.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Anomaly {
    /// 某次归一化前的最大值为零, 该次除法被跳过.
    EmptyProfile,

    /// 束窗退化, 平坦度或对称性的分母为零, 对应指标记为 NaN.
    DegenerateBeam,
}

/// 单条剖线的处理报告.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BeamProfile {
    resampled: Vec<f64>,
    fwhm_segment: Vec<f64>,
    beam_segment: Vec<f64>,
    left_hm: usize,
    right_hm: usize,
    flatness: f64,
    symmetry: f64,
    anomalies: Vec<Anomaly>,
}

impl BeamProfile {
    /// 获得反转归一化并重采样后的完整曲线.
    #[inline]
    pub fn resampled(&self) -> &[f64] {
        &self.resampled
    }

    /// 获得 FWHM 区段. 前部以 NaN 补齐, 与重采样曲线的索引轴对齐.
    #[inline]
    pub fn fwhm_segment(&self) -> &[f64] {
        &self.fwhm_segment
    }

    /// 获得束窗区段. 前部以 NaN 补齐, 与重采样曲线的索引轴对齐.
    #[inline]
    pub fn beam_segment(&self) -> &[f64] {
        &self.beam_segment
    }

    /// 获得左半高位置 (重采样索引).
    #[inline]
    pub fn left_half_max(&self) -> usize {
        self.left_hm
    }

    /// 获得右半高位置 (重采样索引).
    #[inline]
    pub fn right_half_max(&self) -> usize {
        self.right_hm
    }

    /// 获得 FWHM (重采样索引差).
    #[inline]
    pub fn fwhm(&self) -> usize {
        self.right_hm - self.left_hm
    }

    /// 获得平坦度 (百分数). 束窗退化时为 NaN.
    #[inline]
    pub fn flatness(&self) -> f64 {
        self.flatness
    }

    /// 获得对称性 (带符号的百分数). 束窗退化时为 NaN.
    #[inline]
    pub fn symmetry(&self) -> f64 {
        self.symmetry
    }

    /// 获得处理过程中记录的所有异常.
    #[inline]
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// 判断束窗是否退化.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.anomalies.contains(&Anomaly::DegenerateBeam)
    }
}

/// `process_profile` 函数的实现细节.
struct ProcessImp {
    curve: Vec<f64>,
    anomalies: Vec<Anomaly>,
}

impl ProcessImp {
    #[inline]
    pub fn new(profile: &[f64]) -> Self {
        Self {
            curve: profile.to_vec(),
            anomalies: Vec::new(),
        }
    }

    /// 运行实际处理.
    pub fn process(mut self) -> BeamProfile {
        if self.curve.is_empty() {
            warn!("剖线不含任何采样, 跳过处理.");
            return BeamProfile {
                resampled: Vec::new(),
                fwhm_segment: Vec::new(),
                beam_segment: Vec::new(),
                left_hm: 0,
                right_hm: 0,
                flatness: 0.0,
                symmetry: 0.0,
                anomalies: vec![Anomaly::EmptyProfile],
            };
        }

        // step 1: 反转归一化.
        self.normalize();
        for v in self.curve.iter_mut() {
            *v = 1.0 - *v;
        }
        self.normalize();

        // step 2: 10 倍线性重采样.
        let resampled = resample(&self.curve);

        // step 3: 前后两半分别定位半高.
        let half_len = resampled.len() / 2;
        let peak = resampled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let half = peak / 2.0;
        let left_hm = nearest_pos(&resampled[..half_len], half);
        let right_hm = half_len + nearest_pos(&resampled[half_len..], half);

        // step 4: 束窗从半高区间两端各去掉 FWHM 的 10%.
        let fwhm = right_hm - left_hm;
        let trim = fwhm / PENUMBRA_TRIM_DIVISOR;
        let mut beam = resampled[left_hm + trim..right_hm - trim].to_vec();

        // step 5: 平坦度.
        let bmax = beam.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let bmin = beam.iter().copied().fold(f64::INFINITY, f64::min);
        let mut degenerate = false;
        let flatness = if bmax + bmin == 0.0 {
            degenerate = true;
            f64::NAN
        } else {
            100.0 * (bmax - bmin) / (bmax + bmin)
        };

        // step 6: 奇偶修剪.
        trim_parity(&mut beam);

        // step 7: 带符号的对称性.
        let mid = beam.len() / 2;
        let front: f64 = beam[..mid].iter().sum();
        let back: f64 = beam[mid..].iter().sum();
        let symmetry = if front + back == 0.0 {
            degenerate = true;
            f64::NAN
        } else {
            100.0 * (front - back) / (front + back)
        };

        if degenerate {
            warn!("束窗退化, 平坦度/对称性记为 NaN.");
            self.anomalies.push(Anomaly::DegenerateBeam);
        }

        // step 8: NaN 前缀对齐.
        let fwhm_segment = pad_gaps(left_hm, &resampled[left_hm..right_hm]);
        let beam_segment = pad_gaps(left_hm + trim, &beam);

        BeamProfile {
            resampled,
            fwhm_segment,
            beam_segment,
            left_hm,
            right_hm,
            flatness,
            symmetry,
            anomalies: self.anomalies,
        }
    }

    /// 将曲线按其最大值归一化. 最大值为零时跳过除法并记录异常.
    fn normalize(&mut self) {
        let max = self.curve.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max == 0.0 {
            warn!("剖线最大值为零, 跳过归一化.");
            self.anomalies.push(Anomaly::EmptyProfile);
            return;
        }
        for v in self.curve.iter_mut() {
            *v /= max;
        }
    }
}

/// 线性重采样到原采样数的 10 倍, 采样点均匀分布在 `[0, n - 1]` 区间.
fn resample(xs: &[f64]) -> Vec<f64> {
    let n = xs.len();
    debug_assert!(n >= 1);
    if n == 1 {
        // 单采样曲线没有斜率可言, 按常量铺满.
        return vec![xs[0]; INTERP_FACTOR];
    }
    let grid = Array::linspace(0.0, (n - 1) as f64, n * INTERP_FACTOR);
    grid.iter()
        .map(|&t| {
            let i = (t as usize).min(n - 2);
            let frac = t - i as f64;
            xs[i] * (1.0 - frac) + xs[i + 1] * frac
        })
        .collect()
}

/// 求 `ys` 中与 `target` 最接近的采样位置. 同距离时取首个.
fn nearest_pos(ys: &[f64], target: f64) -> usize {
    debug_assert!(!ys.is_empty());
    ys.iter()
        .position_min_by_key(|&&v| NotNan::new((v - target).abs()).unwrap())
        .unwrap()
}

/// 奇数长度的束窗在折半前删除中点偏后一位的采样.
/// 长度为 1 时没有 "偏后一位" 可删, 保持原样.
fn trim_parity(beam: &mut Vec<f64>) {
    if beam.len() % 2 == 1 {
        let drop_at = beam.len() / 2 + 1;
        if drop_at < beam.len() {
            beam.remove(drop_at);
        }
    }
}

/// 在 `tail` 前补 `prefix` 个 NaN 占位.
fn pad_gaps(prefix: usize, tail: &[f64]) -> Vec<f64> {
    let mut ans = vec![f64::NAN; prefix];
    ans.extend_from_slice(tail);
    ans
}

#[cfg(test)]
mod tests {
    use super::{process_profile, trim_parity, Anomaly, ProcessImp};

    /// 长度为 10 的剖线重采样后恰好是 100 个采样,
    /// 且两个区段的 NaN 前缀与其真实位置对齐.
    #[test]
    fn test_process_interp_density() {
        let profile = [0.0, 0.0, 2.0, 8.0, 10.0, 10.0, 10.0, 8.0, 2.0, 0.0];
        let r = process_profile(&profile);

        assert_eq!(r.resampled().len(), 100);
        assert!(r.anomalies().is_empty());
        assert!(r.flatness().is_finite());
        assert!(r.symmetry().is_finite());

        assert_eq!(r.fwhm_segment().len(), r.right_half_max());
        for (i, v) in r.fwhm_segment().iter().enumerate() {
            assert_eq!(v.is_nan(), i < r.left_half_max());
        }
        let beam_from = r.left_half_max() + r.fwhm() / 10;
        for (i, v) in r.beam_segment().iter().enumerate() {
            assert_eq!(v.is_nan(), i < beam_from);
        }
    }

    /// 对称的梯形剖线: 平坦度与对称性都应几乎为零.
    #[test]
    fn test_process_trapezoid_symmetric() {
        let mut profile = vec![0.0f64; 14];
        for i in [0, 1, 12, 13] {
            profile[i] = 10.0;
        }
        let r = process_profile(&profile);

        assert!(r.anomalies().is_empty());
        assert!(r.flatness().abs() < 1e-8, "flatness = {}", r.flatness());
        assert!(r.symmetry().abs() < 1e-8, "symmetry = {}", r.symmetry());
    }

    /// 奇数束窗删除的必须是中点偏后一位 (索引 `len / 2 + 1`),
    /// 而不是任何对称修剪规则.
    #[test]
    fn test_process_parity_drop_exact() {
        let mut beam = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        trim_parity(&mut beam);
        assert_eq!(beam, vec![10.0, 20.0, 30.0, 50.0]);

        let mut single = vec![7.0];
        trim_parity(&mut single);
        assert_eq!(single, vec![7.0]);

        let mut even = vec![1.0, 2.0, 3.0, 4.0];
        trim_parity(&mut even);
        assert_eq!(even, vec![1.0, 2.0, 3.0, 4.0]);
    }

    /// 归一化是幂等的: 对已归一化的曲线再归一化, 序列不变.
    #[test]
    fn test_process_normalize_idempotent() {
        let mut imp = ProcessImp::new(&[0.0, 0.25, 0.5, 1.0]);
        imp.normalize();
        let once = imp.curve.clone();
        imp.normalize();
        assert_eq!(once, imp.curve);
        assert!(imp.anomalies.is_empty());
    }

    /// 空剖线与全零剖线都走有定义的退化路径, 不崩溃.
    #[test]
    fn test_process_empty_and_all_zero() {
        let r = process_profile(&[]);
        assert!(r.resampled().is_empty());
        assert_eq!(r.flatness(), 0.0);
        assert_eq!(r.symmetry(), 0.0);
        assert_eq!(r.anomalies(), [Anomaly::EmptyProfile]);

        // 全零剖线反转后变为全 1 高台, 平坦度与对称性自然归零.
        let r = process_profile(&[0.0; 8]);
        assert_eq!(r.resampled().len(), 80);
        assert!(r.flatness().abs() < 1e-8);
        assert!(r.symmetry().abs() < 1e-8);
        assert_eq!(r.anomalies(), [Anomaly::EmptyProfile]);
        assert!(!r.is_degenerate());
    }

    /// 常量剖线: 反转归一化后曲线全零, 束窗退化, 指标记为 NaN.
    /// 半高搜索的同值平局取首个位置.
    #[test]
    fn test_process_constant_degenerate() {
        let r = process_profile(&[5.0; 6]);

        assert_eq!(r.left_half_max(), 0);
        assert_eq!(r.right_half_max(), 30);
        assert_eq!(r.fwhm(), 30);
        assert!(r.flatness().is_nan());
        assert!(r.symmetry().is_nan());
        assert!(r.anomalies().contains(&Anomaly::EmptyProfile));
        assert!(r.is_degenerate());
    }

    /// 单采样剖线按常量铺满重采样网格.
    #[test]
    fn test_process_single_sample() {
        let r = process_profile(&[42.0]);

        assert_eq!(r.resampled(), [0.0; 10]);
        assert_eq!(r.fwhm(), 5);
        assert!(r.flatness().is_nan());
        assert!(r.symmetry().is_nan());
        assert!(r.is_degenerate());
    }
}
