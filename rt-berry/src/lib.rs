#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供放射治疗 QA 射野图像 (胶片扫描、EPID 采集等来源) 的均匀性
//! (PIU) 与剖线 (FWHM, 平坦度, 对称性) 分析算法.
//!
//! 该 crate 目前仅提供 `safe` 接口. 将来可能为部分高性能场景关键路径提供 `unsafe` 接口.
//!
//! # 注意
//!
//! 1. 本 crate 只处理单张二维灰度图 (行优先存储). 体数据的切片选择、文件解码
//!   均由调用方负责, 调用方以 `ndarray` 数组形式提交像素.
//! 2. 两个分析入口都不会就地修改输入图像; 标注结果写在新分配的副本上.
//! 3. 在非期望情况下, 程序会直接 panic, 而不会导致内存错误. As what Rust promises.
//!
//! # 开发计划
//!
//! ### 射野切片对象 ✅
//!
//! 不可变/可变视图与自有数据三件套, 行优先索引约定.
//!
//! 实现位于 `rt-berry/src/data/slice`.
//!
//! ### 显示窗口 ✅
//!
//! 提供一个独立的窗口对象, 以便将原始像素值转换为 8-bit 灰度值.
//!
//! 实现位于 `rt-berry/src/data/window.rs`.
//!
//! ### 中心 ROI 与小圆盘掩膜 ✅
//!
//! 以图像中心为圆心的经验 ROI, 以及极值点附近半径 2 的圆盘掩膜.
//!
//! 实现位于 `rt-berry/src/data/roi.rs`.
//!
//! ### PIU 均匀性分析 ✅
//!
//! 在中心 ROI 内定位最大/最小区域并求均值比, 输出 PIU 和标注图.
//!
//! 参考论文: "Intensity uniformity assessment in
//! quality assurance of linac imaging systems".
//! 从该类测量规程得知 PIU 的近似计算方法.
//!
//! 实现位于 `rt-berry/src/uniformity`.
//!
//! ### 剖线提取与带状中值采样 ✅
//!
//! 由四个点选坐标导出水平/垂直剖线, 以 `2w+1` 宽度带的中值采样,
//! 从而抑制坏点之类的伪影.
//!
//! 实现位于 `rt-berry/src/profile`.
//!
//! ### 1D 剖线处理 ✅
//!
//! 1. 如何处理胶片的明暗反转约定? ✅
//! 2. 如何在半影区获得亚像素精度? ✅
//! 3. 如何在两侧独立定位半高位置? ✅
//! 4. 如何定义有效射束窗口? ✅
//! 5. 奇数长度射束如何对半比较? ✅
//!
//! 上述问题的答案:
//!
//! 1. 归一化-反转-再归一化. 最暗原始像素被映射为最亮归一化值.
//! 2. 在 `[0, n-1]` 索引区间上线性插值到 `10 * n` 个等距采样点.
//! 3. 在插值序列前后两半中分别最小化 `|v - max/2|`, 按行优先规则取首个命中.
//! 4. `[left_hm + fwhm/10, right_hm - fwhm/10)`, 即从半高区间两侧各裁去
//!   10% 的半影.
//! 5. 删除正中过后一位的采样点 (非对称裁剪), 使两半等长.
//!
//! 实现位于 `rt-berry/src/profile/process.rs`.
//!
//! ### 批量 QA 运行器 ✅
//!
//! 对目录下的射野图批量运行两种分析并输出统计报告.
//!
//! 实现位于 workspace 成员 `studies/beamcheck`.
//!
//! ### 完善代码文档 ✅
//!
//! 给每个 public API 提供文档, 并视情况给 private
//! API 提供文档.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 屏幕点选坐标 `(x, y)`. `x` 沿宽度方向 (列), `y` 沿高度方向 (行).
///
/// 注意分量次序与 [`Idx2d`] 的 `(行, 列)` 约定相反, 这与图像查看器
/// 上报点击事件的习惯一致.
pub type ClickPos = (f64, f64);

/// 射野图像基础数据结构.
mod data;

pub use data::{
    FieldSlice, FieldSliceMut, FieldWindow, ImgWriteRaw, ImgWriteVis, OwnedFieldSlice,
};

pub use data::roi;

pub mod consts;

pub mod profile;
pub mod uniformity;

pub mod prelude;
